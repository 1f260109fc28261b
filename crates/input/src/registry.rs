//! The ranked set of parser definitions, built once per dispatcher.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use tracing::{debug, info};

use crate::error::BuildError;
use crate::media_type::{MediaType, MediaTypeDecl, ParamCase};
use crate::parser::{BodyParser, SharedParser};
use crate::utils::ensure;

/// The fallback parser, used when no definition matches a request.
pub enum DefaultParser<B, T> {
    /// Refers to a registration by its media type string, compared case-insensitively.
    Named(String),
    Direct(SharedParser<B, T>),
}

impl<B, T> DefaultParser<B, T> {
    pub fn named(name: impl Into<String>) -> Self {
        DefaultParser::Named(name.into())
    }

    pub fn direct<P: BodyParser<B, T> + 'static>(parser: P) -> Self {
        DefaultParser::Direct(Arc::new(parser))
    }
}

impl<B, T> fmt::Debug for DefaultParser<B, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DefaultParser::Named(name) => f.debug_tuple("Named").field(name).finish(),
            DefaultParser::Direct(_) => f.write_str("Direct(..)"),
        }
    }
}

/// A registered media type and the parser handling it.
pub struct Definition<B, T> {
    media_type: MediaTypeDecl,
    parser: SharedParser<B, T>,
}

impl<B, T> Definition<B, T> {
    pub fn media_type(&self) -> &MediaTypeDecl {
        &self.media_type
    }

    pub fn parser(&self) -> &SharedParser<B, T> {
        &self.parser
    }
}

impl<B, T> fmt::Debug for Definition<B, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Definition").field("media_type", &self.media_type).finish_non_exhaustive()
    }
}

/// Definitions sorted from the most to the least specific.
pub struct Registry<B, T> {
    definitions: Vec<Definition<B, T>>,
    default_parser: Option<SharedParser<B, T>>,
}

impl<B, T> Registry<B, T> {
    /// Validates the registrations and ranks them.
    ///
    /// Registrations keep their declaration order among definitions with the same number of
    /// parameters.
    ///
    /// # Errors
    ///
    /// - [`BuildError::NoParsers`] when `registrations` is empty
    /// - [`BuildError::UnknownDefault`] when a named default matches no registration
    /// - [`BuildError::MalformedMediaType`] and [`BuildError::DuplicateParameter`] for an
    ///   invalid registration string
    /// - [`BuildError::DuplicateDefinition`] when two registrations declare the same type and
    ///   parameter set
    pub fn build(
        registrations: Vec<(String, SharedParser<B, T>)>,
        default_parser: Option<DefaultParser<B, T>>,
        case: ParamCase,
    ) -> Result<Self, BuildError> {
        ensure!(!registrations.is_empty(), BuildError::NoParsers);

        let default_parser = match default_parser {
            None => None,
            Some(DefaultParser::Direct(parser)) => Some(parser),
            Some(DefaultParser::Named(name)) => {
                let (_, parser) = registrations
                    .iter()
                    .find(|(media_type, _)| media_type.eq_ignore_ascii_case(&name))
                    .ok_or_else(|| BuildError::unknown_default(&name))?;
                Some(Arc::clone(parser))
            }
        };

        let mut definitions = Vec::with_capacity(registrations.len());
        let mut identities = HashSet::with_capacity(registrations.len());
        for (raw, parser) in registrations {
            let media_type = MediaTypeDecl::parse(&raw, case)?;
            ensure!(identities.insert(media_type.identity()), BuildError::duplicate_definition(&raw));
            definitions.push(Definition { media_type, parser });
        }

        // stable: equal specificity keeps declaration order
        definitions.sort_by_key(|definition| std::cmp::Reverse(definition.media_type.specificity()));

        info!(definitions = definitions.len(), has_default = default_parser.is_some(), "built input parser registry");
        Ok(Self { definitions, default_parser })
    }

    /// Picks the parser for a request: the first matching definition, else the default parser.
    pub fn select(&self, media_type: &MediaType) -> Option<&SharedParser<B, T>> {
        match self.definitions.iter().find(|definition| definition.media_type.matches(media_type)) {
            Some(definition) => {
                debug!(request = %media_type, definition = ?definition.media_type, "selected input parser");
                Some(&definition.parser)
            }
            None => self.default_parser.as_ref(),
        }
    }

    pub fn definitions(&self) -> &[Definition<B, T>] {
        &self.definitions
    }

    pub fn default_parser(&self) -> Option<&SharedParser<B, T>> {
        self.default_parser.as_ref()
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

impl<B, T> fmt::Debug for Registry<B, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("definitions", &self.definitions)
            .field("has_default", &self.default_parser.is_some())
            .finish()
    }
}
