//! Helper macros shared by the registry and the media type declarations.

/// Returns early with `$error` when `$predicate` does not hold.
///
/// Works like `assert!`, but yields an error instead of panicking.
///
/// ```ignore
/// ensure!(!parsers.is_empty(), BuildError::NoParsers);
/// ```
macro_rules! ensure {
    ($predicate:expr, $error:expr) => {
        if !$predicate {
            return Err($error);
        }
    };
}

pub(crate) use ensure;
