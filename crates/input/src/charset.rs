use tracing::warn;

use crate::error::Rejection;

/// Charsets accepted when [`CharsetGuard`] is enforcing.
pub const ALLOWED_CHARSETS: [&str; 4] = ["utf-8", "utf8", "unicode-1-1-utf-8", "us-ascii"];

/// Restricts the `charset` parameter of incoming requests to UTF-8 compatible values.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct CharsetGuard {
    any_charset: bool,
}

impl CharsetGuard {
    pub fn new(any_charset: bool) -> Self {
        Self { any_charset }
    }

    /// A guard that accepts every charset.
    pub fn permissive() -> Self {
        Self::new(true)
    }

    /// Accepts an absent charset or one of [`ALLOWED_CHARSETS`], compared case-insensitively.
    pub fn check(&self, charset: Option<&str>) -> Result<(), Rejection> {
        match charset {
            _ if self.any_charset => Ok(()),
            None => Ok(()),
            Some(charset) if ALLOWED_CHARSETS.iter().any(|allowed| allowed.eq_ignore_ascii_case(charset)) => Ok(()),
            Some(charset) => {
                warn!(charset = charset, "rejecting request with unsupported charset");
                Err(Rejection::unsupported_charset(charset))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn utf8_spellings_are_accepted() {
        let guard = CharsetGuard::default();
        for charset in ["UTF-8", "utf-8", "UTF8", "utf8", "Unicode-1-1-UTF-8", "US-ASCII"] {
            assert_eq!(guard.check(Some(charset)), Ok(()), "{charset}");
        }
    }

    #[test]
    fn absent_charset_is_accepted() {
        assert_eq!(CharsetGuard::default().check(None), Ok(()));
    }

    #[test]
    fn other_charsets_are_rejected() {
        let guard = CharsetGuard::default();

        assert_eq!(guard.check(Some("ISO-8859-1")), Err(Rejection::unsupported_charset("ISO-8859-1")));
        assert!(guard.check(Some("utf-16")).is_err());
        assert!(guard.check(Some("")).is_err());
    }

    #[test]
    fn permissive_guard_accepts_anything() {
        let guard = CharsetGuard::permissive();

        assert_eq!(guard.check(Some("ISO-8859-1")), Ok(()));
        assert_eq!(guard.check(Some("koi8-r")), Ok(()));
    }
}
