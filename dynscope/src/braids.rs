use std::{convert::Infallible, fmt};

use aliri_braid::braid;
use thiserror::Error;

/// The longest scope name that will be accepted, in bytes
pub const MAX_SCOPE_NAME_LEN: usize = 255;

/// An invalid scope name
#[derive(Debug, Error)]
pub enum InvalidScopeName {
    /// The scope name was the empty string
    #[error("scope name cannot be empty")]
    EmptyString,
    /// The scope name contained a byte not allowed in an OAuth2 scope token
    #[error("invalid scope name byte at position {position}: 0x{value:02x}")]
    InvalidByte {
        /// The index in the scope name where the invalid byte was found
        position: usize,
        /// The invalid byte value
        value: u8,
    },
    /// The scope name was longer than [`MAX_SCOPE_NAME_LEN`]
    #[error("scope name is {0} bytes long, at most 255 are allowed")]
    TooLong(usize),
}

impl From<Infallible> for InvalidScopeName {
    fn from(x: Infallible) -> Self {
        match x {}
    }
}

/// The name of a registered OAuth2 scope
///
/// A scope name is a single scope token as defined in
/// [RFC 6749, Section 3.3][RFC6749 3.3]: it is composed of printable
/// ASCII characters excluding ` ` (space), `"` (double quote), and
/// `\` (backslash). It may be at most [`MAX_SCOPE_NAME_LEN`] bytes long.
///
///   [RFC6749 3.3]: (https://datatracker.ietf.org/doc/html/rfc6749#section-3.3)
#[braid(
    serde,
    validator,
    ref_doc = "A borrowed reference to a [`ScopeName`]"
)]
pub struct ScopeName;

impl aliri_braid::Validator for ScopeName {
    type Error = InvalidScopeName;

    fn validate(s: &str) -> Result<(), Self::Error> {
        if s.is_empty() {
            Err(InvalidScopeName::EmptyString)
        } else if let Some((position, &value)) = s
            .as_bytes()
            .iter()
            .enumerate()
            .find(|(_, &b)| b <= 0x20 || b == 0x22 || b == 0x5C || 0x7F <= b)
        {
            Err(InvalidScopeName::InvalidByte { position, value })
        } else if s.len() > MAX_SCOPE_NAME_LEN {
            Err(InvalidScopeName::TooLong(s.len()))
        } else {
            Ok(())
        }
    }
}

/// The identifier of an OAuth2 client application known to the
/// authorization server
#[braid(serde)]
pub struct ApplicationId;

/// A bearer credential presented to the authorization server
#[braid(serde, debug = "owned", display = "owned")]
pub struct AccessToken;

impl fmt::Debug for AccessTokenRef {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if f.alternate() {
            f.write_str("\"")?;
            limited_reveal(self.as_str(), &mut *f, 15)?;
            f.write_str("\"")
        } else {
            f.write_str("***ACCESS TOKEN***")
        }
    }
}

impl fmt::Display for AccessTokenRef {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if f.alternate() {
            limited_reveal(self.as_str(), &mut *f, usize::MAX)
        } else {
            f.write_str("***ACCESS TOKEN***")
        }
    }
}

fn limited_reveal(unprotected: &str, f: &mut fmt::Formatter, default_len: usize) -> fmt::Result {
    let max_len = f.width().unwrap_or(default_len);
    if max_len <= 1 {
        f.write_str("…")
    } else if max_len > unprotected.len() {
        f.write_str(unprotected)
    } else {
        match unprotected.char_indices().nth(max_len - 2) {
            Some((idx, c)) if idx + c.len_utf8() < unprotected.len() => {
                f.write_str(&unprotected[0..idx + c.len_utf8()])?;
                f.write_str("…")
            }
            _ => f.write_str(unprotected),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_plain_and_uri_names() {
        for name in ["read", "write:all", "https://api.example.com/scopes/admin"] {
            let parsed: ScopeName = name.parse().unwrap();
            assert_eq!(parsed.as_str(), name);
        }
    }

    #[test]
    fn rejects_empty() {
        let x = "".parse::<ScopeName>();
        assert!(matches!(x, Err(InvalidScopeName::EmptyString)));
    }

    #[test]
    fn rejects_space() {
        let x = "read write".parse::<ScopeName>();
        assert!(matches!(
            x,
            Err(InvalidScopeName::InvalidByte {
                position: 4,
                value: 0x20
            })
        ));
    }

    #[test]
    fn rejects_quote_and_backslash() {
        assert!(matches!(
            "\"read\"".parse::<ScopeName>(),
            Err(InvalidScopeName::InvalidByte { .. })
        ));
        assert!(matches!(
            "read\\write".parse::<ScopeName>(),
            Err(InvalidScopeName::InvalidByte { .. })
        ));
    }

    #[test]
    fn rejects_non_ascii() {
        let x = "lecture¿".parse::<ScopeName>();
        assert!(matches!(x, Err(InvalidScopeName::InvalidByte { .. })));
    }

    #[test]
    fn enforces_length_limit() {
        let longest = "a".repeat(MAX_SCOPE_NAME_LEN);
        assert!(longest.parse::<ScopeName>().is_ok());

        let too_long = "a".repeat(MAX_SCOPE_NAME_LEN + 1);
        assert!(matches!(
            too_long.parse::<ScopeName>(),
            Err(InvalidScopeName::TooLong(256))
        ));
    }

    #[test]
    fn ref_validates_too() {
        assert!(ScopeNameRef::from_str("read").is_ok());
        assert!(matches!(
            ScopeNameRef::from_str(""),
            Err(InvalidScopeName::EmptyString)
        ));
    }

    #[test]
    fn access_token_is_redacted() {
        let token = AccessToken::from(String::from("this-is-a-long-secret-token"));
        assert_eq!(format!("{}", token), "***ACCESS TOKEN***");
        assert_eq!(format!("{:?}", token), "***ACCESS TOKEN***");
        assert_eq!(format!("{:#}", token), "this-is-a-long-secret-token");
        assert_eq!(format!("{:#6}", token), "this-…");
    }
}
