//! Opaque bearer credential passed through to downstream APIs

use std::fmt;

/// A bearer token supplied by a client or by configuration.
///
/// The value is never validated; it is forwarded verbatim as
/// `Authorization: Bearer <value>`. `Debug` and `Display` are redacted so a
/// credential can sit inside structs that get logged.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Build a credential from an optional raw value. Only the empty string
    /// counts as "not supplied"; anything else is kept byte-for-byte.
    pub fn from_optional(value: Option<String>) -> Option<Self> {
        value.filter(|v| !v.is_empty()).map(Self)
    }

    /// The raw token, for building the outbound request only.
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Short hint (last four characters) safe for logs.
    pub fn hint(&self) -> String {
        let chars: Vec<char> = self.0.chars().collect();
        if chars.len() <= 8 {
            return "****".to_string();
        }
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("****{}", tail)
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Credential").field(&"[REDACTED]").finish()
    }
}

impl fmt::Display for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.hint())
    }
}
