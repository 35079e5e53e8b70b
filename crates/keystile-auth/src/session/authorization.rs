//! `Authorization` header parsing.

/// Role token that marks a refresh request.
pub const REFRESH_ROLE: &str = "token";

/// An `Authorization` header split into its role and credential halves.
///
/// The header has the form `"<role> <credential>"`. Anything other than
/// exactly two whitespace-separated parts leaves `credential` empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Authorization<'a> {
    /// The role half (e.g. `Bearer`, `token`).
    pub role: &'a str,
    /// The credential half, when the header has exactly two parts.
    pub credential: Option<&'a str>,
    has_separator: bool,
}

impl<'a> Authorization<'a> {
    /// Splits a raw header value.
    #[must_use]
    pub fn parse(header: &'a str) -> Self {
        let mut parts = header.split_whitespace();
        let role = parts.next().unwrap_or_default();
        let credential = match (parts.next(), parts.next()) {
            (Some(credential), None) => Some(credential),
            _ => None,
        };

        Self {
            role,
            credential,
            has_separator: header.contains(char::is_whitespace),
        }
    }

    /// Returns `true` if the caller presents a refresh token
    /// (role `token`, compared case-insensitively, followed by a separator).
    #[must_use]
    pub fn is_refresh(&self) -> bool {
        self.has_separator && self.role.eq_ignore_ascii_case(REFRESH_ROLE)
    }
}
