//! Path and query-string helpers shared by the request translator.

use lambda_runtime::tracing::warn;
use std::borrow::Cow;
use std::fmt;

/// A base path in canonical form: empty, or a single leading slash followed by
/// segments with no trailing slash.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct BasePath(String);

impl BasePath {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Removes one leading occurrence of the base path from `path`.
    ///
    /// A base path of `/` or shorter never strips anything.
    #[must_use]
    pub fn strip<'a>(&self, path: &'a str) -> &'a str {
        if self.0.len() <= 1 {
            return path;
        }
        path.strip_prefix(self.0.as_str()).unwrap_or(path)
    }
}

impl fmt::Display for BasePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Canonicalizes a configured base-path prefix.
///
/// Blank input disables stripping. Otherwise surrounding whitespace is
/// trimmed, every leading and trailing slash removed, and one leading slash
/// prepended: `api/v1/` and `//api/v1` both become `/api/v1`.
#[must_use]
pub fn normalize_base_path(raw: &str) -> BasePath {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return BasePath::default();
    }

    let segments = trimmed.trim_start_matches('/').trim_end_matches('/');
    BasePath(format!("/{segments}"))
}

/// Decodes a query-string component, treating `+` as a space.
///
/// Components that do not decode to UTF-8 are returned unchanged.
#[must_use]
pub fn query_unescape(component: &str) -> Cow<'_, str> {
    let spaced: Cow<'_, str> = if component.contains('+') {
        Cow::Owned(component.replace('+', " "))
    } else {
        Cow::Borrowed(component)
    };

    match urlencoding::decode(&spaced) {
        Ok(decoded) => Cow::Owned(decoded.into_owned()),
        Err(e) => {
            warn!(error = %e, component = %component, "Query component is not valid UTF-8 once unescaped");
            Cow::Borrowed(component)
        }
    }
}
