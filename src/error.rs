//! Route-registration error definitions.

use thiserror::Error;

/// Errors raised while registering a route pattern.
///
/// Every variant is a programmer error: the pattern itself is malformed or
/// contradicts an earlier registration. Each message names the offending
/// pattern so a failed registration can be traced back to the call site.
/// Lookups never produce an error; an unmatched path is simply `None`.
///
/// # Examples
///
/// ```
/// use radixmux::{Dispatcher, InsertError};
/// use http::Method;
///
/// let mut dispatcher = Dispatcher::new();
/// dispatcher.get("/user/:name", 1);
///
/// let err = dispatcher
///     .try_handle(Method::GET, "/user/:name", 2)
///     .unwrap_err();
/// assert!(matches!(err, InsertError::DuplicateHandler { .. }));
/// assert!(err.to_string().contains("/user/:name"));
/// ```
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum InsertError {
    /// Route patterns are absolute; anything else is a typo.
    #[error("path must begin with '/' in '{path}'")]
    MissingLeadingSlash { path: String },

    /// The exact pattern already carries a handler.
    #[error("a handler is already registered for path '{path}'")]
    DuplicateHandler { path: String },

    /// The pattern disagrees with a wildcard registered at this position,
    /// either on its name or on whether the position is a wildcard at all.
    #[error("path segment '{segment}' conflicts with existing wildcard '{wildcard}' in path '{path}'")]
    WildcardConflict {
        segment: String,
        wildcard: String,
        path: String,
    },

    /// A second `:` or `*` inside one segment.
    #[error("only one wildcard per path segment is allowed, has: '{segment}' in path '{path}'")]
    TooManyWildcards { segment: String, path: String },

    /// A wildcard inserted under a node that already has children would make
    /// those children unreachable.
    #[error("wildcard route '{wildcard}' conflicts with existing children in path '{path}'")]
    UnreachableWildcard { wildcard: String, path: String },

    /// `:` or `*` immediately followed by `/` or the end of the pattern.
    #[error("wildcard must be named with a non-empty name in path '{path}'")]
    UnnamedWildcard { path: String },

    /// A catch-all segment anywhere but the end of the pattern.
    #[error("catch-all routes are only allowed at the end of the path in path '{path}'")]
    CatchAllNotLast { path: String },

    /// A catch-all directly below a path that already terminates in `/`.
    #[error("catch-all conflicts with existing handler for the path segment root in path '{path}'")]
    CatchAllRootConflict { path: String },

    /// The byte before the `*` must be `/`.
    #[error("no / before catch-all in path '{path}'")]
    CatchAllMissingSlash { path: String },

    /// The pattern diverges from an existing route in the middle of a
    /// multi-byte character, so no valid split point exists.
    #[error("path '{path}' overlaps an existing route inside a multi-byte character")]
    CharBoundary { path: String },
}
