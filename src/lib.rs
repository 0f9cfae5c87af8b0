//! # radixmux
//!
//! A trie-based high performance HTTP request dispatcher.
//!
//! Routes live in one compressed radix tree per HTTP method, so matching a
//! request costs O(path length) regardless of how many routes are
//! registered, and matching a parameter-free route performs no heap
//! allocation at all.
//!
//! ## Pattern syntax
//!
//! | Syntax  | Kind            | Matches                                    |
//! |---------|-----------------|--------------------------------------------|
//! | literal | static          | itself, byte for byte                      |
//! | `:name` | named parameter | one segment, up to the next `/` or the end |
//! | `*name` | catch-all       | the rest of the path, leading `/` included |
//!
//! Named parameters are dynamic path segments:
//!
//! ```text
//! Pattern: /blog/:category/:post
//!
//!  /blog/go/request-routers          match: category="go", post="request-routers"
//!  /blog/go/request-routers/         no match, redirect recommended
//!  /blog/go/                         no match
//! ```
//!
//! Catch-all parameters swallow everything from their leading slash to the
//! path end and therefore must be the final pattern segment:
//!
//! ```text
//! Pattern: /files/*filepath
//!
//!  /files/                           match: filepath="/"
//!  /files/templates/article.html     match: filepath="/templates/article.html"
//!  /files                            no match, redirect recommended
//! ```
//!
//! ## Example
//!
//! ```
//! use radixmux::{Dispatch, Dispatcher};
//! use http::Method;
//!
//! let mut dispatcher = Dispatcher::new();
//! dispatcher.get("/", "index");
//! dispatcher.get("/hello/:name", "hello");
//!
//! match dispatcher.dispatch(&Method::GET, "/hello/gopher") {
//!     Dispatch::Handler { handler, params } => {
//!         assert_eq!(*handler, "hello");
//!         assert_eq!(params.get("name"), Some("gopher"));
//!     }
//!     outcome => panic!("unexpected outcome: {outcome:?}"),
//! }
//! ```
//!
//! The dispatcher never performs I/O: [`dispatch`](Dispatcher::dispatch)
//! returns the routing decision — serve, redirect, auto-OPTIONS, 405 or
//! 404 — as a value, and the surrounding server turns it into a response.

use std::collections::HashMap;

use http::{Method, StatusCode};
use tracing::debug;

mod error;
pub mod params;
pub mod path;
pub mod tree;

pub use error::InsertError;
pub use params::{Param, Params};
pub use tree::{Node, Resolution};

use path::normalize_path;

// ============================================================================
// Dispatch Outcome
// ============================================================================

/// The routing decision for one request.
#[derive(Debug)]
pub enum Dispatch<'tree, 'path, T> {
    /// A route matched; serve it.
    Handler {
        handler: &'tree T,
        params: Params<'tree, 'path>,
    },
    /// No exact match, but a canonical variant of the path exists. `code` is
    /// 301 for GET and 307 for everything else, so non-idempotent requests
    /// are replayed against the corrected location with their method intact.
    Redirect { location: String, code: StatusCode },
    /// An OPTIONS request answered from the routing table; `allow` is the
    /// `Allow` header value.
    Options { allow: String },
    /// The path exists under other methods; `allow` lists them.
    MethodNotAllowed { allow: String },
    /// Nothing matched.
    NotFound,
}

// ============================================================================
// Dispatcher
// ============================================================================

/// A request dispatcher with one routing tree per HTTP method.
///
/// Registration is exclusive: inserting routes must not run concurrently
/// with other insertions or lookups. Once registration is done the
/// dispatcher is immutable and lookups need no synchronization.
///
/// Path auto-correction, trailing slashes included, is enabled by default;
/// the `redirect_*`/`handle_*` fields switch the individual behaviors off.
///
/// # Examples
///
/// ```
/// use radixmux::Dispatcher;
/// use http::Method;
///
/// let mut dispatcher = Dispatcher::new();
/// dispatcher.get("/user/:name", "user");
///
/// let found = dispatcher.lookup(&Method::GET, "/user/gopher");
/// assert_eq!(found.handler, Some(&"user"));
/// assert_eq!(found.params.get("name"), Some("gopher"));
/// assert!(!found.tsr);
/// ```
#[derive(Clone)]
pub struct Dispatcher<T> {
    trees: HashMap<Method, Node<T>>,

    /// Redirect when the route matches with one trailing slash added or
    /// removed: `/foo/` is redirected to `/foo` if only `/foo` is
    /// registered. 301 for GET requests, 307 otherwise.
    pub redirect_trailing_slash: bool,

    /// When no handler matches, clean the path (`..`, `//`) and retry
    /// case-insensitively, redirecting to the canonical route on success:
    /// `/FOO` and `/..//Foo` can both be redirected to `/foo`. Independent
    /// of `redirect_trailing_slash`.
    pub redirect_fixed_path: bool,

    /// Answer unroutable requests with 405 and an `Allow` header when the
    /// path is registered under other methods.
    pub handle_method_not_allowed: bool,

    /// Answer OPTIONS requests from the routing table. Registered OPTIONS
    /// handlers take priority over the automatic reply.
    pub handle_options: bool,
}

impl<T> Dispatcher<T> {
    /// A dispatcher with every auto-correction behavior enabled.
    pub fn new() -> Self {
        Dispatcher {
            trees: HashMap::new(),
            redirect_trailing_slash: true,
            redirect_fixed_path: true,
            handle_method_not_allowed: true,
            handle_options: true,
        }
    }

    // ========================================================================
    // Registration
    // ========================================================================

    /// Registers a handler for the given method and pattern.
    ///
    /// # Panics
    ///
    /// Panics when the pattern is malformed or conflicts with an existing
    /// registration — both are bugs at the registration site, and the
    /// message names the offending pattern. Use [`try_handle`] to get the
    /// conflict as a value instead.
    ///
    /// [`try_handle`]: Dispatcher::try_handle
    pub fn handle(&mut self, method: Method, path: &str, handler: T) {
        if let Err(err) = self.try_handle(method, path, handler) {
            panic!("{err}");
        }
    }

    /// Registers a handler, reporting conflicts as an error value.
    ///
    /// The method's tree may be left partially reshaped by a failed
    /// registration, so an error should abort startup rather than be
    /// retried.
    pub fn try_handle(&mut self, method: Method, path: &str, handler: T) -> Result<(), InsertError> {
        if !path.starts_with('/') {
            return Err(InsertError::MissingLeadingSlash {
                path: path.to_string(),
            });
        }

        debug!(method = %method, path, "registering route");

        self.trees
            .entry(method)
            .or_insert_with(Node::new)
            .insert(path, handler)
    }

    /// Shortcut for [`handle`](Dispatcher::handle) with [`Method::GET`].
    pub fn get(&mut self, path: &str, handler: T) {
        self.handle(Method::GET, path, handler);
    }

    /// Shortcut for [`handle`](Dispatcher::handle) with [`Method::HEAD`].
    pub fn head(&mut self, path: &str, handler: T) {
        self.handle(Method::HEAD, path, handler);
    }

    /// Shortcut for [`handle`](Dispatcher::handle) with [`Method::POST`].
    pub fn post(&mut self, path: &str, handler: T) {
        self.handle(Method::POST, path, handler);
    }

    /// Shortcut for [`handle`](Dispatcher::handle) with [`Method::PUT`].
    pub fn put(&mut self, path: &str, handler: T) {
        self.handle(Method::PUT, path, handler);
    }

    /// Shortcut for [`handle`](Dispatcher::handle) with [`Method::PATCH`].
    pub fn patch(&mut self, path: &str, handler: T) {
        self.handle(Method::PATCH, path, handler);
    }

    /// Shortcut for [`handle`](Dispatcher::handle) with [`Method::DELETE`].
    pub fn delete(&mut self, path: &str, handler: T) {
        self.handle(Method::DELETE, path, handler);
    }

    /// Shortcut for [`handle`](Dispatcher::handle) with [`Method::OPTIONS`].
    pub fn options(&mut self, path: &str, handler: T) {
        self.handle(Method::OPTIONS, path, handler);
    }

    // ========================================================================
    // Lookup
    // ========================================================================

    /// Manual lookup of a method + path combination, e.g. to build a
    /// framework around the dispatcher.
    ///
    /// The handler is returned even when the resolution only recommends a
    /// trailing-slash redirect, so callers can fall back to serving it.
    pub fn lookup<'s, 'p>(&'s self, method: &Method, path: &'p str) -> Resolution<'s, 'p, T> {
        match self.trees.get(method) {
            Some(root) => root.resolve(path),
            None => Resolution::default(),
        }
    }

    /// The `Allow` header value for a path: every method that can route it,
    /// excluding `method` itself, sorted, with `OPTIONS` appended. `"*"`
    /// asks server-wide. Empty when nothing else matches.
    pub fn allowed(&self, path: &str, method: &Method) -> String {
        let mut allow: Vec<&str> = Vec::new();

        if path == "*" {
            for registered in self.trees.keys() {
                if *registered == Method::OPTIONS {
                    continue;
                }
                allow.push(registered.as_str());
            }
        } else {
            for (registered, root) in &self.trees {
                if registered == method || *registered == Method::OPTIONS {
                    continue;
                }
                if root.resolve(path).handler.is_some() {
                    allow.push(registered.as_str());
                }
            }
        }

        if allow.is_empty() {
            return String::new();
        }

        allow.sort_unstable();
        allow.push("OPTIONS");
        allow.join(", ")
    }

    /// Routes one request and returns the decision.
    ///
    /// Decision order, mirroring what a server front end needs:
    ///
    /// 1. Exact match → [`Dispatch::Handler`].
    /// 2. Trailing-slash match (`redirect_trailing_slash`) →
    ///    [`Dispatch::Redirect`] with the slash toggled.
    /// 3. Case-insensitive match on the cleaned path
    ///    (`redirect_fixed_path`, skipped for CONNECT and `/`) →
    ///    [`Dispatch::Redirect`] to the canonical route.
    /// 4. OPTIONS auto-reply (`handle_options`) → [`Dispatch::Options`].
    /// 5. Other methods match (`handle_method_not_allowed`) →
    ///    [`Dispatch::MethodNotAllowed`].
    /// 6. [`Dispatch::NotFound`].
    ///
    /// # Examples
    ///
    /// ```
    /// use radixmux::{Dispatch, Dispatcher};
    /// use http::Method;
    ///
    /// let mut dispatcher = Dispatcher::new();
    /// dispatcher.get("/path", "handler");
    ///
    /// match dispatcher.dispatch(&Method::GET, "/path/") {
    ///     Dispatch::Redirect { location, code } => {
    ///         assert_eq!(location, "/path");
    ///         assert_eq!(code.as_u16(), 301);
    ///     }
    ///     outcome => panic!("unexpected outcome: {outcome:?}"),
    /// }
    /// ```
    pub fn dispatch<'s, 'p>(&'s self, method: &Method, path: &'p str) -> Dispatch<'s, 'p, T> {
        if let Some(root) = self.trees.get(method) {
            let found = root.resolve(path);

            if let Some(handler) = found.handler {
                if !found.tsr || !self.redirect_trailing_slash {
                    return Dispatch::Handler {
                        handler,
                        params: found.params,
                    };
                }

                let location = if path.len() > 1 && path.ends_with('/') {
                    path[..path.len() - 1].to_string()
                } else {
                    format!("{path}/")
                };
                return Dispatch::Redirect {
                    location,
                    code: redirect_code(method),
                };
            }

            if self.redirect_fixed_path && *method != Method::CONNECT && path != "/" {
                let cleaned = normalize_path(path);
                if let Some(fixed) =
                    root.find_case_insensitive_path(&cleaned, self.redirect_trailing_slash)
                {
                    return Dispatch::Redirect {
                        location: fixed,
                        code: redirect_code(method),
                    };
                }
            }
        }

        if *method == Method::OPTIONS {
            if self.handle_options {
                let allow = self.allowed(path, method);
                if !allow.is_empty() {
                    return Dispatch::Options { allow };
                }
            }
        } else if self.handle_method_not_allowed {
            let allow = self.allowed(path, method);
            if !allow.is_empty() {
                return Dispatch::MethodNotAllowed { allow };
            }
        }

        Dispatch::NotFound
    }
}

impl<T> Default for Dispatcher<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Permanent redirect for GET; temporary, method-preserving redirect for
/// everything else.
fn redirect_code(method: &Method) -> StatusCode {
    if *method == Method::GET {
        StatusCode::MOVED_PERMANENTLY
    } else {
        StatusCode::TEMPORARY_REDIRECT
    }
}
