//! Exact path lookup with parameter capture and trailing-slash
//! recommendation.

use crate::params::Params;

use super::{Node, NodeKind};

/// The outcome of resolving a request path against one tree.
///
/// `tsr` (trailing-slash recommendation) means the exact path did not match,
/// but the same path with one trailing slash added or removed would. The
/// matching handler is returned alongside `tsr = true` so callers can choose
/// between serving it and issuing a redirect.
#[derive(Debug, Clone)]
pub struct Resolution<'tree, 'path, T> {
    pub handler: Option<&'tree T>,
    pub params: Params<'tree, 'path>,
    pub tsr: bool,
}

impl<T> Default for Resolution<'_, '_, T> {
    fn default() -> Self {
        Resolution {
            handler: None,
            params: Params::new(),
            tsr: false,
        }
    }
}

impl<T> Node<T> {
    /// Looks up the handler registered for a request path.
    ///
    /// Parameter values are captured in pattern order. The walk is
    /// read-only and never fails; an unmatched path yields a resolution
    /// with no handler, possibly with `tsr` set.
    pub fn resolve<'tree, 'path>(&'tree self, path: &'path str) -> Resolution<'tree, 'path, T> {
        let mut current = self;
        let mut path = path;
        let mut params = Params::new();

        loop {
            let prefix_len = current.path.len();

            if path.len() > prefix_len {
                if &path.as_bytes()[..prefix_len] != current.path.as_bytes() {
                    break;
                }
                path = &path[prefix_len..];

                // No wildcard child: either the remainder is a lone slash
                // behind a handler (recommend stripping it), or some static
                // child owns the next byte.
                if !current.wild_child {
                    if path == "/" && current.handler.is_some() {
                        return Resolution {
                            handler: current.handler.as_ref(),
                            params,
                            tsr: true,
                        };
                    }

                    let next = path.as_bytes()[0];
                    match current.indices.iter().position(|&c| c == next) {
                        Some(i) => {
                            current = &current.children[i];
                            continue;
                        }
                        None => {
                            return Resolution {
                                handler: None,
                                params,
                                tsr: false,
                            }
                        }
                    }
                }

                current = &current.children[0];
                match current.kind {
                    NodeKind::Param => {
                        let end = path
                            .as_bytes()
                            .iter()
                            .position(|&c| c == b'/')
                            .unwrap_or(path.len());

                        params.prealloc(current.nparams);
                        params.push(&current.path[1..], &path[..end]);

                        if end < path.len() {
                            // more path behind the segment value
                            if &path[end..] == "/" && current.handler.is_some() {
                                return Resolution {
                                    handler: current.handler.as_ref(),
                                    params,
                                    tsr: true,
                                };
                            }

                            if !current.children.is_empty() {
                                path = &path[end..];
                                current = &current.children[0];
                                continue;
                            }

                            return Resolution {
                                handler: None,
                                params,
                                tsr: false,
                            };
                        }

                        if current.handler.is_some() {
                            return Resolution {
                                handler: current.handler.as_ref(),
                                params,
                                tsr: false,
                            };
                        }

                        // no handler here; a lone '/' child would match with
                        // a trailing slash appended
                        if current.children.len() == 1 {
                            let child = &current.children[0];
                            if child.path == "/" && child.handler.is_some() {
                                return Resolution {
                                    handler: child.handler.as_ref(),
                                    params,
                                    tsr: true,
                                };
                            }
                        }

                        return Resolution {
                            handler: None,
                            params,
                            tsr: false,
                        };
                    }
                    NodeKind::CatchAll => {
                        // the capture keeps the '/' in front of the wildcard
                        params.prealloc(current.nparams);
                        params.push(&current.path[2..], path);

                        return Resolution {
                            handler: current.handler.as_ref(),
                            params,
                            tsr: false,
                        };
                    }
                    _ => unreachable!("wildcard child is always a param or catch-all node"),
                }
            }

            if path == current.path {
                if current.handler.is_some() {
                    return Resolution {
                        handler: current.handler.as_ref(),
                        params,
                        tsr: false,
                    };
                }

                // redirect /name/ to /name
                if path == "/" && current.wild_child && current.kind != NodeKind::Root {
                    return Resolution {
                        handler: None,
                        params,
                        tsr: true,
                    };
                }

                // a '/'-child that carries a handler one step down means the
                // path with a trailing slash appended would match
                if let Some(i) = current.indices.iter().position(|&c| c == b'/') {
                    let child = &current.children[i];

                    if child.path.len() == 1 && child.handler.is_some() {
                        return Resolution {
                            handler: child.handler.as_ref(),
                            params,
                            tsr: true,
                        };
                    }

                    if child.kind == NodeKind::CatchAll && child.children[0].handler.is_some() {
                        return Resolution {
                            handler: child.children[0].handler.as_ref(),
                            params,
                            tsr: true,
                        };
                    }
                }

                return Resolution {
                    handler: None,
                    params,
                    tsr: false,
                };
            }

            break;
        }

        // Nothing matched. Recommend stripping a superfluous trailing slash,
        // or appending one when the node's own path is the request plus '/'.
        if path == "/" {
            return Resolution {
                handler: None,
                params,
                tsr: true,
            };
        }

        let node = current.path.as_bytes();
        let tsr = node.len() == path.len() + 1
            && node[path.len()] == b'/'
            && path.as_bytes() == &node[..node.len() - 1]
            && current.handler.is_some();

        Resolution {
            handler: if tsr { current.handler.as_ref() } else { None },
            params,
            tsr,
        }
    }
}
