//! Route registration: tree construction, node splitting, conflict checks.

use std::mem;

use crate::error::InsertError;

use super::{count_params, longest_common_prefix, Node, NodeKind};

impl<T> Node<T> {
    /// Registers a handler under the given pattern.
    ///
    /// Splits and extends the tree as needed. Returns an error when the
    /// pattern is malformed or contradicts an earlier registration; the tree
    /// may have been partially reshaped at that point, so a failed insert
    /// should be treated as fatal by the caller.
    ///
    /// Not safe to call concurrently with any other operation on the tree.
    pub fn insert(&mut self, path: &str, handler: T) -> Result<(), InsertError> {
        let full_path = path;
        let mut nparams = count_params(path);
        self.priority += 1;

        // empty tree
        if self.path.is_empty() && self.children.is_empty() {
            self.kind = NodeKind::Root;
            if nparams > self.nparams {
                self.nparams = nparams;
            }
            return self.insert_child(nparams, path, full_path, handler);
        }

        let mut current = self;
        let mut path = path;

        'walk: loop {
            if nparams > current.nparams {
                current.nparams = nparams;
            }

            // The longest common prefix contains no ':' or '*', since an
            // existing node path never holds those bytes.
            let i = longest_common_prefix(path, &current.path);

            // split the edge
            if i < current.path.len() {
                if !current.path.is_char_boundary(i) {
                    return Err(InsertError::CharBoundary {
                        path: full_path.to_string(),
                    });
                }

                let mut child = Node {
                    kind: NodeKind::Static,
                    path: current.path[i..].to_string(),
                    indices: mem::take(&mut current.indices),
                    wild_child: current.wild_child,
                    nparams: 0,
                    priority: current.priority - 1,
                    handler: current.handler.take(),
                    children: mem::take(&mut current.children),
                };
                for grandchild in &child.children {
                    if grandchild.nparams > child.nparams {
                        child.nparams = grandchild.nparams;
                    }
                }

                current.indices = vec![current.path.as_bytes()[i]];
                current.path.truncate(i);
                current.wild_child = false;
                current.children = vec![child];
            }

            // the pattern has a tail; descend or branch
            if i < path.len() {
                path = &path[i..];

                if current.wild_child {
                    current = &mut current.children[0];
                    current.priority += 1;

                    if nparams > current.nparams {
                        current.nparams = nparams;
                    }
                    nparams = nparams.saturating_sub(1);

                    // the tail must spell out the very same wildcard
                    let wild_len = current.path.len();
                    if path.len() >= wild_len
                        && current.path.as_bytes() == &path.as_bytes()[..wild_len]
                        && (wild_len >= path.len() || path.as_bytes()[wild_len] == b'/')
                    {
                        continue 'walk;
                    }

                    return Err(InsertError::WildcardConflict {
                        segment: path.to_string(),
                        wildcard: current.path.clone(),
                        path: full_path.to_string(),
                    });
                }

                let next = path.as_bytes()[0];

                // slash after a parameter segment
                if current.kind == NodeKind::Param && next == b'/' && current.children.len() == 1 {
                    current = &mut current.children[0];
                    current.priority += 1;
                    continue 'walk;
                }

                // a child shares the next byte; descend
                if let Some(pos) = current.indices.iter().position(|&c| c == next) {
                    let pos = current.update_child_priority(pos);
                    current = &mut current.children[pos];
                    continue 'walk;
                }

                // otherwise branch off a new child
                if next != b':' && next != b'*' {
                    current.indices.push(next);
                    current.children.push(Node::new());
                    let pos = current.update_child_priority(current.children.len() - 1);
                    current.children[pos].nparams = nparams;
                    current = &mut current.children[pos];
                }
                return current.insert_child(nparams, path, full_path, handler);
            }

            // the pattern ends exactly here
            if current.handler.is_some() {
                return Err(InsertError::DuplicateHandler {
                    path: full_path.to_string(),
                });
            }
            current.handler = Some(handler);
            return Ok(());
        }
    }

    /// Builds the chain of static, parameter and catch-all nodes for a
    /// pattern tail that has no counterpart in the tree yet.
    fn insert_child(
        &mut self,
        mut nparams: u8,
        path: &str,
        full_path: &str,
        handler: T,
    ) -> Result<(), InsertError> {
        let bytes = path.as_bytes();
        let max = bytes.len();
        let mut current = self;
        let mut offset = 0; // bytes of `path` already consumed
        let mut i = 0;

        while nparams > 0 {
            let c = bytes[i];
            if c != b':' && c != b'*' {
                i += 1;
                continue;
            }

            // wildcard runs to the next '/' or the pattern end
            let mut end = i + 1;
            while end < max && bytes[end] != b'/' {
                if bytes[end] == b':' || bytes[end] == b'*' {
                    return Err(InsertError::TooManyWildcards {
                        segment: path[i..].to_string(),
                        path: full_path.to_string(),
                    });
                }
                end += 1;
            }

            if !current.children.is_empty() {
                return Err(InsertError::UnreachableWildcard {
                    wildcard: path[i..end].to_string(),
                    path: full_path.to_string(),
                });
            }

            if end - i < 2 {
                return Err(InsertError::UnnamedWildcard {
                    path: full_path.to_string(),
                });
            }

            if c == b':' {
                // split the fragment at the wildcard start
                if i > 0 {
                    current.path = path[offset..i].to_string();
                    offset = i;
                }

                current.children = vec![Node {
                    kind: NodeKind::Param,
                    nparams,
                    ..Node::new()
                }];
                current.wild_child = true;
                current = &mut current.children[0];
                current.priority += 1;
                nparams -= 1;

                // a pattern continuing past the parameter needs another
                // static node for the '/...' suffix
                if end < max {
                    current.path = path[offset..end].to_string();
                    offset = end;

                    current.children = vec![Node {
                        nparams,
                        priority: 1,
                        ..Node::new()
                    }];
                    current = &mut current.children[0];
                }

                i = end;
            } else {
                // catch-all terminates the pattern
                if end != max || nparams > 1 {
                    return Err(InsertError::CatchAllNotLast {
                        path: full_path.to_string(),
                    });
                }

                if current.path.ends_with('/') {
                    return Err(InsertError::CatchAllRootConflict {
                        path: full_path.to_string(),
                    });
                }

                let slash = match i.checked_sub(1) {
                    Some(s) if bytes[s] == b'/' => s,
                    _ => {
                        return Err(InsertError::CatchAllMissingSlash {
                            path: full_path.to_string(),
                        })
                    }
                };
                current.path = path[offset..slash].to_string();

                // anchor node: lets the exact-match walk observe the slash
                current.children = vec![Node {
                    kind: NodeKind::CatchAll,
                    nparams: 1,
                    wild_child: true,
                    ..Node::new()
                }];
                current.indices = vec![b'/'];
                current = &mut current.children[0];
                current.priority += 1;

                // leaf node holding the variable and the handler
                current.children = vec![Node {
                    kind: NodeKind::CatchAll,
                    path: path[slash..].to_string(),
                    nparams: 1,
                    priority: 1,
                    handler: Some(handler),
                    ..Node::new()
                }];
                return Ok(());
            }
        }

        // no wildcard left; attach the remaining fragment and the handler
        current.path = path[offset..].to_string();
        current.handler = Some(handler);
        Ok(())
    }

    /// Bumps the priority of the child at `pos` and bubbles it toward the
    /// front past lower-priority siblings, keeping `indices` parallel.
    /// Returns the child's new position.
    fn update_child_priority(&mut self, pos: usize) -> usize {
        self.children[pos].priority += 1;
        let priority = self.children[pos].priority;

        let mut new_pos = pos;
        while new_pos > 0 && self.children[new_pos - 1].priority < priority {
            self.children.swap(new_pos - 1, new_pos);
            new_pos -= 1;
        }

        if new_pos != pos {
            self.indices = [
                &self.indices[..new_pos],    // unchanged prefix
                &self.indices[pos..=pos],    // the moved index byte
                &self.indices[new_pos..pos], // shifted block
                &self.indices[pos + 1..],
            ]
            .concat();
        }

        new_pos
    }
}
