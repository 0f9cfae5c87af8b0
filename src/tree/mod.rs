//! Compressed radix tree for URL path matching.
//!
//! One tree per HTTP method. Each edge carries a multi-byte path fragment;
//! `:name` parameter segments and `*name` catch-all segments are stored as
//! dedicated node kinds. Lookup walks the tree byte by byte, so matching
//! cost is proportional to the request path, not to the number of routes.

mod case_fold;
mod insert;
mod resolve;

pub use resolve::Resolution;

/// The kinds of nodes the tree can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum NodeKind {
    /// A literal path fragment.
    Static,
    /// The tree root.
    Root,
    /// A `:name` parameter segment, matching up to the next `/` or the end.
    Param,
    /// A `*name` segment, matching the remainder of the path including the
    /// `/` in front of it. Used both for the anchor node (empty path,
    /// indexed by `/` in its parent) and the `/*name` leaf below it.
    CatchAll,
}

/// A vertex of the routing tree.
///
/// Nodes are created by [`insert`](Node::insert) — either as fresh children
/// or by splitting an existing node at a common-prefix boundary — and never
/// deleted. Lookups treat the tree as read-only; registration must not run
/// concurrently with lookups.
///
/// Invariants kept by insertion:
/// - `children` is sorted non-increasing by `priority` (the number of
///   handlers in each child's subtree), so busier branches are tried first
/// - `indices[i]` is the first path byte of `children[i]` for static
///   children; a wildcard child is the only child and is not indexed
/// - `nparams` bounds the number of wildcards on any path through this node
#[derive(Clone)]
pub struct Node<T> {
    pub(crate) path: String,
    pub(crate) indices: Vec<u8>,
    pub(crate) kind: NodeKind,
    pub(crate) wild_child: bool,
    pub(crate) nparams: u8,
    pub(crate) priority: u32,
    pub(crate) handler: Option<T>,
    pub(crate) children: Vec<Node<T>>,
}

impl<T> Node<T> {
    /// An empty tree.
    pub const fn new() -> Self {
        Node {
            path: String::new(),
            indices: Vec::new(),
            kind: NodeKind::Static,
            wild_child: false,
            nparams: 0,
            priority: 0,
            handler: None,
            children: Vec::new(),
        }
    }
}

impl<T> Default for Node<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Number of `:` and `*` wildcards in a pattern, saturating at 255.
pub(crate) fn count_params(path: &str) -> u8 {
    path.bytes()
        .filter(|&c| c == b':' || c == b'*')
        .count()
        .min(255) as u8
}

/// Length of the shared byte prefix of two fragments.
pub(crate) fn longest_common_prefix(a: &str, b: &str) -> usize {
    a.as_bytes()
        .iter()
        .zip(b.as_bytes())
        .take_while(|(x, y)| x == y)
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree(routes: &[&str]) -> Node<String> {
        let mut root = Node::new();
        for route in routes {
            root.insert(route, route.to_string())
                .unwrap_or_else(|e| panic!("inserting {route}: {e}"));
        }
        root
    }

    /// Siblings sorted non-increasing by priority, indices parallel to the
    /// static children, and priority equal to the number of handlers below.
    fn check_priorities<T>(node: &Node<T>) -> u32 {
        let mut sum = u32::from(node.handler.is_some());

        let mut previous = u32::MAX;
        for child in &node.children {
            assert!(
                child.priority <= previous,
                "children out of priority order at '{}'",
                node.path
            );
            previous = child.priority;
            sum += check_priorities(child);
        }

        if !node.wild_child {
            assert_eq!(
                node.indices.len(),
                node.children.len(),
                "indices not parallel to children at '{}'",
                node.path
            );
            for (i, child) in node.children.iter().enumerate() {
                if !child.path.is_empty() {
                    assert_eq!(
                        node.indices[i],
                        child.path.as_bytes()[0],
                        "index byte mismatch at '{}'",
                        node.path
                    );
                }
            }
        }

        assert_eq!(
            node.priority, sum,
            "priority of '{}' is not the handler count of its subtree",
            node.path
        );
        sum
    }

    /// `nparams` at every node bounds the wildcards on any path through it.
    fn check_nparams<T>(node: &Node<T>) -> u8 {
        // the catch-all anchor captures nothing itself; its `/*name` leaf does
        let own = u8::from(node.kind == NodeKind::Param)
            + u8::from(node.kind == NodeKind::CatchAll && node.path.starts_with('/'));

        let deepest = node.children.iter().map(check_nparams).max().unwrap_or(0);
        let required = own + deepest;
        assert!(
            node.nparams >= required,
            "nparams {} < {} at '{}'",
            node.nparams,
            required,
            node.path
        );
        required
    }

    #[test]
    fn test_priority_invariant_holds_after_inserts() {
        let root = tree(&[
            "/",
            "/cmd/:tool/:sub",
            "/cmd/:tool/",
            "/src/*filepath",
            "/search/",
            "/search/:query",
            "/user_:name",
            "/user_:name/about",
            "/files/:dir/*filepath",
            "/doc/",
            "/doc/go_faq.html",
            "/doc/go1.html",
            "/info/:user/public",
            "/info/:user/project/:project",
        ]);
        check_priorities(&root);
    }

    #[test]
    fn test_priority_reorders_busy_branches_first() {
        let root = tree(&["/a/one", "/b/one", "/b/two", "/b/three"]);
        check_priorities(&root);
        // the /b subtree carries three handlers and must be probed first
        assert_eq!(root.children[0].path.as_bytes()[0], b'b');
    }

    #[test]
    fn test_nparams_bounds_wildcards() {
        let root = tree(&[
            "/search/:page",
            "/users/:id",
            "/users/:id/posts/:post",
            "/files/*filepath",
            "/static/about",
        ]);
        check_nparams(&root);
        assert!(root.nparams >= 2);
    }

    #[test]
    fn test_nparams_set_on_first_insert() {
        let root = tree(&["/user/:name"]);
        assert_eq!(root.nparams, 1);
    }

    #[test]
    fn test_static_match_allocates_no_params() {
        let root = tree(&["/", "/doc", "/doc/go_faq.html"]);
        let found = root.resolve("/doc/go_faq.html");
        assert!(found.handler.is_some());
        assert!(found.params.is_empty());
        assert_eq!(found.params.capacity(), 0);
    }

    #[test]
    fn test_param_vector_allocated_exactly_once() {
        let root = tree(&["/info/:user/project/:project"]);
        let found = root.resolve("/info/gordon/project/go");
        assert_eq!(found.params.len(), 2);
        assert_eq!(found.params.capacity(), 2);
    }

    #[test]
    fn test_count_params() {
        assert_eq!(count_params("/"), 0);
        assert_eq!(count_params("/user/:name"), 1);
        assert_eq!(count_params("/files/:dir/*filepath"), 2);
    }

    #[test]
    fn test_longest_common_prefix() {
        assert_eq!(longest_common_prefix("contact", "con"), 3);
        assert_eq!(longest_common_prefix("co", "contact"), 2);
        assert_eq!(longest_common_prefix("ab", "cd"), 0);
    }
}
