//! Case-insensitive path rediscovery.
//!
//! Recovers the canonically cased route when a client sent mixed case, e.g.
//! `/FOO` for a registered `/foo`. The walk compares a lowercase shadow of
//! the request against a lowercase shadow of each node fragment, and the
//! output is assembled from the registered fragments so it carries the
//! registered casing. Wildcard values are appended verbatim.
//!
//! Comparison is byte by byte, but child selection must happen per rune: a
//! registered pattern may have cased any character either way, so at each
//! fragment boundary the walk first recurses down the child matching the
//! lowercase first byte of the next rune and then retries with the
//! uppercase variant. A four-byte buffer carries the bytes of the rune
//! currently being consumed across node boundaries.

use super::{Node, NodeKind};

impl<T> Node<T> {
    /// Case-insensitive lookup, optionally fixing a missing or superfluous
    /// trailing slash.
    ///
    /// Returns the canonically cased path when a route matches.
    pub fn find_case_insensitive_path(
        &self,
        path: &str,
        fix_trailing_slash: bool,
    ) -> Option<String> {
        let lower = path.to_lowercase();
        let (fixed, found) = self.find_case_insensitive_rec(
            path.as_bytes(),
            lower.as_bytes(),
            Vec::with_capacity(path.len() + 1),
            [0; 4],
            fix_trailing_slash,
        );

        if found {
            String::from_utf8(fixed).ok()
        } else {
            None
        }
    }

    fn find_case_insensitive_rec(
        &self,
        mut path: &[u8],
        mut lower_path: &[u8],
        mut out: Vec<u8>,
        mut rb: [u8; 4],
        fix_trailing_slash: bool,
    ) -> (Vec<u8>, bool) {
        let mut current = self;
        let mut lower_node = current.path.to_lowercase();

        // Byte 0 of every fragment was already verified through the parent's
        // indices (or is the leading '/'), so shadows compare from byte 1.
        'walk: while lower_path.len() >= lower_node.len()
            && (lower_node.is_empty()
                || lower_path[1..lower_node.len()] == lower_node.as_bytes()[1..])
        {
            out.extend_from_slice(current.path.as_bytes());
            path = &path[current.path.len().min(path.len())..];

            if !path.is_empty() {
                let old_lower = lower_path;
                lower_path = &lower_path[lower_node.len()..];

                if !current.wild_child {
                    rb = shift_rune_bytes(rb, lower_node.len());

                    if rb[0] != 0 {
                        // still inside the rune that began in the parent
                        let pending = rb[0];
                        for (i, &c) in current.indices.iter().enumerate() {
                            if c == pending {
                                current = &current.children[i];
                                lower_node = current.path.to_lowercase();
                                continue 'walk;
                            }
                        }
                    } else {
                        // start a new rune; it may have begun up to three
                        // bytes before the fragment boundary
                        let boundary = lower_node.len();
                        let mut off = 0;
                        let mut rune = None;
                        let max_off = boundary.min(3);
                        while off < max_off {
                            let start = boundary - off;
                            match old_lower.get(start) {
                                Some(&b) if is_rune_start(b) => {
                                    rune = first_char(&old_lower[start..]);
                                    break;
                                }
                                _ => off += 1,
                            }
                        }

                        if let Some(rune) = rune {
                            let _ = rune.encode_utf8(&mut rb);
                            rb = shift_rune_bytes(rb, off);

                            let lower_byte = rb[0];
                            for (i, &c) in current.indices.iter().enumerate() {
                                if c == lower_byte {
                                    // both casings may exist as children, so
                                    // the lowercase branch is only tried, not
                                    // committed to
                                    let (fixed, found) = current.children[i]
                                        .find_case_insensitive_rec(
                                            path,
                                            lower_path,
                                            out.clone(),
                                            rb,
                                            fix_trailing_slash,
                                        );
                                    if found {
                                        return (fixed, true);
                                    }
                                    break;
                                }
                            }

                            let upper = single_char_uppercase(rune);
                            if upper != rune {
                                let _ = upper.encode_utf8(&mut rb);
                                rb = shift_rune_bytes(rb, off);

                                let upper_byte = rb[0];
                                for (i, &c) in current.indices.iter().enumerate() {
                                    if c == upper_byte {
                                        current = &current.children[i];
                                        lower_node = current.path.to_lowercase();
                                        continue 'walk;
                                    }
                                }
                            }
                        }
                    }

                    // dead end; only a superfluous trailing slash is fixable
                    return (
                        out,
                        fix_trailing_slash && path == b"/" && current.handler.is_some(),
                    );
                }

                current = &current.children[0];
                match current.kind {
                    NodeKind::Param => {
                        let k = path
                            .iter()
                            .position(|&c| c == b'/')
                            .unwrap_or(path.len());

                        // the segment value keeps the request casing
                        out.extend_from_slice(&path[..k]);

                        if k < path.len() {
                            if !current.children.is_empty() {
                                path = &path[k..];
                                lower_path = &lower_path[k.min(lower_path.len())..];
                                current = &current.children[0];
                                lower_node = current.path.to_lowercase();
                                continue 'walk;
                            }

                            // deeper path than pattern; fixable only when the
                            // overhang is one trailing slash
                            if fix_trailing_slash && path.len() == k + 1 {
                                return (out, true);
                            }
                            return (out, false);
                        }

                        if current.handler.is_some() {
                            return (out, true);
                        }

                        if fix_trailing_slash && current.children.len() == 1 {
                            let child = &current.children[0];
                            if child.path == "/" && child.handler.is_some() {
                                out.push(b'/');
                                return (out, true);
                            }
                        }

                        return (out, false);
                    }
                    NodeKind::CatchAll => {
                        out.extend_from_slice(path);
                        return (out, true);
                    }
                    _ => unreachable!("wildcard child is always a param or catch-all node"),
                }
            }

            // the path ends at this node
            if current.handler.is_some() {
                return (out, true);
            }

            if fix_trailing_slash {
                if let Some(i) = current.indices.iter().position(|&c| c == b'/') {
                    let child = &current.children[i];
                    if (child.path.len() == 1 && child.handler.is_some())
                        || (child.kind == NodeKind::CatchAll
                            && child.children[0].handler.is_some())
                    {
                        out.push(b'/');
                        return (out, true);
                    }
                    return (out, false);
                }
            }

            return (out, false);
        }

        // the walk stopped short; try a trailing-slash fix
        if fix_trailing_slash {
            if path == b"/" {
                return (out, true);
            }

            let node = lower_node.as_bytes();
            if lower_path.len() + 1 == node.len()
                && node[lower_path.len()] == b'/'
                && (lower_path.is_empty() || lower_path[1..] == node[1..lower_path.len()])
                && current.handler.is_some()
            {
                out.extend_from_slice(current.path.as_bytes());
                return (out, true);
            }
        }

        (out, false)
    }
}

/// Discards `n` consumed bytes from the rune buffer, zero-filling the tail.
fn shift_rune_bytes(rb: [u8; 4], n: usize) -> [u8; 4] {
    match n {
        0 => rb,
        1 => [rb[1], rb[2], rb[3], 0],
        2 => [rb[2], rb[3], 0, 0],
        3 => [rb[3], 0, 0, 0],
        _ => [0; 4],
    }
}

/// Whether a byte can start a UTF-8 encoded character.
fn is_rune_start(b: u8) -> bool {
    b & 0xC0 != 0x80
}

/// Decodes the first character of a byte tail known to come from a valid
/// UTF-8 string sliced at a character boundary.
fn first_char(bytes: &[u8]) -> Option<char> {
    let take = bytes.len().min(4);
    (1..=take).find_map(|end| {
        std::str::from_utf8(&bytes[..end])
            .ok()
            .and_then(|s| s.chars().next())
    })
}

/// The single-character uppercase mapping, or the character itself when the
/// uppercase form expands to multiple characters (those cannot appear as a
/// cased variant of one rune in a registered pattern).
fn single_char_uppercase(c: char) -> char {
    let mut upper = c.to_uppercase();
    match (upper.next(), upper.next()) {
        (Some(u), None) => u,
        _ => c,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shift_rune_bytes() {
        let rb = [0xCF, 0x80, 0, 0];
        assert_eq!(shift_rune_bytes(rb, 0), rb);
        assert_eq!(shift_rune_bytes(rb, 1), [0x80, 0, 0, 0]);
        assert_eq!(shift_rune_bytes(rb, 2), [0, 0, 0, 0]);
        assert_eq!(shift_rune_bytes(rb, 5), [0, 0, 0, 0]);
    }

    #[test]
    fn test_first_char() {
        assert_eq!(first_char(b"abc"), Some('a'));
        assert_eq!(first_char("πx".as_bytes()), Some('π'));
        assert_eq!(first_char("𠜎".as_bytes()), Some('𠜎'));
        assert_eq!(first_char(b""), None);
    }

    #[test]
    fn test_single_char_uppercase() {
        assert_eq!(single_char_uppercase('a'), 'A');
        assert_eq!(single_char_uppercase('π'), 'Π');
        assert_eq!(single_char_uppercase('/'), '/');
        // no single-rune uppercase exists
        assert_eq!(single_char_uppercase('ß'), 'ß');
    }
}
