//! Script fragment chains.
//!
//! The `content` column of a `SceneScript` row holds at most
//! [`MAX_FRAGMENT_LEN`] bytes. Longer source is split into consecutive rows;
//! each row names its neighbours through `previous` and `next`, with 0 ending
//! the chain in either direction.

use std::collections::{HashMap, HashSet};

use crate::wdb::records::Script;
use crate::Db2Error;

/// Fragment size used by the game client's own tables.
pub const MAX_FRAGMENT_LEN: usize = 4000;

/// Number of fragments needed for `len` bytes. Empty content still takes one.
pub fn fragment_count(len: usize, fragment_len: usize) -> usize {
    len.div_ceil(fragment_len).max(1)
}

/// Split `content` into linked fragments with ids `first_id`, `first_id + 1`, ...
///
/// Splits fall on byte boundaries, so a multi-byte character may straddle two
/// fragments. Every fragment carries `name`. `fragment_len` must be non-zero.
pub fn split_content(name: &str, content: &[u8], first_id: u32, fragment_len: usize) -> Vec<Script> {
    let count = fragment_count(content.len(), fragment_len);
    let pieces: Vec<&[u8]> = if content.is_empty() {
        vec![content]
    } else {
        content.chunks(fragment_len).collect()
    };

    pieces
        .into_iter()
        .enumerate()
        .map(|(k, piece)| {
            let id = first_id + k as u32;
            Script {
                id,
                name: name.to_string(),
                content: piece.to_vec(),
                previous: if k == 0 { 0 } else { id - 1 },
                next: if k + 1 == count { 0 } else { id + 1 },
            }
        })
        .collect()
}

/// Reassembled chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chain {
    /// Name of the head fragment.
    pub name: String,
    pub content: Vec<u8>,
    /// Fragment ids in link order.
    pub fragments: Vec<u32>,
}

/// Scripts indexed by id. The first row with a given id wins.
#[derive(Debug)]
pub struct ScriptIndex<'a> {
    by_id: HashMap<u32, &'a Script>,
}

impl<'a> ScriptIndex<'a> {
    pub fn new(scripts: &'a [Script]) -> Self {
        let mut by_id = HashMap::with_capacity(scripts.len());
        for script in scripts {
            by_id.entry(script.id).or_insert(script);
        }
        ScriptIndex { by_id }
    }

    pub fn get(&self, id: u32) -> Option<&'a Script> {
        self.by_id.get(&id).copied()
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    /// Follow `next` links from `head`, concatenating content.
    ///
    /// `member` is the id of the package member holding the head link and
    /// is only used in errors. Every `previous` link on the way must resolve
    /// too, but it is not required to point back along the walked path.
    pub fn reassemble(&self, member: u32, head: u32) -> Result<Chain, Db2Error> {
        let first = self.get(head).ok_or(Db2Error::DanglingChainLink {
            from: member,
            link: "member",
            target: head,
        })?;

        let mut seen = HashSet::new();
        let mut content = Vec::new();
        let mut fragments = Vec::new();
        let mut script = first;
        loop {
            if !seen.insert(script.id) {
                return Err(Db2Error::ChainCycle {
                    head,
                    at: script.id,
                });
            }
            if script.previous != 0 && self.get(script.previous).is_none() {
                return Err(Db2Error::DanglingChainLink {
                    from: script.id,
                    link: "previous",
                    target: script.previous,
                });
            }
            content.extend_from_slice(&script.content);
            fragments.push(script.id);

            if script.next == 0 {
                break;
            }
            script = self.get(script.next).ok_or(Db2Error::DanglingChainLink {
                from: script.id,
                link: "next",
                target: script.next,
            })?;
        }

        Ok(Chain {
            name: first.name.clone(),
            content,
            fragments,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn script(id: u32, content: &str, previous: u32, next: u32) -> Script {
        Script {
            id,
            name: "s".to_string(),
            content: content.as_bytes().to_vec(),
            previous,
            next,
        }
    }

    #[test]
    fn test_fragment_count() {
        assert_eq!(fragment_count(0, 4000), 1);
        assert_eq!(fragment_count(1, 4000), 1);
        assert_eq!(fragment_count(4000, 4000), 1);
        assert_eq!(fragment_count(4001, 4000), 2);
        assert_eq!(fragment_count(9000, 4000), 3);
    }

    #[test]
    fn test_split_nine_thousand_bytes() {
        let content: Vec<u8> = (0..9000u32).map(|i| b'a' + (i % 26) as u8).collect();
        let parts = split_content("Intro", &content, 5, MAX_FRAGMENT_LEN);

        assert_eq!(parts.len(), 3);
        assert_eq!(
            parts.iter().map(|s| s.id).collect::<Vec<_>>(),
            vec![5, 6, 7]
        );
        assert_eq!(
            parts.iter().map(|s| s.content.len()).collect::<Vec<_>>(),
            vec![4000, 4000, 1000]
        );
        assert_eq!((parts[0].previous, parts[0].next), (0, 6));
        assert_eq!((parts[1].previous, parts[1].next), (5, 7));
        assert_eq!((parts[2].previous, parts[2].next), (6, 0));
        assert!(parts.iter().all(|s| s.name == "Intro"));

        let index = ScriptIndex::new(&parts);
        let chain = index.reassemble(1, 5).unwrap();
        assert_eq!(chain.content, content);
        assert_eq!(chain.fragments, vec![5, 6, 7]);
        assert_eq!(chain.name, "Intro");
    }

    #[test]
    fn test_split_empty_content() {
        let parts = split_content("empty", b"", 1, MAX_FRAGMENT_LEN);
        assert_eq!(parts.len(), 1);
        assert!(parts[0].content.is_empty());
        assert_eq!((parts[0].previous, parts[0].next), (0, 0));
    }

    #[test]
    fn test_split_exact_multiple() {
        let parts = split_content("x", &[b'x'; 8], 1, 4);
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[1].next, 0);
    }

    #[test]
    fn test_split_multibyte_boundary() {
        let content = "é".repeat(3).into_bytes();
        let parts = split_content("u", &content, 1, 5);
        assert_eq!(parts[0].content.len(), 5);
        assert!(std::str::from_utf8(&parts[0].content).is_err());
        let chain = ScriptIndex::new(&parts).reassemble(1, 1).unwrap();
        assert_eq!(chain.content, content);
    }

    #[test]
    fn test_missing_head() {
        let scripts = vec![script(1, "a", 0, 0)];
        let err = ScriptIndex::new(&scripts).reassemble(4, 2).unwrap_err();
        assert!(matches!(
            err,
            Db2Error::DanglingChainLink {
                from: 4,
                link: "member",
                target: 2
            }
        ));
    }

    #[test]
    fn test_dangling_next() {
        let scripts = vec![script(1, "a", 0, 2)];
        let err = ScriptIndex::new(&scripts).reassemble(1, 1).unwrap_err();
        assert!(matches!(
            err,
            Db2Error::DanglingChainLink {
                from: 1,
                link: "next",
                target: 2
            }
        ));
    }

    #[test]
    fn test_dangling_previous() {
        let scripts = vec![script(1, "a", 0, 2), script(2, "b", 9, 0)];
        let err = ScriptIndex::new(&scripts).reassemble(1, 1).unwrap_err();
        assert!(matches!(
            err,
            Db2Error::DanglingChainLink {
                from: 2,
                link: "previous",
                target: 9
            }
        ));
    }

    #[test]
    fn test_cycle_detected() {
        let scripts = vec![script(1, "a", 0, 2), script(2, "b", 1, 1)];
        let err = ScriptIndex::new(&scripts).reassemble(1, 1).unwrap_err();
        assert!(matches!(err, Db2Error::ChainCycle { head: 1, at: 1 }));
    }

    #[test]
    fn test_first_duplicate_id_wins() {
        let scripts = vec![script(1, "first", 0, 0), script(1, "second", 0, 0)];
        let index = ScriptIndex::new(&scripts);
        assert_eq!(index.len(), 1);
        assert_eq!(index.reassemble(1, 1).unwrap().content, b"first");
    }
}
