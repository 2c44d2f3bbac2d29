//! The decoder tree: build and lookup.
//!
//! Each registered encoding ("leaf") carries a `(mask, match_)` pair over
//! its fixed bits. The tree groups leaves by bits fixed across every member
//! of a group ("common mask"), branching on the group's most distinguishing
//! bits first (sorted by Hamming weight, as in the original's
//! leaf-ordering), and falls back to a flat candidate list, tried in
//! registration order, once no bits are common to every remaining leaf.
//! Lookup descends the tree in `O(depth)` steps rather than scanning every
//! registered encoding.

use std::collections::HashMap;

use crate::error::DecodeError;

/// One registered encoding: its fixed-bit constraint plus an opaque
/// payload index into the caller's leaf table.
#[derive(Debug, Clone, Copy)]
pub struct Candidate {
    /// Bits that are significant (fixed `0`/`1` in the spec).
    pub mask: u32,
    /// The fixed bits' required values.
    pub match_bits: u32,
    /// Index into the owning [`crate::decoder::Decoder`]'s leaf table.
    pub payload: usize,
}

/// One node of the decoder tree.
pub enum Node {
    /// A terminal list of candidates, tried in order; the first whose
    /// `(mask, match_bits)` is satisfied by the input wins.
    Leaf(Vec<Candidate>),
    /// Branches on the bits selected by `common_mask`, extracted via
    /// `(raw & common_mask)`.
    Branch { common_mask: u32, children: HashMap<u32, Node> },
}

/// Recursively builds a tree over `candidates`. `candidates` sharing no
/// fixed bit in common become a `Leaf`, most-constrained (highest mask
/// popcount) first.
pub fn build(mut candidates: Vec<Candidate>) -> Node {
    if candidates.len() <= 1 {
        return Node::Leaf(candidates);
    }

    let common_mask = candidates.iter().fold(u32::MAX, |acc, c| acc & c.mask);
    if common_mask == 0 {
        candidates.sort_by_key(|c| std::cmp::Reverse(c.mask.count_ones()));
        return Node::Leaf(candidates);
    }

    let mut groups: HashMap<u32, Vec<Candidate>> = HashMap::new();
    for c in candidates {
        let key = c.match_bits & common_mask;
        groups.entry(key).or_default().push(c);
    }

    if groups.len() == 1 {
        // Every candidate agrees on these bits; they're not discriminating.
        // Fall back to matching on full mask/match pairs directly.
        let candidates: Vec<Candidate> = groups.into_values().next().unwrap();
        let mut candidates = candidates;
        candidates.sort_by_key(|c| std::cmp::Reverse(c.mask.count_ones()));
        return Node::Leaf(candidates);
    }

    let children = groups.into_iter().map(|(key, group)| (key, build(group))).collect();
    Node::Branch { common_mask, children }
}

/// Walks the tree for `raw`, returning the first matching candidate's
/// payload index, or [`DecodeError`] if nothing matches.
pub fn lookup(node: &Node, raw: u32) -> Result<usize, DecodeError> {
    match node {
        Node::Leaf(candidates) => {
            for c in candidates {
                if raw & c.mask == c.match_bits {
                    return Ok(c.payload);
                }
            }
            Err(DecodeError)
        }
        Node::Branch { common_mask, children } => {
            let key = raw & common_mask;
            match children.get(&key) {
                Some(child) => lookup(child, raw),
                None => Err(DecodeError),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disambiguates_by_common_fixed_bits() {
        let candidates = vec![
            Candidate { mask: 0xF000, match_bits: 0x1000, payload: 0 },
            Candidate { mask: 0xF000, match_bits: 0x2000, payload: 1 },
            Candidate { mask: 0xFF00, match_bits: 0x2300, payload: 2 },
        ];
        let tree = build(candidates);
        assert_eq!(lookup(&tree, 0x1234).unwrap(), 0);
        assert_eq!(lookup(&tree, 0x2300).unwrap(), 2);
        assert_eq!(lookup(&tree, 0x2999).unwrap(), 1);
    }

    #[test]
    fn no_match_is_decode_error() {
        let candidates = vec![Candidate { mask: 0xFF00, match_bits: 0x1200, payload: 0 }];
        let tree = build(candidates);
        assert!(lookup(&tree, 0x0000).is_err());
    }

    #[test]
    fn most_constrained_candidate_wins_ties() {
        let candidates = vec![
            Candidate { mask: 0xF000, match_bits: 0x1000, payload: 0 },
            Candidate { mask: 0xFF00, match_bits: 0x1200, payload: 1 },
        ];
        // Both candidates agree on their shared fixed bits (0x1000 via mask
        // 0xF000), so this collapses to an ordered leaf list; the more
        // specific encoding (payload 1) must be tried first.
        let tree = build(candidates);
        assert_eq!(lookup(&tree, 0x1200).unwrap(), 1);
        assert_eq!(lookup(&tree, 0x1300).unwrap(), 0);
    }
}
