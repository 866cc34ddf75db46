//! Run map: the flattened text-node layout of an annotation container.
//!
//! Browser selection APIs speak in `(node, offset-in-node)` pairs, but a
//! stable persisted anchor needs a single integer into the container's
//! flattened text. A `RunMap` is the bridge: one run per text node, in
//! document order, built by the platform layer from a full text-node walk.
//! Walking every text node (rather than element indices or character-class
//! heuristics) is the only representation robust to intervening inline
//! elements - bold spans, links, mentions.

use std::ops::Range;

/// Document-order index of a text node under the container.
pub type TextNodeIndex = usize;

/// One text node's contribution to the flattened container text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TextRun {
    /// Index of the text node this run came from.
    pub node: TextNodeIndex,
    /// Char range this run occupies in the flattened text.
    pub char_range: Range<usize>,
}

impl TextRun {
    /// Run length in chars.
    pub fn len(&self) -> usize {
        self.char_range.end - self.char_range.start
    }

    pub fn is_empty(&self) -> bool {
        self.char_range.is_empty()
    }
}

/// A position inside a specific text node.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DocPosition {
    pub node: TextNodeIndex,
    /// Char offset within the node's own text.
    pub offset_in_node: usize,
}

/// Result of mapping a node position to a flat offset.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OffsetLookup {
    /// The flat char offset.
    pub offset: usize,
    /// False when the node was never found and the total length was returned
    /// as a best-effort fallback. Callers must treat inexact lookups as
    /// reduced-confidence and verify before publishing.
    pub exact: bool,
}

/// Flattened text-node layout for one container snapshot.
///
/// Stale after any DOM mutation to the container; rebuild rather than patch.
#[derive(Clone, Debug, Default)]
pub struct RunMap {
    runs: Vec<TextRun>,
    total_len: usize,
}

impl RunMap {
    /// Build from per-node char lengths in document order. Empty text nodes
    /// are kept so node indices stay aligned with the platform walk.
    pub fn from_lengths<I>(lengths: I) -> Self
    where
        I: IntoIterator<Item = usize>,
    {
        let mut runs = Vec::new();
        let mut acc = 0;
        for (node, len) in lengths.into_iter().enumerate() {
            runs.push(TextRun {
                node,
                char_range: acc..acc + len,
            });
            acc += len;
        }
        Self {
            runs,
            total_len: acc,
        }
    }

    /// Total flattened length in chars.
    pub fn total_len(&self) -> usize {
        self.total_len
    }

    /// Number of runs (text nodes).
    pub fn run_count(&self) -> usize {
        self.runs.len()
    }

    pub fn runs(&self) -> &[TextRun] {
        &self.runs
    }

    /// Map a `(node, offset-in-node)` pair to a flat char offset.
    ///
    /// Accumulates run lengths in document order until `node` is reached.
    /// When the node is not in the map, returns the total length with
    /// `exact = false` - the best-effort fallback the contract requires.
    pub fn position_to_offset(&self, node: TextNodeIndex, offset_in_node: usize) -> OffsetLookup {
        for run in &self.runs {
            if run.node == node {
                return OffsetLookup {
                    offset: run.char_range.start + offset_in_node,
                    exact: true,
                };
            }
        }
        tracing::trace!(
            target: "margin::doc",
            node,
            total = self.total_len,
            "node not in run map, falling back to total length"
        );
        OffsetLookup {
            offset: self.total_len,
            exact: false,
        }
    }

    /// Map a flat char offset back to a `(node, offset-in-node)` position.
    ///
    /// Returns `None` when `offset` exceeds the total text length. An offset
    /// on a run boundary resolves into the earlier run's end, so a range end
    /// never lands at the zero-width start of the following node.
    pub fn offset_to_position(&self, offset: usize) -> Option<DocPosition> {
        if offset > self.total_len {
            return None;
        }
        let mut last_nonempty: Option<&TextRun> = None;
        for run in &self.runs {
            if run.is_empty() {
                continue;
            }
            if offset <= run.char_range.end {
                if offset < run.char_range.start {
                    // Offset fell in a gap (cannot happen with contiguous
                    // runs); snap to this run's start.
                    return Some(DocPosition {
                        node: run.node,
                        offset_in_node: 0,
                    });
                }
                return Some(DocPosition {
                    node: run.node,
                    offset_in_node: offset - run.char_range.start,
                });
            }
            last_nonempty = Some(run);
        }
        // Empty container, or offset == total with trailing empty runs.
        last_nonempty
            .map(|run| DocPosition {
                node: run.node,
                offset_in_node: run.len(),
            })
            .or_else(|| {
                (offset == 0 && !self.runs.is_empty()).then(|| DocPosition {
                    node: self.runs[0].node,
                    offset_in_node: 0,
                })
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // "The " | "quick brown" | " fox " | "jumps."  - inline markup split
    fn fox_map() -> RunMap {
        RunMap::from_lengths([4, 11, 5, 6])
    }

    #[test]
    fn test_position_to_offset_exact() {
        let map = fox_map();
        assert_eq!(
            map.position_to_offset(0, 0),
            OffsetLookup {
                offset: 0,
                exact: true
            }
        );
        assert_eq!(
            map.position_to_offset(1, 0),
            OffsetLookup {
                offset: 4,
                exact: true
            }
        );
        assert_eq!(
            map.position_to_offset(3, 6),
            OffsetLookup {
                offset: 26,
                exact: true
            }
        );
    }

    #[test]
    fn test_position_to_offset_unknown_node_falls_back() {
        let map = fox_map();
        let lookup = map.position_to_offset(9, 2);
        assert_eq!(lookup.offset, map.total_len());
        assert!(!lookup.exact);
    }

    #[test]
    fn test_offset_to_position() {
        let map = fox_map();
        assert_eq!(
            map.offset_to_position(0),
            Some(DocPosition {
                node: 0,
                offset_in_node: 0
            })
        );
        assert_eq!(
            map.offset_to_position(6),
            Some(DocPosition {
                node: 1,
                offset_in_node: 2
            })
        );
        assert_eq!(
            map.offset_to_position(26),
            Some(DocPosition {
                node: 3,
                offset_in_node: 6
            })
        );
        assert_eq!(map.offset_to_position(27), None);
    }

    #[test]
    fn test_boundary_resolves_into_earlier_run() {
        let map = fox_map();
        // Offset 4 is both the end of node 0 and the start of node 1.
        assert_eq!(
            map.offset_to_position(4),
            Some(DocPosition {
                node: 0,
                offset_in_node: 4
            })
        );
    }

    #[test]
    fn test_round_trip() {
        let map = fox_map();
        for offset in 0..=map.total_len() {
            let pos = map.offset_to_position(offset).unwrap();
            let back = map.position_to_offset(pos.node, pos.offset_in_node);
            assert!(back.exact);
            assert_eq!(back.offset, offset, "offset {offset} did not round-trip");
        }
    }

    #[test]
    fn test_empty_runs_are_skipped() {
        // Empty text nodes (whitespace-collapsed, emptied spans) keep their
        // index but never claim an offset.
        let map = RunMap::from_lengths([3, 0, 4]);
        assert_eq!(
            map.offset_to_position(3),
            Some(DocPosition {
                node: 0,
                offset_in_node: 3
            })
        );
        assert_eq!(
            map.offset_to_position(4),
            Some(DocPosition {
                node: 2,
                offset_in_node: 1
            })
        );
    }

    #[test]
    fn test_empty_container() {
        let map = RunMap::from_lengths([]);
        assert_eq!(map.total_len(), 0);
        assert_eq!(map.offset_to_position(0), None);
        assert_eq!(map.offset_to_position(1), None);
        let lookup = map.position_to_offset(0, 0);
        assert!(!lookup.exact);
    }
}
