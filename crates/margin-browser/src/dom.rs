//! Text-node walking: DOM subtree -> `RunMap` snapshot.
//!
//! The walk visits every text node under the container in document order,
//! which is the one representation robust to inline markup (bold spans,
//! links, mentions) interleaved with the text. DOM offsets are UTF-16 code
//! units; everything handed to margin-core is converted to chars here.

use margin_core::{DocPosition, RunMap, TextNodeIndex};
use wasm_bindgen::JsCast;

const SHOW_TEXT: u32 = 0x4;

/// Snapshot of a container's text nodes and their flattened layout.
///
/// Stale after any DOM mutation to the container - recapture rather than
/// patch, exactly like the `RunMap` it carries.
pub struct TextWalk {
    nodes: Vec<web_sys::Node>,
    texts: Vec<String>,
    runs: RunMap,
}

impl TextWalk {
    /// Walk `container`'s text nodes in document order.
    ///
    /// Subtrees marked `contenteditable="false"` (embedded widgets, marker
    /// overlays that ended up inside) contribute no text, matching what the
    /// editor itself treats as content.
    pub fn capture(container: &web_sys::Element) -> Option<Self> {
        let document = web_sys::window()?.document()?;
        let walker = document
            .create_tree_walker_with_what_to_show(container, SHOW_TEXT)
            .ok()?;

        let mut nodes = Vec::new();
        let mut texts = Vec::new();
        while let Ok(Some(node)) = walker.next_node() {
            if in_non_editable_subtree(&node, container) {
                continue;
            }
            let text = node.text_content().unwrap_or_default();
            nodes.push(node);
            texts.push(text);
        }

        let runs = RunMap::from_lengths(texts.iter().map(|t| t.chars().count()));
        tracing::trace!(
            target: "margin::dom",
            nodes = nodes.len(),
            total_chars = runs.total_len(),
            "captured text walk"
        );
        Some(Self { nodes, texts, runs })
    }

    /// The flattened layout of this snapshot.
    pub fn runs(&self) -> &RunMap {
        &self.runs
    }

    /// The container's flattened text (concatenated text nodes).
    pub fn container_text(&self) -> String {
        self.texts.concat()
    }

    /// Document-order index of a DOM node within this walk, if present.
    pub fn node_index(&self, node: &web_sys::Node) -> Option<TextNodeIndex> {
        self.nodes
            .iter()
            .position(|candidate| candidate.is_same_node(Some(node)))
    }

    /// Convert a UTF-16 offset within the indexed node to a char offset.
    pub fn char_offset_in_node(&self, index: TextNodeIndex, utf16_offset: usize) -> usize {
        self.texts
            .get(index)
            .map(|text| utf16_to_char_offset(text, utf16_offset))
            .unwrap_or(0)
    }

    /// Convert a core position back to a DOM `(node, utf16-offset)` pair
    /// suitable for `Range::set_start`/`set_end`.
    pub fn dom_position(&self, pos: DocPosition) -> Option<(web_sys::Node, u32)> {
        let node = self.nodes.get(pos.node)?.clone();
        let text = self.texts.get(pos.node)?;
        let utf16 = char_to_utf16_offset(text, pos.offset_in_node);
        Some((node, utf16 as u32))
    }
}

fn in_non_editable_subtree(node: &web_sys::Node, container: &web_sys::Element) -> bool {
    let container_node: &web_sys::Node = container.as_ref();
    let mut current = node.parent_node();
    while let Some(parent) = current {
        if parent.is_same_node(Some(container_node)) {
            return false;
        }
        if let Some(element) = parent.dyn_ref::<web_sys::Element>() {
            if element.get_attribute("contenteditable").as_deref() == Some("false") {
                return true;
            }
        }
        current = parent.parent_node();
    }
    false
}

/// UTF-16 code unit offset -> char offset within one node's text. Clamps
/// to the node length.
pub fn utf16_to_char_offset(text: &str, utf16_offset: usize) -> usize {
    let mut utf16 = 0;
    for (chars, c) in text.chars().enumerate() {
        if utf16 >= utf16_offset {
            return chars;
        }
        utf16 += c.len_utf16();
    }
    text.chars().count()
}

/// Char offset -> UTF-16 code unit offset within one node's text. Clamps
/// to the node length.
pub fn char_to_utf16_offset(text: &str, char_offset: usize) -> usize {
    text.chars()
        .take(char_offset)
        .map(char::len_utf16)
        .sum()
}
