//! DOM-backed rectangle queries for marker placement.

use margin_core::{DocPosition, MarkerRect, RectQuery};

use crate::dom::TextWalk;

/// `RectQuery` implementation over a walk snapshot: build a DOM range for
/// the position pair and measure its bounding rectangle, converted to
/// container-relative coordinates.
///
/// Borrows the walk and the container, so a value only lives within one
/// resolution pass - which is also exactly how long its answers are valid.
pub struct DomRects<'a> {
    walk: &'a TextWalk,
    container: &'a web_sys::Element,
}

impl<'a> DomRects<'a> {
    pub fn new(walk: &'a TextWalk, container: &'a web_sys::Element) -> Self {
        Self { walk, container }
    }
}

impl RectQuery for DomRects<'_> {
    fn range_rect(&self, start: DocPosition, end: DocPosition) -> Option<MarkerRect> {
        let document = web_sys::window()?.document()?;
        let range = document.create_range().ok()?;

        let (start_node, start_offset) = self.walk.dom_position(start)?;
        let (end_node, end_offset) = self.walk.dom_position(end)?;
        range.set_start(&start_node, start_offset).ok()?;
        range.set_end(&end_node, end_offset).ok()?;

        let rect = range.get_bounding_client_rect();
        let container_rect = self.container.get_bounding_client_rect();
        let marker = MarkerRect::new(
            rect.y() - container_rect.y(),
            rect.x() - container_rect.x(),
            rect.width(),
            rect.height(),
        );
        if marker.is_degenerate() {
            tracing::trace!(
                target: "margin::dom",
                ?start,
                ?end,
                "degenerate rectangle for anchor range"
            );
            return None;
        }
        Some(marker)
    }
}
