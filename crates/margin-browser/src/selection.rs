//! Native selection reading and the `selectionchange` subscription.

use gloo_events::EventListener;
use margin_core::RawSelection;

use crate::dom::TextWalk;

/// Read the current native selection into a `RawSelection` against the
/// given walk snapshot.
///
/// Returns `None` when there is no selection object or no range at all -
/// the caller feeds that straight to the engine, which treats it as "no
/// selection". The range's start container is used (ranges are ordered,
/// unlike anchor/focus, so backwards selections need no special casing).
pub fn read_raw_selection(
    walk: &TextWalk,
    container: &web_sys::Element,
) -> Option<RawSelection> {
    let window = web_sys::window()?;
    let selection = window.get_selection().ok()??;
    if selection.range_count() == 0 {
        return None;
    }

    let range = selection.get_range_at(0).ok()?;
    let collapsed = range.collapsed();
    let text = String::from(js_sys::Object::to_string(selection.as_ref()));

    let container_node: &web_sys::Node = container.as_ref();
    let in_container = range
        .common_ancestor_container()
        .ok()
        .map(|ancestor| container_node.contains(Some(&ancestor)))
        .unwrap_or(false);

    let start_container = range.start_container().ok()?;
    let start_utf16 = range.start_offset().ok()? as usize;
    let node = walk.node_index(&start_container);
    let offset_in_node = node
        .map(|index| walk.char_offset_in_node(index, start_utf16))
        .unwrap_or(0);

    if node.is_none() && in_container {
        // Selection starts on an element (tripled-clicked paragraph) or a
        // node that appeared after the walk; the engine's verification
        // decides whether the fallback offset is usable.
        tracing::trace!(
            target: "margin::dom",
            node_name = %start_container.node_name(),
            "selection start container not in text walk"
        );
    }

    Some(RawSelection {
        node,
        offset_in_node,
        text: text.into(),
        collapsed,
        in_container,
    })
}

/// RAII subscription to document-level `selectionchange` events.
///
/// The browser only dispatches `selectionchange` on the document, so the
/// listener is global; scoping to one container happens in
/// `read_raw_selection` via the `in_container` flag. Dropping the value
/// removes the listener - tie it to the container's mount lifetime.
pub struct SelectionListener {
    _listener: EventListener,
}

impl SelectionListener {
    /// Attach `callback` to `selectionchange`. Returns `None` outside a
    /// browser context.
    pub fn attach<F>(mut callback: F) -> Option<Self>
    where
        F: FnMut() + 'static,
    {
        let document = web_sys::window()?.document()?;
        let listener = EventListener::new(&document, "selectionchange", move |_event| {
            callback();
        });
        Some(Self {
            _listener: listener,
        })
    }
}
