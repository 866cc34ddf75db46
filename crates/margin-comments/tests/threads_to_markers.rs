//! Store -> thread model -> annotation engine, end to end.

use margin_comments::{
    CommentAuthor, CommentStatus, CommentStore, CommentThreads, MemoryStore, NewComment,
};
use margin_core::{
    AnnotationEngine, DocPosition, EngineConfig, MarkerRect, RectQuery, RunMap,
};
use web_time::Duration;

const TEXT: &str = "The quick brown fox jumps.";

struct CharGrid(RunMap);

impl RectQuery for CharGrid {
    fn range_rect(&self, start: DocPosition, end: DocPosition) -> Option<MarkerRect> {
        let s = self.0.position_to_offset(start.node, start.offset_in_node);
        let e = self.0.position_to_offset(end.node, end.offset_in_node);
        (s.exact && e.exact).then(|| {
            MarkerRect::new(
                0.0,
                s.offset as f64 * 8.0,
                e.offset.saturating_sub(s.offset) as f64 * 8.0,
                16.0,
            )
        })
    }
}

fn user(name: &str) -> CommentAuthor {
    CommentAuthor {
        id: name.to_ascii_lowercase().into(),
        name: name.into(),
        avatar_url: None,
    }
}

#[tokio::test]
async fn listed_comments_become_markers() {
    let store = MemoryStore::new();
    let mut rx = store.subscribe();

    let anchored = store
        .create(NewComment::anchored(
            "a1",
            "is this the right fox?",
            4,
            15,
            "quick brown",
            user("Dana"),
        ))
        .await
        .unwrap();
    store
        .create(NewComment::reply("a1", anchored.id.clone(), "yes", user("Sam")))
        .await
        .unwrap();
    store
        .create(NewComment::reply(
            "a1",
            anchored.id.clone(),
            "checked against the draft",
            user("Dana"),
        ))
        .await
        .unwrap();

    // The push channel reported changes; the consumer refreshes via list.
    assert!(rx.has_changed().unwrap());
    rx.mark_unchanged();

    let threads = CommentThreads::from_nested(store.list("a1").await.unwrap());
    assert_eq!(threads.roots().len(), 1);
    assert_eq!(threads.roots()[0].replies.len(), 2);
    assert_eq!(threads.counts_by_status().total, 3);

    // Replies contribute no anchors: one marker for the thread head.
    let runs = RunMap::from_lengths([4, 11, 5, 6]);
    let mut engine = AnnotationEngine::new(EngineConfig {
        settle_delay: Duration::ZERO,
        ..EngineConfig::default()
    });
    engine.set_anchors(threads.anchors());
    let positions = engine.resolve_markers(TEXT, &runs, &CharGrid(runs.clone()));
    assert_eq!(positions.len(), 1);
    let rect = positions.get(anchored.id.as_str()).copied().flatten().unwrap();
    assert_eq!(rect.left, 32.0);
}

#[tokio::test]
async fn status_filter_keeps_thread_heads() {
    let store = MemoryStore::new();
    let top = store
        .create(NewComment::anchored(
            "a1",
            "thread head",
            4,
            15,
            "quick brown",
            user("Dana"),
        ))
        .await
        .unwrap();
    let r1 = store
        .create(NewComment::reply("a1", top.id.clone(), "first", user("Sam")))
        .await
        .unwrap();
    store
        .create(NewComment::reply("a1", top.id.clone(), "second", user("Sam")))
        .await
        .unwrap();
    store
        .update_status(&r1.id, CommentStatus::Resolved)
        .await
        .unwrap();

    let threads = CommentThreads::from_nested(store.list("a1").await.unwrap());
    let resolved = threads.filter(|c| c.status == CommentStatus::Resolved);

    // The unmatched parent survives with exactly the resolved reply.
    assert_eq!(resolved.roots().len(), 1);
    assert_eq!(resolved.roots()[0].id, top.id);
    assert_eq!(resolved.roots()[0].status, CommentStatus::Active);
    let reply_ids: Vec<_> = resolved.roots()[0]
        .replies
        .iter()
        .map(|r| r.id.clone())
        .collect();
    assert_eq!(reply_ids, [r1.id]);
}
