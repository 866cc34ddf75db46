//! Thread structure over comment records: nesting, filtering, counts.
//!
//! Purely structural bookkeeping - no anchor logic. The one rule that
//! matters: filtering never decapitates a thread. A parent whose reply
//! matches survives, so the reply keeps its context.

use chrono::{DateTime, Utc};

use crate::record::{Comment, CommentId, CommentStatus};
use margin_core::StoredAnchor;

/// Aggregate counts over every comment and reply.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StatusCounts {
    pub active: usize,
    pub resolved: usize,
    pub archived: usize,
    pub total: usize,
}

/// A threaded comment set: top-level comments each owning their ordered
/// replies.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CommentThreads {
    roots: Vec<Comment>,
}

impl CommentThreads {
    /// Wrap an already-nested collection.
    pub fn from_nested(roots: Vec<Comment>) -> Self {
        Self { roots }
    }

    /// Nest a flat record list by `parent_id`.
    ///
    /// Top-level comments keep their input order; replies are attached to
    /// their parent ordered by `created_at`. A reply whose parent is
    /// missing from the list surfaces as top-level rather than being
    /// dropped - the backend returned it, so the user gets to see it.
    pub fn from_flat(records: Vec<Comment>) -> Self {
        let mut roots: Vec<Comment> = Vec::new();
        let mut replies: Vec<Comment> = Vec::new();
        for mut record in records {
            record.replies.clear();
            if record.parent_id.is_some() {
                replies.push(record);
            } else {
                roots.push(record);
            }
        }

        replies.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        let mut orphans = Vec::new();
        for reply in replies {
            let parent_id = reply.parent_id.clone().expect("partitioned as reply");
            match roots.iter_mut().find(|root| root.id == parent_id) {
                Some(parent) => parent.replies.push(reply),
                None => {
                    tracing::warn!(
                        target: "margin::threads",
                        reply = %reply.id,
                        parent = %parent_id,
                        "reply references a missing parent, keeping it top-level"
                    );
                    orphans.push(reply);
                }
            }
        }
        roots.extend(orphans);
        Self { roots }
    }

    pub fn roots(&self) -> &[Comment] {
        &self.roots
    }

    pub fn into_roots(self) -> Vec<Comment> {
        self.roots
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Retain every comment that matches `pred` or has a matching
    /// descendant, recursively filtering retained replies. A reply is never
    /// returned without its ancestor chain.
    pub fn filter<F>(&self, pred: F) -> Self
    where
        F: Fn(&Comment) -> bool,
    {
        fn filter_one<F: Fn(&Comment) -> bool>(comment: &Comment, pred: &F) -> Option<Comment> {
            let replies: Vec<Comment> = comment
                .replies
                .iter()
                .filter_map(|reply| filter_one(reply, pred))
                .collect();
            if pred(comment) || !replies.is_empty() {
                let mut kept = comment.clone();
                kept.replies = replies;
                Some(kept)
            } else {
                None
            }
        }

        Self {
            roots: self
                .roots
                .iter()
                .filter_map(|root| filter_one(root, &pred))
                .collect(),
        }
    }

    /// Depth-first traversal yielding every comment and nested reply
    /// exactly once.
    pub fn flatten(&self) -> Vec<&Comment> {
        fn walk<'a>(comment: &'a Comment, out: &mut Vec<&'a Comment>) {
            out.push(comment);
            for reply in &comment.replies {
                walk(reply, out);
            }
        }
        let mut out = Vec::new();
        for root in &self.roots {
            walk(root, &mut out);
        }
        out
    }

    /// Status tallies over the flattened set.
    pub fn counts_by_status(&self) -> StatusCounts {
        let mut counts = StatusCounts::default();
        for comment in self.flatten() {
            counts.total += 1;
            match comment.status {
                CommentStatus::Active => counts.active += 1,
                CommentStatus::Resolved => counts.resolved += 1,
                CommentStatus::Archived => counts.archived += 1,
            }
        }
        counts
    }

    /// How many comments were created at or after `since`.
    pub fn recent_count(&self, since: DateTime<Utc>) -> usize {
        self.flatten()
            .iter()
            .filter(|c| c.created_at >= since)
            .count()
    }

    /// Anchor triples of the top-level comments that carry one, in root
    /// order. Feed this to `AnnotationEngine::set_anchors`.
    pub fn anchors(&self) -> Vec<(CommentId, StoredAnchor)> {
        self.roots
            .iter()
            .filter_map(|root| root.anchor().map(|anchor| (root.id.clone(), anchor)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{CommentAuthor, ContentType};
    use chrono::TimeZone;

    fn at(minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, minute, 0).unwrap()
    }

    fn comment(id: &str, parent: Option<&str>, status: CommentStatus, minute: u32) -> Comment {
        Comment {
            id: id.into(),
            article_id: "a1".into(),
            content: format!("comment {id}"),
            content_type: ContentType::Text,
            image_url: None,
            selection_start: parent.is_none().then_some(4),
            selection_end: parent.is_none().then_some(15),
            selected_text: parent.is_none().then(|| "quick brown".into()),
            status,
            parent_id: parent.map(Into::into),
            replies: vec![],
            created_at: at(minute),
            updated_at: at(minute),
            user: CommentAuthor {
                id: "u1".into(),
                name: "Dana".into(),
                avatar_url: None,
            },
        }
    }

    fn sample() -> CommentThreads {
        CommentThreads::from_flat(vec![
            comment("c1", None, CommentStatus::Active, 0),
            // Replies arrive out of creation order.
            comment("r2", Some("c1"), CommentStatus::Resolved, 5),
            comment("r1", Some("c1"), CommentStatus::Active, 2),
            comment("c2", None, CommentStatus::Resolved, 1),
        ])
    }

    #[test]
    fn test_from_flat_nests_in_creation_order() {
        let threads = sample();
        assert_eq!(threads.roots().len(), 2);
        let c1 = &threads.roots()[0];
        assert_eq!(c1.id, "c1");
        let reply_ids: Vec<_> = c1.replies.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(reply_ids, ["r1", "r2"]);
    }

    #[test]
    fn test_orphan_reply_kept_top_level() {
        let threads = CommentThreads::from_flat(vec![
            comment("c1", None, CommentStatus::Active, 0),
            comment("r9", Some("gone"), CommentStatus::Active, 1),
        ]);
        assert_eq!(threads.roots().len(), 2);
        assert_eq!(threads.roots()[1].id, "r9");
    }

    #[test]
    fn test_filter_keeps_parent_of_matching_reply() {
        // Parent is active, one reply resolved: filtering by resolved
        // returns the unmatched parent together with exactly that reply.
        let filtered = sample().filter(|c| c.status == CommentStatus::Resolved);
        let ids: Vec<_> = filtered.flatten().iter().map(|c| c.id.clone()).collect();
        assert_eq!(ids, ["c1", "r2", "c2"]);
        assert_eq!(filtered.roots()[0].replies.len(), 1);
    }

    #[test]
    fn test_filter_is_subset_of_original() {
        let threads = sample();
        let original: Vec<_> = threads.flatten().iter().map(|c| c.id.clone()).collect();
        let filtered = threads.filter(|c| c.content.contains("r1"));
        for c in filtered.flatten() {
            assert!(original.contains(&c.id));
        }
        // And the matching reply arrived with its ancestor.
        let ids: Vec<_> = filtered.flatten().iter().map(|c| c.id.clone()).collect();
        assert_eq!(ids, ["c1", "r1"]);
    }

    #[test]
    fn test_filter_no_match_is_empty() {
        let filtered = sample().filter(|c| c.content.contains("nope"));
        assert!(filtered.is_empty());
    }

    #[test]
    fn test_flatten_visits_each_once() {
        let threads = sample();
        let flat = threads.flatten();
        let mut ids: Vec<_> = flat.iter().map(|c| c.id.clone()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 4);
    }

    #[test]
    fn test_counts_by_status() {
        let counts = sample().counts_by_status();
        assert_eq!(
            counts,
            StatusCounts {
                active: 2,
                resolved: 2,
                archived: 0,
                total: 4
            }
        );
    }

    #[test]
    fn test_recent_count() {
        assert_eq!(sample().recent_count(at(2)), 2);
    }

    #[test]
    fn test_anchors_skip_replies_and_unanchored() {
        let mut unanchored = comment("c3", None, CommentStatus::Active, 3);
        unanchored.selection_start = None;
        unanchored.selection_end = None;
        unanchored.selected_text = None;

        let mut records = sample().into_roots();
        records.push(unanchored);
        let threads = CommentThreads::from_nested(records);

        let anchors = threads.anchors();
        let ids: Vec<_> = anchors.iter().map(|(id, _)| id.as_str()).collect();
        assert_eq!(ids, ["c1", "c2"]);
        assert_eq!(anchors[0].1.start, 4);
    }
}
