//! Domain events - emitted after a write commits
//!
//! Events are built from what the store returned, never from what a client sent,
//! so every subscriber observes the same authoritative values.

use crate::entities::{Comment, VoteTally};

/// All events fanned out to post subscribers
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainEvent {
    /// A comment was persisted
    CommentAdded { post_slug: String, comment: Comment },
    /// A vote changed a comment's counters
    CommentVoteUpdated(VoteTally),
}

impl DomainEvent {
    /// Event name as seen by realtime clients
    pub fn event_name(&self) -> &'static str {
        match self {
            Self::CommentAdded { .. } => "comment_added",
            Self::CommentVoteUpdated(_) => "comment_vote_updated",
        }
    }

    /// Slug of the post whose subscribers receive this event
    pub fn post_slug(&self) -> &str {
        match self {
            Self::CommentAdded { post_slug, .. } => post_slug,
            Self::CommentVoteUpdated(tally) => &tally.post_slug,
        }
    }
}
