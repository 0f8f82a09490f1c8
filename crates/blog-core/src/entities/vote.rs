//! Vote entity and the like/dislike reconciliation rules
//!
//! A voter holds at most one vote per comment. Casting a vote is planned by
//! [`VoteTransition::plan`] from the vote currently stored for that pair:
//!
//! | existing | requested | operation  | counters                 |
//! |----------|-----------|------------|--------------------------|
//! | none     | X         | `added`    | X + 1                    |
//! | X        | X         | `removed`  | X - 1                    |
//! | X        | Y         | `switched` | X - 1, Y + 1             |
//!
//! Every store applies the same plan so counters and vote rows move together.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::value_objects::{CommentId, PostId, UserId};

/// Kind of vote
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteType {
    Like,
    Dislike,
}

impl VoteType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Like => "like",
            Self::Dislike => "dislike",
        }
    }
}

impl fmt::Display for VoteType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VoteType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "like" => Ok(Self::Like),
            "dislike" => Ok(Self::Dislike),
            other => Err(DomainError::InvalidVoteType(other.to_string())),
        }
    }
}

/// What a cast did to the stored vote
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteOperation {
    Added,
    Removed,
    Switched,
}

impl VoteOperation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Added => "added",
            Self::Removed => "removed",
            Self::Switched => "switched",
        }
    }
}

impl fmt::Display for VoteOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Vote entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vote {
    pub comment_id: CommentId,
    pub voter_id: UserId,
    pub vote_type: VoteType,
    pub created_at: DateTime<Utc>,
}

impl Vote {
    /// Create a new Vote
    pub fn new(comment_id: CommentId, voter_id: UserId, vote_type: VoteType) -> Self {
        Self {
            comment_id,
            voter_id,
            vote_type,
            created_at: Utc::now(),
        }
    }
}

/// Cached like/dislike counters of a comment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct VoteCounters {
    pub likes: i32,
    pub dislikes: i32,
}

impl VoteCounters {
    pub const fn new(likes: i32, dislikes: i32) -> Self {
        Self { likes, dislikes }
    }

    fn adjust(self, vote_type: VoteType, delta: i32) -> Self {
        match vote_type {
            VoteType::Like => Self {
                likes: (self.likes + delta).max(0),
                ..self
            },
            VoteType::Dislike => Self {
                dislikes: (self.dislikes + delta).max(0),
                ..self
            },
        }
    }
}

/// Planned effect of one cast
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VoteTransition {
    pub operation: VoteOperation,
    /// Vote stored for the pair once the cast commits
    pub resulting: Option<VoteType>,
    /// Vote type whose counter goes down, if any
    pub decrement: Option<VoteType>,
    /// Vote type whose counter goes up, if any
    pub increment: Option<VoteType>,
}

impl VoteTransition {
    /// Plan a cast of `requested` given the voter's `existing` vote
    pub fn plan(existing: Option<VoteType>, requested: VoteType) -> Self {
        match existing {
            None => Self {
                operation: VoteOperation::Added,
                resulting: Some(requested),
                decrement: None,
                increment: Some(requested),
            },
            Some(current) if current == requested => Self {
                operation: VoteOperation::Removed,
                resulting: None,
                decrement: Some(current),
                increment: None,
            },
            Some(current) => Self {
                operation: VoteOperation::Switched,
                resulting: Some(requested),
                decrement: Some(current),
                increment: Some(requested),
            },
        }
    }

    /// Apply the counter effect, flooring decrements at zero
    pub fn apply(&self, counters: VoteCounters) -> VoteCounters {
        let counters = match self.decrement {
            Some(vote_type) => counters.adjust(vote_type, -1),
            None => counters,
        };
        match self.increment {
            Some(vote_type) => counters.adjust(vote_type, 1),
            None => counters,
        }
    }
}

/// Result of a committed cast, as read back under the transaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoteTally {
    pub comment_id: CommentId,
    pub post_id: PostId,
    pub post_slug: String,
    pub operation: VoteOperation,
    pub counters: VoteCounters,
}
