//! Realtime room naming
//!
//! One room per post, keyed by the post slug. Transports carry the room as
//! `post:{slug}`.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Prefix of a room's name on the fan-out transport
pub const ROOM_PREFIX: &str = "post:";

/// Longest slug accepted as a room key
pub const MAX_SLUG_LENGTH: usize = 200;

/// Room of the connections following one post
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomId(String);

impl RoomId {
    /// Room for a post slug
    ///
    /// # Errors
    /// Returns a validation error for a blank or oversized slug
    pub fn for_post(slug: &str) -> Result<Self, DomainError> {
        let slug = slug.trim();
        if slug.is_empty() {
            return Err(DomainError::ValidationError("post slug is required".to_string()));
        }
        if slug.chars().count() > MAX_SLUG_LENGTH {
            return Err(DomainError::ValidationError(format!(
                "post slug must be at most {MAX_SLUG_LENGTH} characters"
            )));
        }
        Ok(Self(slug.to_string()))
    }

    #[inline]
    pub fn slug(&self) -> &str {
        &self.0
    }

    /// Name used on the fan-out transport
    pub fn channel_name(&self) -> String {
        format!("{ROOM_PREFIX}{}", self.0)
    }

    /// Parse a transport name back into a room
    pub fn from_channel_name(name: &str) -> Option<Self> {
        name.strip_prefix(ROOM_PREFIX)
            .and_then(|slug| Self::for_post(slug).ok())
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_name_round_trip() {
        let room = RoomId::for_post("hello-world").unwrap();
        assert_eq!(room.channel_name(), "post:hello-world");
        assert_eq!(RoomId::from_channel_name("post:hello-world"), Some(room));
    }

    #[test]
    fn test_slug_is_trimmed() {
        let room = RoomId::for_post("  spaced  ").unwrap();
        assert_eq!(room.slug(), "spaced");
    }

    #[test]
    fn test_invalid_slugs() {
        assert!(RoomId::for_post("").is_err());
        assert!(RoomId::for_post("   ").is_err());
        assert!(RoomId::for_post(&"s".repeat(MAX_SLUG_LENGTH + 1)).is_err());
        assert_eq!(RoomId::from_channel_name("guild:42"), None);
        assert_eq!(RoomId::from_channel_name("post:"), None);
    }
}
