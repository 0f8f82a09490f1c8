//! Value objects - immutable, identity-less domain values

mod identity;
mod ids;
mod room;
mod sort;

pub use identity::{Identity, UserIdentity};
pub use ids::{CommentId, PostId, UserId};
pub use room::{RoomId, MAX_SLUG_LENGTH, ROOM_PREFIX};
pub use sort::SortPolicy;
