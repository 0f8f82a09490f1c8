//! Comment entity <-> model mapper

use blog_core::entities::{Comment, CommentAuthor, NewComment};
use blog_core::value_objects::{CommentId, PostId, UserId};
use uuid::Uuid;

use crate::models::CommentModel;

/// Convert CommentModel to Comment entity
impl From<CommentModel> for Comment {
    fn from(model: CommentModel) -> Self {
        Comment {
            id: CommentId::from_uuid(model.id),
            post_id: PostId::from_uuid(model.post_id),
            author: CommentAuthor {
                user_id: model.user_id.map(UserId::from_uuid),
                name: model.author,
            },
            content: model.content,
            likes: model.likes,
            dislikes: model.dislikes,
            created_at: model.created_at,
        }
    }
}

/// Convert NewComment reference to values for database insertion
pub struct CommentInsert<'a> {
    pub post_id: Uuid,
    pub user_id: Option<Uuid>,
    pub author: &'a str,
    pub content: &'a str,
}

impl<'a> CommentInsert<'a> {
    pub fn new(comment: &'a NewComment) -> Self {
        Self {
            post_id: comment.post_id.as_uuid(),
            user_id: comment.author.user_id.map(Uuid::from),
            author: &comment.author.name,
            content: &comment.content,
        }
    }
}
