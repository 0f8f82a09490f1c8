//! Post entity <-> model mapper

use blog_core::entities::Post;
use blog_core::value_objects::PostId;

use crate::models::PostModel;

/// Convert PostModel to Post entity
impl From<PostModel> for Post {
    fn from(model: PostModel) -> Self {
        Post {
            id: PostId::from_uuid(model.id),
            slug: model.slug,
            title: model.title,
            body: model.content,
            created_at: model.created_at,
        }
    }
}
