//! Test fixtures and data generators

use std::sync::atomic::{AtomicU64, Ordering};

use serde_json::{json, Value};

/// Post every cluster starts with
pub const POST_SLUG: &str = "hello-world";

/// Secret shared by the test token issuer and every node
pub const TEST_JWT_SECRET: &str = "integration-test-secret";

/// Counter for unique test data
static COUNTER: AtomicU64 = AtomicU64::new(1);

/// Get a unique suffix for test data
pub fn unique_suffix() -> u64 {
    COUNTER.fetch_add(1, Ordering::SeqCst)
}

/// Unique comment text
pub fn comment_text() -> String {
    format!("comment #{}", unique_suffix())
}

/// `POST /comments` body
pub fn comment_body(content: &str) -> Value {
    json!({ "content": content })
}

/// `POST /comments/vote` body
pub fn vote_body(comment_id: &str, vote_type: &str) -> Value {
    json!({ "commentId": comment_id, "voteType": vote_type })
}

/// `new_comment` realtime payload
pub fn new_comment_data(post_slug: &str, content: &str, author: Option<&str>) -> Value {
    match author {
        Some(author) => json!({ "postSlug": post_slug, "content": content, "author": author }),
        None => json!({ "postSlug": post_slug, "content": content }),
    }
}
