//! In-memory store
//!
//! Implements the repository traits over a single mutex-guarded state. Casts run
//! the same [`VoteTransition`] plan as the PostgreSQL repository while holding the
//! lock, so they are atomic and serialized the same way. Used by the service and
//! gateway tests and by single-node development runs without a database.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;

use blog_core::entities::{
    Comment, NewComment, Post, Vote, VoteOperation, VoteTally, VoteTransition, VoteType,
};
use blog_core::error::DomainError;
use blog_core::traits::{CommentRepository, PostRepository, RepoResult, VoteRepository};
use blog_core::value_objects::{CommentId, PostId, SortPolicy, UserId};

#[derive(Default)]
struct State {
    posts: HashMap<PostId, Post>,
    slugs: HashMap<String, PostId>,
    comments: HashMap<CommentId, Comment>,
    votes: HashMap<(UserId, CommentId), Vote>,
    last_created_at: Option<DateTime<Utc>>,
}

impl State {
    /// Strictly increasing creation timestamps so insertion order is never ambiguous
    fn next_timestamp(&mut self) -> DateTime<Utc> {
        let now = Utc::now();
        let stamp = match self.last_created_at {
            Some(last) if now <= last => last + Duration::microseconds(1),
            _ => now,
        };
        self.last_created_at = Some(stamp);
        stamp
    }
}

/// Mutex-backed implementation of every repository trait
#[derive(Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<State>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a post, or return the stored one if the slug already exists
    pub fn insert_post(&self, post: Post) -> Post {
        let mut state = self.state.lock();
        if let Some(existing) = state.slugs.get(&post.slug).and_then(|id| state.posts.get(id)) {
            return existing.clone();
        }
        state.slugs.insert(post.slug.clone(), post.id);
        state.posts.insert(post.id, post.clone());
        post
    }
}

impl std::fmt::Debug for MemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock();
        f.debug_struct("MemoryStore")
            .field("posts", &state.posts.len())
            .field("comments", &state.comments.len())
            .field("votes", &state.votes.len())
            .finish()
    }
}

#[async_trait]
impl PostRepository for MemoryStore {
    async fn find_by_slug(&self, slug: &str) -> RepoResult<Option<Post>> {
        let state = self.state.lock();
        Ok(state
            .slugs
            .get(slug)
            .and_then(|id| state.posts.get(id))
            .cloned())
    }
}

#[async_trait]
impl CommentRepository for MemoryStore {
    async fn create(&self, comment: &NewComment) -> RepoResult<Comment> {
        let mut state = self.state.lock();
        if !state.posts.contains_key(&comment.post_id) {
            return Err(DomainError::ConstraintViolation(format!(
                "post {} does not exist",
                comment.post_id
            )));
        }

        let stored = Comment {
            id: CommentId::generate(),
            post_id: comment.post_id,
            author: comment.author.clone(),
            content: comment.content.clone(),
            likes: 0,
            dislikes: 0,
            created_at: state.next_timestamp(),
        };
        state.comments.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn find_by_id(&self, id: CommentId) -> RepoResult<Option<Comment>> {
        Ok(self.state.lock().comments.get(&id).cloned())
    }

    async fn find_by_post(&self, post_id: PostId, sort: SortPolicy) -> RepoResult<Vec<Comment>> {
        let state = self.state.lock();
        let mut comments: Vec<Comment> = state
            .comments
            .values()
            .filter(|c| c.post_id == post_id)
            .cloned()
            .collect();
        comments.sort_by(|a, b| sort.compare(a, b));
        Ok(comments)
    }
}

#[async_trait]
impl VoteRepository for MemoryStore {
    async fn cast(
        &self,
        voter_id: UserId,
        comment_id: CommentId,
        vote_type: VoteType,
    ) -> RepoResult<VoteTally> {
        let mut state = self.state.lock();
        let state = &mut *state;

        let comment = state
            .comments
            .get_mut(&comment_id)
            .ok_or(DomainError::CommentNotFound(comment_id))?;
        let post_slug = state
            .posts
            .get(&comment.post_id)
            .map(|post| post.slug.clone())
            .ok_or_else(|| DomainError::PostNotFound(comment.post_id.to_string()))?;

        let key = (voter_id, comment_id);
        let existing = state.votes.get(&key).map(|vote| vote.vote_type);
        let plan = VoteTransition::plan(existing, vote_type);

        match plan.operation {
            VoteOperation::Removed => {
                state.votes.remove(&key);
            }
            VoteOperation::Added | VoteOperation::Switched => {
                state
                    .votes
                    .insert(key, Vote::new(comment_id, voter_id, vote_type));
            }
        }

        let counters = plan.apply(comment.counters());
        comment.likes = counters.likes;
        comment.dislikes = counters.dislikes;

        Ok(VoteTally {
            comment_id,
            post_id: comment.post_id,
            post_slug,
            operation: plan.operation,
            counters,
        })
    }

    async fn find(&self, voter_id: UserId, comment_id: CommentId) -> RepoResult<Option<VoteType>> {
        Ok(self
            .state
            .lock()
            .votes
            .get(&(voter_id, comment_id))
            .map(|vote| vote.vote_type))
    }

    async fn find_many(&self, voter_id: UserId, comment_ids: &[CommentId]) -> RepoResult<Vec<Vote>> {
        let state = self.state.lock();
        Ok(comment_ids
            .iter()
            .filter_map(|comment_id| state.votes.get(&(voter_id, *comment_id)))
            .cloned()
            .collect())
    }

    async fn count(&self, comment_id: CommentId, vote_type: VoteType) -> RepoResult<i64> {
        let state = self.state.lock();
        let count = state
            .votes
            .values()
            .filter(|vote| vote.comment_id == comment_id && vote.vote_type == vote_type)
            .count();
        Ok(i64::try_from(count).unwrap_or(i64::MAX))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use blog_core::entities::{CommentAuthor, VoteCounters};

    async fn seeded() -> (MemoryStore, Post) {
        let store = MemoryStore::new();
        let post = store.insert_post(Post::new("hello-world", "Hello", "First post"));
        (store, post)
    }

    async fn add_comment(store: &MemoryStore, post: &Post, content: &str) -> Comment {
        let new = NewComment::new(post.id, CommentAuthor::named("tester"), content.to_string())
            .unwrap();
        store.create(&new).await.unwrap()
    }

    #[tokio::test]
    async fn test_insert_post_is_idempotent_by_slug() {
        let (store, post) = seeded().await;
        let again = store.insert_post(Post::new("hello-world", "Other", "Other body"));
        assert_eq!(again.id, post.id);
        assert_eq!(again.title, "Hello");
    }

    #[tokio::test]
    async fn test_create_zeroes_counters() {
        let (store, post) = seeded().await;
        let comment = add_comment(&store, &post, "first").await;

        assert_eq!(comment.counters(), VoteCounters::default());
        let found = store.find_by_id(comment.id).await.unwrap().unwrap();
        assert_eq!(found, comment);
    }

    #[tokio::test]
    async fn test_create_for_unknown_post() {
        let store = MemoryStore::new();
        let new = NewComment::new(PostId::generate(), CommentAuthor::named("x"), "hi".to_string())
            .unwrap();
        let result = store.create(&new).await;
        assert!(matches!(result, Err(DomainError::ConstraintViolation(_))));
    }

    #[tokio::test]
    async fn test_list_orders() {
        let (store, post) = seeded().await;
        let first = add_comment(&store, &post, "one").await;
        let second = add_comment(&store, &post, "two").await;
        let third = add_comment(&store, &post, "three").await;

        let voter = UserId::generate();
        store.cast(voter, second.id, VoteType::Like).await.unwrap();

        let newest = store.find_by_post(post.id, SortPolicy::Newest).await.unwrap();
        let ids: Vec<_> = newest.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![third.id, second.id, first.id]);

        let oldest = store.find_by_post(post.id, SortPolicy::Oldest).await.unwrap();
        let ids: Vec<_> = oldest.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![first.id, second.id, third.id]);

        let popular = store.find_by_post(post.id, SortPolicy::Popular).await.unwrap();
        let ids: Vec<_> = popular.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![second.id, third.id, first.id]);
    }

    #[tokio::test]
    async fn test_cast_transitions() {
        let (store, post) = seeded().await;
        let comment = add_comment(&store, &post, "vote on me").await;
        let voter = UserId::generate();

        let tally = store.cast(voter, comment.id, VoteType::Like).await.unwrap();
        assert_eq!(tally.operation, VoteOperation::Added);
        assert_eq!(tally.counters, VoteCounters::new(1, 0));
        assert_eq!(tally.post_slug, "hello-world");

        let tally = store.cast(voter, comment.id, VoteType::Dislike).await.unwrap();
        assert_eq!(tally.operation, VoteOperation::Switched);
        assert_eq!(tally.counters, VoteCounters::new(0, 1));
        assert_eq!(
            store.find(voter, comment.id).await.unwrap(),
            Some(VoteType::Dislike)
        );

        let tally = store.cast(voter, comment.id, VoteType::Dislike).await.unwrap();
        assert_eq!(tally.operation, VoteOperation::Removed);
        assert_eq!(tally.counters, VoteCounters::default());
        assert_eq!(store.find(voter, comment.id).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_cast_unknown_comment() {
        let store = MemoryStore::new();
        let missing = CommentId::generate();
        let result = store.cast(UserId::generate(), missing, VoteType::Like).await;
        assert!(matches!(result, Err(DomainError::CommentNotFound(id)) if id == missing));
    }

    #[tokio::test]
    async fn test_counters_match_vote_rows() {
        let (store, post) = seeded().await;
        let comment = add_comment(&store, &post, "popular").await;

        let voters: Vec<_> = (0..6).map(|_| UserId::generate()).collect();
        for (i, voter) in voters.iter().enumerate() {
            let vote_type = if i % 3 == 0 { VoteType::Dislike } else { VoteType::Like };
            store.cast(*voter, comment.id, vote_type).await.unwrap();
        }
        // One voter withdraws, one switches
        store.cast(voters[1], comment.id, VoteType::Like).await.unwrap();
        store.cast(voters[2], comment.id, VoteType::Dislike).await.unwrap();

        let stored = store.find_by_id(comment.id).await.unwrap().unwrap();
        let likes = store.count(comment.id, VoteType::Like).await.unwrap();
        let dislikes = store.count(comment.id, VoteType::Dislike).await.unwrap();
        assert_eq!(i64::from(stored.likes), likes);
        assert_eq!(i64::from(stored.dislikes), dislikes);
        assert_eq!((likes, dislikes), (2, 3));
    }

    #[tokio::test]
    async fn test_find_many_only_returns_voted() {
        let (store, post) = seeded().await;
        let a = add_comment(&store, &post, "a").await;
        let b = add_comment(&store, &post, "b").await;
        let voter = UserId::generate();
        store.cast(voter, b.id, VoteType::Dislike).await.unwrap();

        let votes = store.find_many(voter, &[a.id, b.id]).await.unwrap();
        assert_eq!(votes.len(), 1);
        assert_eq!(votes[0].comment_id, b.id);
        assert_eq!(votes[0].vote_type, VoteType::Dislike);

        assert!(store.find_many(voter, &[]).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_concurrent_casts_from_distinct_voters() {
        let (store, post) = seeded().await;
        let comment = add_comment(&store, &post, "race").await;

        let tasks: Vec<_> = (0..20)
            .map(|_| {
                let store = store.clone();
                tokio::spawn(async move {
                    store
                        .cast(UserId::generate(), comment.id, VoteType::Like)
                        .await
                        .unwrap()
                })
            })
            .collect();
        for task in tasks {
            assert_eq!(task.await.unwrap().operation, VoteOperation::Added);
        }

        let stored = store.find_by_id(comment.id).await.unwrap().unwrap();
        assert_eq!(stored.likes, 20);
        assert_eq!(store.count(comment.id, VoteType::Like).await.unwrap(), 20);
    }
}
