//! HTTP API integration tests
//!
//! Each test starts its own node over an in-memory store, so no database is needed.

use integration_tests::*;
use reqwest::StatusCode;
use serde_json::{json, Value};

const COMMENTS: &str = "/comments?slug=hello-world";

async fn create_comment(server: &TestServer, token: &str, content: &str) -> anyhow::Result<Value> {
    let response = server
        .post(COMMENTS, Some(token), &comment_body(content))
        .await?;
    let body: Value = assert_json(response, StatusCode::CREATED).await?;
    Ok(body["comment"].clone())
}

async fn cast_vote(
    server: &TestServer,
    token: &str,
    comment_id: &str,
    vote_type: &str,
) -> anyhow::Result<Value> {
    let response = server
        .post("/comments/vote", Some(token), &vote_body(comment_id, vote_type))
        .await?;
    assert_json(response, StatusCode::OK).await
}

// ============================================================================
// Health
// ============================================================================

#[tokio::test]
async fn test_health_reports_node() -> anyhow::Result<()> {
    let cluster = Cluster::new();
    let server = cluster.node("node-health").await?;

    let body: Value = assert_json(server.get("/health").await?, StatusCode::OK).await?;
    assert_eq!(body["status"], "OK");
    assert_eq!(body["nodeId"], "node-health");

    let body: Value = assert_json(server.get("/health/ready").await?, StatusCode::OK).await?;
    assert_eq!(body["status"], "ready");
    Ok(())
}

// ============================================================================
// Comments
// ============================================================================

#[tokio::test]
async fn test_create_comment() -> anyhow::Result<()> {
    let cluster = Cluster::new();
    let server = cluster.node("node-a").await?;
    let token = cluster.token_for("alice")?;

    let comment = create_comment(&server, &token, "First!").await?;

    assert_eq!(comment["content"], "First!");
    assert_eq!(comment["author"], "alice");
    assert_eq!(comment["postSlug"], POST_SLUG);
    assert_eq!(comment["likes"], 0);
    assert_eq!(comment["dislikes"], 0);
    assert!(comment["id"].is_string());
    assert!(comment["userId"].is_string());
    Ok(())
}

#[tokio::test]
async fn test_create_comment_requires_identity() -> anyhow::Result<()> {
    let cluster = Cluster::new();
    let server = cluster.node("node-a").await?;

    let response = server.post(COMMENTS, None, &comment_body("hi")).await?;
    let code = assert_error(response, StatusCode::UNAUTHORIZED).await?;
    assert_eq!(code, "UNAUTHORIZED");

    let response = server
        .post(COMMENTS, Some("not-a-token"), &comment_body("hi"))
        .await?;
    let code = assert_error(response, StatusCode::UNAUTHORIZED).await?;
    assert_eq!(code, "INVALID_TOKEN");
    Ok(())
}

#[tokio::test]
async fn test_create_comment_validation() -> anyhow::Result<()> {
    let cluster = Cluster::new();
    let server = cluster.node("node-a").await?;
    let token = cluster.token_for("alice")?;

    let response = server
        .post("/comments", Some(&token), &comment_body("hi"))
        .await?;
    let code = assert_error(response, StatusCode::BAD_REQUEST).await?;
    assert_eq!(code, "INVALID_QUERY_PARAMETER");

    let response = server
        .post(COMMENTS, Some(&token), &comment_body("   "))
        .await?;
    let code = assert_error(response, StatusCode::BAD_REQUEST).await?;
    assert_eq!(code, "VALIDATION_ERROR");

    let response = server
        .post(COMMENTS, Some(&token), &comment_body("nul\u{0}inside"))
        .await?;
    let code = assert_error(response, StatusCode::BAD_REQUEST).await?;
    assert_eq!(code, "VALIDATION_ERROR");

    let too_long = "x".repeat(2001);
    let response = server
        .post(COMMENTS, Some(&token), &comment_body(&too_long))
        .await?;
    let code = assert_error(response, StatusCode::BAD_REQUEST).await?;
    assert_eq!(code, "CONTENT_TOO_LONG");

    let response = server
        .post(COMMENTS, Some(&token), &json!({ "text": "wrong field" }))
        .await?;
    assert_error(response, StatusCode::BAD_REQUEST).await?;
    Ok(())
}

#[tokio::test]
async fn test_comment_at_length_limit_is_accepted() -> anyhow::Result<()> {
    let cluster = Cluster::new();
    let server = cluster.node("node-a").await?;
    let token = cluster.token_for("alice")?;

    let content = "é".repeat(2000);
    let comment = create_comment(&server, &token, &content).await?;
    assert_eq!(comment["content"], content.as_str());
    Ok(())
}

#[tokio::test]
async fn test_comment_on_unknown_post() -> anyhow::Result<()> {
    let cluster = Cluster::new();
    let server = cluster.node("node-a").await?;
    let token = cluster.token_for("alice")?;

    let response = server
        .post("/comments?slug=no-such-post", Some(&token), &comment_body("hi"))
        .await?;
    let code = assert_error(response, StatusCode::NOT_FOUND).await?;
    assert_eq!(code, "UNKNOWN_POST");

    let response = server.get("/comments?slug=no-such-post").await?;
    let code = assert_error(response, StatusCode::NOT_FOUND).await?;
    assert_eq!(code, "UNKNOWN_POST");
    Ok(())
}

#[tokio::test]
async fn test_list_comments_sorting() -> anyhow::Result<()> {
    let cluster = Cluster::new();
    let server = cluster.node("node-a").await?;
    let alice = cluster.token_for("alice")?;
    let bob = cluster.token_for("bob")?;

    let first = create_comment(&server, &alice, "first").await?;
    let second = create_comment(&server, &alice, "second").await?;

    let first_id = first["id"].as_str().unwrap_or_default().to_string();
    cast_vote(&server, &bob, &first_id, "like").await?;

    let body: Value = assert_json(server.get(COMMENTS).await?, StatusCode::OK).await?;
    assert_eq!(body["count"], 2);
    assert_eq!(body["comments"][0]["id"], second["id"]);

    let body: Value = assert_json(
        server.get(&format!("{COMMENTS}&sort=oldest")).await?,
        StatusCode::OK,
    )
    .await?;
    assert_eq!(body["comments"][0]["id"], first["id"]);

    let body: Value = assert_json(
        server.get(&format!("{COMMENTS}&sort=popular")).await?,
        StatusCode::OK,
    )
    .await?;
    assert_eq!(body["comments"][0]["id"], first["id"]);
    assert_eq!(body["comments"][0]["likes"], 1);

    let response = server.get(&format!("{COMMENTS}&sort=random")).await?;
    let code = assert_error(response, StatusCode::BAD_REQUEST).await?;
    assert_eq!(code, "INVALID_SORT");
    Ok(())
}

#[tokio::test]
async fn test_list_requires_slug() -> anyhow::Result<()> {
    let cluster = Cluster::new();
    let server = cluster.node("node-a").await?;

    let code = assert_error(server.get("/comments").await?, StatusCode::BAD_REQUEST).await?;
    assert_eq!(code, "INVALID_QUERY_PARAMETER");
    Ok(())
}

// ============================================================================
// Votes
// ============================================================================

#[tokio::test]
async fn test_vote_transitions() -> anyhow::Result<()> {
    let cluster = Cluster::new();
    let server = cluster.node("node-a").await?;
    let alice = cluster.token_for("alice")?;
    let bob = cluster.token_for("bob")?;

    let comment = create_comment(&server, &alice, "vote on me").await?;
    let id = comment["id"].as_str().unwrap_or_default().to_string();

    let body = cast_vote(&server, &bob, &id, "like").await?;
    assert_eq!(body["success"], true);
    assert_eq!(body["operation"], "added");
    assert_eq!(body["comment"]["likes"], 1);
    assert_eq!(body["comment"]["dislikes"], 0);
    assert_eq!(body["comment"]["userVote"], "like");

    let body = cast_vote(&server, &bob, &id, "dislike").await?;
    assert_eq!(body["operation"], "switched");
    assert_eq!(body["comment"]["likes"], 0);
    assert_eq!(body["comment"]["dislikes"], 1);
    assert_eq!(body["comment"]["userVote"], "dislike");

    let body = cast_vote(&server, &bob, &id, "dislike").await?;
    assert_eq!(body["operation"], "removed");
    assert_eq!(body["comment"]["likes"], 0);
    assert_eq!(body["comment"]["dislikes"], 0);
    assert!(body["comment"]["userVote"].is_null());
    Ok(())
}

#[tokio::test]
async fn test_vote_errors() -> anyhow::Result<()> {
    let cluster = Cluster::new();
    let server = cluster.node("node-a").await?;
    let alice = cluster.token_for("alice")?;

    let comment = create_comment(&server, &alice, "target").await?;
    let id = comment["id"].as_str().unwrap_or_default().to_string();

    let response = server
        .post("/comments/vote", Some(&alice), &vote_body(&id, "love"))
        .await?;
    let code = assert_error(response, StatusCode::BAD_REQUEST).await?;
    assert_eq!(code, "INVALID_VOTE_TYPE");

    let unknown = "00000000-0000-4000-8000-000000000000";
    let response = server
        .post("/comments/vote", Some(&alice), &vote_body(unknown, "like"))
        .await?;
    let code = assert_error(response, StatusCode::NOT_FOUND).await?;
    assert_eq!(code, "UNKNOWN_COMMENT");

    let response = server
        .post("/comments/vote", None, &vote_body(&id, "like"))
        .await?;
    assert_error(response, StatusCode::UNAUTHORIZED).await?;
    Ok(())
}

#[tokio::test]
async fn test_user_votes() -> anyhow::Result<()> {
    let cluster = Cluster::new();
    let server = cluster.node("node-a").await?;
    let alice = cluster.token_for("alice")?;
    let bob = cluster.token_for("bob")?;

    let liked = create_comment(&server, &alice, "liked").await?;
    let untouched = create_comment(&server, &alice, "untouched").await?;
    let liked_id = liked["id"].as_str().unwrap_or_default().to_string();

    cast_vote(&server, &bob, &liked_id, "like").await?;

    let response = server
        .post(
            "/comments/votes",
            Some(&bob),
            &json!({ "commentIds": [liked["id"], untouched["id"]] }),
        )
        .await?;
    let body: Value = assert_json(response, StatusCode::OK).await?;
    let votes = body["votes"].as_array().cloned().unwrap_or_default();
    assert_eq!(votes.len(), 1);
    assert_eq!(votes[0]["commentId"], liked["id"]);
    assert_eq!(votes[0]["voteType"], "like");

    // Another user sees none of bob's votes
    let response = server
        .post("/comments/votes", Some(&alice), &json!({ "commentIds": [liked["id"]] }))
        .await?;
    let body: Value = assert_json(response, StatusCode::OK).await?;
    assert_eq!(body["votes"], json!([]));
    Ok(())
}

#[tokio::test]
async fn test_user_votes_bounds() -> anyhow::Result<()> {
    let cluster = Cluster::new();
    let server = cluster.node("node-a").await?;
    let token = cluster.token_for("alice")?;

    let response = server
        .post("/comments/votes", Some(&token), &json!({ "commentIds": [] }))
        .await?;
    let code = assert_error(response, StatusCode::BAD_REQUEST).await?;
    assert_eq!(code, "VALIDATION_ERROR");

    let ids: Vec<String> = (0..101)
        .map(|i| format!("00000000-0000-4000-8000-{i:012}"))
        .collect();
    let response = server
        .post("/comments/votes", Some(&token), &json!({ "commentIds": ids }))
        .await?;
    let code = assert_error(response, StatusCode::BAD_REQUEST).await?;
    assert_eq!(code, "VALIDATION_ERROR");
    Ok(())
}
