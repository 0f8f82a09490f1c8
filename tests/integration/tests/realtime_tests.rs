//! Realtime gateway integration tests
//!
//! Two in-process nodes share one fan-out hub and one store, standing in for a
//! cluster behind a load balancer.

use std::time::Duration;

use integration_tests::*;
use reqwest::StatusCode;
use serde_json::{json, Value};

const QUIET: Duration = Duration::from_millis(500);

#[tokio::test]
async fn test_greeting_names_the_node() -> anyhow::Result<()> {
    let cluster = Cluster::new();
    let a = cluster.node("node-a").await?;
    let b = cluster.node("node-b").await?;

    let on_a = a.connect(None).await?;
    let on_b = b.connect(None).await?;

    assert_eq!(on_a.node_id, "node-a");
    assert_eq!(on_b.node_id, "node-b");
    assert_eq!(a.bus.connection_count(), 1);
    assert_eq!(b.bus.connection_count(), 1);
    Ok(())
}

#[tokio::test]
async fn test_comment_reaches_other_node() -> anyhow::Result<()> {
    let cluster = Cluster::new();
    let a = cluster.node("node-a").await?;
    let b = cluster.node("node-b").await?;

    let mut writer = a.connect(None).await?;
    let mut reader = b.connect(None).await?;
    writer.join(POST_SLUG).await?;
    reader.join(POST_SLUG).await?;
    reader.expect_online(POST_SLUG, 2).await?;

    let content = comment_text();
    writer
        .send(
            "new_comment",
            new_comment_data(POST_SLUG, &content, Some("Guest Writer")),
        )
        .await?;

    let remote = reader.expect_event("comment_added").await?;
    assert_eq!(remote["content"], content.as_str());
    assert_eq!(remote["author"], "Guest Writer");
    assert_eq!(remote["postSlug"], POST_SLUG);

    // The writer is a room member too
    let local = writer.expect_event("comment_added").await?;
    assert_eq!(local["id"], remote["id"]);
    Ok(())
}

#[tokio::test]
async fn test_http_comment_is_broadcast() -> anyhow::Result<()> {
    let cluster = Cluster::new();
    let a = cluster.node("node-a").await?;
    let b = cluster.node("node-b").await?;
    let token = cluster.token_for("alice")?;

    let mut reader = b.connect(None).await?;
    reader.join(POST_SLUG).await?;
    reader.expect_online(POST_SLUG, 1).await?;

    let response = a
        .post("/comments?slug=hello-world", Some(&token), &comment_body("over http"))
        .await?;
    let created: Value = assert_json(response, StatusCode::CREATED).await?;

    let event = reader.expect_event("comment_added").await?;
    assert_eq!(event["id"], created["comment"]["id"]);
    assert_eq!(event["author"], "alice");
    Ok(())
}

#[tokio::test]
async fn test_token_identity_wins_over_guest_name() -> anyhow::Result<()> {
    let cluster = Cluster::new();
    let a = cluster.node("node-a").await?;
    let token = cluster.token_for("alice")?;

    let mut client = a.connect(Some(&token)).await?;
    client.join(POST_SLUG).await?;
    client
        .send(
            "new_comment",
            new_comment_data(POST_SLUG, "signed in", Some("Impostor")),
        )
        .await?;

    let event = client.expect_event("comment_added").await?;
    assert_eq!(event["author"], "alice");
    assert!(event["userId"].is_string());
    Ok(())
}

#[tokio::test]
async fn test_vote_update_reaches_other_node() -> anyhow::Result<()> {
    let cluster = Cluster::new();
    let a = cluster.node("node-a").await?;
    let b = cluster.node("node-b").await?;
    let alice = cluster.token_for("alice")?;
    let bob = cluster.token_for("bob")?;

    let response = a
        .post("/comments?slug=hello-world", Some(&alice), &comment_body("vote me"))
        .await?;
    let created: Value = assert_json(response, StatusCode::CREATED).await?;
    let comment_id = created["comment"]["id"].as_str().unwrap_or_default().to_string();

    let mut reader = b.connect(None).await?;
    reader.join(POST_SLUG).await?;
    reader.expect_online(POST_SLUG, 1).await?;

    let response = a
        .post("/comments/vote", Some(&bob), &vote_body(&comment_id, "dislike"))
        .await?;
    assert_json::<Value>(response, StatusCode::OK).await?;

    let update = reader.expect_event("comment_vote_updated").await?;
    assert_eq!(
        update,
        json!({ "commentId": comment_id, "likes": 0, "dislikes": 1 })
    );
    Ok(())
}

#[tokio::test]
async fn test_online_count_spans_nodes() -> anyhow::Result<()> {
    let cluster = Cluster::new();
    let a = cluster.node("node-a").await?;
    let b = cluster.node("node-b").await?;

    let mut first = a.connect(None).await?;
    first.join(POST_SLUG).await?;
    first.expect_online(POST_SLUG, 1).await?;

    let mut second = b.connect(None).await?;
    second.join(POST_SLUG).await?;
    second.expect_online(POST_SLUG, 2).await?;
    first.expect_online(POST_SLUG, 2).await?;

    second.close().await?;
    first.expect_online(POST_SLUG, 1).await?;
    Ok(())
}

#[tokio::test]
async fn test_leave_post_updates_count() -> anyhow::Result<()> {
    let cluster = Cluster::new();
    let a = cluster.node("node-a").await?;

    let mut stays = a.connect(None).await?;
    let mut leaves = a.connect(None).await?;
    stays.join(POST_SLUG).await?;
    leaves.join(POST_SLUG).await?;
    stays.expect_online(POST_SLUG, 2).await?;

    leaves.send("leave_post", json!(POST_SLUG)).await?;
    stays.expect_online(POST_SLUG, 1).await?;

    // Events for the post no longer reach the leaver
    stays
        .send("new_comment", new_comment_data(POST_SLUG, "after leave", None))
        .await?;
    stays.expect_event("comment_added").await?;
    leaves.expect_silence("comment_added", QUIET).await?;
    Ok(())
}

#[tokio::test]
async fn test_crashed_node_members_expire() -> anyhow::Result<()> {
    let cluster = Cluster::new();
    let a = cluster.node("node-a").await?;
    let b = cluster.node("node-b").await?;

    let mut survivor = a.connect(None).await?;
    survivor.join(POST_SLUG).await?;
    let mut orphan = b.connect(None).await?;
    orphan.join(POST_SLUG).await?;
    survivor.expect_online(POST_SLUG, 2).await?;

    // No goodbye: the count drops once node-b misses its heartbeats
    b.kill();
    survivor.expect_online(POST_SLUG, 1).await?;
    drop(orphan);
    Ok(())
}

#[tokio::test]
async fn test_comment_error_only_reaches_sender() -> anyhow::Result<()> {
    let cluster = Cluster::new();
    let a = cluster.node("node-a").await?;

    let mut sender = a.connect(None).await?;
    let mut bystander = a.connect(None).await?;
    sender.join(POST_SLUG).await?;
    bystander.join(POST_SLUG).await?;
    bystander.expect_online(POST_SLUG, 2).await?;

    let too_long = "x".repeat(2001);
    sender
        .send("new_comment", new_comment_data(POST_SLUG, &too_long, None))
        .await?;

    let error = sender.expect_event("comment_error").await?;
    assert_eq!(error["code"], "CONTENT_TOO_LONG");
    assert!(error["error"].is_string());

    bystander.expect_silence("comment_error", QUIET).await?;
    Ok(())
}

#[tokio::test]
async fn test_comment_on_unknown_post_reports_error() -> anyhow::Result<()> {
    let cluster = Cluster::new();
    let a = cluster.node("node-a").await?;

    let mut client = a.connect(None).await?;
    client
        .send("new_comment", new_comment_data("no-such-post", "hello?", None))
        .await?;

    let error = client.expect_event("comment_error").await?;
    assert_eq!(error["code"], "UNKNOWN_POST");
    Ok(())
}

#[tokio::test]
async fn test_malformed_frame_keeps_connection_open() -> anyhow::Result<()> {
    let cluster = Cluster::new();
    let a = cluster.node("node-a").await?;

    let mut client = a.connect(None).await?;
    client.send_raw("this is not json").await?;
    let error = client.expect_event("comment_error").await?;
    assert_eq!(error["code"], "INVALID_MESSAGE");

    client.send("shout", json!("hello")).await?;
    let error = client.expect_event("comment_error").await?;
    assert_eq!(error["code"], "INVALID_MESSAGE");

    client.send_raw(r#"{"event":"ping"}"#).await?;
    client.expect_event("pong").await?;
    Ok(())
}

#[tokio::test]
async fn test_invalid_token_is_rejected() -> anyhow::Result<()> {
    let cluster = Cluster::new();
    let a = cluster.node("node-a").await?;

    assert!(a.connect(Some("forged.token.value")).await.is_err());

    // Guests are still welcome
    let token = cluster.token_for("alice")?;
    a.connect(Some(&token)).await?;
    a.connect(None).await?;
    Ok(())
}
