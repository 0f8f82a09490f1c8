//! Test helpers for integration tests
//!
//! Provides an in-process cluster, server nodes bound to ephemeral ports, and
//! HTTP and WebSocket clients for driving them.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use blog_api::{create_app, AppState};
use blog_bus::{Bus, LocalFanOut, NodeId};
use blog_common::{AppConfig, JwtService};
use blog_core::entities::Post;
use blog_core::{UserId, UserIdentity};
use blog_db::MemoryStore;
use blog_service::ServiceContextBuilder;
use futures_util::{SinkExt, StreamExt};
use reqwest::{Client, Response, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::{json, Value};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

use crate::fixtures::{POST_SLUG, TEST_JWT_SECRET};

/// How long a client waits for an expected event
pub const EVENT_TIMEOUT: Duration = Duration::from_secs(5);

/// Presence heartbeat of test nodes
const TEST_HEARTBEAT: Duration = Duration::from_millis(200);

/// Nodes sharing one store and one fan-out hub
pub struct Cluster {
    hub: LocalFanOut,
    store: MemoryStore,
    jwt: JwtService,
}

impl Cluster {
    /// A cluster holding the post [`POST_SLUG`]
    pub fn new() -> Self {
        let store = MemoryStore::default();
        store.insert_post(Post::new(POST_SLUG, "Hello", "First post"));
        Self {
            hub: LocalFanOut::new(),
            store,
            jwt: JwtService::new(TEST_JWT_SECRET, 3600),
        }
    }

    /// Start a node with the given id
    pub async fn node(&self, node_id: &str) -> Result<TestServer> {
        let bus = Bus::new(
            NodeId::new(node_id),
            Arc::new(self.hub.clone()),
            TEST_HEARTBEAT,
        );
        let store = Arc::new(self.store.clone());
        let ctx = ServiceContextBuilder::new()
            .post_repo(store.clone())
            .comment_repo(store.clone())
            .vote_repo(store)
            .bus(Arc::clone(&bus))
            .build()?;

        let state = AppState::new(ctx, None, test_config(node_id)?);
        TestServer::start(state, bus).await
    }

    /// Mint an identity token for a fresh user
    pub fn token_for(&self, username: &str) -> Result<String> {
        let user = UserIdentity::new(UserId::generate(), username);
        Ok(self.jwt.issue(&user)?)
    }
}

impl Default for Cluster {
    fn default() -> Self {
        Self::new()
    }
}

/// Configuration for a test node; the database URL is never dialed
pub fn test_config(node_id: &str) -> Result<AppConfig> {
    let node_id = node_id.to_string();
    AppConfig::from_lookup(|key| {
        let value = match key {
            "PORT" => "0",
            "DATABASE_URL" => "postgres://unused@localhost/unused",
            "JWT_SECRET" => TEST_JWT_SECRET,
            "NODE_ID" => node_id.as_str(),
            "RATE_LIMIT_REQUESTS_PER_SECOND" => "1",
            "RATE_LIMIT_BURST" => "10000",
            _ => return None,
        };
        Some(value.to_string())
    })
    .context("test configuration")
}

/// Test server instance that manages lifecycle
pub struct TestServer {
    pub addr: SocketAddr,
    pub client: Client,
    pub bus: Arc<Bus>,
    handle: JoinHandle<()>,
    bus_tasks: Vec<JoinHandle<()>>,
}

impl TestServer {
    async fn start(state: AppState, bus: Arc<Bus>) -> Result<Self> {
        let app = create_app(state)?;

        let listener = TcpListener::bind(("127.0.0.1", 0)).await?;
        let addr = listener.local_addr()?;

        let bus_tasks = bus.start();
        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        let client = Client::builder().timeout(Duration::from_secs(10)).build()?;

        Ok(Self {
            addr,
            client,
            bus,
            handle,
            bus_tasks,
        })
    }

    /// Get base URL for the server
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Make a GET request
    pub async fn get(&self, path: &str) -> Result<Response> {
        let url = format!("{}{}", self.base_url(), path);
        Ok(self.client.get(&url).send().await?)
    }

    /// Make a POST request with a JSON body and an optional bearer token
    pub async fn post<T: Serialize>(
        &self,
        path: &str,
        token: Option<&str>,
        body: &T,
    ) -> Result<Response> {
        let url = format!("{}{}", self.base_url(), path);
        let mut request = self.client.post(&url).json(body);
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        Ok(request.send().await?)
    }

    /// Open a realtime connection
    pub async fn connect(&self, token: Option<&str>) -> Result<WsClient> {
        WsClient::connect(self.addr, token).await
    }

    /// Stop the node as a crash would: no goodbye to the cluster
    pub fn kill(&self) {
        self.handle.abort();
        for task in &self.bus_tasks {
            task.abort();
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.kill();
    }
}

/// Realtime client speaking the `{"event", "data"}` frame format
pub struct WsClient {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
    /// Node that accepted the connection, from `node_info`
    pub node_id: String,
}

impl WsClient {
    /// Connect and consume the `node_info` greeting
    pub async fn connect(addr: SocketAddr, token: Option<&str>) -> Result<Self> {
        let url = match token {
            Some(token) => format!("ws://{addr}/ws?token={token}"),
            None => format!("ws://{addr}/ws"),
        };
        let (stream, _) = connect_async(url.as_str()).await?;

        let mut client = Self {
            stream,
            node_id: String::new(),
        };
        let hello = client.next_event().await?;
        if hello["event"] != "node_info" {
            bail!("expected node_info first, got {hello}");
        }
        client.node_id = hello["data"]["nodeId"]
            .as_str()
            .context("node_info without nodeId")?
            .to_string();
        Ok(client)
    }

    /// Send a client event
    pub async fn send(&mut self, event: &str, data: Value) -> Result<()> {
        let frame = json!({ "event": event, "data": data });
        self.send_raw(&frame.to_string()).await
    }

    /// Send an arbitrary text frame
    pub async fn send_raw(&mut self, text: &str) -> Result<()> {
        self.stream.send(Message::Text(text.to_string())).await?;
        Ok(())
    }

    pub async fn join(&mut self, post_slug: &str) -> Result<()> {
        self.send("join_post", json!(post_slug)).await
    }

    /// Next event frame, skipping transport pings
    pub async fn next_event(&mut self) -> Result<Value> {
        tokio::time::timeout(EVENT_TIMEOUT, self.read_event())
            .await
            .context("timed out waiting for an event")?
    }

    async fn read_event(&mut self) -> Result<Value> {
        loop {
            match self.stream.next().await {
                Some(Ok(Message::Text(text))) => return Ok(serde_json::from_str(&text)?),
                Some(Ok(Message::Close(_))) | None => bail!("connection closed"),
                Some(Ok(_)) => {}
                Some(Err(e)) => return Err(e.into()),
            }
        }
    }

    /// Skip events until one with the given name arrives; returns its data
    pub async fn expect_event(&mut self, name: &str) -> Result<Value> {
        loop {
            let event = self.next_event().await?;
            if event["event"] == name {
                return Ok(event["data"].clone());
            }
        }
    }

    /// Wait until `online_users` for the post reports `count`
    pub async fn expect_online(&mut self, post_slug: &str, count: u64) -> Result<()> {
        loop {
            let data = self.expect_event("online_users").await?;
            if data["postId"] == post_slug && data["count"] == count {
                return Ok(());
            }
        }
    }

    /// Fail if an event with the given name arrives within `window`
    pub async fn expect_silence(&mut self, name: &str, window: Duration) -> Result<()> {
        let deadline = tokio::time::Instant::now() + window;
        loop {
            let remaining = deadline.saturating_duration_since(tokio::time::Instant::now());
            if remaining.is_zero() {
                return Ok(());
            }
            match tokio::time::timeout(remaining, self.stream.next()).await {
                Err(_) | Ok(None) => return Ok(()),
                Ok(Some(Ok(Message::Text(text)))) => {
                    let event: Value = serde_json::from_str(&text)?;
                    if event["event"] == name {
                        bail!("unexpected {name}: {event}");
                    }
                }
                Ok(Some(Ok(_))) => {}
                Ok(Some(Err(e))) => return Err(e.into()),
            }
        }
    }

    /// Close the connection from the client side
    pub async fn close(mut self) -> Result<()> {
        self.stream.close(None).await?;
        Ok(())
    }
}

/// Assert response status and parse JSON body
pub async fn assert_json<T: DeserializeOwned>(
    response: Response,
    expected_status: StatusCode,
) -> Result<T> {
    let status = response.status();
    if status != expected_status {
        let body = response.text().await?;
        bail!("Expected status {expected_status}, got {status}. Body: {body}");
    }
    Ok(response.json().await?)
}

/// Assert an error response and return its `error.code`
pub async fn assert_error(response: Response, expected_status: StatusCode) -> Result<String> {
    let body: Value = assert_json(response, expected_status).await?;
    body["error"]["code"]
        .as_str()
        .map(ToString::to_string)
        .with_context(|| format!("error body without code: {body}"))
}
