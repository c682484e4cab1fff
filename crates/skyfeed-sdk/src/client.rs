//! Client for the feed server's stream and health endpoints.

use anyhow::Result;
use futures_util::StreamExt;
use reqwest::Url;
use serde::Deserialize;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

use skyfeed_core::StreamMessage;

/// Body of `GET /health`.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct HealthStatus {
    pub status: String,
    pub mode: String,
    #[serde(default)]
    pub synthetic: bool,
    pub viewers: usize,
    pub frames: usize,
}

/// WebSocket stream of snapshot, routes and ping messages.
pub struct StreamClient {
    socket: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

impl StreamClient {
    /// Connect to `base` (http, https, ws or wss) at the stream path.
    pub async fn connect(base: &str) -> Result<Self> {
        let url = stream_url(base)?;
        tracing::debug!("Connecting to {}", url);
        let (socket, _) = connect_async(url.as_str()).await?;
        Ok(Self { socket })
    }

    /// Read the next message from the stream (returns None on close).
    pub async fn next_message(&mut self) -> Result<Option<StreamMessage>> {
        while let Some(msg) = self.socket.next().await {
            match msg? {
                Message::Text(text) => return Ok(Some(StreamMessage::from_json(&text)?)),
                Message::Binary(data) => {
                    if let Ok(text) = String::from_utf8(data) {
                        if let Ok(message) = StreamMessage::from_json(&text) {
                            return Ok(Some(message));
                        }
                    }
                }
                Message::Close(_) => return Ok(None),
                _ => {}
            }
        }
        Ok(None)
    }

    /// Skip pings until a snapshot or routes message arrives.
    pub async fn next_payload(&mut self) -> Result<Option<StreamMessage>> {
        loop {
            match self.next_message().await? {
                Some(StreamMessage::Ping) => continue,
                other => return Ok(other),
            }
        }
    }

    pub async fn close(mut self) -> Result<()> {
        self.socket.close(None).await?;
        // Drain until the server acknowledges.
        while let Some(msg) = self.socket.next().await {
            if msg.is_err() {
                break;
            }
        }
        Ok(())
    }
}

/// Fetch the server's health report.
pub async fn fetch_health(base: &str) -> Result<HealthStatus> {
    let mut url = Url::parse(base)?;
    let scheme = match url.scheme() {
        "ws" => "http",
        "wss" => "https",
        other => other,
    }
    .to_string();
    url.set_scheme(&scheme)
        .map_err(|_| anyhow::anyhow!("Invalid base URL scheme"))?;
    url.set_path("/health");

    let response = reqwest::get(url).await?;
    if !response.status().is_success() {
        anyhow::bail!("Health check failed: {}", response.status());
    }
    Ok(response.json().await?)
}

/// Stream endpoint for a server base URL.
pub fn stream_url(base: &str) -> Result<Url> {
    let mut url = Url::parse(base)?;
    let scheme = match url.scheme() {
        "http" => "ws",
        "https" => "wss",
        other => other,
    }
    .to_string();

    url.set_scheme(&scheme)
        .map_err(|_| anyhow::anyhow!("Invalid base URL scheme"))?;
    if url.path() == "/" {
        url.set_path("/v1/stream");
    }
    Ok(url)
}
