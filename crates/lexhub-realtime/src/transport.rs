//! WebSocket transport abstraction.
//!
//! The channel state machine talks to a [`ChannelTransport`] rather than a
//! concrete socket, so tests can script connection attempts and incoming
//! frames without a server.

use std::time::Duration;

use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::protocol::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tracing::{debug, warn};

use lexhub_core::error::{AppError, ErrorKind};
use lexhub_core::result::AppResult;

use crate::events::ChannelEvent;

/// Establishes WebSocket connections to the notification endpoint.
#[async_trait]
pub trait ChannelTransport: Send + Sync {
    /// Opens a connection authenticated with `token`.
    async fn connect(&self, token: &str) -> AppResult<Box<dyn ChannelConnection>>;
}

/// A live connection producing server-pushed events.
#[async_trait]
pub trait ChannelConnection: Send {
    /// Waits for the next event. `Ok(None)` means the server closed the
    /// connection normally; an `Authentication` error means it rejected or
    /// expired the token.
    async fn next_event(&mut self) -> AppResult<Option<ChannelEvent>>;

    /// Closes the connection.
    async fn close(&mut self);
}

/// [`ChannelTransport`] over `tokio-tungstenite`.
pub struct WsTransport {
    url: String,
    connect_timeout: Duration,
}

impl std::fmt::Debug for WsTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WsTransport").field("url", &self.url).finish()
    }
}

impl WsTransport {
    /// Creates a transport targeting `url` (a `ws://` or `wss://` endpoint).
    pub fn new(url: impl Into<String>, connect_timeout: Duration) -> Self {
        Self {
            url: url.into(),
            connect_timeout,
        }
    }
}

#[async_trait]
impl ChannelTransport for WsTransport {
    async fn connect(&self, token: &str) -> AppResult<Box<dyn ChannelConnection>> {
        let mut request = self
            .url
            .as_str()
            .into_client_request()
            .map_err(|e| AppError::with_source(ErrorKind::Channel, "Invalid WebSocket URL", e))?;
        let header = format!("Bearer {token}")
            .parse()
            .map_err(|_| AppError::channel("Token contains characters invalid in a header"))?;
        request.headers_mut().insert("Authorization", header);

        debug!(url = %self.url, "Opening notification channel");
        let connect = connect_async(request);
        let (stream, _response) = tokio::time::timeout(self.connect_timeout, connect)
            .await
            .map_err(|_| AppError::channel("WebSocket connect timed out"))?
            .map_err(|e| map_ws_error(e, "WebSocket connect failed"))?;

        Ok(Box::new(WsConnection { stream }))
    }
}

/// Live socket wrapper that decodes Text frames into [`ChannelEvent`]s.
struct WsConnection {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

#[async_trait]
impl ChannelConnection for WsConnection {
    async fn next_event(&mut self) -> AppResult<Option<ChannelEvent>> {
        loop {
            let message = match self.stream.next().await {
                Some(Ok(message)) => message,
                Some(Err(e)) => return Err(map_ws_error(e, "WebSocket read failed")),
                None => return Ok(None),
            };

            match message {
                Message::Text(text) => match serde_json::from_str::<ChannelEvent>(&text) {
                    Ok(event) => return Ok(Some(event)),
                    Err(e) => {
                        // Unknown event names are not fatal; skip the frame.
                        warn!(error = %e, "Dropping unrecognized channel frame");
                    }
                },
                Message::Ping(payload) => {
                    self.stream
                        .send(Message::Pong(payload))
                        .await
                        .map_err(|e| map_ws_error(e, "WebSocket pong failed"))?;
                }
                Message::Close(frame) => {
                    if let Some(frame) = frame {
                        let reason = frame.reason.to_string();
                        if is_auth_reason(&reason) {
                            return Err(AppError::authentication(reason));
                        }
                    }
                    return Ok(None);
                }
                Message::Pong(_) | Message::Binary(_) | Message::Frame(_) => continue,
            }
        }
    }

    async fn close(&mut self) {
        if let Err(e) = self.stream.close(None).await {
            debug!(error = %e, "WebSocket close failed");
        }
    }
}

fn map_ws_error(error: tokio_tungstenite::tungstenite::Error, context: &str) -> AppError {
    use tokio_tungstenite::tungstenite::Error as WsError;
    use tokio_tungstenite::tungstenite::http::StatusCode;

    match &error {
        WsError::Http(response) if response.status() == StatusCode::UNAUTHORIZED => {
            AppError::authentication("WebSocket handshake rejected: invalid token")
        }
        _ => AppError::with_source(ErrorKind::Channel, context, error),
    }
}

/// Matches the phrases the server uses when closing due to auth failure.
pub(crate) fn is_auth_reason(reason: &str) -> bool {
    let reason = reason.to_ascii_lowercase();
    reason.contains("expired")
        || reason.contains("invalid token")
        || reason.contains("authentication error")
}
