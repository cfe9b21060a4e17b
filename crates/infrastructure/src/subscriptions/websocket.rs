//! GraphQL over WebSocket using the `graphql-transport-ws` protocol.
//!
//! Flow: `connection_init` (headers as payload) → `connection_ack` →
//! `subscribe` → `next`* → `complete`. Pings are answered and, when a
//! keep-alive interval is configured, sent periodically.

use std::time::Duration;

use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use graphit_application::ports::{
    SubscriptionConnection, SubscriptionError, SubscriptionTransport, TransportEvent,
};
use graphit_domain::{ClientSettings, SubscriptionProtocol, SubscriptionRequest};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::net::TcpStream;
use tokio::time::{Instant, Interval, MissedTickBehavior};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use tracing::{debug, warn};

/// WebSocket subprotocol name.
pub const GRAPHQL_TRANSPORT_WS: &str = "graphql-transport-ws";

/// Every connection carries exactly one operation.
const OPERATION_ID: &str = "1";

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Messages of the `graphql-transport-ws` protocol.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum WsMessage {
    ConnectionInit {
        #[serde(skip_serializing_if = "Option::is_none")]
        payload: Option<Value>,
    },
    ConnectionAck {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        payload: Option<Value>,
    },
    Ping {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        payload: Option<Value>,
    },
    Pong {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        payload: Option<Value>,
    },
    Subscribe {
        id: String,
        payload: Value,
    },
    Next {
        id: String,
        payload: Value,
    },
    Error {
        id: String,
        payload: Value,
    },
    Complete {
        id: String,
    },
}

impl WsMessage {
    fn to_frame(&self) -> Result<Message, SubscriptionError> {
        serde_json::to_string(self)
            .map(|json| Message::Text(json.into()))
            .map_err(|e| SubscriptionError::Protocol(e.to_string()))
    }
}

/// Converts an `http(s)://` endpoint to `ws(s)://`.
///
/// `ws(s)://` URLs pass through unchanged.
///
/// # Errors
///
/// Returns [`SubscriptionError::InvalidEndpoint`] for any other scheme.
pub fn http_to_ws_url(url: &str) -> Result<String, SubscriptionError> {
    if let Some(rest) = url.strip_prefix("https://") {
        Ok(format!("wss://{rest}"))
    } else if let Some(rest) = url.strip_prefix("http://") {
        Ok(format!("ws://{rest}"))
    } else if url.starts_with("ws://") || url.starts_with("wss://") {
        Ok(url.to_string())
    } else {
        Err(SubscriptionError::InvalidEndpoint)
    }
}

/// Collects the messages of a `graphql-transport-ws` error payload.
fn error_message(payload: &Value) -> String {
    let messages: Vec<&str> = match payload {
        Value::Array(errors) => errors
            .iter()
            .filter_map(|e| e.get("message").and_then(Value::as_str))
            .collect(),
        Value::Object(_) => payload
            .get("message")
            .and_then(Value::as_str)
            .into_iter()
            .collect(),
        _ => Vec::new(),
    };

    if messages.is_empty() {
        "Unknown error".to_string()
    } else {
        messages.join("; ")
    }
}

/// WebSocket transport.
#[derive(Debug, Clone)]
pub struct WsTransport {
    connect_timeout: Duration,
    keep_alive: Option<Duration>,
}

impl Default for WsTransport {
    fn default() -> Self {
        Self::with_settings(&ClientSettings::default())
    }
}

impl WsTransport {
    /// Creates a transport using the WebSocket timeouts from `settings`.
    #[must_use]
    pub fn with_settings(settings: &ClientSettings) -> Self {
        Self {
            connect_timeout: settings.ws_connect_timeout(),
            keep_alive: settings.ws_keep_alive(),
        }
    }

    /// Sets the handshake deadline.
    #[must_use]
    pub const fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Sets the ping interval; `None` disables client pings.
    #[must_use]
    pub const fn with_keep_alive(mut self, interval: Option<Duration>) -> Self {
        self.keep_alive = interval;
        self
    }

    fn timeout_ms(&self) -> u64 {
        u64::try_from(self.connect_timeout.as_millis()).unwrap_or(u64::MAX)
    }

    async fn handshake(&self, request: &SubscriptionRequest) -> Result<WsStream, SubscriptionError> {
        let url = http_to_ws_url(&request.url)?;
        let mut client_request = url
            .as_str()
            .into_client_request()
            .map_err(|_| SubscriptionError::InvalidEndpoint)?;
        client_request.headers_mut().insert(
            "Sec-WebSocket-Protocol",
            HeaderValue::from_static(GRAPHQL_TRANSPORT_WS),
        );

        let (mut stream, _) = tokio_tungstenite::connect_async(client_request)
            .await
            .map_err(|e| SubscriptionError::Connect(e.to_string()))?;

        let init = WsMessage::ConnectionInit {
            payload: Some(Value::Object(request.headers_object())),
        };
        send(&mut stream, &init).await?;

        // Wait for the ack, answering pings meanwhile
        loop {
            let Some(frame) = stream.next().await else {
                return Err(SubscriptionError::Connect(
                    "Connection closed before acknowledgement".to_string(),
                ));
            };
            match frame.map_err(|e| SubscriptionError::Connect(e.to_string()))? {
                Message::Text(text) => match serde_json::from_str::<WsMessage>(text.as_str()) {
                    Ok(WsMessage::ConnectionAck { .. }) => break,
                    Ok(WsMessage::Ping { .. }) => {
                        send(&mut stream, &WsMessage::Pong { payload: None }).await?;
                    }
                    Ok(other) => {
                        return Err(SubscriptionError::Protocol(format!(
                            "Unexpected message before acknowledgement: {other:?}"
                        )));
                    }
                    Err(e) => return Err(SubscriptionError::Protocol(e.to_string())),
                },
                Message::Close(frame) => {
                    let reason = frame.map_or_else(
                        || "Connection closed".to_string(),
                        |f| format!("Connection closed ({}): {}", u16::from(f.code), f.reason.as_str()),
                    );
                    return Err(SubscriptionError::Connect(reason));
                }
                _ => {}
            }
        }

        let subscribe = WsMessage::Subscribe {
            id: OPERATION_ID.to_string(),
            payload: request.payload(),
        };
        send(&mut stream, &subscribe).await?;
        Ok(stream)
    }
}

async fn send(stream: &mut WsStream, message: &WsMessage) -> Result<(), SubscriptionError> {
    stream
        .send(message.to_frame()?)
        .await
        .map_err(|e| SubscriptionError::Connect(e.to_string()))
}

#[async_trait]
impl SubscriptionTransport for WsTransport {
    fn protocol(&self) -> SubscriptionProtocol {
        SubscriptionProtocol::Ws
    }

    async fn connect(
        &self,
        request: &SubscriptionRequest,
    ) -> Result<Box<dyn SubscriptionConnection>, SubscriptionError> {
        let stream = tokio::time::timeout(self.connect_timeout, self.handshake(request))
            .await
            .map_err(|_| SubscriptionError::Timeout {
                timeout_ms: self.timeout_ms(),
            })??;

        debug!(url = %request.url, "WebSocket subscription acknowledged");

        let keep_alive = self.keep_alive.map(|period| {
            let mut interval = tokio::time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            interval
        });

        Ok(Box::new(WsConnection {
            stream,
            keep_alive,
            closed: false,
        }))
    }
}

enum Step {
    Frame(Option<Result<Message, tokio_tungstenite::tungstenite::Error>>),
    Ping,
}

struct WsConnection {
    stream: WsStream,
    keep_alive: Option<Interval>,
    closed: bool,
}

impl WsConnection {
    async fn tick(keep_alive: &mut Option<Interval>) {
        match keep_alive {
            Some(interval) => {
                interval.tick().await;
            }
            None => std::future::pending().await,
        }
    }

    /// Maps one protocol message; `None` means keep reading.
    async fn handle(&mut self, message: WsMessage) -> Option<TransportEvent> {
        match message {
            WsMessage::Next { id, payload } if id == OPERATION_ID => Some(TransportEvent::Data(payload)),
            WsMessage::Error { id, payload } if id == OPERATION_ID => {
                Some(TransportEvent::Error(error_message(&payload)))
            }
            WsMessage::Complete { id } if id == OPERATION_ID => Some(TransportEvent::Complete),
            WsMessage::Ping { .. } => {
                if let Err(e) = send(&mut self.stream, &WsMessage::Pong { payload: None }).await {
                    return Some(TransportEvent::Error(e.to_string()));
                }
                None
            }
            other => {
                debug!(message = ?other, "Ignoring WebSocket message");
                None
            }
        }
    }
}

#[async_trait]
impl SubscriptionConnection for WsConnection {
    async fn next_event(&mut self) -> Option<TransportEvent> {
        if self.closed {
            return None;
        }

        loop {
            let step = tokio::select! {
                frame = self.stream.next() => Step::Frame(frame),
                () = Self::tick(&mut self.keep_alive) => Step::Ping,
            };

            let frame = match step {
                Step::Frame(frame) => frame,
                Step::Ping => {
                    if let Err(e) = send(&mut self.stream, &WsMessage::Ping { payload: None }).await {
                        return Some(TransportEvent::Error(e.to_string()));
                    }
                    continue;
                }
            };

            match frame? {
                Ok(Message::Text(text)) => match serde_json::from_str::<WsMessage>(text.as_str()) {
                    Ok(message) => {
                        if let Some(event) = self.handle(message).await {
                            return Some(event);
                        }
                    }
                    Err(e) => warn!(error = %e, "Unreadable WebSocket message"),
                },
                Ok(Message::Close(frame)) => {
                    self.closed = true;
                    return match frame {
                        Some(f) if u16::from(f.code) != 1000 => Some(TransportEvent::Error(format!(
                            "Connection closed ({}): {}",
                            u16::from(f.code),
                            f.reason.as_str()
                        ))),
                        _ => None,
                    };
                }
                Ok(_) => {}
                Err(e) => return Some(TransportEvent::Error(e.to_string())),
            }
        }
    }

    async fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;

        let complete = WsMessage::Complete {
            id: OPERATION_ID.to_string(),
        };
        if let Ok(frame) = complete.to_frame() {
            let _ = self.stream.send(frame).await;
        }
        if let Err(e) = self.stream.close(None).await {
            debug!(error = %e, "WebSocket close failed");
        }
    }
}
