//! GraphQL over Server-Sent Events, distinct connections mode.
//!
//! The operation is POSTed as JSON; the server answers with `next` events
//! carrying results and a final `complete` event.

use std::time::Duration;

use async_trait::async_trait;
use futures_util::StreamExt;
use graphit_application::ports::{
    SubscriptionConnection, SubscriptionError, SubscriptionTransport, TransportEvent,
};
use graphit_domain::{ClientSettings, SubscriptionProtocol, SubscriptionRequest};
use reqwest::Client;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest_eventsource::{Event, EventSource, RequestBuilderExt};
use serde_json::Value;
use tracing::debug;

/// SSE transport backed by `reqwest-eventsource`.
#[derive(Debug, Clone)]
pub struct SseTransport {
    client: Client,
    open_timeout: Duration,
}

impl SseTransport {
    /// Creates a transport sharing `client`, with default settings.
    #[must_use]
    pub fn new(client: Client) -> Self {
        Self::with_settings(client, &ClientSettings::default())
    }

    /// Creates a transport sharing `client`, using the open timeout from `settings`.
    #[must_use]
    pub const fn with_settings(client: Client, settings: &ClientSettings) -> Self {
        Self {
            client,
            open_timeout: settings.sse_open_timeout(),
        }
    }

    /// Sets how long to wait for the stream to open.
    #[must_use]
    pub const fn with_open_timeout(mut self, timeout: Duration) -> Self {
        self.open_timeout = timeout;
        self
    }
}

fn open_error(error: reqwest_eventsource::Error) -> SubscriptionError {
    match error {
        reqwest_eventsource::Error::InvalidStatusCode(status, _) => {
            SubscriptionError::Connect(format!("HTTP {status}"))
        }
        reqwest_eventsource::Error::InvalidContentType(content_type, _) => SubscriptionError::Protocol(
            format!("Unexpected content type {content_type:?}"),
        ),
        other => SubscriptionError::Connect(other.to_string()),
    }
}

#[async_trait]
impl SubscriptionTransport for SseTransport {
    fn protocol(&self) -> SubscriptionProtocol {
        SubscriptionProtocol::Sse
    }

    async fn connect(
        &self,
        request: &SubscriptionRequest,
    ) -> Result<Box<dyn SubscriptionConnection>, SubscriptionError> {
        let mut builder = self
            .client
            .post(&request.url)
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "text/event-stream");
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let mut source = builder
            .body(request.payload().to_string())
            .eventsource()
            .map_err(|e| SubscriptionError::Connect(e.to_string()))?;

        let timeout_ms = u64::try_from(self.open_timeout.as_millis()).unwrap_or(u64::MAX);
        let opened = tokio::time::timeout(self.open_timeout, source.next())
            .await
            .map_err(|_| SubscriptionError::Timeout { timeout_ms });

        match opened {
            Ok(Some(Ok(Event::Open))) => {
                debug!(url = %request.url, "SSE stream open");
                Ok(Box::new(SseConnection { source }))
            }
            Ok(Some(Ok(Event::Message(_)))) => Err(SubscriptionError::Protocol(
                "Stream sent data before opening".to_string(),
            )),
            Ok(Some(Err(e))) => {
                source.close();
                Err(open_error(e))
            }
            Ok(None) => Err(SubscriptionError::Connect("Stream ended".to_string())),
            Err(e) => {
                source.close();
                Err(e)
            }
        }
    }
}

struct SseConnection {
    source: EventSource,
}

#[async_trait]
impl SubscriptionConnection for SseConnection {
    async fn next_event(&mut self) -> Option<TransportEvent> {
        loop {
            match self.source.next().await? {
                Ok(Event::Open) => {}
                Ok(Event::Message(message)) => match message.event.as_str() {
                    "complete" => return Some(TransportEvent::Complete),
                    "next" | "message" => {
                        return Some(match serde_json::from_str::<Value>(&message.data) {
                            Ok(payload) => TransportEvent::Data(payload),
                            Err(e) => TransportEvent::Error(format!("Invalid event payload: {e}")),
                        });
                    }
                    other => debug!(event = other, "Ignoring SSE event"),
                },
                Err(reqwest_eventsource::Error::StreamEnded) => return None,
                Err(e) => return Some(TransportEvent::Error(e.to_string())),
            }
        }
    }

    async fn close(&mut self) {
        self.source.close();
    }
}
