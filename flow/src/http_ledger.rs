//! HTTP client for the hosted booking backend.
//!
//! Serves both collaborator contracts: reservations through the backend's
//! RPC endpoints and slot lists through its REST endpoint.

use crate::catalog::{CatalogResult, SlotCatalogSource};
use crate::config::Config;
use crate::error::{CatalogError, ReservationError};
use crate::ledger::{CapacityLedger, ReservationFuture, ReservationResult};
use crate::types::{SessionId, Slot, SlotId, UserId};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

#[derive(Serialize)]
struct ReserveSlotRequest {
    slot_id: SlotId,
    user_id: UserId,
}

#[derive(Serialize)]
struct ReserveSessionRequest {
    session_id: SessionId,
    user_id: UserId,
}

#[derive(Debug, Deserialize)]
struct ReserveResponse {
    success: bool,
    #[serde(default)]
    failure_reason: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// Backend client
#[derive(Clone, Debug)]
pub struct HttpLedger {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl HttpLedger {
    /// Create a client for `base_url` with a per-request timeout
    ///
    /// # Errors
    ///
    /// Returns error if the TLS backend cannot be initialised.
    pub fn new(
        base_url: impl Into<String>,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
        })
    }

    /// Create a client from loaded configuration
    ///
    /// # Errors
    ///
    /// Same as [`HttpLedger::new`].
    pub fn from_config(config: &Config) -> Result<Self, reqwest::Error> {
        Self::new(
            config.ledger_url.clone(),
            config.ledger_api_key.clone(),
            config.ledger_timeout,
        )
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.api_key {
            Some(key) => request.bearer_auth(key),
            None => request,
        }
    }

    async fn call_reserve<B: Serialize + Sync>(&self, rpc: &str, body: &B) -> ReservationResult {
        let url = format!("{}/rpc/{rpc}", self.base_url);

        let response = self
            .authorize(self.client.post(&url))
            .json(body)
            .send()
            .await
            .map_err(|e| {
                tracing::warn!(rpc, error = %e, "Reservation request failed");
                ReservationError::unexpected(transport_message(&e))
            })?;

        let status = response.status().as_u16();
        let text = response.text().await.map_err(|e| {
            tracing::warn!(rpc, error = %e, "Failed to read reservation response");
            ReservationError::unexpected(transport_message(&e))
        })?;

        interpret_reserve_response(status, &text)
    }
}

fn transport_message(error: &reqwest::Error) -> String {
    if error.is_timeout() {
        "The booking service did not respond in time".to_string()
    } else {
        format!("Could not reach the booking service: {error}")
    }
}

/// Map a reserve RPC response to a reservation result
///
/// Non-2xx statuses and unreadable bodies are `Unexpected`. A failure with a
/// missing or unrecognised reason is `Unexpected` too.
pub(crate) fn interpret_reserve_response(status: u16, body: &str) -> ReservationResult {
    if !(200..300).contains(&status) {
        return Err(ReservationError::unexpected(format!(
            "Booking service returned status {status}"
        )));
    }

    let response: ReserveResponse = serde_json::from_str(body).map_err(|e| {
        tracing::warn!(error = %e, "Unreadable reservation response");
        ReservationError::unexpected("Unreadable response from the booking service")
    })?;

    if response.success {
        return Ok(());
    }

    match response.failure_reason.as_deref() {
        Some("CapacityExceeded") => Err(response
            .message
            .map_or_else(ReservationError::capacity_exceeded, |message| {
                ReservationError::CapacityExceeded { message }
            })),
        _ => Err(ReservationError::unexpected(
            response
                .message
                .unwrap_or_else(|| "Reservation failed".to_string()),
        )),
    }
}

impl CapacityLedger for HttpLedger {
    fn reserve_slot(&self, slot_id: SlotId, user_id: UserId) -> ReservationFuture<'_> {
        Box::pin(async move {
            self.call_reserve("reserve_slot", &ReserveSlotRequest { slot_id, user_id })
                .await
        })
    }

    fn reserve_session(&self, session_id: SessionId, user_id: UserId) -> ReservationFuture<'_> {
        Box::pin(async move {
            self.call_reserve(
                "reserve_session",
                &ReserveSessionRequest {
                    session_id,
                    user_id,
                },
            )
            .await
        })
    }
}

impl SlotCatalogSource for HttpLedger {
    fn load_slots(
        &self,
        session_id: SessionId,
    ) -> Pin<Box<dyn Future<Output = CatalogResult<Vec<Slot>>> + Send + '_>> {
        Box::pin(async move {
            let url = format!("{}/sessions/{session_id}/slots", self.base_url);
            let response = self.authorize(self.client.get(&url)).send().await?;

            if !response.status().is_success() {
                return Err(CatalogError::Status {
                    status: response.status().as_u16(),
                });
            }

            Ok(response.json::<Vec<Slot>>().await?)
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::FailureKind;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};
    use tokio::task::JoinHandle;

    fn http_response(status_line: &str, body: &str) -> String {
        format!(
            "HTTP/1.1 {status_line}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
            body.len()
        )
    }

    async fn read_request(socket: &mut TcpStream) -> String {
        let mut buf = Vec::new();
        let mut chunk = [0_u8; 1024];
        loop {
            let n = socket.read(&mut chunk).await.unwrap();
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);
            let text = String::from_utf8_lossy(&buf);
            if let Some(end) = text.find("\r\n\r\n") {
                let length = text[..end]
                    .lines()
                    .find_map(|line| {
                        let (name, value) = line.split_once(':')?;
                        if name.eq_ignore_ascii_case("content-length") {
                            value.trim().parse::<usize>().ok()
                        } else {
                            None
                        }
                    })
                    .unwrap_or(0);
                if buf.len() >= end + 4 + length {
                    break;
                }
            }
        }
        String::from_utf8_lossy(&buf).into_owned()
    }

    /// Serve one canned response and hand back the raw request
    async fn respond_once(response: String) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());
        let server = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let request = read_request(&mut socket).await;
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();
            request
        });
        (base_url, server)
    }

    #[tokio::test]
    async fn test_silent_backend_times_out_as_unexpected() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());
        let _server = tokio::spawn(async move {
            let (socket, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(5)).await;
            drop(socket);
        });

        let ledger = HttpLedger::new(base_url, None, Duration::from_millis(50)).unwrap();
        let err = ledger.reserve_slot(SlotId::new(), UserId::new()).await.unwrap_err();

        assert_eq!(err.kind(), FailureKind::Unexpected);
        assert_eq!(err.message(), "The booking service did not respond in time");
    }

    #[tokio::test]
    async fn test_catalog_error_status() {
        let (base_url, server) =
            respond_once(http_response("503 Service Unavailable", "")).await;
        let ledger = HttpLedger::new(base_url, None, Duration::from_secs(5)).unwrap();

        let err = ledger.load_slots(SessionId::new()).await.unwrap_err();

        assert!(matches!(err, CatalogError::Status { status: 503 }));
        let request = server.await.unwrap();
        assert!(request.starts_with("GET /sessions/"));
    }

    #[tokio::test]
    async fn test_reserve_slot_posts_rpc_with_bearer_key() {
        let (base_url, server) = respond_once(http_response(
            "200 OK",
            r#"{"success": false, "failure_reason": "CapacityExceeded"}"#,
        ))
        .await;
        let ledger =
            HttpLedger::new(base_url, Some("secret".to_string()), Duration::from_secs(5)).unwrap();
        let slot_id = SlotId::new();

        let err = ledger.reserve_slot(slot_id, UserId::new()).await.unwrap_err();

        assert_eq!(err, ReservationError::capacity_exceeded());
        let request = server.await.unwrap();
        assert!(request.starts_with("POST /rpc/reserve_slot "));
        assert!(request.to_ascii_lowercase().contains("authorization: bearer secret"));
        assert!(request.contains(&slot_id.to_string()));
    }

    #[test]
    fn test_success_response() {
        assert_eq!(interpret_reserve_response(200, r#"{"success": true}"#), Ok(()));
    }

    #[test]
    fn test_capacity_exceeded_keeps_backend_message() {
        let body = r#"{"success": false, "failure_reason": "CapacityExceeded", "message": "Slot 2 is full"}"#;
        let err = interpret_reserve_response(200, body).unwrap_err();
        assert_eq!(err.kind(), FailureKind::CapacityExceeded);
        assert_eq!(err.message(), "Slot 2 is full");
    }

    #[test]
    fn test_capacity_exceeded_without_message_uses_default() {
        let body = r#"{"success": false, "failure_reason": "CapacityExceeded"}"#;
        let err = interpret_reserve_response(200, body).unwrap_err();
        assert_eq!(err, ReservationError::capacity_exceeded());
    }

    #[test]
    fn test_unknown_or_missing_reason_is_unexpected() {
        let unknown = r#"{"success": false, "failure_reason": "Banned", "message": "nope"}"#;
        let err = interpret_reserve_response(200, unknown).unwrap_err();
        assert_eq!(err, ReservationError::unexpected("nope"));

        let missing = r#"{"success": false}"#;
        let err = interpret_reserve_response(200, missing).unwrap_err();
        assert_eq!(err.kind(), FailureKind::Unexpected);
    }

    #[test]
    fn test_error_status_is_unexpected() {
        let err = interpret_reserve_response(503, "Service Unavailable").unwrap_err();
        assert_eq!(err.kind(), FailureKind::Unexpected);
        assert!(err.message().contains("503"));
    }

    #[test]
    fn test_garbage_body_is_unexpected() {
        let err = interpret_reserve_response(200, "<html>").unwrap_err();
        assert_eq!(err.kind(), FailureKind::Unexpected);
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let ledger =
            HttpLedger::new("http://localhost:54321/", None, Duration::from_secs(1)).unwrap();
        assert_eq!(ledger.base_url, "http://localhost:54321");
    }
}
