use crate::availability::traits::AvailabilitySource;
use crate::availability::types::{DayQuery, SearchParameters, SessionCredential};
use crate::error::DateError;
use crate::models::RawAvailabilityResponse;
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::header::{CONTENT_TYPE, COOKIE};
use reqwest::{Client, StatusCode};
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, warn};

pub const API_URL: &str =
    "https://www.mandarinoriental.com/api/v1/booking/check-room-availability";

pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                              (KHTML, like Gecko) Chrome/142.0.0.0 Safari/537.36";

const JSON_CONTENT_TYPE: &str = "application/json;charset=UTF-8";

#[derive(Debug, Clone)]
pub struct ClientSettings {
    pub endpoint: String,
    /// `None` leaves the transport default in place
    pub request_timeout: Option<Duration>,
    /// Honour `HTTP_PROXY`/`HTTPS_PROXY` from the environment
    pub system_proxy: bool,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            endpoint: API_URL.to_string(),
            request_timeout: None,
            system_proxy: true,
        }
    }
}

/// JSON body of a `check-room-availability` call. The room, bed and rate filters are
/// always sent as `null`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AvailabilityRequest<'a> {
    hotel_code: String,
    room_codes: Option<Vec<String>>,
    room_name: Option<String>,
    bed_type: Option<String>,
    rate_code: Option<String>,
    adult_guest_count: String,
    child_guest_count: String,
    stay_date_start: NaiveDate,
    stay_date_end: NaiveDate,
    primary_language_id: &'a str,
}

impl<'a> AvailabilityRequest<'a> {
    fn new(query: &DayQuery, params: &'a SearchParameters) -> Self {
        Self {
            hotel_code: params.hotel_id.to_string(),
            room_codes: None,
            room_name: None,
            bed_type: None,
            rate_code: None,
            adult_guest_count: params.guests.adults.to_string(),
            child_guest_count: params.guests.children.to_string(),
            stay_date_start: query.stay_start,
            stay_date_end: query.stay_end,
            primary_language_id: &params.language,
        }
    }
}

/// Booking API client. Holds no per-run state; the session cookie is passed on each call.
pub struct AvailabilityClient {
    client: Client,
    endpoint: String,
}

impl AvailabilityClient {
    /// Create a client for the production booking API
    pub fn new() -> Result<Self> {
        Self::with_settings(ClientSettings::default())
    }

    pub fn with_settings(settings: ClientSettings) -> Result<Self> {
        let mut builder = Client::builder().user_agent(USER_AGENT);
        if let Some(timeout) = settings.request_timeout {
            builder = builder.timeout(timeout);
        }
        if !settings.system_proxy {
            builder = builder.no_proxy();
        }
        let client = builder.build().context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            endpoint: settings.endpoint,
        })
    }
}

#[async_trait]
impl AvailabilitySource for AvailabilityClient {
    async fn fetch_day(
        &self,
        query: &DayQuery,
        credential: &SessionCredential,
        params: &SearchParameters,
    ) -> Result<RawAvailabilityResponse, DateError> {
        let date = query.stay_start;
        let transport = |reason: String| DateError::TransportFailure { date, reason };

        let payload = serde_json::to_vec(&AvailabilityRequest::new(query, params))
            .map_err(|e| transport(format!("Failed to encode request: {}", e)))?;

        debug!("POST {} for {}", self.endpoint, date);

        let response = self
            .client
            .post(&self.endpoint)
            .header(CONTENT_TYPE, JSON_CONTENT_TYPE)
            .header(COOKIE, credential.as_str())
            .body(payload)
            .send()
            .await
            .map_err(|e| transport(e.to_string()))?;

        let status = response.status();
        if status != StatusCode::OK {
            warn!("Availability API returned status {} for {}", status, date);
            return Err(DateError::RequestFailure {
                status_code: status.as_u16(),
                date,
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| transport(format!("Failed to read response body: {}", e)))?;

        debug!("Received {} bytes for {}", body.len(), date);

        RawAvailabilityResponse::from_slice(&body)
            .map_err(|e| transport(format!("Malformed response body: {}", e)))
    }

    fn source_name(&self) -> &'static str {
        "Mandarin Oriental booking API"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    fn query() -> DayQuery {
        DayQuery::for_date(NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()).unwrap()
    }

    fn client_for(endpoint: String) -> AvailabilityClient {
        AvailabilityClient::with_settings(ClientSettings {
            endpoint,
            request_timeout: Some(Duration::from_secs(5)),
            system_proxy: false,
        })
        .unwrap()
    }

    /// Answer exactly one HTTP request with the given status line and body,
    /// handing back the raw request text.
    async fn respond_once(status: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let endpoint = format!("http://{}/api/v1/booking/check-room-availability", listener.local_addr().unwrap());

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut chunk = [0u8; 4096];

            loop {
                let n = socket.read(&mut chunk).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&chunk[..n]);

                let text = String::from_utf8_lossy(&request).to_string();
                if let Some(header_end) = text.find("\r\n\r\n") {
                    let content_length = text[..header_end]
                        .lines()
                        .filter_map(|line| line.split_once(':'))
                        .find(|(name, _)| name.eq_ignore_ascii_case("content-length"))
                        .and_then(|(_, value)| value.trim().parse::<usize>().ok())
                        .unwrap_or(0);
                    if request.len() >= header_end + 4 + content_length {
                        break;
                    }
                }
            }

            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            let _ = socket.shutdown().await;

            String::from_utf8(request).unwrap()
        });

        (endpoint, handle)
    }

    #[tokio::test]
    async fn test_request_shape() {
        let (endpoint, server) = respond_once("200 OK", r#"{"roomStays": []}"#).await;
        let client = client_for(endpoint);

        let response = client
            .fetch_day(&query(), &SessionCredential::new("session=abc; pref=1"), &SearchParameters::default())
            .await
            .unwrap();
        assert_eq!(response.room_stays, Some(vec![]));

        let request = server.await.unwrap();
        let (head, body) = request.split_once("\r\n\r\n").unwrap();
        let head = head.to_ascii_lowercase();

        assert!(head.starts_with("post /api/v1/booking/check-room-availability"));
        assert!(head.contains("content-type: application/json;charset=utf-8"));
        assert!(head.contains("cookie: session=abc; pref=1"));
        assert!(head.contains("user-agent: mozilla/5.0 (windows nt 10.0; win64; x64)"));

        let body: serde_json::Value = serde_json::from_str(body).unwrap();
        assert_eq!(
            body,
            json!({
                "hotelCode": "514",
                "roomCodes": null,
                "roomName": null,
                "bedType": null,
                "rateCode": null,
                "adultGuestCount": "2",
                "childGuestCount": "0",
                "stayDateStart": "2025-01-01",
                "stayDateEnd": "2025-01-02",
                "primaryLanguageId": "en"
            })
        );
    }

    #[tokio::test]
    async fn test_missing_room_stays_is_success() {
        let (endpoint, server) = respond_once("200 OK", r#"{"status": "NoAvailability"}"#).await;

        let response = client_for(endpoint)
            .fetch_day(&query(), &SessionCredential::new("c"), &SearchParameters::default())
            .await
            .unwrap();
        assert_eq!(response.room_stays, None);
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_forbidden_is_request_failure() {
        let (endpoint, server) = respond_once("403 Forbidden", r#"{"error": "session expired"}"#).await;

        let err = client_for(endpoint)
            .fetch_day(&query(), &SessionCredential::new("c"), &SearchParameters::default())
            .await
            .unwrap_err();
        assert_eq!(
            err,
            DateError::RequestFailure {
                status_code: 403,
                date: query().stay_start
            }
        );
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_only_200_counts_as_success() {
        let (endpoint, server) = respond_once("202 Accepted", r#"{"roomStays": []}"#).await;

        let err = client_for(endpoint)
            .fetch_day(&query(), &SessionCredential::new("c"), &SearchParameters::default())
            .await
            .unwrap_err();
        assert!(matches!(err, DateError::RequestFailure { status_code: 202, .. }));
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_malformed_body_is_transport_failure() {
        let (endpoint, server) = respond_once("200 OK", "<html>maintenance</html>").await;

        let err = client_for(endpoint)
            .fetch_day(&query(), &SessionCredential::new("c"), &SearchParameters::default())
            .await
            .unwrap_err();
        assert!(matches!(err, DateError::TransportFailure { .. }));
        assert_eq!(err.date(), query().stay_start);
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_connection_refused_is_transport_failure() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = client_for(format!("http://{}/", addr))
            .fetch_day(&query(), &SessionCredential::new("c"), &SearchParameters::default())
            .await
            .unwrap_err();
        assert!(matches!(err, DateError::TransportFailure { .. }));
    }
}
