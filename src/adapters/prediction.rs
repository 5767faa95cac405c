//! HTTP transport for the prediction service.
//!
//! Implements [`PredictionPort`] by POSTing the JSON request to
//! `{endpoint}/api/predictions/predict` and decoding the JSON answer.
//!
//! ## cfg gating
//!
//! - **`target_os = "espidf"`**: `esp_idf_svc::http::client::EspHttpConnection`.
//! - **all other targets**: `reqwest` blocking client, for bench runs
//!   against a backend on the development machine.

use core::time::Duration;
use std::time::Instant;

use log::debug;

use crate::app::ports::{PredictionError, PredictionPort};
use crate::risk::remote::{PREDICT_PATH, PredictionRequest, PredictionResponse};

/// Upper bound on a response body; anything larger is treated as malformed.
pub const MAX_RESPONSE_BYTES: usize = 4096;

/// Join the configured endpoint and the prediction route.
pub fn predict_url(endpoint: &str) -> String {
    let mut url = String::with_capacity(endpoint.len() + PREDICT_PATH.len());
    url.push_str(endpoint.trim_end_matches('/'));
    url.push_str(PREDICT_PATH);
    url
}

/// Map an HTTP status and body onto the port result.
pub fn decode_reply(status: u16, body: &[u8]) -> Result<PredictionResponse, PredictionError> {
    if !(200..300).contains(&status) {
        return Err(PredictionError::Status(status));
    }
    if body.len() > MAX_RESPONSE_BYTES {
        return Err(PredictionError::Malformed);
    }
    PredictionResponse::from_json(body)
}

/// Wall-clock bound on a whole exchange.  The connection's own timeout
/// applies per socket operation and restarts on every read.
#[derive(Debug, Clone, Copy)]
pub struct Deadline {
    at: Instant,
}

impl Deadline {
    pub fn after(timeout: Duration) -> Self {
        let now = Instant::now();
        Self {
            at: now.checked_add(timeout).unwrap_or(now),
        }
    }

    /// `Err(Timeout)` once the deadline has passed.
    pub fn check(&self) -> Result<(), PredictionError> {
        if Instant::now() >= self.at {
            Err(PredictionError::Timeout)
        } else {
            Ok(())
        }
    }
}

pub struct HttpPredictionClient {
    url: String,
    #[cfg(not(target_os = "espidf"))]
    http: reqwest::blocking::Client,
}

impl HttpPredictionClient {
    #[cfg(target_os = "espidf")]
    pub fn new(endpoint: &str) -> Result<Self, PredictionError> {
        Ok(Self {
            url: predict_url(endpoint),
        })
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn new(endpoint: &str) -> Result<Self, PredictionError> {
        let http = reqwest::blocking::Client::builder()
            .build()
            .map_err(|_| PredictionError::Connect)?;
        Ok(Self {
            url: predict_url(endpoint),
            http,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    // ── Platform-specific ─────────────────────────────────────

    #[cfg(target_os = "espidf")]
    fn exchange(&mut self, body: &[u8], timeout: Duration) -> Result<(u16, Vec<u8>), PredictionError> {
        use esp_idf_svc::http::Method;
        use esp_idf_svc::http::client::{Configuration, EspHttpConnection};

        let deadline = Deadline::after(timeout);
        let mut conn = EspHttpConnection::new(&Configuration {
            timeout: Some(timeout),
            ..Default::default()
        })
        .map_err(|_| PredictionError::Connect)?;

        let len = body.len().to_string();
        let headers = [
            ("Content-Type", "application/json"),
            ("Content-Length", len.as_str()),
        ];
        conn.initiate_request(Method::Post, &self.url, &headers)
            .map_err(|_| PredictionError::Connect)?;

        let mut written = 0;
        while written < body.len() {
            deadline.check()?;
            written += conn
                .write(&body[written..])
                .map_err(|_| PredictionError::Connect)?;
        }
        deadline.check()?;
        conn.initiate_response().map_err(|_| PredictionError::Timeout)?;
        let status = conn.status();

        let mut out = Vec::new();
        let mut buf = [0u8; 512];
        loop {
            deadline.check()?;
            let n = conn.read(&mut buf).map_err(|_| PredictionError::Timeout)?;
            if n == 0 {
                break;
            }
            out.extend_from_slice(&buf[..n]);
            if out.len() > MAX_RESPONSE_BYTES {
                return Err(PredictionError::Malformed);
            }
        }
        Ok((status, out))
    }

    #[cfg(not(target_os = "espidf"))]
    fn exchange(&mut self, body: &[u8], timeout: Duration) -> Result<(u16, Vec<u8>), PredictionError> {
        let deadline = Deadline::after(timeout);
        let resp = self
            .http
            .post(&self.url)
            .timeout(timeout)
            .header("Content-Type", "application/json")
            .body(body.to_vec())
            .send()
            .map_err(|e| classify(&e))?;
        let status = resp.status().as_u16();
        let bytes = resp.bytes().map_err(|e| classify(&e))?;
        deadline.check()?;
        Ok((status, bytes.to_vec()))
    }
}

#[cfg(not(target_os = "espidf"))]
fn classify(e: &reqwest::Error) -> PredictionError {
    if e.is_timeout() {
        PredictionError::Timeout
    } else if e.is_decode() || e.is_body() {
        PredictionError::Malformed
    } else {
        PredictionError::Connect
    }
}

impl PredictionPort for HttpPredictionClient {
    fn predict(
        &mut self,
        request: &PredictionRequest<'_>,
        timeout: Duration,
    ) -> Result<PredictionResponse, PredictionError> {
        let body = serde_json::to_vec(request).map_err(|_| PredictionError::Encode)?;
        debug!("prediction: POST {} ({} bytes)", self.url, body.len());
        let (status, reply) = self.exchange(&body, timeout)?;
        decode_reply(status, &reply)
    }
}
