//! reqwest-backed implementation of [`PassesApi`].

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

use super::{PassesApi, PassesPayload, WriteResponse};
use crate::config::GreenieConfig;
use crate::error::{Error, Errors, Result};
use crate::models::date_range::DateRange;
use crate::models::wire::PassWire;

/// Rails-style parameter wrapping: `{"pass": {...}}`.
#[derive(Serialize)]
struct PassBody<'a> {
    pass: &'a PassWire,
}

#[derive(Deserialize)]
struct ErrorsBody {
    errors: Errors,
}

/// HTTP client for the Greenie backend.
pub struct HttpPassesApi {
    client: reqwest::Client,
    base_url: String,
}

impl HttpPassesApi {
    /// Client with the default request timeout.
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        Self::with_timeout(base_url, Duration::from_secs(30))
    }

    pub fn from_config(config: &GreenieConfig) -> Result<Self> {
        Self::with_timeout(
            config.api.base_url.clone(),
            Duration::from_secs(config.api.timeout_secs),
        )
    }

    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Config(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }

    /// Map a write response: 422 carries field errors, other non-2xx are
    /// hard failures, 2xx carries the saved record.
    async fn write_response(response: reqwest::Response) -> Result<WriteResponse> {
        let status = response.status();
        if status == StatusCode::UNPROCESSABLE_ENTITY {
            let body: ErrorsBody = response
                .json()
                .await
                .map_err(|e| Error::Decode(format!("invalid validation errors body: {}", e)))?;
            return Ok(WriteResponse::Invalid(body.errors));
        }
        if !status.is_success() {
            return Err(Error::Http {
                status: status.as_u16(),
            });
        }
        let pass: PassWire = response
            .json()
            .await
            .map_err(|e| Error::Decode(format!("invalid pass body: {}", e)))?;
        Ok(WriteResponse::Saved(pass))
    }
}

#[async_trait]
impl PassesApi for HttpPassesApi {
    async fn list_passes(&self, squadron: &str, range: &DateRange) -> Result<PassesPayload> {
        let response = self
            .client
            .get(self.url(&format!("/squadrons/{}/passes.json", squadron)))
            .query(&[
                ("start_date", range.start().to_rfc3339()),
                ("end_date", range.end().to_rfc3339()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Http {
                status: status.as_u16(),
            });
        }
        response
            .json()
            .await
            .map_err(|e| Error::Decode(format!("invalid passes payload: {}", e)))
    }

    async fn create_pass(&self, pass: &PassWire) -> Result<WriteResponse> {
        let response = self
            .client
            .post(self.url("/squadron/passes.json"))
            .json(&PassBody { pass })
            .send()
            .await?;
        Self::write_response(response).await
    }

    async fn update_pass(&self, id: i64, pass: &PassWire) -> Result<WriteResponse> {
        let response = self
            .client
            .put(self.url(&format!("/squadron/passes/{}.json", id)))
            .json(&PassBody { pass })
            .send()
            .await?;
        Self::write_response(response).await
    }

    async fn delete_pass(&self, id: i64) -> Result<PassWire> {
        let response = self
            .client
            .delete(self.url(&format!("/squadron/passes/{}.json", id)))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Http {
                status: status.as_u16(),
            });
        }
        response
            .json()
            .await
            .map_err(|e| Error::Decode(format!("invalid pass body: {}", e)))
    }

    async fn delete_unknown_passes(&self) -> Result<()> {
        let response = self
            .client
            .delete(self.url("/squadron/passes/unknown.json"))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Http {
                status: status.as_u16(),
            });
        }
        Ok(())
    }
}
