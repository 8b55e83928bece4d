use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use shared::models::{Area, Guest};
use std::time::Duration;

use super::{AssignmentSolver, SolverRequest, SolverResponse};
use crate::core::{EngineConfig, SolverError};

/// Solver endpoint, relative to the base URL
const ASSIGN_PATH: &str = "api/seating/assign";

/// Error body returned by the solver service
#[derive(serde::Deserialize)]
struct SolverErrorResponse {
    pub message: String,
}

/// `reqwest` adapter for an HTTP assignment solver
#[derive(Debug, Clone)]
pub struct HttpAssignmentSolver {
    client: Client,
    base_url: String,
}

impl HttpAssignmentSolver {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, SolverError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn from_config(config: &EngineConfig) -> Result<Self, SolverError> {
        Self::new(
            &config.solver_url,
            Duration::from_secs(config.solver_timeout_secs),
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn endpoint(&self) -> String {
        format!("{}/{}", self.base_url, ASSIGN_PATH)
    }

    async fn handle_response(response: reqwest::Response) -> Result<SolverResponse, SolverError> {
        let status = response.status();
        if !status.is_success() {
            let text = response.text().await?;
            let message = serde_json::from_str::<SolverErrorResponse>(&text)
                .map(|e| e.message)
                .unwrap_or(text);
            return Err(match status {
                StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => SolverError::Timeout,
                s if s.is_client_error() => SolverError::Rejected(message),
                _ => SolverError::Network(format!("{status}: {message}")),
            });
        }
        Ok(response.json().await?)
    }
}

#[async_trait]
impl AssignmentSolver for HttpAssignmentSolver {
    async fn request_assignment(
        &self,
        area: &Area,
        guests: &[Guest],
    ) -> Result<SolverResponse, SolverError> {
        let url = self.endpoint();
        tracing::debug!(url = %url, area = %area.kind, guests = guests.len(), "Requesting remote assignment");
        let response = self
            .client
            .post(&url)
            .json(&SolverRequest { area, guests })
            .send()
            .await?;
        Self::handle_response(response).await
    }
}
