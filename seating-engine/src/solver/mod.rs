//! Remote assignment solver collaborator
//!
//! The engine never solves remotely itself; it hands an area and the guest
//! list to an [`AssignmentSolver`] and normalizes whatever comes back.

mod http;

pub use http::HttpAssignmentSolver;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use shared::models::{Area, Guest, GuestId, TableId};

use crate::core::SolverError;

/// Request body sent to the solver
#[derive(Debug, Clone, Serialize)]
pub struct SolverRequest<'a> {
    pub area: &'a Area,
    pub guests: &'a [Guest],
}

/// One guest placement returned by the solver
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolverPlacement {
    pub guest_id: GuestId,
    pub table_id: TableId,
}

/// Raw solver answer, before normalization
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SolverResponse {
    pub assignments: Vec<SolverPlacement>,
    /// 0..=100 when the solver scores its own answer
    #[serde(default)]
    pub score: Option<f64>,
    #[serde(default)]
    pub warnings: Vec<String>,
    #[serde(default)]
    pub suggestions: Vec<String>,
}

/// Asynchronous guest→table solver
///
/// Timeouts and retries are the implementation's business; the engine only
/// sees success or a [`SolverError`].
#[async_trait]
pub trait AssignmentSolver: Send + Sync {
    async fn request_assignment(
        &self,
        area: &Area,
        guests: &[Guest],
    ) -> Result<SolverResponse, SolverError>;
}
