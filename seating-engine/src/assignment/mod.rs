//! Assignment engine
//!
//! - [`heuristic`]: local best-fit-decreasing proposal
//! - [`remote`]: remote solver request lifecycle and response normalization
//! - [`apply`]: atomic application of any proposal to the plan

pub mod apply;
pub mod heuristic;
pub mod remote;

pub use apply::apply_proposal;
pub use heuristic::{
    Party, TableSuggestion, eligible_guests, group_parties, local_assignment, occupied_seats,
    suggest_tables,
};
pub use remote::{RemoteStatus, RemoteTicket, RemoteTracker, normalize_response};
