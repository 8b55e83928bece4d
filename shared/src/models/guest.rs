//! Guest Model
//!
//! Guests are owned by the guest directory; the engine only reads the
//! attributes it needs for allocation.

use serde::{Deserialize, Serialize};

/// Guest identifier (opaque, directory-owned)
pub type GuestId = String;

/// Guest as seen by the seating engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Guest {
    pub id: GuestId,
    pub name: String,
    /// Guests sharing a party id are seated together
    #[serde(default)]
    pub party_id: Option<String>,
    /// Companions occupying extra seats next to this guest
    #[serde(default)]
    pub companions: u32,
    /// Needs step-free / wheelchair access
    #[serde(default)]
    pub accessibility: bool,
    #[serde(default)]
    pub dietary: Option<String>,
    /// Relationship tags (family side, friend group, vip, …)
    #[serde(default)]
    pub tags: Vec<String>,
}

impl Guest {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            party_id: None,
            companions: 0,
            accessibility: false,
            dietary: None,
            tags: Vec::new(),
        }
    }

    pub fn in_party(mut self, party_id: impl Into<String>) -> Self {
        self.party_id = Some(party_id.into());
        self
    }

    pub fn with_companions(mut self, companions: u32) -> Self {
        self.companions = companions;
        self
    }

    /// Seats this guest occupies, companions included
    pub fn seat_count(&self) -> u32 {
        1 + self.companions
    }
}
