//! DTOs for the address API served by the mock server.
//!
//! # Design
//! These types mirror the mock-server's schema but are defined independently.
//! Integration tests catch any schema drift between the two crates.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A postal address. `person` is set only by associating the address with a
/// person through a uri-list.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Address {
    pub id: Uuid,
    pub lines: Vec<String>,
    pub city: String,
    pub province: String,
    pub postal_code: String,
    pub person: Option<Uuid>,
}

/// Request payload for creating a new address.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAddress {
    #[serde(default)]
    pub lines: Vec<String>,
    pub city: String,
    pub province: String,
    pub postal_code: String,
}
