//! Supplier mapping records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A country as listed by a supplier or in the master catalogue.
#[derive(Debug, Clone, Serialize)]
pub struct CountryRecord {
    pub source: &'static str,
    pub code: &'static str,
    pub name: &'static str,
}

/// A hotel as listed by a supplier or in the master catalogue.
#[derive(Debug, Clone, Serialize)]
pub struct HotelRecord {
    pub source: &'static str,
    pub code: &'static str,
    pub name: &'static str,
    pub address: &'static str,
    pub country_code: &'static str,
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MappingEntity {
    Country,
    Hotel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionStatus {
    Mapped,
    Rejected,
}

/// Operator decision on a supplier record. Held in memory only.
#[derive(Debug, Clone, Serialize)]
pub struct MappingDecision {
    pub decision_id: Uuid,
    pub entity: MappingEntity,
    pub supplier: String,
    pub supplier_code: String,
    pub master_code: Option<String>,
    pub status: DecisionStatus,
    pub decided_utc: DateTime<Utc>,
}
