use serde::Deserialize;
use validator::Validate;

use crate::models::{DecisionStatus, MappingEntity};

#[derive(Debug, Deserialize)]
pub struct HotelsQuery {
    pub country: Option<String>,
}

/// Operator decision on a supplier record.
#[derive(Debug, Deserialize, Validate)]
pub struct DecisionRequest {
    pub entity: MappingEntity,
    #[validate(length(min = 1, max = 50, message = "Supplier is required"))]
    pub supplier: String,
    #[validate(length(min = 1, max = 50, message = "Supplier code is required"))]
    pub supplier_code: String,
    #[validate(length(min = 1, max = 50, message = "Master code must not be empty"))]
    pub master_code: Option<String>,
    pub status: DecisionStatus,
}
