//! Supplier mapping screens. Suggestions are advisory; decisions live in memory.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use service_core::error::AppError;

use crate::dtos::{DecisionRequest, HotelsQuery};
use crate::models::{CountryRecord, DecisionStatus, HotelRecord, MappingDecision, MappingEntity};
use crate::services::mapping::MappingRow;
use crate::services::metrics::MAPPING_DECISIONS_TOTAL;
use crate::utils::ValidatedJson;
use crate::AppState;

/// GET /api/mapping/countries
pub async fn countries(State(state): State<AppState>) -> Json<Vec<MappingRow<CountryRecord>>> {
    Json(state.mapping.countries())
}

/// GET /api/mapping/hotels?country=
pub async fn hotels(
    State(state): State<AppState>,
    Query(query): Query<HotelsQuery>,
) -> Json<Vec<MappingRow<HotelRecord>>> {
    let country = query
        .country
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty());
    Json(state.mapping.hotels(country))
}

/// Record a map or reject decision.
///
/// POST /api/mapping/decisions
pub async fn record_decision(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<DecisionRequest>,
) -> Result<(StatusCode, Json<MappingDecision>), AppError> {
    if !state
        .mapping
        .supplier_record_exists(req.entity, &req.supplier, &req.supplier_code)
    {
        return Err(AppError::NotFound(anyhow::anyhow!(
            "No {} record {} for supplier {}",
            entity_label(req.entity),
            req.supplier_code,
            req.supplier
        )));
    }

    let master_code = match req.status {
        DecisionStatus::Mapped => {
            let code = req.master_code.clone().ok_or_else(|| {
                AppError::field_invalid(
                    "master_code",
                    "required",
                    "A master record is required to map",
                )
            })?;
            if !state.mapping.master_record_exists(req.entity, &code) {
                return Err(AppError::field_invalid(
                    "master_code",
                    "unknown_master",
                    "Unknown master record",
                ));
            }
            Some(code)
        }
        DecisionStatus::Rejected => None,
    };

    let decision = state.mapping.decide(
        req.entity,
        &req.supplier,
        &req.supplier_code,
        master_code,
        req.status,
    );

    MAPPING_DECISIONS_TOTAL
        .with_label_values(&[entity_label(req.entity), status_label(req.status)])
        .inc();
    tracing::info!(
        entity = entity_label(req.entity),
        supplier = %req.supplier,
        supplier_code = %req.supplier_code,
        master_code = ?decision.master_code,
        status = status_label(req.status),
        "Mapping decision recorded"
    );

    Ok((StatusCode::CREATED, Json(decision)))
}

/// GET /api/mapping/decisions
pub async fn list_decisions(State(state): State<AppState>) -> Json<Vec<MappingDecision>> {
    Json(state.mapping.decisions())
}

fn entity_label(entity: MappingEntity) -> &'static str {
    match entity {
        MappingEntity::Country => "country",
        MappingEntity::Hotel => "hotel",
    }
}

fn status_label(status: DecisionStatus) -> &'static str {
    match status {
        DecisionStatus::Mapped => "mapped",
        DecisionStatus::Rejected => "rejected",
    }
}
