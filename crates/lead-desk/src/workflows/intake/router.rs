use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde_json::json;

use super::domain::{LeadRequest, QuoteRequest, SlotConfirmRequest, SlotEstimateRequest};
use super::service::{IntakeError, LeadDeskService};
use crate::workflows::audit::AuditLog;
use crate::workflows::scheduling::CalendarStore;

/// Lead intake, pricing, and booking endpoints.
pub fn lead_desk_router<C, A>(service: Arc<LeadDeskService<C, A>>) -> Router
where
    C: CalendarStore + 'static,
    A: AuditLog + 'static,
{
    Router::new()
        .route("/api/v1/leads", post(lead_handler::<C, A>))
        .route("/api/v1/quotes", post(quote_handler::<C, A>))
        .route("/api/v1/slots/estimate", post(estimate_handler::<C, A>))
        .route("/api/v1/slots/confirm", post(confirm_handler::<C, A>))
        .with_state(service)
}

pub(crate) async fn lead_handler<C, A>(
    State(service): State<Arc<LeadDeskService<C, A>>>,
    Json(request): Json<LeadRequest>,
) -> Response
where
    C: CalendarStore + 'static,
    A: AuditLog + 'static,
{
    match service.submit_lead(request).await {
        Ok(response) => (StatusCode::OK, Json(response)).into_response(),
        Err(error) => error.into_response(),
    }
}

pub(crate) async fn quote_handler<C, A>(
    State(service): State<Arc<LeadDeskService<C, A>>>,
    Json(request): Json<QuoteRequest>,
) -> Response
where
    C: CalendarStore + 'static,
    A: AuditLog + 'static,
{
    match service.price_quote(request).await {
        Ok(response) => (StatusCode::OK, Json(response)).into_response(),
        Err(error) => error.into_response(),
    }
}

pub(crate) async fn estimate_handler<C, A>(
    State(service): State<Arc<LeadDeskService<C, A>>>,
    Json(request): Json<SlotEstimateRequest>,
) -> Response
where
    C: CalendarStore + 'static,
    A: AuditLog + 'static,
{
    match service.estimate_slot(request).await {
        Ok(response) => (StatusCode::OK, Json(response)).into_response(),
        Err(error) => error.into_response(),
    }
}

pub(crate) async fn confirm_handler<C, A>(
    State(service): State<Arc<LeadDeskService<C, A>>>,
    Json(request): Json<SlotConfirmRequest>,
) -> Response
where
    C: CalendarStore + 'static,
    A: AuditLog + 'static,
{
    match service.confirm_slot(request).await {
        Ok(response) => (StatusCode::CREATED, Json(response)).into_response(),
        Err(error) => error.into_response(),
    }
}

impl IntoResponse for IntakeError {
    fn into_response(self) -> Response {
        match self {
            IntakeError::Validation(errors) => {
                let payload = json!({
                    "error": "invalid request",
                    "fields": errors.errors,
                });
                (StatusCode::UNPROCESSABLE_ENTITY, Json(payload)).into_response()
            }
            IntakeError::NoAvailability { horizon_days } => {
                let payload = json!({
                    "status": "no_availability",
                    "horizon_days": horizon_days,
                });
                (StatusCode::OK, Json(payload)).into_response()
            }
            IntakeError::Conflict {
                reason,
                alternative,
            } => {
                let payload = json!({
                    "status": "conflict",
                    "reason": reason.to_string(),
                    "alternative": alternative,
                });
                (StatusCode::CONFLICT, Json(payload)).into_response()
            }
            IntakeError::Persistence(error) => {
                let payload = json!({
                    "error": error.to_string(),
                });
                (StatusCode::INTERNAL_SERVER_ERROR, Json(payload)).into_response()
            }
        }
    }
}
