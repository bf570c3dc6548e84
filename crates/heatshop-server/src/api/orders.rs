use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension, Json,
};
use heatshop_catalog::Order;

use super::{map_catalog_error, ApiError, AppState};
use crate::middleware::RequestId;

/// Validates the order and relays the upstream status and JSON body.
pub(super) async fn submit_order(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    payload: Result<Json<Order>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(order) = payload.map_err(|e| {
        ApiError::new(req_id.0.clone(), "validation_error", e.body_text())
    })?;

    let reply = state
        .catalog
        .submit_order(&order)
        .await
        .map_err(|e| map_catalog_error(req_id.0, &e))?;

    let status = StatusCode::from_u16(reply.status).unwrap_or(StatusCode::BAD_GATEWAY);
    Ok((status, Json(reply.body)).into_response())
}
