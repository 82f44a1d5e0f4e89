//! Stock alert endpoints.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use super::error::ApiError;
use super::validation::validate_alert_type;
use crate::db::{Alert, AlertWithProduct, CreateAlertRequest, MessageResponse, UpdateAlertRequest};
use crate::AppState;

/// List alerts with their inventory's product, active ones first
///
/// GET /alerts
pub async fn list_alerts(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<AlertWithProduct>>, ApiError> {
    let alerts: Vec<AlertWithProduct> = sqlx::query_as(
        "SELECT a.id, a.inventory_id, i.product_id, p.product_name,
                a.alert_type, a.message, a.is_active
         FROM alerts a
         JOIN inventory i ON i.id = a.inventory_id
         JOIN products p ON p.id = i.product_id
         ORDER BY a.is_active DESC, a.id DESC",
    )
    .fetch_all(&state.db)
    .await?;

    Ok(Json(alerts))
}

/// Create a new alert
///
/// POST /alerts
pub async fn create_alert(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateAlertRequest>,
) -> Result<(StatusCode, Json<Alert>), ApiError> {
    validate_alert_type(&req.alert_type).map_err(ApiError::validation)?;

    let result = sqlx::query(
        "INSERT INTO alerts (inventory_id, alert_type, message, is_active) VALUES (?, ?, ?, ?)",
    )
    .bind(req.inventory_id)
    .bind(&req.alert_type)
    .bind(&req.message)
    .bind(req.is_active)
    .execute(&state.db)
    .await?;

    tracing::info!(inventory_id = req.inventory_id, alert_type = %req.alert_type, "Created alert");

    Ok((
        StatusCode::CREATED,
        Json(Alert {
            id: result.last_insert_rowid(),
            inventory_id: req.inventory_id,
            alert_type: req.alert_type,
            message: req.message,
            is_active: req.is_active,
        }),
    ))
}

/// Replace an alert's mutable fields (active flag and message)
///
/// PUT /alerts/:id
pub async fn update_alert(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateAlertRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    sqlx::query("UPDATE alerts SET is_active = ?, message = ? WHERE id = ?")
        .bind(req.is_active)
        .bind(&req.message)
        .bind(id)
        .execute(&state.db)
        .await?;

    Ok(Json(MessageResponse::new("Alert updated successfully")))
}

/// Delete an alert
///
/// DELETE /alerts/:id
pub async fn delete_alert(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>, ApiError> {
    sqlx::query("DELETE FROM alerts WHERE id = ?")
        .bind(id)
        .execute(&state.db)
        .await?;

    Ok(Json(MessageResponse::new("Alert deleted successfully")))
}
