//! Supplier directory endpoints.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use super::error::ApiError;
use super::validation::{validate_contact_email, validate_name, validate_phone_number};
use crate::db::{MessageResponse, Supplier, SupplierRequest};
use crate::AppState;

fn validate_request(req: &SupplierRequest) -> Result<(), ApiError> {
    validate_name(&req.supplier_name, "Supplier name").map_err(ApiError::validation)?;
    validate_contact_email(&req.contact_email).map_err(ApiError::validation)?;
    validate_phone_number(&req.phone_number).map_err(ApiError::validation)?;
    Ok(())
}

/// List all suppliers
///
/// GET /suppliers
pub async fn list_suppliers(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Supplier>>, ApiError> {
    let suppliers: Vec<Supplier> = sqlx::query_as("SELECT * FROM suppliers ORDER BY id")
        .fetch_all(&state.db)
        .await?;

    Ok(Json(suppliers))
}

/// Create a new supplier
///
/// POST /suppliers
pub async fn create_supplier(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SupplierRequest>,
) -> Result<(StatusCode, Json<Supplier>), ApiError> {
    validate_request(&req)?;

    let result = sqlx::query(
        "INSERT INTO suppliers (supplier_name, contact_email, phone_number) VALUES (?, ?, ?)",
    )
    .bind(&req.supplier_name)
    .bind(&req.contact_email)
    .bind(&req.phone_number)
    .execute(&state.db)
    .await?;

    tracing::info!(supplier = %req.supplier_name, "Created supplier");

    Ok((
        StatusCode::CREATED,
        Json(Supplier {
            id: result.last_insert_rowid(),
            supplier_name: req.supplier_name,
            contact_email: req.contact_email,
            phone_number: req.phone_number,
        }),
    ))
}

/// Replace a supplier's fields
///
/// PUT /suppliers/:id
pub async fn update_supplier(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(req): Json<SupplierRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    validate_request(&req)?;

    sqlx::query(
        "UPDATE suppliers SET supplier_name = ?, contact_email = ?, phone_number = ? WHERE id = ?",
    )
    .bind(&req.supplier_name)
    .bind(&req.contact_email)
    .bind(&req.phone_number)
    .bind(id)
    .execute(&state.db)
    .await?;

    Ok(Json(MessageResponse::new("Supplier updated successfully")))
}

/// Delete a supplier
///
/// DELETE /suppliers/:id
pub async fn delete_supplier(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>, ApiError> {
    sqlx::query("DELETE FROM suppliers WHERE id = ?")
        .bind(id)
        .execute(&state.db)
        .await?;

    Ok(Json(MessageResponse::new("Supplier deleted successfully")))
}
