//! Inventory level endpoints.
//!
//! Rows here track the current stock of a product. Direct edits through PUT
//! overwrite the quantity; audited changes go through the transactions
//! endpoint instead, which adjusts the quantity as part of an atomic unit.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use std::sync::Arc;

use super::auth::CurrentUser;
use super::error::ApiError;
use crate::db::{
    CreateInventoryRequest, InventoryItem, InventoryWithProduct, MessageResponse,
    UpdateInventoryRequest,
};
use crate::AppState;

/// List inventory with product names
///
/// GET /inventory
pub async fn list_inventory(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<InventoryWithProduct>>, ApiError> {
    let items: Vec<InventoryWithProduct> = sqlx::query_as(
        "SELECT i.id, i.product_id, p.product_name, i.quantity, i.low_stock_threshold, i.last_updated
         FROM inventory i
         JOIN products p ON p.id = i.product_id
         ORDER BY i.id",
    )
    .fetch_all(&state.db)
    .await?;

    Ok(Json(items))
}

/// Create an inventory row for a product
///
/// POST /inventory
pub async fn create_inventory(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateInventoryRequest>,
) -> Result<(StatusCode, Json<InventoryItem>), ApiError> {
    let last_updated = Utc::now().to_rfc3339();

    let result = sqlx::query(
        "INSERT INTO inventory (product_id, quantity, low_stock_threshold, last_updated)
         VALUES (?, ?, ?, ?)",
    )
    .bind(req.product_id)
    .bind(req.quantity)
    .bind(req.low_stock_threshold)
    .bind(&last_updated)
    .execute(&state.db)
    .await?;

    tracing::info!(product_id = req.product_id, quantity = req.quantity, "Created inventory row");

    Ok((
        StatusCode::CREATED,
        Json(InventoryItem {
            id: result.last_insert_rowid(),
            product_id: req.product_id,
            quantity: req.quantity,
            low_stock_threshold: req.low_stock_threshold,
            last_updated,
        }),
    ))
}

/// Replace an inventory row's mutable fields
///
/// PUT /inventory/:id
pub async fn update_inventory(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateInventoryRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    sqlx::query(
        "UPDATE inventory SET quantity = ?, low_stock_threshold = ?, last_updated = ? WHERE id = ?",
    )
    .bind(req.quantity)
    .bind(req.low_stock_threshold)
    .bind(Utc::now().to_rfc3339())
    .bind(id)
    .execute(&state.db)
    .await?;

    Ok(Json(MessageResponse::new("Inventory updated")))
}

/// Delete an inventory row (requires a session)
///
/// DELETE /inventory/:id
pub async fn delete_inventory(
    State(state): State<Arc<AppState>>,
    CurrentUser(principal): CurrentUser,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>, ApiError> {
    sqlx::query("DELETE FROM inventory WHERE id = ?")
        .bind(id)
        .execute(&state.db)
        .await?;

    tracing::info!(inventory_id = id, by = %principal.username, "Deleted inventory row");

    Ok(Json(MessageResponse::new(
        "Inventory item deleted successfully",
    )))
}
