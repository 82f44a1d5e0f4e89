//! Stock transaction endpoints.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use super::error::ApiError;
use super::validation::{validate_quantity_change, validate_transaction_type};
use crate::db::stock::record_stock_transaction;
use crate::db::{MessageResponse, StockTransaction, TransactionRequest, TransactionWithProduct};
use crate::AppState;

/// List transactions, newest first, with product names
///
/// GET /transactions
pub async fn list_transactions(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<TransactionWithProduct>>, ApiError> {
    let transactions: Vec<TransactionWithProduct> = sqlx::query_as(
        "SELECT t.id, t.product_id, p.product_name, t.user_id, t.transaction_type,
                t.quantity_change, t.transaction_date
         FROM transactions t
         JOIN products p ON p.id = t.product_id
         ORDER BY t.transaction_date DESC",
    )
    .fetch_all(&state.db)
    .await?;

    Ok(Json(transactions))
}

/// Record a transaction and apply its delta to the product's inventory
///
/// POST /transactions
pub async fn create_transaction(
    State(state): State<Arc<AppState>>,
    Json(req): Json<TransactionRequest>,
) -> Result<(StatusCode, Json<StockTransaction>), ApiError> {
    validate_transaction_type(&req.transaction_type).map_err(ApiError::validation)?;
    validate_quantity_change(req.quantity_change).map_err(ApiError::validation)?;

    let transaction = record_stock_transaction(
        &state.db,
        req.product_id,
        req.user_id,
        &req.transaction_type,
        req.quantity_change,
    )
    .await
    .map_err(|e| ApiError::internal(format!("Transaction failed: {}", e)))?;

    tracing::info!(
        product_id = transaction.product_id,
        quantity_change = transaction.quantity_change,
        transaction_type = %transaction.transaction_type,
        "Recorded stock transaction"
    );

    Ok((StatusCode::CREATED, Json(transaction)))
}

/// Delete a transaction row
///
/// DELETE /transactions/:id
///
/// Removes only the record. The inventory delta it applied stays in place;
/// callers wanting the stock adjusted back must record a compensating
/// transaction.
pub async fn delete_transaction(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>, ApiError> {
    sqlx::query("DELETE FROM transactions WHERE id = ?")
        .bind(id)
        .execute(&state.db)
        .await?;

    Ok(Json(MessageResponse::new("Transaction deleted")))
}
