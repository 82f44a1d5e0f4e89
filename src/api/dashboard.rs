//! Dashboard aggregate endpoints.
//!
//! Read-only summaries for the overview screens. Each handler is a single
//! aggregate query with no state to coordinate.

use axum::{extract::State, Json};
use chrono::{Duration, Utc};
use serde::Serialize;
use sqlx::FromRow;
use std::sync::Arc;

use super::error::ApiError;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct DashboardStats {
    pub total_products: i64,
    pub total_suppliers: i64,
    pub low_stock_items: i64,
    pub active_alerts: i64,
}

#[derive(Debug, Serialize)]
pub struct InventoryStatus {
    pub in_stock: i64,
    pub low_stock: i64,
    pub out_of_stock: i64,
}

#[derive(Debug, Serialize, FromRow)]
pub struct TransactionTrend {
    pub date: String,
    pub transaction_type: String,
    pub count: i64,
}

#[derive(Debug, Serialize, FromRow)]
pub struct LowStockProduct {
    pub product_name: String,
    pub quantity: i64,
    pub low_stock_threshold: i64,
}

#[derive(Debug, Serialize, FromRow)]
pub struct CategoryCount {
    pub category: Option<String>,
    pub count: i64,
}

/// Headline counts for the dashboard
///
/// GET /dashboard/stats
pub async fn stats(State(state): State<Arc<AppState>>) -> Result<Json<DashboardStats>, ApiError> {
    let total_products: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
        .fetch_one(&state.db)
        .await?;

    let total_suppliers: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM suppliers")
        .fetch_one(&state.db)
        .await?;

    let low_stock_items: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM inventory WHERE quantity <= low_stock_threshold")
            .fetch_one(&state.db)
            .await?;

    let active_alerts: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM alerts WHERE is_active = 1")
        .fetch_one(&state.db)
        .await?;

    Ok(Json(DashboardStats {
        total_products,
        total_suppliers,
        low_stock_items,
        active_alerts,
    }))
}

/// Inventory rows bucketed by stock level
///
/// GET /dashboard/inventory-status
pub async fn inventory_status(
    State(state): State<Arc<AppState>>,
) -> Result<Json<InventoryStatus>, ApiError> {
    let (in_stock, low_stock, out_of_stock): (Option<i64>, Option<i64>, Option<i64>) =
        sqlx::query_as(
            "SELECT
                SUM(CASE WHEN quantity > low_stock_threshold THEN 1 ELSE 0 END),
                SUM(CASE WHEN quantity > 0 AND quantity <= low_stock_threshold THEN 1 ELSE 0 END),
                SUM(CASE WHEN quantity <= 0 THEN 1 ELSE 0 END)
             FROM inventory",
        )
        .fetch_one(&state.db)
        .await?;

    Ok(Json(InventoryStatus {
        in_stock: in_stock.unwrap_or(0),
        low_stock: low_stock.unwrap_or(0),
        out_of_stock: out_of_stock.unwrap_or(0),
    }))
}

/// Transaction counts per day and type over the last 30 days
///
/// GET /dashboard/transaction-trends
pub async fn transaction_trends(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<TransactionTrend>>, ApiError> {
    let cutoff = (Utc::now() - Duration::days(30)).to_rfc3339();

    let trends: Vec<TransactionTrend> = sqlx::query_as(
        "SELECT DATE(transaction_date) AS date, transaction_type, COUNT(*) AS count
         FROM transactions
         WHERE transaction_date >= ?
         GROUP BY DATE(transaction_date), transaction_type
         ORDER BY date",
    )
    .bind(cutoff)
    .fetch_all(&state.db)
    .await?;

    Ok(Json(trends))
}

/// The ten products closest to running out
///
/// GET /dashboard/low-stock-products
pub async fn low_stock_products(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<LowStockProduct>>, ApiError> {
    let products: Vec<LowStockProduct> = sqlx::query_as(
        "SELECT p.product_name, i.quantity, i.low_stock_threshold
         FROM inventory i
         JOIN products p ON p.id = i.product_id
         WHERE i.quantity <= i.low_stock_threshold
         ORDER BY i.quantity ASC
         LIMIT 10",
    )
    .fetch_all(&state.db)
    .await?;

    Ok(Json(products))
}

/// Product counts per category
///
/// GET /dashboard/category-distribution
pub async fn category_distribution(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<CategoryCount>>, ApiError> {
    let categories: Vec<CategoryCount> = sqlx::query_as(
        "SELECT category, COUNT(*) AS count FROM products GROUP BY category",
    )
    .fetch_all(&state.db)
    .await?;

    Ok(Json(categories))
}
