//! Product catalog endpoints.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use super::error::ApiError;
use super::validation::{validate_name, validate_price};
use crate::db::{MessageResponse, Product, ProductRequest};
use crate::AppState;

fn validate_request(req: &ProductRequest) -> Result<(), ApiError> {
    validate_name(&req.product_name, "Product name").map_err(ApiError::validation)?;
    validate_price(req.price).map_err(ApiError::validation)?;
    Ok(())
}

/// List all products
///
/// GET /products
pub async fn list_products(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Product>>, ApiError> {
    let products: Vec<Product> = sqlx::query_as("SELECT * FROM products ORDER BY id")
        .fetch_all(&state.db)
        .await?;

    Ok(Json(products))
}

/// Create a new product
///
/// POST /products
pub async fn create_product(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ProductRequest>,
) -> Result<(StatusCode, Json<Product>), ApiError> {
    validate_request(&req)?;

    let result = sqlx::query(
        "INSERT INTO products (product_name, description, category, price, supplier_id)
         VALUES (?, ?, ?, ?, ?)",
    )
    .bind(&req.product_name)
    .bind(&req.description)
    .bind(&req.category)
    .bind(req.price)
    .bind(req.supplier_id)
    .execute(&state.db)
    .await?;

    tracing::info!(product = %req.product_name, "Created product");

    Ok((
        StatusCode::CREATED,
        Json(Product {
            id: result.last_insert_rowid(),
            product_name: req.product_name,
            description: req.description,
            category: req.category,
            price: req.price,
            supplier_id: req.supplier_id,
        }),
    ))
}

/// Replace a product's fields
///
/// PUT /products/:id
pub async fn update_product(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(req): Json<ProductRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    validate_request(&req)?;

    sqlx::query(
        "UPDATE products SET product_name = ?, description = ?, category = ?, price = ?, supplier_id = ?
         WHERE id = ?",
    )
    .bind(&req.product_name)
    .bind(&req.description)
    .bind(&req.category)
    .bind(req.price)
    .bind(req.supplier_id)
    .bind(id)
    .execute(&state.db)
    .await?;

    Ok(Json(MessageResponse::new("Product updated successfully")))
}

/// Delete a product
///
/// DELETE /products/:id
///
/// Deleting an unknown id is not an error; the call reports success either way.
pub async fn delete_product(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>, ApiError> {
    sqlx::query("DELETE FROM products WHERE id = ?")
        .bind(id)
        .execute(&state.db)
        .await?;

    Ok(Json(MessageResponse::new("Product deleted successfully")))
}
