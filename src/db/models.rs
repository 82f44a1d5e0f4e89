use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::DbPool;

// Domain entities

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Product {
    pub id: i64,
    pub product_name: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub price: f64,
    pub supplier_id: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Supplier {
    pub id: i64,
    pub supplier_name: String,
    pub contact_email: Option<String>,
    pub phone_number: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct InventoryItem {
    pub id: i64,
    pub product_id: i64,
    pub quantity: i64,
    pub low_stock_threshold: i64,
    pub last_updated: String,
}

/// Inventory row joined with its product name, as returned by list endpoints.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct InventoryWithProduct {
    pub id: i64,
    pub product_id: i64,
    pub product_name: String,
    pub quantity: i64,
    pub low_stock_threshold: i64,
    pub last_updated: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct StockTransaction {
    pub id: i64,
    pub product_id: i64,
    pub user_id: i64,
    pub transaction_type: String,
    pub quantity_change: i64,
    pub transaction_date: String,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct TransactionWithProduct {
    pub id: i64,
    pub product_id: i64,
    pub product_name: String,
    pub user_id: i64,
    pub transaction_type: String,
    pub quantity_change: i64,
    pub transaction_date: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Alert {
    pub id: i64,
    pub inventory_id: i64,
    pub alert_type: String,
    pub message: String,
    pub is_active: bool,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct AlertWithProduct {
    pub id: i64,
    pub inventory_id: i64,
    pub product_id: i64,
    pub product_name: String,
    pub alert_type: String,
    pub message: String,
    pub is_active: bool,
}

// User and session models

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub password_hash: String,
    pub role: String,
    pub created_at: String,
}

impl User {
    pub async fn find_by_username(pool: &DbPool, username: &str) -> sqlx::Result<Option<User>> {
        sqlx::query_as("SELECT * FROM users WHERE username = ?")
            .bind(username)
            .fetch_optional(pool)
            .await
    }

    pub async fn create(
        pool: &DbPool,
        username: &str,
        password_hash: &str,
        role: &str,
    ) -> sqlx::Result<User> {
        let result =
            sqlx::query("INSERT INTO users (username, password_hash, role) VALUES (?, ?, ?)")
                .bind(username)
                .bind(password_hash)
                .bind(role)
                .execute(pool)
                .await?;

        sqlx::query_as("SELECT * FROM users WHERE id = ?")
            .bind(result.last_insert_rowid())
            .fetch_one(pool)
            .await
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct UserResponse {
    pub id: i64,
    pub username: String,
    pub role: String,
    pub created_at: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            role: user.role,
            created_at: user.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Session {
    pub id: String,
    pub user_id: i64,
    pub token_hash: String,
    pub expires_at: String,
    pub created_at: String,
}

// DTOs for API

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
    #[serde(default = "default_role")]
    pub role: String,
}

fn default_role() -> String {
    "staff".to_string()
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Payload for creating or fully replacing a product.
#[derive(Debug, Deserialize)]
pub struct ProductRequest {
    pub product_name: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub price: f64,
    pub supplier_id: i64,
}

/// Payload for creating or fully replacing a supplier.
#[derive(Debug, Deserialize)]
pub struct SupplierRequest {
    pub supplier_name: String,
    pub contact_email: Option<String>,
    pub phone_number: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateInventoryRequest {
    pub product_id: i64,
    pub quantity: i64,
    #[serde(default = "default_low_stock_threshold")]
    pub low_stock_threshold: i64,
}

/// Replaces the mutable inventory fields; `product_id` is fixed at creation.
#[derive(Debug, Deserialize)]
pub struct UpdateInventoryRequest {
    pub quantity: i64,
    #[serde(default = "default_low_stock_threshold")]
    pub low_stock_threshold: i64,
}

fn default_low_stock_threshold() -> i64 {
    10
}

#[derive(Debug, Deserialize)]
pub struct TransactionRequest {
    pub product_id: i64,
    pub user_id: i64,
    pub transaction_type: String,
    pub quantity_change: i64,
}

#[derive(Debug, Deserialize)]
pub struct CreateAlertRequest {
    pub inventory_id: i64,
    pub alert_type: String,
    pub message: String,
    #[serde(default = "default_alert_active")]
    pub is_active: bool,
}

#[derive(Debug, Deserialize)]
pub struct UpdateAlertRequest {
    pub is_active: bool,
    #[serde(default)]
    pub message: String,
}

fn default_alert_active() -> bool {
    true
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
