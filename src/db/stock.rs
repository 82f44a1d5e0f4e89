//! Stock transaction processing.
//!
//! Recording a transaction is the one multi-statement write in the system:
//! the immutable transaction row and the inventory quantity adjustment are
//! applied inside a single database transaction, so neither is ever visible
//! without the other.

use chrono::Utc;
use thiserror::Error;

use super::{DbPool, StockTransaction};

#[derive(Debug, Error)]
pub enum StockError {
    #[error("no inventory record exists for product {0}")]
    MissingInventory(i64),
    #[error(transparent)]
    Db(#[from] sqlx::Error),
}

/// Append a transaction row and apply its quantity delta to the matching
/// inventory row, as one atomic unit.
///
/// The caller has already validated that `quantity_change` is non-zero. The
/// delta may drive `quantity` negative; no floor is applied. If the product
/// has no inventory row the whole unit rolls back.
pub async fn record_stock_transaction(
    pool: &DbPool,
    product_id: i64,
    user_id: i64,
    transaction_type: &str,
    quantity_change: i64,
) -> Result<StockTransaction, StockError> {
    let mut tx = pool.begin().await?;

    let transaction_date = Utc::now().to_rfc3339();
    let inserted = sqlx::query(
        "INSERT INTO transactions (product_id, user_id, transaction_type, quantity_change, transaction_date)
         VALUES (?, ?, ?, ?, ?)",
    )
    .bind(product_id)
    .bind(user_id)
    .bind(transaction_type)
    .bind(quantity_change)
    .bind(&transaction_date)
    .execute(&mut *tx)
    .await?;

    let updated = sqlx::query(
        "UPDATE inventory SET quantity = quantity + ?, last_updated = ? WHERE product_id = ?",
    )
    .bind(quantity_change)
    .bind(&transaction_date)
    .bind(product_id)
    .execute(&mut *tx)
    .await?;

    if updated.rows_affected() == 0 {
        tx.rollback().await?;
        return Err(StockError::MissingInventory(product_id));
    }

    tx.commit().await?;

    Ok(StockTransaction {
        id: inserted.last_insert_rowid(),
        product_id,
        user_id,
        transaction_type: transaction_type.to_string(),
        quantity_change,
        transaction_date,
    })
}
