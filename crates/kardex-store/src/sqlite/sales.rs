//! Sales ledger on the `sales` table.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use kardex_core::types::{Sale, SaleLine};
use kardex_core::Money;

use crate::contracts::SalesStore;
use crate::error::{StoreError, StoreResult};

/// SQLite implementation of [`SalesStore`].
///
/// Insert-only: the table has no update or delete path, mirroring the
/// contract's immutability rule.
#[derive(Debug, Clone)]
pub struct SqliteSalesStore {
    pool: SqlitePool,
}

impl SqliteSalesStore {
    pub fn new(pool: SqlitePool) -> Self {
        SqliteSalesStore { pool }
    }
}

#[derive(sqlx::FromRow)]
struct SaleRow {
    receipt: String,
    operator: String,
    ts: DateTime<Utc>,
    lines: String,
    total_cents: i64,
    profit_cents: i64,
    note: Option<String>,
}

impl SaleRow {
    fn into_sale(self) -> StoreResult<Sale> {
        let lines: Vec<SaleLine> = serde_json::from_str(&self.lines)
            .map_err(|e| StoreError::corrupt("sale", format!("lines: {e}")))?;
        Ok(Sale {
            receipt: self.receipt,
            operator: self.operator,
            ts: self.ts,
            lines,
            total: Money::from_cents(self.total_cents),
            profit: Money::from_cents(self.profit_cents),
            note: self.note,
        })
    }
}

#[async_trait]
impl SalesStore for SqliteSalesStore {
    async fn save(&self, sale: &Sale) -> StoreResult<()> {
        let lines = serde_json::to_string(&sale.lines)
            .map_err(|e| StoreError::corrupt("sale", format!("lines: {e}")))?;

        // Plain INSERT: the UNIQUE index on receipt turns a duplicate
        // into StoreError::UniqueViolation.
        sqlx::query(
            r#"
            INSERT INTO sales (receipt, operator, ts, lines, total_cents, profit_cents, note)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&sale.receipt)
        .bind(&sale.operator)
        .bind(sale.ts)
        .bind(lines)
        .bind(sale.total.cents())
        .bind(sale.profit.cents())
        .bind(&sale.note)
        .execute(&self.pool)
        .await?;

        debug!(receipt = %sale.receipt, total = %sale.total, "Sale persisted");
        Ok(())
    }

    async fn get(&self, receipt: &str) -> StoreResult<Option<Sale>> {
        let row: Option<SaleRow> = sqlx::query_as(
            "SELECT receipt, operator, ts, lines, total_cents, profit_cents, note \
             FROM sales WHERE receipt = ?1",
        )
        .bind(receipt)
        .fetch_optional(&self.pool)
        .await?;

        row.map(SaleRow::into_sale).transpose()
    }

    async fn list(&self) -> StoreResult<Vec<Sale>> {
        let rows: Vec<SaleRow> = sqlx::query_as(
            "SELECT receipt, operator, ts, lines, total_cents, profit_cents, note \
             FROM sales ORDER BY seq",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(SaleRow::into_sale).collect()
    }

    async fn next_receipt(&self) -> StoreResult<String> {
        // Latest receipt by ledger order; sales are never deleted, so
        // max + 1 is monotonic.
        let last: Option<(String,)> =
            sqlx::query_as("SELECT receipt FROM sales ORDER BY seq DESC LIMIT 1")
                .fetch_optional(&self.pool)
                .await?;

        let max = last
            .and_then(|(receipt,)| receipt.strip_prefix('B')?.parse::<u64>().ok())
            .unwrap_or(0);
        Ok(format!("B{:06}", max + 1))
    }
}
