//! Sales ledger on `sales.json`.

use std::path::Path;

use async_trait::async_trait;
use tracing::debug;

use kardex_core::types::Sale;

use crate::contracts::SalesStore;
use crate::error::{StoreError, StoreResult};
use crate::json::{ensure_dir, FamilyFile};

/// JSON flat-file implementation of [`SalesStore`].
pub struct JsonSalesStore {
    file: FamilyFile<Sale>,
}

impl JsonSalesStore {
    pub async fn open(dir: &Path) -> StoreResult<Self> {
        ensure_dir(dir).await?;
        Ok(JsonSalesStore {
            file: FamilyFile::new(dir, "sales.json", "sale"),
        })
    }
}

/// Numeric part of a receipt number, if it parses: `B000042` -> 42.
fn receipt_seq(receipt: &str) -> Option<u64> {
    receipt.strip_prefix('B')?.parse().ok()
}

#[async_trait]
impl SalesStore for JsonSalesStore {
    async fn save(&self, sale: &Sale) -> StoreResult<()> {
        let record = sale.clone();
        self.file
            .update(move |sales| {
                // Immutability: a receipt number is used exactly once.
                if sales.iter().any(|s| s.receipt == record.receipt) {
                    return Err(StoreError::UniqueViolation {
                        field: "receipt".to_string(),
                        value: record.receipt.clone(),
                    });
                }
                sales.push(record);
                Ok(())
            })
            .await?;
        debug!(receipt = %sale.receipt, total = %sale.total, "Sale persisted");
        Ok(())
    }

    async fn get(&self, receipt: &str) -> StoreResult<Option<Sale>> {
        let sales = self.file.load().await?;
        Ok(sales.into_iter().find(|s| s.receipt == receipt))
    }

    async fn list(&self) -> StoreResult<Vec<Sale>> {
        let mut sales = self.file.load().await?;
        sales.sort_by_key(|s| receipt_seq(&s.receipt));
        Ok(sales)
    }

    async fn next_receipt(&self) -> StoreResult<String> {
        let sales = self.file.load().await?;
        let max = sales
            .iter()
            .filter_map(|s| receipt_seq(&s.receipt))
            .max()
            .unwrap_or(0);
        Ok(format!("B{:06}", max + 1))
    }
}
