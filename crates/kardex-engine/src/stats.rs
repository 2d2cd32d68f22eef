//! # Statistics Aggregator
//!
//! Read-only profit & loss over the sales ledger. Mutates nothing, ever.
//!
//! ## Cost Basis
//! Cost comes from the per-line snapshot frozen at sale time, so reports
//! are stable under later catalog edits. Lines that predate cost
//! snapshots fall back to the product's *current* cost basis per base
//! unit (and to zero when the product no longer exists).

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};

use kardex_core::types::{Product, Sale};
use kardex_core::{CoreResult, Money};
use kardex_store::{InventoryStore, SalesStore};

use crate::error::EngineResult;

// =============================================================================
// Report Types
// =============================================================================

/// Profit & loss over a half-open time range `[from, to)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PnlReport {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
    pub revenue: Money,
    pub cost: Money,
    pub margin: Money,
    pub sale_count: usize,
}

/// One day's slice of a breakdown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DailyPnl {
    pub day: NaiveDate,
    pub revenue: Money,
    pub cost: Money,
    pub margin: Money,
    pub sale_count: usize,
}

// =============================================================================
// Stats Service
// =============================================================================

/// Aggregations over the sales ledger.
#[derive(Clone)]
pub struct Stats {
    sales: Arc<dyn SalesStore>,
    inventory: Arc<dyn InventoryStore>,
}

impl Stats {
    pub fn new(sales: Arc<dyn SalesStore>, inventory: Arc<dyn InventoryStore>) -> Self {
        Stats { sales, inventory }
    }

    /// Revenue, cost and margin for sales with `from <= ts < to`.
    pub async fn profit_and_loss(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> EngineResult<PnlReport> {
        let (sales, catalog) = self.load_range(from, to).await?;

        let mut revenue = Money::zero();
        let mut cost = Money::zero();
        for sale in &sales {
            revenue += sale.total;
            cost += sale_cost(sale, &catalog)?;
        }

        Ok(PnlReport {
            from,
            to,
            revenue,
            cost,
            margin: revenue - cost,
            sale_count: sales.len(),
        })
    }

    /// Per-day slices of the same range, oldest day first. Days without
    /// sales are omitted.
    pub async fn daily_breakdown(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> EngineResult<Vec<DailyPnl>> {
        let (sales, catalog) = self.load_range(from, to).await?;

        let mut days: BTreeMap<NaiveDate, DailyPnl> = BTreeMap::new();
        for sale in &sales {
            let day = sale.ts.date_naive();
            let slice = days.entry(day).or_insert_with(|| DailyPnl {
                day,
                revenue: Money::zero(),
                cost: Money::zero(),
                margin: Money::zero(),
                sale_count: 0,
            });
            slice.revenue += sale.total;
            slice.cost += sale_cost(sale, &catalog)?;
            slice.sale_count += 1;
        }
        for slice in days.values_mut() {
            slice.margin = slice.revenue - slice.cost;
        }

        Ok(days.into_values().collect())
    }

    async fn load_range(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> EngineResult<(Vec<Sale>, BTreeMap<u32, Product>)> {
        let mut sales = self.sales.list().await?;
        sales.retain(|s| s.ts >= from && s.ts < to);

        // Catalog lookup only matters for pre-snapshot lines; loading it
        // once keeps the fallback O(1) per line.
        let catalog: BTreeMap<u32, Product> = self
            .inventory
            .list()
            .await?
            .into_iter()
            .map(|p| (p.id, p))
            .collect();

        Ok((sales, catalog))
    }
}

/// Total cost of one sale, preferring per-line snapshots.
fn sale_cost(sale: &Sale, catalog: &BTreeMap<u32, Product>) -> CoreResult<Money> {
    let mut cost = Money::zero();
    for line in &sale.lines {
        cost += match line.unit_cost {
            Some(unit_cost) => unit_cost.times(line.quantity)?,
            None => match catalog.get(&line.product_id) {
                Some(p) => p.cost.times(line.quantity_base)?,
                None => Money::zero(),
            },
        };
    }
    Ok(cost)
}

#[cfg(test)]
mod tests {
    use super::*;
    use kardex_core::types::{SaleLine, UnitKind};

    fn line(unit_cost: Option<i64>, quantity: i64, quantity_base: i64) -> SaleLine {
        SaleLine {
            product_id: 1,
            sku: "SKU-00001".to_string(),
            name: "Thing".to_string(),
            variant_id: "v_00000000".to_string(),
            attributes: BTreeMap::new(),
            unit: UnitKind::Piece,
            quantity,
            quantity_base,
            unit_price: Money::from_cents(500),
            unit_cost: unit_cost.map(Money::from_cents),
            line_total: Money::from_cents(500 * quantity),
            line_profit: Money::zero(),
        }
    }

    fn sale_with(lines: Vec<SaleLine>) -> Sale {
        Sale {
            receipt: "B000001".to_string(),
            operator: "ana".to_string(),
            ts: Utc::now(),
            lines,
            total: Money::from_cents(1000),
            profit: Money::zero(),
            note: None,
        }
    }

    #[test]
    fn snapshot_cost_wins_over_catalog() {
        let mut product = Product {
            id: 1,
            sku: "SKU-00001".to_string(),
            name: "Thing".to_string(),
            category: String::new(),
            image: "default.png".to_string(),
            stock_min: 0,
            price: Money::from_cents(500),
            cost: Money::from_cents(999), // current cost, must be ignored
            variants: Vec::new(),
        };
        let catalog = BTreeMap::from([(1, product.clone())]);

        let sale = sale_with(vec![line(Some(200), 2, 2)]);
        assert_eq!(sale_cost(&sale, &catalog).unwrap().cents(), 400);

        // Pre-snapshot line: falls back to current catalog cost per base
        product.cost = Money::from_cents(100);
        let catalog = BTreeMap::from([(1, product)]);
        let sale = sale_with(vec![line(None, 1, 12)]);
        assert_eq!(sale_cost(&sale, &catalog).unwrap().cents(), 1200);
    }

    #[test]
    fn missing_product_fallback_is_zero() {
        let sale = sale_with(vec![line(None, 1, 5)]);
        assert_eq!(sale_cost(&sale, &BTreeMap::new()).unwrap().cents(), 0);
    }

    #[test]
    fn overflowing_cost_is_an_error_not_a_wrap() {
        let sale = sale_with(vec![line(Some(i64::MAX), 2, 2)]);
        assert!(sale_cost(&sale, &BTreeMap::new()).is_err());
    }
}
