//! # Sales Engine
//!
//! Atomic cart checkout: a cart either becomes a persisted `Sale` with
//! every stock decrement applied, or nothing changes at all.
//!
//! ## Checkout Phases
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        checkout(cart, operator)                         │
//! │                                                                         │
//! │  Phase 0: empty-cart / shape checks (outside the lock, read-only)       │
//! │                                                                         │
//! │  ───────────────── acquire stock lock ─────────────────                 │
//! │                                                                         │
//! │  Phase 1: VALIDATE ALL (no mutation)                                    │
//! │    for every line: resolve product ─► variant ─► unit                   │
//! │                    convert quantity to base units                       │
//! │                    check available stock minus what earlier lines       │
//! │                    of this cart already claim                           │
//! │                    snapshot price & cost for the sale record            │
//! │    any failure ─► release lock, nothing mutated                         │
//! │                                                                         │
//! │  Phase 2: MUTATE ALL                                                    │
//! │    decrement every variant, save every touched product                  │
//! │    assign receipt number, persist the Sale                              │
//! │                                                                         │
//! │  ───────────────── release stock lock ─────────────────                 │
//! │                                                                         │
//! │  Phase 3: audit (one Stock event per line + one Sale event)             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The lock closes the double-spend race between concurrent checkouts and
//! stock adjustments. The decrement/persist pair in phase 2 spans two
//! writes and is best-effort across a crash; neither backend offers a
//! transaction covering both families.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::Mutex;
use tracing::{info, warn};

use kardex_core::types::{
    AuditEvent, AuditKind, AuditOutcome, Cart, Product, Sale, SaleLine,
};
use kardex_core::{validation, CoreError, Money};
use kardex_store::{InventoryStore, SalesStore};

use crate::audit::AuditRecorder;
use crate::error::EngineResult;
use crate::inventory::convert_unit;

// =============================================================================
// Sales Engine
// =============================================================================

/// Checkout and sales-ledger reads.
#[derive(Clone)]
pub struct SalesEngine {
    inventory: Arc<dyn InventoryStore>,
    sales: Arc<dyn SalesStore>,
    audit: AuditRecorder,
    /// Shared with [`crate::inventory::Inventory`].
    stock_lock: Arc<Mutex<()>>,
}

impl SalesEngine {
    pub fn new(
        inventory: Arc<dyn InventoryStore>,
        sales: Arc<dyn SalesStore>,
        audit: AuditRecorder,
        stock_lock: Arc<Mutex<()>>,
    ) -> Self {
        SalesEngine {
            inventory,
            sales,
            audit,
            stock_lock,
        }
    }

    /// Consumes a cart into a persisted, immutable `Sale`.
    ///
    /// On any validation failure the cart is rejected whole: no stock
    /// moves, no sale is written. See the module docs for the phases.
    pub async fn checkout(
        &self,
        cart: Cart,
        operator: &str,
        note: Option<String>,
    ) -> EngineResult<Sale> {
        if cart.is_empty() {
            return Err(CoreError::EmptyCart.into());
        }
        validation::validate_cart_shape(&cart)?;

        let _guard = self.stock_lock.lock().await;

        match self.validate_and_apply(&cart, operator, note).await {
            Ok(sale) => {
                info!(
                    receipt = %sale.receipt,
                    operator = %operator,
                    lines = sale.lines.len(),
                    total = %sale.total,
                    "Checkout completed"
                );
                self.audit_sale(&sale).await;
                Ok(sale)
            }
            Err(e) => {
                warn!(operator = %operator, error = %e, "Checkout rejected");
                self.audit
                    .rejected(operator, AuditKind::Sale, "checkout", e.to_string())
                    .await;
                Err(e)
            }
        }
    }

    /// Phases 1 and 2, under the lock.
    async fn validate_and_apply(
        &self,
        cart: &Cart,
        operator: &str,
        note: Option<String>,
    ) -> EngineResult<Sale> {
        // ---- Phase 1: validate all, snapshot all -----------------------
        // Products are cached so multiple lines against one product see
        // (and later mutate) the same in-memory record.
        let mut products: BTreeMap<u32, Product> = BTreeMap::new();
        let mut resolved: Vec<SaleLine> = Vec::with_capacity(cart.lines.len());
        // Base units already claimed by earlier lines of this cart.
        let mut claimed: BTreeMap<(u32, String), i64> = BTreeMap::new();

        for line in &cart.lines {
            if !products.contains_key(&line.product_id) {
                let product = self
                    .inventory
                    .get(line.product_id)
                    .await?
                    .ok_or(CoreError::UnknownProduct(line.product_id))?;
                products.insert(line.product_id, product);
            }
            let product = &products[&line.product_id];

            let variant =
                product
                    .variant(&line.variant_id)
                    .ok_or_else(|| CoreError::UnknownVariant {
                        product_id: line.product_id,
                        variant_id: line.variant_id.clone(),
                    })?;
            let unit = variant
                .unit(line.unit)
                .ok_or_else(|| CoreError::UnknownUnit {
                    variant_id: line.variant_id.clone(),
                    unit: line.unit.to_string(),
                })?
                .clone();

            let quantity_base = convert_unit(variant, line.unit, line.quantity)?;

            let key = (line.product_id, line.variant_id.clone());
            let already = *claimed.get(&key).unwrap_or(&0);
            let available = variant.available() - already;
            if quantity_base > available {
                return Err(CoreError::InsufficientStock {
                    sku: product.sku.clone(),
                    variant_id: line.variant_id.clone(),
                    available: available.max(0),
                    requested: quantity_base,
                }
                .into());
            }
            claimed.insert(key, already + quantity_base);

            // Price and cost are frozen now; later catalog edits must not
            // rewrite history.
            let unit_price = product.unit_price(&unit);
            let unit_cost = product.unit_cost(&unit);
            let line_total = unit_price.times(line.quantity)?;
            let line_profit = line_total - unit_cost.times(line.quantity)?;

            resolved.push(SaleLine {
                product_id: line.product_id,
                sku: product.sku.clone(),
                name: product.name.clone(),
                variant_id: line.variant_id.clone(),
                attributes: variant.attributes.clone(),
                unit: line.unit,
                quantity: line.quantity,
                quantity_base,
                unit_price,
                unit_cost: Some(unit_cost),
                line_total,
                line_profit,
            });
        }

        // ---- Phase 2: mutate all ---------------------------------------
        for ((product_id, variant_id), base) in &claimed {
            if let Some(variant) = products
                .get_mut(product_id)
                .and_then(|p| p.variant_mut(variant_id))
            {
                variant.stock -= *base;
            }
        }
        for product in products.values() {
            self.inventory.save(product).await?;
        }

        let receipt = self.sales.next_receipt().await?;
        let lines = resolved;
        let total: Money = lines.iter().map(|l| l.line_total).sum();
        let profit: Money = lines.iter().map(|l| l.line_profit).sum();

        let sale = Sale {
            receipt,
            operator: operator.to_string(),
            ts: Utc::now(),
            lines,
            total,
            profit,
            note,
        };
        self.sales.save(&sale).await?;

        Ok(sale)
    }

    /// Phase 3: one Stock event per line, one Sale event for the whole.
    async fn audit_sale(&self, sale: &Sale) {
        for line in &sale.lines {
            self.audit
                .record(
                    AuditEvent::new(
                        &sale.operator,
                        AuditKind::Stock,
                        &line.sku,
                        AuditOutcome::Success,
                        format!(
                            "Sold {} x {} ({} base units) on {}",
                            line.quantity, line.unit, line.quantity_base, sale.receipt
                        ),
                    )
                    .with_detail("variant_id", &line.variant_id)
                    .with_detail("receipt", &sale.receipt),
                )
                .await;
        }
        self.audit
            .record(
                AuditEvent::new(
                    &sale.operator,
                    AuditKind::Sale,
                    &sale.receipt,
                    AuditOutcome::Success,
                    format!(
                        "Sale {} completed: {} line(s), total {}",
                        sale.receipt,
                        sale.lines.len(),
                        sale.total
                    ),
                )
                .with_detail("total_cents", sale.total.cents().to_string()),
            )
            .await;
    }

    // =========================================================================
    // Ledger Reads
    // =========================================================================

    pub async fn get_sale(&self, receipt: &str) -> EngineResult<Option<Sale>> {
        Ok(self.sales.get(receipt).await?)
    }

    pub async fn list_sales(&self) -> EngineResult<Vec<Sale>> {
        Ok(self.sales.list().await?)
    }
}
