//! # Inventory Manager
//!
//! Catalog CRUD, variant management, unit conversion, the reservation
//! lifecycle, and the stock-mutating code paths (this module's
//! `adjust_stock`/`commit_reserved` and checkout in [`crate::sales`]).
//!
//! ## Stock Invariants
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  • Stock is stored per variant, in base units, as an integer            │
//! │  • Conversion sold-unit → base happens exactly once, at the boundary    │
//! │  • No adjustment may leave stock negative, on any path                  │
//! │  • Every successful adjustment appends one Stock audit event with       │
//! │    the prior and new quantity                                           │
//! │  • All mutations run under the shared stock lock, the same lock         │
//! │    checkout holds for its validate-then-decrement sequence              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::BTreeMap;
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::info;

use kardex_core::types::{AuditKind, Product, SellUnit, UnitKind, Variant};
use kardex_core::{validation, CoreError, CoreResult, Money};
use kardex_store::InventoryStore;

use crate::audit::AuditRecorder;
use crate::error::EngineResult;

// =============================================================================
// Unit Conversion
// =============================================================================

/// Converts a quantity in a sold unit to base units for one variant.
///
/// The factor is looked up once, on the variant's own unit table;
/// `UnknownUnit` if the variant is not sold in that unit.
pub fn convert_unit(variant: &Variant, kind: UnitKind, quantity: i64) -> CoreResult<i64> {
    let unit = variant
        .unit(kind)
        .ok_or_else(|| CoreError::UnknownUnit {
            variant_id: variant.variant_id.clone(),
            unit: kind.to_string(),
        })?;
    quantity
        .checked_mul(unit.factor)
        .ok_or(CoreError::Overflow {
            context: "base quantity",
        })
}

// =============================================================================
// New Product Input
// =============================================================================

/// Caller-supplied fields for product creation; id and SKU are assigned
/// by the manager.
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub name: String,
    pub category: String,
    pub image: Option<String>,
    pub stock_min: i64,
    pub price: Money,
    pub cost: Money,
}

// =============================================================================
// Inventory Service
// =============================================================================

/// Catalog and stock service over an [`InventoryStore`].
#[derive(Clone)]
pub struct Inventory {
    store: Arc<dyn InventoryStore>,
    audit: AuditRecorder,
    /// Shared with [`crate::sales::SalesEngine`]: one critical section
    /// covers every stock mutation in the process.
    stock_lock: Arc<Mutex<()>>,
}

impl Inventory {
    pub fn new(
        store: Arc<dyn InventoryStore>,
        audit: AuditRecorder,
        stock_lock: Arc<Mutex<()>>,
    ) -> Self {
        Inventory {
            store,
            audit,
            stock_lock,
        }
    }

    // =========================================================================
    // Catalog Reads
    // =========================================================================

    /// Fetches a product or fails with `UnknownProduct`.
    pub async fn get_product(&self, id: u32) -> EngineResult<Product> {
        self.store
            .get(id)
            .await?
            .ok_or_else(|| CoreError::UnknownProduct(id).into())
    }

    pub async fn list_products(&self) -> EngineResult<Vec<Product>> {
        Ok(self.store.list().await?)
    }

    /// Case-insensitive substring search over SKU, name and category.
    pub async fn search(&self, query: &str) -> EngineResult<Vec<Product>> {
        let needle = query.trim().to_lowercase();
        let mut products = self.store.list().await?;
        if !needle.is_empty() {
            products.retain(|p| {
                p.sku.to_lowercase().contains(&needle)
                    || p.name.to_lowercase().contains(&needle)
                    || p.category.to_lowercase().contains(&needle)
            });
        }
        Ok(products)
    }

    /// Products whose total stock is at or below their own threshold.
    pub async fn low_stock(&self) -> EngineResult<Vec<Product>> {
        let mut products = self.store.list().await?;
        products.retain(Product::is_low_stock);
        Ok(products)
    }

    // =========================================================================
    // Catalog Writes
    // =========================================================================

    /// Creates a product with a fresh id and derived SKU.
    pub async fn create_product(&self, input: NewProduct, actor: &str) -> EngineResult<Product> {
        validation::validate_product_name(&input.name)?;
        validation::validate_category(&input.category)?;
        validation::validate_stock_min(input.stock_min)?;
        validation::validate_amount("price", input.price.cents())?;
        validation::validate_amount("cost", input.cost.cents())?;

        // Creation is serialized by the stock lock so id assignment is
        // race-free (next_product_id is a read, not a reservation).
        let _guard = self.stock_lock.lock().await;

        let id = self.store.next_product_id().await?;
        let product = Product {
            id,
            sku: Product::sku_for(id),
            name: input.name.trim().to_string(),
            category: input.category.trim().to_string(),
            image: input.image.unwrap_or_else(|| "default.png".to_string()),
            stock_min: input.stock_min,
            price: input.price,
            cost: input.cost,
            variants: Vec::new(),
        };
        self.store.save(&product).await?;

        info!(id = product.id, sku = %product.sku, "Product created");
        self.audit
            .success(
                actor,
                AuditKind::Product,
                &product.sku,
                format!("Created product '{}'", product.name),
            )
            .await;
        Ok(product)
    }

    /// Replaces a product record. The product must already exist; id and
    /// SKU are immutable.
    pub async fn update_product(&self, product: Product, actor: &str) -> EngineResult<Product> {
        validation::validate_product_name(&product.name)?;
        validation::validate_category(&product.category)?;
        validation::validate_stock_min(product.stock_min)?;
        validation::validate_amount("price", product.price.cents())?;
        validation::validate_amount("cost", product.cost.cents())?;

        let _guard = self.stock_lock.lock().await;

        let existing = self
            .store
            .get(product.id)
            .await?
            .ok_or(CoreError::UnknownProduct(product.id))?;

        let mut product = product;
        product.sku = existing.sku; // derived from id, never caller-set
        self.store.save(&product).await?;

        self.audit
            .success(
                actor,
                AuditKind::Product,
                &product.sku,
                format!("Updated product '{}'", product.name),
            )
            .await;
        Ok(product)
    }

    pub async fn delete_product(&self, id: u32, actor: &str) -> EngineResult<()> {
        let _guard = self.stock_lock.lock().await;

        let product = self
            .store
            .get(id)
            .await?
            .ok_or(CoreError::UnknownProduct(id))?;
        self.store.delete(id).await?;

        self.audit
            .success(
                actor,
                AuditKind::Product,
                &product.sku,
                format!("Deleted product '{}'", product.name),
            )
            .await;
        Ok(())
    }

    /// Adds a variant to a product. Units default to by-the-piece when
    /// none are given; factors are checked against the unit kind.
    pub async fn add_variant(
        &self,
        product_id: u32,
        attributes: BTreeMap<String, String>,
        initial_stock: i64,
        units: Vec<SellUnit>,
        actor: &str,
    ) -> EngineResult<Variant> {
        if initial_stock < 0 {
            return Err(CoreError::Validation(
                kardex_core::ValidationError::MustBePositive { field: "stock" },
            )
            .into());
        }
        for unit in &units {
            validation::validate_unit_factor(unit.kind, unit.factor)?;
        }

        let _guard = self.stock_lock.lock().await;

        let mut product = self
            .store
            .get(product_id)
            .await?
            .ok_or(CoreError::UnknownProduct(product_id))?;

        let mut variant = Variant::new(attributes);
        variant.stock = initial_stock;
        if !units.is_empty() {
            variant.units = units;
        }
        product.variants.push(variant.clone());
        self.store.save(&product).await?;

        self.audit
            .success(
                actor,
                AuditKind::Product,
                &product.sku,
                format!(
                    "Added variant {} {}",
                    variant.variant_id,
                    variant.attribute_summary()
                ),
            )
            .await;
        Ok(variant)
    }

    // =========================================================================
    // Stock
    // =========================================================================

    /// Adjusts one variant's stock by a signed delta in base units.
    ///
    /// Rejected with `InsufficientStock` if the result would go negative;
    /// on success, exactly one Stock audit event records prior and new
    /// quantity.
    pub async fn adjust_stock(
        &self,
        product_id: u32,
        variant_id: &str,
        delta_base: i64,
        reason: &str,
        actor: &str,
    ) -> EngineResult<i64> {
        let _guard = self.stock_lock.lock().await;

        let mut product = self
            .store
            .get(product_id)
            .await?
            .ok_or(CoreError::UnknownProduct(product_id))?;
        let sku = product.sku.clone();

        let variant = product
            .variant_mut(variant_id)
            .ok_or_else(|| CoreError::UnknownVariant {
                product_id,
                variant_id: variant_id.to_string(),
            })?;

        let prior = variant.stock;
        let new = prior.checked_add(delta_base).ok_or(CoreError::Overflow {
            context: "stock adjustment",
        })?;
        // On-hand stock may never drop below zero, nor below what is
        // currently reserved.
        if new < variant.reserved.max(0) {
            return Err(CoreError::InsufficientStock {
                sku,
                variant_id: variant_id.to_string(),
                available: variant.available(),
                requested: -delta_base,
            }
            .into());
        }
        variant.stock = new;

        self.store.save(&product).await?;

        info!(
            sku = %sku,
            variant_id = %variant_id,
            prior,
            new,
            "Stock adjusted"
        );
        self.audit
            .record(
                kardex_core::types::AuditEvent::new(
                    actor,
                    AuditKind::Stock,
                    &sku,
                    kardex_core::types::AuditOutcome::Success,
                    format!("Stock {prior} -> {new} ({reason})"),
                )
                .with_detail("variant_id", variant_id)
                .with_detail("prior", prior.to_string())
                .with_detail("new", new.to_string()),
            )
            .await;
        Ok(new)
    }

    // =========================================================================
    // Reservations
    // =========================================================================

    /// Reserves base units on a variant for pending work. Reserved stock
    /// stays on hand but no longer counts as available, so neither
    /// checkout nor a later reservation can claim it twice.
    ///
    /// Returns the variant's new reserved quantity.
    pub async fn reserve_stock(
        &self,
        product_id: u32,
        variant_id: &str,
        base_qty: i64,
        actor: &str,
    ) -> EngineResult<i64> {
        if base_qty <= 0 {
            return Err(CoreError::Validation(
                kardex_core::ValidationError::MustBePositive { field: "quantity" },
            )
            .into());
        }

        let _guard = self.stock_lock.lock().await;

        let mut product = self
            .store
            .get(product_id)
            .await?
            .ok_or(CoreError::UnknownProduct(product_id))?;
        let sku = product.sku.clone();

        let variant = product
            .variant_mut(variant_id)
            .ok_or_else(|| CoreError::UnknownVariant {
                product_id,
                variant_id: variant_id.to_string(),
            })?;

        let available = variant.available();
        if base_qty > available {
            return Err(CoreError::InsufficientStock {
                sku,
                variant_id: variant_id.to_string(),
                available,
                requested: base_qty,
            }
            .into());
        }
        variant.reserved = variant
            .reserved
            .checked_add(base_qty)
            .ok_or(CoreError::Overflow {
                context: "stock reservation",
            })?;
        let reserved = variant.reserved;

        self.store.save(&product).await?;

        info!(sku = %sku, variant_id = %variant_id, base_qty, reserved, "Stock reserved");
        self.audit
            .success(
                actor,
                AuditKind::Stock,
                &sku,
                format!("Reserved {base_qty} base units on {variant_id} (total {reserved})"),
            )
            .await;
        Ok(reserved)
    }

    /// Releases previously reserved base units. On-hand stock is not
    /// touched; the units simply count as available again.
    pub async fn release_reserved(
        &self,
        product_id: u32,
        variant_id: &str,
        base_qty: i64,
        actor: &str,
    ) -> EngineResult<i64> {
        let _guard = self.stock_lock.lock().await;
        let reserved = self
            .take_reservation(product_id, variant_id, base_qty, false)
            .await?;

        self.audit
            .success(
                actor,
                AuditKind::Stock,
                &Product::sku_for(product_id),
                format!("Released {base_qty} reserved base units on {variant_id}"),
            )
            .await;
        Ok(reserved)
    }

    /// Commits previously reserved base units: the reservation is cleared
    /// and the same quantity leaves on-hand stock.
    pub async fn commit_reserved(
        &self,
        product_id: u32,
        variant_id: &str,
        base_qty: i64,
        actor: &str,
    ) -> EngineResult<i64> {
        let _guard = self.stock_lock.lock().await;
        self.take_reservation(product_id, variant_id, base_qty, true)
            .await?;

        self.audit
            .success(
                actor,
                AuditKind::Stock,
                &Product::sku_for(product_id),
                format!("Committed {base_qty} reserved base units on {variant_id}"),
            )
            .await;
        Ok(base_qty)
    }

    /// Removes `base_qty` from a variant's reservation, optionally also
    /// from its stock. Caller must hold the stock lock.
    async fn take_reservation(
        &self,
        product_id: u32,
        variant_id: &str,
        base_qty: i64,
        decrement_stock: bool,
    ) -> EngineResult<i64> {
        let mut product = self
            .store
            .get(product_id)
            .await?
            .ok_or(CoreError::UnknownProduct(product_id))?;

        let variant = product
            .variant_mut(variant_id)
            .ok_or_else(|| CoreError::UnknownVariant {
                product_id,
                variant_id: variant_id.to_string(),
            })?;

        if base_qty <= 0 || base_qty > variant.reserved {
            return Err(CoreError::Validation(
                kardex_core::ValidationError::OutOfRange {
                    field: "reserved",
                    min: 1,
                    max: variant.reserved,
                },
            )
            .into());
        }
        variant.reserved -= base_qty;
        if decrement_stock {
            // A committed reservation was carved out of on-hand stock when
            // it was taken, so this subtraction cannot go negative.
            variant.stock -= base_qty;
        }
        let reserved = variant.reserved;

        self.store.save(&product).await?;
        Ok(reserved)
    }
}
