//! Product catalog on the `products` table.

use async_trait::async_trait;
use sqlx::SqlitePool;
use tracing::debug;

use kardex_core::types::{Product, Variant};
use kardex_core::Money;

use crate::contracts::InventoryStore;
use crate::error::{StoreError, StoreResult};

/// SQLite implementation of [`InventoryStore`].
#[derive(Debug, Clone)]
pub struct SqliteInventoryStore {
    pool: SqlitePool,
}

impl SqliteInventoryStore {
    pub fn new(pool: SqlitePool) -> Self {
        SqliteInventoryStore { pool }
    }
}

/// Wire shape of a `products` row. Variants live in a JSON column.
#[derive(sqlx::FromRow)]
struct ProductRow {
    id: i64,
    sku: String,
    name: String,
    category: String,
    image: String,
    stock_min: i64,
    price_cents: i64,
    cost_cents: i64,
    variants: String,
}

impl ProductRow {
    fn into_product(self) -> StoreResult<Product> {
        let variants: Vec<Variant> = serde_json::from_str(&self.variants)
            .map_err(|e| StoreError::corrupt("product", format!("variants: {e}")))?;
        Ok(Product {
            id: self.id as u32,
            sku: self.sku,
            name: self.name,
            category: self.category,
            image: self.image,
            stock_min: self.stock_min,
            price: Money::from_cents(self.price_cents),
            cost: Money::from_cents(self.cost_cents),
            variants,
        })
    }
}

#[async_trait]
impl InventoryStore for SqliteInventoryStore {
    async fn save(&self, product: &Product) -> StoreResult<()> {
        let variants = serde_json::to_string(&product.variants)
            .map_err(|e| StoreError::corrupt("product", format!("variants: {e}")))?;

        sqlx::query(
            r#"
            INSERT INTO products (id, sku, name, category, image, stock_min, price_cents, cost_cents, variants)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            ON CONFLICT(id) DO UPDATE SET
                sku = excluded.sku,
                name = excluded.name,
                category = excluded.category,
                image = excluded.image,
                stock_min = excluded.stock_min,
                price_cents = excluded.price_cents,
                cost_cents = excluded.cost_cents,
                variants = excluded.variants
            "#,
        )
        .bind(product.id as i64)
        .bind(&product.sku)
        .bind(&product.name)
        .bind(&product.category)
        .bind(&product.image)
        .bind(product.stock_min)
        .bind(product.price.cents())
        .bind(product.cost.cents())
        .bind(variants)
        .execute(&self.pool)
        .await?;

        debug!(id = product.id, sku = %product.sku, "Product saved");
        Ok(())
    }

    async fn get(&self, id: u32) -> StoreResult<Option<Product>> {
        let row: Option<ProductRow> = sqlx::query_as(
            "SELECT id, sku, name, category, image, stock_min, price_cents, cost_cents, variants \
             FROM products WHERE id = ?1",
        )
        .bind(id as i64)
        .fetch_optional(&self.pool)
        .await?;

        row.map(ProductRow::into_product).transpose()
    }

    async fn list(&self) -> StoreResult<Vec<Product>> {
        let rows: Vec<ProductRow> = sqlx::query_as(
            "SELECT id, sku, name, category, image, stock_min, price_cents, cost_cents, variants \
             FROM products ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(ProductRow::into_product).collect()
    }

    async fn delete(&self, id: u32) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM products WHERE id = ?1")
            .bind(id as i64)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn next_product_id(&self) -> StoreResult<u32> {
        let row: (i64,) = sqlx::query_as("SELECT COALESCE(MAX(id), 0) + 1 FROM products")
            .fetch_one(&self.pool)
            .await?;
        Ok(row.0 as u32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sqlite::{Database, DbConfig};
    use std::collections::BTreeMap;

    async fn store() -> SqliteInventoryStore {
        let db = Database::connect(DbConfig::in_memory()).await.unwrap();
        SqliteInventoryStore::new(db.pool().clone())
    }

    fn product(id: u32) -> Product {
        let mut variant = Variant::new(BTreeMap::from([(
            "size".to_string(),
            "42".to_string(),
        )]));
        variant.stock = 10;
        Product {
            id,
            sku: Product::sku_for(id),
            name: format!("Product {id}"),
            category: "misc".to_string(),
            image: "default.png".to_string(),
            stock_min: 2,
            price: Money::from_cents(500),
            cost: Money::from_cents(200),
            variants: vec![variant],
        }
    }

    #[tokio::test]
    async fn round_trip_preserves_variants() {
        let store = store().await;
        let original = product(1);
        store.save(&original).await.unwrap();

        let loaded = store.get(1).await.unwrap().unwrap();
        assert_eq!(loaded, original);
    }

    #[tokio::test]
    async fn upsert_replaces_the_whole_record() {
        let store = store().await;
        store.save(&product(1)).await.unwrap();

        let mut updated = product(1);
        updated.variants.clear();
        updated.price = Money::from_cents(700);
        store.save(&updated).await.unwrap();

        let loaded = store.get(1).await.unwrap().unwrap();
        assert!(loaded.variants.is_empty());
        assert_eq!(loaded.price.cents(), 700);
    }

    #[tokio::test]
    async fn next_id_and_delete() {
        let store = store().await;
        assert_eq!(store.next_product_id().await.unwrap(), 1);

        store.save(&product(3)).await.unwrap();
        assert_eq!(store.next_product_id().await.unwrap(), 4);

        assert!(store.delete(3).await.unwrap());
        assert!(!store.delete(3).await.unwrap());
    }
}
