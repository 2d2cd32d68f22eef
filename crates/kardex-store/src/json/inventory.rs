//! Product catalog on `products.json`.

use std::path::Path;

use async_trait::async_trait;
use tracing::debug;

use kardex_core::types::Product;

use crate::contracts::InventoryStore;
use crate::error::StoreResult;
use crate::json::{ensure_dir, FamilyFile};

/// JSON flat-file implementation of [`InventoryStore`].
pub struct JsonInventoryStore {
    file: FamilyFile<Product>,
}

impl JsonInventoryStore {
    pub async fn open(dir: &Path) -> StoreResult<Self> {
        ensure_dir(dir).await?;
        Ok(JsonInventoryStore {
            file: FamilyFile::new(dir, "products.json", "product"),
        })
    }
}

#[async_trait]
impl InventoryStore for JsonInventoryStore {
    async fn save(&self, product: &Product) -> StoreResult<()> {
        let record = product.clone();
        self.file
            .update(move |products| {
                match products.iter_mut().find(|p| p.id == record.id) {
                    Some(existing) => *existing = record,
                    None => {
                        products.push(record);
                        products.sort_by_key(|p| p.id);
                    }
                }
                Ok(())
            })
            .await?;
        debug!(id = product.id, sku = %product.sku, "Product saved");
        Ok(())
    }

    async fn get(&self, id: u32) -> StoreResult<Option<Product>> {
        let products = self.file.load().await?;
        Ok(products.into_iter().find(|p| p.id == id))
    }

    async fn list(&self) -> StoreResult<Vec<Product>> {
        let mut products = self.file.load().await?;
        products.sort_by_key(|p| p.id);
        Ok(products)
    }

    async fn delete(&self, id: u32) -> StoreResult<bool> {
        self.file
            .update(move |products| {
                let before = products.len();
                products.retain(|p| p.id != id);
                Ok(products.len() != before)
            })
            .await
    }

    async fn next_product_id(&self) -> StoreResult<u32> {
        let products = self.file.load().await?;
        Ok(products.iter().map(|p| p.id).max().unwrap_or(0) + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kardex_core::Money;

    fn scratch_dir() -> std::path::PathBuf {
        std::env::temp_dir().join(format!("kardex-inv-{}", uuid::Uuid::new_v4().simple()))
    }

    fn product(id: u32) -> Product {
        Product {
            id,
            sku: Product::sku_for(id),
            name: format!("Product {id}"),
            category: String::new(),
            image: "default.png".to_string(),
            stock_min: 0,
            price: Money::from_cents(100),
            cost: Money::from_cents(50),
            variants: Vec::new(),
        }
    }

    #[tokio::test]
    async fn save_get_list_delete_round_trip() {
        let store = JsonInventoryStore::open(&scratch_dir()).await.unwrap();

        store.save(&product(2)).await.unwrap();
        store.save(&product(1)).await.unwrap();

        assert_eq!(store.get(1).await.unwrap().unwrap().sku, "SKU-00001");
        assert!(store.get(99).await.unwrap().is_none());

        let listed = store.list().await.unwrap();
        assert_eq!(listed.iter().map(|p| p.id).collect::<Vec<_>>(), vec![1, 2]);

        assert!(store.delete(1).await.unwrap());
        assert!(!store.delete(1).await.unwrap());
    }

    #[tokio::test]
    async fn save_is_an_upsert() {
        let store = JsonInventoryStore::open(&scratch_dir()).await.unwrap();

        store.save(&product(1)).await.unwrap();
        let mut updated = product(1);
        updated.name = "Renamed".to_string();
        store.save(&updated).await.unwrap();

        let listed = store.list().await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].name, "Renamed");
    }

    #[tokio::test]
    async fn next_id_is_max_plus_one() {
        let store = JsonInventoryStore::open(&scratch_dir()).await.unwrap();
        assert_eq!(store.next_product_id().await.unwrap(), 1);

        store.save(&product(5)).await.unwrap();
        assert_eq!(store.next_product_id().await.unwrap(), 6);
    }
}
