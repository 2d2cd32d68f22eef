//! The same behavior on both backends: the engine cannot tell the JSON
//! flat files and SQLite apart.

use std::collections::BTreeMap;
use std::path::PathBuf;

use kardex_core::types::{Cart, CartLine, Role, SellUnit, UnitKind};
use kardex_core::Money;
use kardex_engine::{Engine, NewProduct};
use kardex_store::BackendConfig;

fn json_dir() -> PathBuf {
    std::env::temp_dir().join(format!("kardex-it-{}", uuid::Uuid::new_v4().simple()))
}

/// Full life cycle against whatever backend is underneath: create a
/// product with a variant, sell from it, manage a user, and read
/// everything back.
async fn exercise(engine: Engine) {
    let inventory = engine.inventory();

    let product = inventory
        .create_product(
            NewProduct {
                name: "Gloves".to_string(),
                category: "clothing".to_string(),
                image: None,
                stock_min: 2,
                price: Money::from_cents(800),
                cost: Money::from_cents(300),
            },
            "tester",
        )
        .await
        .unwrap();
    assert_eq!(product.sku, "SKU-00001");

    let variant = inventory
        .add_variant(
            product.id,
            BTreeMap::from([("size".to_string(), "M".to_string())]),
            20,
            vec![SellUnit::piece(), SellUnit::new(UnitKind::Dozen, 12)],
            "tester",
        )
        .await
        .unwrap();

    // Restock, then sell a dozen
    inventory
        .adjust_stock(product.id, &variant.variant_id, 4, "restock", "tester")
        .await
        .unwrap();

    let sale = engine
        .sales()
        .checkout(
            Cart::new().with_line(CartLine {
                product_id: product.id,
                variant_id: variant.variant_id.clone(),
                unit: UnitKind::Dozen,
                quantity: 1,
            }),
            "tester",
            Some("mostrador".to_string()),
        )
        .await
        .unwrap();
    assert_eq!(sale.lines[0].quantity_base, 12);

    let reloaded = inventory.get_product(product.id).await.unwrap();
    assert_eq!(reloaded.variant(&variant.variant_id).unwrap().stock, 12);

    let stored_sale = engine.sales().get_sale(&sale.receipt).await.unwrap().unwrap();
    assert_eq!(stored_sale.note.as_deref(), Some("mostrador"));

    // Users and settings
    engine
        .users()
        .create_user("ana", "admin123", Role::Admin, "tester")
        .await
        .unwrap();
    engine.users().set_theme("ana", "light").await.unwrap();
    assert_eq!(engine.users().settings_for("ana").await.unwrap().theme, "light");

    // Search and low-stock views
    let hits = inventory.search("glove").await.unwrap();
    assert_eq!(hits.len(), 1);
    assert!(inventory.low_stock().await.unwrap().is_empty());

    // The trail recorded the whole session
    let events = engine.audit().recent(50).await.unwrap();
    assert!(events.len() >= 5);
    let for_sku = engine.audit().for_target("SKU-00001").await.unwrap();
    assert!(!for_sku.is_empty());
}

#[tokio::test]
async fn json_backend_full_cycle() {
    exercise(Engine::open(BackendConfig::json(json_dir())).await.unwrap()).await;
}

#[tokio::test]
async fn sqlite_backend_full_cycle() {
    exercise(Engine::open(BackendConfig::sqlite_in_memory()).await.unwrap()).await;
}

#[tokio::test]
async fn json_backend_survives_reopen() {
    let dir = json_dir();

    {
        let engine = Engine::open(BackendConfig::json(&dir)).await.unwrap();
        engine
            .inventory()
            .create_product(
                NewProduct {
                    name: "Persistent".to_string(),
                    category: String::new(),
                    image: None,
                    stock_min: 0,
                    price: Money::from_cents(100),
                    cost: Money::from_cents(40),
                },
                "tester",
            )
            .await
            .unwrap();
    }

    // A fresh engine over the same directory sees the same records
    let engine = Engine::open(BackendConfig::json(&dir)).await.unwrap();
    let products = engine.inventory().list_products().await.unwrap();
    assert_eq!(products.len(), 1);
    assert_eq!(products[0].name, "Persistent");
    assert_eq!(engine.inventory().get_product(1).await.unwrap().sku, "SKU-00001");
}
