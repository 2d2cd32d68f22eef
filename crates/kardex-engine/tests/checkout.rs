//! End-to-end checkout scenarios over a real backend.

use std::collections::BTreeMap;

use kardex_core::types::{AuditKind, Cart, CartLine, SellUnit, UnitKind};
use kardex_core::{CoreError, Money};
use kardex_engine::{Engine, EngineError, NewProduct};
use kardex_store::BackendConfig;

async fn engine() -> Engine {
    Engine::open(BackendConfig::sqlite_in_memory()).await.unwrap()
}

/// One product, one variant with the given stock, selling piece and pair.
async fn catalog_with_stock(engine: &Engine, stock: i64) -> (u32, String) {
    let product = engine
        .inventory()
        .create_product(
            NewProduct {
                name: "Socks".to_string(),
                category: "clothing".to_string(),
                image: None,
                stock_min: 1,
                price: Money::from_cents(300),
                cost: Money::from_cents(100),
            },
            "tester",
        )
        .await
        .unwrap();

    let variant = engine
        .inventory()
        .add_variant(
            product.id,
            BTreeMap::from([("size".to_string(), "42".to_string())]),
            stock,
            vec![SellUnit::piece(), SellUnit::new(UnitKind::Pair, 2)],
            "tester",
        )
        .await
        .unwrap();

    (product.id, variant.variant_id)
}

fn cart(product_id: u32, variant_id: &str, unit: UnitKind, quantity: i64) -> Cart {
    Cart::new().with_line(CartLine {
        product_id,
        variant_id: variant_id.to_string(),
        unit,
        quantity,
    })
}

#[tokio::test]
async fn successful_checkout_decrements_exactly() {
    let engine = engine().await;
    let (pid, vid) = catalog_with_stock(&engine, 5).await;

    let sale = engine
        .sales()
        .checkout(cart(pid, &vid, UnitKind::Piece, 3), "ana", None)
        .await
        .unwrap();

    assert_eq!(sale.receipt, "B000001");
    assert_eq!(sale.lines.len(), 1);
    assert_eq!(sale.lines[0].quantity_base, 3);
    assert_eq!(sale.total.cents(), 900);
    assert_eq!(sale.profit.cents(), 600);

    let product = engine.inventory().get_product(pid).await.unwrap();
    assert_eq!(product.variant(&vid).unwrap().stock, 2);

    // The ledger holds the sale
    let stored = engine.sales().get_sale("B000001").await.unwrap().unwrap();
    assert_eq!(stored.total, sale.total);
}

#[tokio::test]
async fn failed_checkout_changes_nothing() {
    let engine = engine().await;
    let (pid, vid) = catalog_with_stock(&engine, 2).await;

    let err = engine
        .sales()
        .checkout(cart(pid, &vid, UnitKind::Piece, 3), "ana", None)
        .await
        .unwrap_err();
    match err {
        EngineError::Core(CoreError::InsufficientStock {
            available,
            requested,
            ..
        }) => {
            assert_eq!(available, 2);
            assert_eq!(requested, 3);
        }
        other => panic!("unexpected error: {other}"),
    }

    // Stock untouched, ledger empty
    let product = engine.inventory().get_product(pid).await.unwrap();
    assert_eq!(product.variant(&vid).unwrap().stock, 2);
    assert!(engine.sales().list_sales().await.unwrap().is_empty());
}

#[tokio::test]
async fn conversion_happens_once_at_the_boundary() {
    let engine = engine().await;
    let (pid, vid) = catalog_with_stock(&engine, 10).await;

    // 2 pairs = 4 base units; pair price inherits 300/base * factor 2
    let sale = engine
        .sales()
        .checkout(cart(pid, &vid, UnitKind::Pair, 2), "ana", None)
        .await
        .unwrap();

    assert_eq!(sale.lines[0].quantity_base, 4);
    assert_eq!(sale.lines[0].unit_price.cents(), 600);
    assert_eq!(sale.total.cents(), 1200);

    let product = engine.inventory().get_product(pid).await.unwrap();
    assert_eq!(product.variant(&vid).unwrap().stock, 6);
}

#[tokio::test]
async fn two_lines_on_one_variant_are_validated_together() {
    let engine = engine().await;
    let (pid, vid) = catalog_with_stock(&engine, 5).await;

    // 3 + 3 pieces: each line fits alone, together they exceed stock
    let cart = Cart::new()
        .with_line(CartLine {
            product_id: pid,
            variant_id: vid.clone(),
            unit: UnitKind::Piece,
            quantity: 3,
        })
        .with_line(CartLine {
            product_id: pid,
            variant_id: vid.clone(),
            unit: UnitKind::Piece,
            quantity: 3,
        });

    let err = engine.sales().checkout(cart, "ana", None).await.unwrap_err();
    assert!(matches!(
        err,
        EngineError::Core(CoreError::InsufficientStock { .. })
    ));

    let product = engine.inventory().get_product(pid).await.unwrap();
    assert_eq!(product.variant(&vid).unwrap().stock, 5);
}

#[tokio::test]
async fn empty_cart_is_rejected_before_anything_else() {
    let engine = engine().await;
    let err = engine
        .sales()
        .checkout(Cart::new(), "ana", None)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Core(CoreError::EmptyCart)));
}

#[tokio::test]
async fn receipts_number_sequentially_across_checkouts() {
    let engine = engine().await;
    let (pid, vid) = catalog_with_stock(&engine, 10).await;

    for expected in ["B000001", "B000002", "B000003"] {
        let sale = engine
            .sales()
            .checkout(cart(pid, &vid, UnitKind::Piece, 1), "ana", None)
            .await
            .unwrap();
        assert_eq!(sale.receipt, expected);
    }
}

#[tokio::test]
async fn price_snapshot_survives_catalog_edits() {
    let engine = engine().await;
    let (pid, vid) = catalog_with_stock(&engine, 10).await;

    let sale = engine
        .sales()
        .checkout(cart(pid, &vid, UnitKind::Piece, 1), "ana", None)
        .await
        .unwrap();
    assert_eq!(sale.lines[0].unit_price.cents(), 300);

    // Double the price after the fact
    let mut product = engine.inventory().get_product(pid).await.unwrap();
    product.price = Money::from_cents(600);
    engine.inventory().update_product(product, "ana").await.unwrap();

    let stored = engine.sales().get_sale(&sale.receipt).await.unwrap().unwrap();
    assert_eq!(stored.lines[0].unit_price.cents(), 300);
    assert_eq!(stored.total.cents(), 300);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn concurrent_checkouts_never_oversell() {
    let engine = engine().await;
    let (pid, vid) = catalog_with_stock(&engine, 3).await;

    // Two carts race for the same 3 pieces; the stock lock must let
    // exactly one of them through.
    let first = {
        let engine = engine.clone();
        let vid = vid.clone();
        tokio::spawn(async move {
            engine
                .sales()
                .checkout(cart(pid, &vid, UnitKind::Piece, 3), "ana", None)
                .await
        })
    };
    let second = {
        let engine = engine.clone();
        let vid = vid.clone();
        tokio::spawn(async move {
            engine
                .sales()
                .checkout(cart(pid, &vid, UnitKind::Piece, 3), "luis", None)
                .await
        })
    };

    let first = first.await.unwrap();
    let second = second.await.unwrap();
    assert!(
        first.is_ok() != second.is_ok(),
        "exactly one checkout must win: {first:?} / {second:?}"
    );
    let loser = if first.is_err() { first } else { second };
    assert!(matches!(
        loser.unwrap_err(),
        EngineError::Core(CoreError::InsufficientStock { .. })
    ));

    let product = engine.inventory().get_product(pid).await.unwrap();
    assert_eq!(product.variant(&vid).unwrap().stock, 0);
    assert_eq!(engine.sales().list_sales().await.unwrap().len(), 1);
}

#[tokio::test]
async fn reserved_stock_is_not_sellable() {
    let engine = engine().await;
    let (pid, vid) = catalog_with_stock(&engine, 5).await;

    engine
        .inventory()
        .reserve_stock(pid, &vid, 3, "ana")
        .await
        .unwrap();

    // 5 on hand, 3 reserved: a 3-piece cart sees only 2 available
    let err = engine
        .sales()
        .checkout(cart(pid, &vid, UnitKind::Piece, 3), "ana", None)
        .await
        .unwrap_err();
    match err {
        EngineError::Core(CoreError::InsufficientStock { available, .. }) => {
            assert_eq!(available, 2)
        }
        other => panic!("unexpected error: {other}"),
    }

    // Releasing the reservation makes the same cart go through
    engine
        .inventory()
        .release_reserved(pid, &vid, 3, "ana")
        .await
        .unwrap();
    engine
        .sales()
        .checkout(cart(pid, &vid, UnitKind::Piece, 3), "ana", None)
        .await
        .unwrap();
}

#[tokio::test]
async fn committing_a_reservation_consumes_stock() {
    let engine = engine().await;
    let (pid, vid) = catalog_with_stock(&engine, 5).await;

    engine
        .inventory()
        .reserve_stock(pid, &vid, 2, "ana")
        .await
        .unwrap();
    engine
        .inventory()
        .commit_reserved(pid, &vid, 2, "ana")
        .await
        .unwrap();

    let product = engine.inventory().get_product(pid).await.unwrap();
    let variant = product.variant(&vid).unwrap();
    assert_eq!(variant.stock, 3);
    assert_eq!(variant.reserved, 0);

    // Nothing left to release
    assert!(engine
        .inventory()
        .release_reserved(pid, &vid, 1, "ana")
        .await
        .is_err());

    // Over-reserving is refused outright
    let err = engine
        .inventory()
        .reserve_stock(pid, &vid, 4, "ana")
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        EngineError::Core(CoreError::InsufficientStock { .. })
    ));
}

#[tokio::test]
async fn checkout_leaves_an_audit_trail() {
    let engine = engine().await;
    let (pid, vid) = catalog_with_stock(&engine, 5).await;

    engine
        .sales()
        .checkout(cart(pid, &vid, UnitKind::Piece, 2), "ana", None)
        .await
        .unwrap();

    let events = engine.audit().recent(50).await.unwrap();
    // One Sale event for the receipt...
    assert!(events
        .iter()
        .any(|e| e.kind == AuditKind::Sale && e.target == "B000001"));
    // ...and one Stock event for the sold line
    assert!(events
        .iter()
        .any(|e| e.kind == AuditKind::Stock && e.target == "SKU-00001"));
}
