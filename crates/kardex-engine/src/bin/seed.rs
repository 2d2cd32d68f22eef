//! # Seed Data Generator
//!
//! Provisions a fresh backend with the protected account, a demo staff
//! roster, and a small catalog with variants and sell units.
//!
//! ## Usage
//! ```bash
//! # JSON flat files (default, ./data)
//! cargo run -p kardex-engine --bin seed
//!
//! # SQLite
//! cargo run -p kardex-engine --bin seed -- --backend sqlite --path ./data/kardex.db
//!
//! # JSON in a custom directory
//! cargo run -p kardex-engine --bin seed -- --backend json --path ./demo-data
//! ```

use std::collections::BTreeMap;
use std::env;

use kardex_core::types::{Role, SellUnit, UnitKind, User};
use kardex_core::{Money, PROTECTED_USERNAME};
use kardex_engine::{Engine, NewProduct};
use kardex_store::BackendConfig;

/// Actor name recorded on audit events written during seeding.
const SEED_ACTOR: &str = "seed";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    // Parse command line arguments
    let args: Vec<String> = env::args().collect();

    let mut backend_kind = String::from("json");
    let mut path = String::new();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--backend" | "-b" => {
                if i + 1 < args.len() {
                    backend_kind = args[i + 1].clone();
                    i += 1;
                }
            }
            "--path" | "-p" => {
                if i + 1 < args.len() {
                    path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Kardex Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -b, --backend <json|sqlite>  Backend to seed (default: json)");
                println!("  -p, --path <PATH>            Data dir (json) or db file (sqlite)");
                println!("  -h, --help                   Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    let config = match backend_kind.as_str() {
        "sqlite" => {
            if path.is_empty() {
                path = "./kardex_dev.db".to_string();
            }
            BackendConfig::sqlite(&path)
        }
        _ => {
            if path.is_empty() {
                path = "./data".to_string();
            }
            BackendConfig::json(&path)
        }
    };

    println!("🌱 Kardex Seed Data Generator");
    println!("=============================");
    println!("Backend: {} ({})", backend_kind, path);
    println!();

    let engine = Engine::open(config).await?;
    println!("✓ Backend opened");

    // Idempotence guard: a seeded backend already has the protected user
    if !engine.users().list_users().await?.is_empty() {
        println!("⚠ Backend already has users, skipping seed.");
        println!("  Remove the data to regenerate.");
        return Ok(());
    }

    seed_users(&engine).await?;
    println!("✓ Users seeded (protected account: {PROTECTED_USERNAME})");

    let count = seed_catalog(&engine).await?;
    println!("✓ Catalog seeded ({count} products)");

    println!();
    println!("✓ Seed complete!");
    Ok(())
}

/// The protected account plus a demo admin and operator.
///
/// The protected user is written directly to the store: the user service
/// correctly refuses to ever create a Root account.
async fn seed_users(engine: &Engine) -> Result<(), Box<dyn std::error::Error>> {
    let backend_users = engine.users();

    let root = User {
        username: PROTECTED_USERNAME.to_string(),
        password_hash: kardex_engine::users::hash_password("china2024")?,
        role: Role::Root,
    };
    backend_users.seed_protected(&root).await?;

    backend_users
        .create_user("ana", "admin123", Role::Admin, SEED_ACTOR)
        .await?;
    backend_users
        .create_user("luis", "caja123", Role::Operator, SEED_ACTOR)
        .await?;
    Ok(())
}

async fn seed_catalog(engine: &Engine) -> Result<usize, Box<dyn std::error::Error>> {
    let inventory = engine.inventory();

    let demo: &[(&str, &str, i64, i64, &[(&str, i64)])] = &[
        ("Calcetines térmicos", "ropa", 350, 120, &[("38-40", 48), ("41-43", 60)]),
        ("Guantes de lana", "ropa", 800, 300, &[("M", 24), ("L", 24)]),
        ("Linterna LED", "hogar", 1500, 700, &[("negra", 12)]),
        ("Pilas AA", "hogar", 250, 90, &[("pack", 200)]),
        ("Paraguas plegable", "accesorios", 1200, 450, &[("azul", 15), ("rojo", 10)]),
    ];

    for (name, category, price, cost, variants) in demo {
        let product = inventory
            .create_product(
                NewProduct {
                    name: name.to_string(),
                    category: category.to_string(),
                    image: None,
                    stock_min: 10,
                    price: Money::from_cents(*price),
                    cost: Money::from_cents(*cost),
                },
                SEED_ACTOR,
            )
            .await?;

        for (attr, stock) in variants.iter() {
            let units = vec![
                SellUnit::piece(),
                SellUnit::new(UnitKind::Pair, 2),
                SellUnit::new(UnitKind::Dozen, 12),
            ];
            inventory
                .add_variant(
                    product.id,
                    BTreeMap::from([("tipo".to_string(), attr.to_string())]),
                    *stock,
                    units,
                    SEED_ACTOR,
                )
                .await?;
        }
    }
    Ok(demo.len())
}
