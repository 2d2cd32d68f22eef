//! # Domain Types
//!
//! Core domain types for the inventory-sales engine.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                           Domain Types                                  │
//! │                                                                         │
//! │  Product 1 ──── N Variant 1 ──── N SellUnit                             │
//! │     │                │                                                  │
//! │     │ cost basis     │ stock (base units), reserved                     │
//! │     ▼                ▼                                                  │
//! │  Sale ◄──── Cart (transient, never persisted)                           │
//! │   │  lines snapshot price/cost at validation time                       │
//! │   ▼                                                                     │
//! │  AuditEvent  - one per state-changing operation, append-only            │
//! │                                                                         │
//! │  User { username, role }  - Role::Root is the protected role            │
//! │  Settings                 - per-user display preferences                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Dual-Key Identity Pattern
//! Products carry a numeric id (stable, chosen by the inventory manager)
//! and a derived business SKU (`SKU-00042`). Sales are keyed by receipt
//! number. Keys are owned by the domain, never generated by a backend, so
//! records are addressable identically across backends.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::money::Money;

// =============================================================================
// Units of Sale
// =============================================================================

/// How a variant is sold: by piece, by pair, by dozen, by container, or a
/// custom labelled unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitKind {
    Piece,
    Pair,
    Dozen,
    Box,
    Bag,
    Other,
}

impl UnitKind {
    /// Inherent base-unit factor, where one exists. Box, Bag and Other
    /// carry no inherent size and must be given an explicit factor.
    pub const fn default_factor(&self) -> Option<i64> {
        match self {
            UnitKind::Piece => Some(1),
            UnitKind::Pair => Some(2),
            UnitKind::Dozen => Some(12),
            UnitKind::Box | UnitKind::Bag | UnitKind::Other => None,
        }
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            UnitKind::Piece => "piece",
            UnitKind::Pair => "pair",
            UnitKind::Dozen => "dozen",
            UnitKind::Box => "box",
            UnitKind::Bag => "bag",
            UnitKind::Other => "other",
        }
    }
}

impl fmt::Display for UnitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A unit of sale offered by a variant.
///
/// `factor` is the per-variant conversion factor: how many base units one
/// sold unit represents. All stock arithmetic happens in base units; the
/// conversion is applied exactly once, at the cart/adjustment boundary.
///
/// `price` and `cost` override the product's base price/cost for this unit;
/// `None` inherits from the product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SellUnit {
    pub kind: UnitKind,
    pub factor: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<Money>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost: Option<Money>,
    /// Display label, required in practice for `UnitKind::Other`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl SellUnit {
    /// A plain by-the-piece unit with inherited pricing.
    pub fn piece() -> Self {
        SellUnit {
            kind: UnitKind::Piece,
            factor: 1,
            price: None,
            cost: None,
            label: None,
        }
    }

    pub fn new(kind: UnitKind, factor: i64) -> Self {
        SellUnit {
            kind,
            factor,
            price: None,
            cost: None,
            label: None,
        }
    }

    pub fn with_price(mut self, price: Money) -> Self {
        self.price = Some(price);
        self
    }

    pub fn with_cost(mut self, cost: Money) -> Self {
        self.cost = Some(cost);
        self
    }
}

// =============================================================================
// Product & Variant
// =============================================================================

/// A distinguishable purchasable form of a product (size, colour, ...).
///
/// Stock is held in base units and is non-negative at all times; it is
/// mutated only through the inventory manager, never written directly.
/// `reserved` counts base units committed to pending work and is likewise
/// non-negative.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variant {
    pub variant_id: String,
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
    #[serde(default)]
    pub stock: i64,
    #[serde(default)]
    pub reserved: i64,
    pub units: Vec<SellUnit>,
}

impl Variant {
    /// Creates a variant with a fresh id, selling by the piece.
    pub fn new(attributes: BTreeMap<String, String>) -> Self {
        Variant {
            variant_id: new_variant_id(),
            attributes,
            stock: 0,
            reserved: 0,
            units: vec![SellUnit::piece()],
        }
    }

    /// Stock available for sale, in base units.
    pub fn available(&self) -> i64 {
        (self.stock - self.reserved).max(0)
    }

    /// Looks up the sell unit for a kind, if this variant offers it.
    pub fn unit(&self, kind: UnitKind) -> Option<&SellUnit> {
        self.units.iter().find(|u| u.kind == kind)
    }

    /// Display name fragment built from attributes: `(red, 42)`.
    pub fn attribute_summary(&self) -> String {
        let parts: Vec<&str> = self
            .attributes
            .values()
            .map(String::as_str)
            .filter(|v| !v.is_empty())
            .collect();
        if parts.is_empty() {
            String::new()
        } else {
            format!("({})", parts.join(", "))
        }
    }
}

/// Generates a variant id in the form `v_a1b2c3d4`.
pub fn new_variant_id() -> String {
    let hex = Uuid::new_v4().simple().to_string();
    format!("v_{}", &hex[..8])
}

/// A catalog entry. The product itself is a logical container; real stock
/// lives on its variants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: u32,
    pub sku: String,
    pub name: String,
    #[serde(default)]
    pub category: String,
    #[serde(default = "default_image")]
    pub image: String,
    /// Alert threshold: total stock at or below this is "low".
    #[serde(default)]
    pub stock_min: i64,
    /// Base sale price per base unit, inherited by units without their own.
    pub price: Money,
    /// Cost basis per base unit, used for margin and P&L.
    pub cost: Money,
    #[serde(default)]
    pub variants: Vec<Variant>,
}

fn default_image() -> String {
    "default.png".to_string()
}

impl Product {
    /// Derives the business SKU for a product id: `SKU-00042`.
    pub fn sku_for(id: u32) -> String {
        format!("SKU-{id:05}")
    }

    pub fn variant(&self, variant_id: &str) -> Option<&Variant> {
        self.variants.iter().find(|v| v.variant_id == variant_id)
    }

    pub fn variant_mut(&mut self, variant_id: &str) -> Option<&mut Variant> {
        self.variants.iter_mut().find(|v| v.variant_id == variant_id)
    }

    /// Total stock across variants, in base units.
    pub fn total_stock(&self) -> i64 {
        self.variants.iter().map(|v| v.stock).sum()
    }

    /// Available (unreserved) stock across variants, in base units.
    pub fn available_stock(&self) -> i64 {
        self.variants.iter().map(Variant::available).sum()
    }

    pub fn is_low_stock(&self) -> bool {
        self.total_stock() <= self.stock_min
    }

    /// Sale price for one sold unit, honouring unit-level overrides.
    /// Inherited prices are per base unit, so they scale by the factor.
    pub fn unit_price(&self, unit: &SellUnit) -> Money {
        unit.price
            .unwrap_or_else(|| Money::from_cents(self.price.cents() * unit.factor))
    }

    /// Cost basis for one sold unit, honouring unit-level overrides.
    pub fn unit_cost(&self, unit: &SellUnit) -> Money {
        unit.cost
            .unwrap_or_else(|| Money::from_cents(self.cost.cents() * unit.factor))
    }
}

// =============================================================================
// Cart
// =============================================================================

/// One requested line: a variant reference plus a quantity in a sold unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub product_id: u32,
    pub variant_id: String,
    pub unit: UnitKind,
    pub quantity: i64,
}

/// A transient collection of requested lines. Never persisted: a cart is
/// consumed atomically into a `Sale` by checkout, or discarded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cart {
    pub lines: Vec<CartLine>,
}

impl Cart {
    pub fn new() -> Self {
        Cart::default()
    }

    pub fn add(&mut self, line: CartLine) {
        self.lines.push(line);
    }

    pub fn with_line(mut self, line: CartLine) -> Self {
        self.lines.push(line);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }
}

// =============================================================================
// Sale
// =============================================================================

/// A line item in a committed sale.
///
/// Snapshot pattern: sku, name, price and cost are frozen at validation
/// time, so the sale history stays intact when catalog data changes later.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaleLine {
    pub product_id: u32,
    pub sku: String,
    pub name: String,
    pub variant_id: String,
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
    pub unit: UnitKind,
    /// Quantity in the sold unit, as requested.
    pub quantity: i64,
    /// The same quantity converted to base units (quantity x factor).
    pub quantity_base: i64,
    /// Price per sold unit at time of sale (frozen).
    pub unit_price: Money,
    /// Cost per sold unit at time of sale (frozen). `None` only on records
    /// that predate cost snapshots; reports then fall back to the product's
    /// current cost basis.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit_cost: Option<Money>,
    pub line_total: Money,
    pub line_profit: Money,
}

/// An immutable record of a completed transaction.
///
/// Once persisted, lines and totals never change; corrections are new
/// compensating records, not edits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sale {
    /// Receipt number, the sale's stable key: `B000123`.
    pub receipt: String,
    /// Operator identity that performed the checkout.
    pub operator: String,
    pub ts: DateTime<Utc>,
    pub lines: Vec<SaleLine>,
    pub total: Money,
    pub profit: Money,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

// =============================================================================
// Audit
// =============================================================================

/// Categories of audit events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditKind {
    Sale,
    Stock,
    Product,
    User,
    Security,
    System,
}

impl AuditKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            AuditKind::Sale => "sale",
            AuditKind::Stock => "stock",
            AuditKind::Product => "product",
            AuditKind::User => "user",
            AuditKind::Security => "security",
            AuditKind::System => "system",
        }
    }
}

impl fmt::Display for AuditKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether the audited action took effect or was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditOutcome {
    Success,
    Rejected,
}

impl AuditOutcome {
    pub const fn as_str(&self) -> &'static str {
        match self {
            AuditOutcome::Success => "success",
            AuditOutcome::Rejected => "rejected",
        }
    }
}

impl fmt::Display for AuditOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable append-only record: who did what, when, to what entity.
///
/// Timestamps are informational; ordering guarantees come from the
/// backend's append order, not from the clock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEvent {
    pub id: String,
    pub ts: DateTime<Utc>,
    pub actor: String,
    pub kind: AuditKind,
    /// Entity reference: receipt number, SKU, username, ...
    pub target: String,
    pub outcome: AuditOutcome,
    pub message: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub details: BTreeMap<String, String>,
}

impl AuditEvent {
    pub fn new(
        actor: impl Into<String>,
        kind: AuditKind,
        target: impl Into<String>,
        outcome: AuditOutcome,
        message: impl Into<String>,
    ) -> Self {
        AuditEvent {
            id: Uuid::new_v4().to_string(),
            ts: Utc::now(),
            actor: actor.into(),
            kind,
            target: target.into(),
            outcome,
            message: message.into(),
            details: BTreeMap::new(),
        }
    }

    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.details.insert(key.into(), value.into());
        self
    }
}

// =============================================================================
// Users & Roles
// =============================================================================

/// User roles. A closed enumeration: `Root` is the protected role and is
/// structurally un-assignable and un-removable (see [`crate::guard`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Operator,
    Admin,
    Root,
}

impl Role {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Role::Operator => "operator",
            Role::Admin => "admin",
            Role::Root => "root",
        }
    }

    /// The protected super-role.
    pub const fn is_protected(&self) -> bool {
        matches!(self, Role::Root)
    }

    /// Admin-level access (Root implies admin).
    pub const fn is_admin(&self) -> bool {
        matches!(self, Role::Admin | Role::Root)
    }

    /// Parses a role name; tolerant of case and surrounding whitespace.
    pub fn parse(s: &str) -> Option<Role> {
        match s.trim().to_ascii_lowercase().as_str() {
            "operator" => Some(Role::Operator),
            "admin" => Some(Role::Admin),
            "root" => Some(Role::Root),
            _ => None,
        }
    }
}

impl Default for Role {
    fn default() -> Self {
        Role::Operator
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A system user: identity plus exactly one role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub username: String,
    /// Argon2 PHC string; never a plain-text password.
    pub password_hash: String,
    #[serde(default)]
    pub role: Role,
}

// =============================================================================
// Settings
// =============================================================================

/// Per-user display preferences. Loaded at startup, mutated by explicit
/// settings operations; never consulted by the transaction engine's
/// correctness logic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    pub username: String,
    #[serde(default = "default_theme")]
    pub theme: String,
    #[serde(default)]
    pub low_stock_threshold: i64,
}

fn default_theme() -> String {
    "dark".to_string()
}

impl Settings {
    pub fn for_user(username: impl Into<String>) -> Self {
        Settings {
            username: username.into(),
            theme: default_theme(),
            low_stock_threshold: 0,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn product_with_variant() -> Product {
        let mut variant = Variant::new(BTreeMap::from([(
            "color".to_string(),
            "red".to_string(),
        )]));
        variant.stock = 24;
        variant.units.push(SellUnit::new(UnitKind::Dozen, 12));
        Product {
            id: 7,
            sku: Product::sku_for(7),
            name: "Socks".to_string(),
            category: "clothing".to_string(),
            image: "default.png".to_string(),
            stock_min: 5,
            price: Money::from_cents(300),
            cost: Money::from_cents(100),
            variants: vec![variant],
        }
    }

    #[test]
    fn sku_format() {
        assert_eq!(Product::sku_for(7), "SKU-00007");
        assert_eq!(Product::sku_for(12345), "SKU-12345");
    }

    #[test]
    fn unit_kind_factors() {
        assert_eq!(UnitKind::Piece.default_factor(), Some(1));
        assert_eq!(UnitKind::Pair.default_factor(), Some(2));
        assert_eq!(UnitKind::Dozen.default_factor(), Some(12));
        assert_eq!(UnitKind::Box.default_factor(), None);
    }

    #[test]
    fn inherited_unit_price_scales_by_factor() {
        let product = product_with_variant();
        let variant = &product.variants[0];
        let dozen = variant.unit(UnitKind::Dozen).unwrap();
        // No unit-level override: inherits 300 cents/base * 12
        assert_eq!(product.unit_price(dozen).cents(), 3600);
        assert_eq!(product.unit_cost(dozen).cents(), 1200);
    }

    #[test]
    fn unit_price_override_wins() {
        let mut product = product_with_variant();
        product.variants[0].units[1].price = Some(Money::from_cents(3000));
        let variant = &product.variants[0];
        let dozen = variant.unit(UnitKind::Dozen).unwrap();
        assert_eq!(product.unit_price(dozen).cents(), 3000);
    }

    #[test]
    fn available_clamps_at_zero() {
        let mut variant = Variant::new(BTreeMap::new());
        variant.stock = 3;
        variant.reserved = 5;
        assert_eq!(variant.available(), 0);
    }

    #[test]
    fn variant_ids_are_unique_and_prefixed() {
        let a = new_variant_id();
        let b = new_variant_id();
        assert!(a.starts_with("v_") && a.len() == 10);
        assert_ne!(a, b);
    }

    #[test]
    fn role_parse_is_lenient() {
        assert_eq!(Role::parse(" Admin "), Some(Role::Admin));
        assert_eq!(Role::parse("ROOT"), Some(Role::Root));
        assert_eq!(Role::parse("cashier"), None);
    }

    #[test]
    fn protected_role_is_exactly_root() {
        assert!(Role::Root.is_protected());
        assert!(!Role::Admin.is_protected());
        assert!(!Role::Operator.is_protected());
    }

    #[test]
    fn sale_round_trips_through_json() {
        let sale = Sale {
            receipt: "B000001".to_string(),
            operator: "ana".to_string(),
            ts: Utc::now(),
            lines: vec![SaleLine {
                product_id: 7,
                sku: "SKU-00007".to_string(),
                name: "Socks".to_string(),
                variant_id: "v_ab12cd34".to_string(),
                attributes: BTreeMap::new(),
                unit: UnitKind::Pair,
                quantity: 3,
                quantity_base: 6,
                unit_price: Money::from_cents(600),
                unit_cost: Some(Money::from_cents(200)),
                line_total: Money::from_cents(1800),
                line_profit: Money::from_cents(1200),
            }],
            total: Money::from_cents(1800),
            profit: Money::from_cents(1200),
            note: None,
        };
        let json = serde_json::to_string(&sale).unwrap();
        let back: Sale = serde_json::from_str(&json).unwrap();
        assert_eq!(back, sale);
    }
}
