//! Upgrade economy
//!
//! Static catalog plus the purchase protocol that turns energy into levels.
//! Nothing here reads a clock or draws random numbers.

pub mod catalog;
pub mod purchase;

pub use catalog::{UPGRADES, UpgradeCategory, UpgradeDef, UpgradeKind, UpgradeLevels};
pub use purchase::{
    PurchaseError, PurchaseIntent, PurchaseReceipt, UpgradeOffer, cheapest_next_cost, cost_at,
    next_cost, offers, purchase, purchase_kind,
};
