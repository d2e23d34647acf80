//! Cost curve and the purchase protocol
//!
//! A purchase either debits the cost, bumps the level by one and applies the
//! effect, or changes nothing at all.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::catalog::{UPGRADES, UpgradeCategory, UpgradeDef, UpgradeKind};
use crate::achievements;
use crate::sim::particle::Particle;
use crate::sim::state::GameState;

/// `floor(base × multiplier^level)`
pub fn cost_at(def: &UpgradeDef, level: u32) -> f64 {
    (def.base_cost * def.cost_multiplier.powi(level as i32)).floor()
}

/// Price of the next level, or `None` once capped
pub fn next_cost(state: &GameState, kind: UpgradeKind) -> Option<f64> {
    let def = kind.def();
    let level = state.upgrade_levels.level(kind);
    (level < def.max_level).then(|| cost_at(def, level))
}

/// A request to buy one level of an upgrade
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseIntent {
    pub upgrade_id: String,
    /// Price the UI showed; a mismatch rejects the purchase
    #[serde(default)]
    pub expected_cost: Option<f64>,
}

impl PurchaseIntent {
    pub fn new(upgrade_id: impl Into<String>) -> Self {
        Self {
            upgrade_id: upgrade_id.into(),
            expected_cost: None,
        }
    }

    pub fn with_expected_cost(mut self, cost: f64) -> Self {
        self.expected_cost = Some(cost);
        self
    }
}

/// Outcome of a successful purchase
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseReceipt {
    pub kind: UpgradeKind,
    pub cost: f64,
    pub new_level: u32,
    pub achievement: Option<achievements::Achievement>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PurchaseError {
    /// No upgrade has this id
    UnknownUpgrade(String),
    /// Prerequisites are not met
    Hidden(UpgradeKind),
    MaxLevel { kind: UpgradeKind, level: u32 },
    InsufficientFunds { cost: f64, available: f64 },
    /// The price moved since the intent was created
    StaleCost { expected: f64, actual: f64 },
}

impl fmt::Display for PurchaseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PurchaseError::UnknownUpgrade(id) => write!(f, "Unknown upgrade '{}'", id),
            PurchaseError::Hidden(kind) => write!(f, "Upgrade '{}' is not available yet", kind.id()),
            PurchaseError::MaxLevel { kind, level } => {
                write!(f, "Upgrade '{}' is already at max level {}", kind.id(), level)
            }
            PurchaseError::InsufficientFunds { cost, available } => {
                write!(f, "Need {} energy, have {:.1}", cost, available)
            }
            PurchaseError::StaleCost { expected, actual } => {
                write!(f, "Price changed from {} to {}", expected, actual)
            }
        }
    }
}

impl std::error::Error for PurchaseError {}

/// Buy one level of the upgrade named by `intent`
pub fn purchase(
    state: &mut GameState,
    particles: &mut [Particle],
    intent: &PurchaseIntent,
) -> Result<PurchaseReceipt, PurchaseError> {
    let kind = UpgradeKind::from_id(&intent.upgrade_id)
        .ok_or_else(|| PurchaseError::UnknownUpgrade(intent.upgrade_id.clone()))?;
    purchase_kind(state, particles, kind, intent.expected_cost)
}

pub fn purchase_kind(
    state: &mut GameState,
    particles: &mut [Particle],
    kind: UpgradeKind,
    expected_cost: Option<f64>,
) -> Result<PurchaseReceipt, PurchaseError> {
    let def = kind.def();
    let level = state.upgrade_levels.level(kind);
    if level >= def.max_level {
        return Err(PurchaseError::MaxLevel { kind, level });
    }
    if !kind.is_visible(state) {
        return Err(PurchaseError::Hidden(kind));
    }
    let cost = cost_at(def, level);
    if let Some(expected) = expected_cost
        && expected != cost
    {
        return Err(PurchaseError::StaleCost {
            expected,
            actual: cost,
        });
    }
    if !state.debit(cost) {
        return Err(PurchaseError::InsufficientFunds {
            cost,
            available: state.resource,
        });
    }

    let new_level = level + 1;
    state.upgrade_levels.set(kind, new_level);
    kind.apply(state, particles);
    state.sanitize_resource();
    let achievement = achievements::evaluate_purchase(state, kind);

    log::info!("Purchased {} level {} for {}", def.id, new_level, cost);
    Ok(PurchaseReceipt {
        kind,
        cost,
        new_level,
        achievement,
    })
}

/// Read-only view of one upgrade for the UI
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpgradeOffer {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub category: UpgradeCategory,
    /// Panel heading the UI groups this offer under
    pub category_label: &'static str,
    pub level: u32,
    pub max_level: u32,
    pub next_cost: Option<f64>,
    pub affordable: bool,
    pub maxed: bool,
}

/// Every visible upgrade in catalog order
pub fn offers(state: &GameState) -> Vec<UpgradeOffer> {
    UPGRADES
        .iter()
        .filter(|def| def.kind.is_visible(state))
        .map(|def| {
            let level = state.upgrade_levels.level(def.kind);
            let next_cost = next_cost(state, def.kind);
            UpgradeOffer {
                id: def.id,
                name: def.name,
                description: def.description,
                category: def.category,
                category_label: def.category.label(),
                level,
                max_level: def.max_level,
                next_cost,
                affordable: next_cost.is_some_and(|c| c <= state.resource),
                maxed: next_cost.is_none(),
            }
        })
        .collect()
}

/// Lowest price among visible, uncapped upgrades
pub fn cheapest_next_cost(state: &GameState) -> Option<f64> {
    UPGRADES
        .iter()
        .filter(|def| def.kind.is_visible(state))
        .filter_map(|def| next_cost(state, def.kind))
        .min_by(f64::total_cmp)
}
