use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::types::{Money, Percent, PlanId};

/// How the carrier's plan fee is deducted from the discounted sale price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum FeeRule {
    /// Flat amount subtracted once.
    Fixed(Money),
    /// Percentage points of the discounted price.
    Percentage(Percent),
}

/// A percentage share and ordinal position within a plan's payout schedule.
///
/// Shares are not required to sum to 100: partial payout plans are allowed
/// and validation is left to the catalog's maintainers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InstallmentDef {
    /// 1-based position in the payout schedule.
    pub number: u32,
    pub share: Percent,
}

/// Commission template governing a sale's pricing and installment breakdown.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Plan {
    pub id: PlanId,
    pub carrier: String,
    /// Product line, e.g. "PME" or "PF (Odonto)". Free-form reference data.
    pub kind: String,
    /// Total commission over the plan's lifetime, in percentage points.
    pub commission_total: Percent,
    pub fee_rule: FeeRule,
    /// Kept sorted ascending by installment number by [`PlanCatalog::insert`].
    pub installments: Vec<InstallmentDef>,
}

/// In-memory lookup of the static plan reference data.
#[derive(Debug, Default)]
pub struct PlanCatalog {
    plans: HashMap<PlanId, Plan>,
}

impl PlanCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces a plan, normalizing its installment ordering.
    pub fn insert(&mut self, mut plan: Plan) {
        plan.installments.sort_by_key(|def| def.number);
        self.plans.insert(plan.id, plan);
    }

    pub fn get(&self, id: &PlanId) -> Option<&Plan> {
        self.plans.get(id)
    }

    pub fn len(&self) -> usize {
        self.plans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plans.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Plan> {
        self.plans.values()
    }
}
