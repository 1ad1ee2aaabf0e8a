//! Power budget over a base layout.
//!
//! consumed: magnitude of every built facility's draw, control center and
//!           power plants excluded.
//! maximum:  magnitude of every power plant's output.
//!
//! Pure; recompute whenever the layout or the reference data changes.

use crate::{reference::ReferenceData, save::{FacilityKind, Layout}};
use serde::Serialize;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PowerBudget {
    pub consumed: i64,
    pub maximum:  i64,
}

impl PowerBudget {
    /// Running total: output left after every consumer is subtracted.
    pub fn remaining(&self) -> i64 {
        self.maximum - self.consumed
    }

    pub fn is_overdrawn(&self) -> bool {
        self.consumed > self.maximum
    }
}

/// The control center never draws power, whatever its curve says.
/// Power plants generate and are counted toward the maximum instead.
fn draws_power(kind: FacilityKind) -> bool {
    !matches!(kind, FacilityKind::Control | FacilityKind::Power)
}

pub fn power_budget(layout: &Layout, reference: &ReferenceData) -> PowerBudget {
    let mut budget = PowerBudget::default();
    for (kind, level) in layout.levels() {
        if level == 0 {
            continue;
        }
        let power = reference.power_at(kind, level).abs();
        if kind == FacilityKind::Power {
            budget.maximum += power;
        } else if draws_power(kind) {
            budget.consumed += power;
        }
    }
    budget
}
