//! Read-only game reference data.
//!
//! Per facility kind, a power curve and a capacity curve indexed by
//! `level - 1`. Lookups never fail: a missing kind, level 0 or a level
//! past the end of a curve all read as zero.

use crate::{save::FacilityKind, types::Level};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FacilityCurve {
    /// Signed power per level. Generators are positive, consumers
    /// are usually recorded as negative draw.
    #[serde(default)]
    pub power:    Vec<i64>,
    /// Maximum concurrently assigned characters per level.
    #[serde(default)]
    pub capacity: Vec<u32>,
}

impl FacilityCurve {
    pub fn new(power: Vec<i64>, capacity: Vec<u32>) -> Self {
        Self { power, capacity }
    }

    pub fn max_level(&self) -> Level {
        self.power.len().max(self.capacity.len()).min(Level::MAX as usize) as Level
    }
}

#[derive(Debug, Clone, Deserialize)]
struct FacilitiesFile {
    facilities: HashMap<FacilityKind, FacilityCurve>,
}

#[derive(Debug, Clone, Default)]
pub struct ReferenceData {
    curves: HashMap<FacilityKind, FacilityCurve>,
}

fn at_level<T: Copy + Default>(values: &[T], level: Level) -> T {
    match level {
        0 => T::default(),
        l => values.get(l as usize - 1).copied().unwrap_or_default(),
    }
}

impl ReferenceData {
    pub fn new(curves: HashMap<FacilityKind, FacilityCurve>) -> Self {
        Self { curves }
    }

    /// Load from `<data_dir>/facilities.json`.
    /// In tests, use ReferenceData::default_test().
    pub fn load(data_dir: &str) -> anyhow::Result<Self> {
        let path = format!("{data_dir}/facilities.json");
        let content = std::fs::read_to_string(&path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        let data = Self::from_json(&content)?;
        log::info!("Loaded reference curves for {} facility kinds from {path}", data.curves.len());
        Ok(data)
    }

    pub fn from_json(content: &str) -> anyhow::Result<Self> {
        let file: FacilitiesFile = serde_json::from_str(content)?;
        Ok(Self::new(file.facilities))
    }

    /// Built-in curves matching data/facilities.json.
    pub fn default_test() -> Self {
        let curves = [
            (FacilityKind::Control,     FacilityCurve::new(vec![0, 0, 0, 0, 0], vec![5, 5, 5, 5, 5])),
            (FacilityKind::Dormitory,   FacilityCurve::new(vec![-10, -20, -30, -45, -65], vec![5, 5, 5, 5, 5])),
            (FacilityKind::Hire,        FacilityCurve::new(vec![-10, -30, -60], vec![1, 1, 1])),
            (FacilityKind::Manufacture, FacilityCurve::new(vec![-10, -30, -60], vec![1, 2, 3])),
            (FacilityKind::Meeting,     FacilityCurve::new(vec![-10, -30, -60], vec![2, 2, 2])),
            (FacilityKind::Power,       FacilityCurve::new(vec![60, 130, 270], vec![1, 1, 1])),
            (FacilityKind::Trading,     FacilityCurve::new(vec![-10, -30, -60], vec![1, 2, 3])),
            (FacilityKind::Training,    FacilityCurve::new(vec![-10, -30, -60], vec![1, 1, 1])),
            (FacilityKind::Workshop,    FacilityCurve::new(vec![-10, -30, -60], vec![])),
        ];
        Self::new(curves.into_iter().collect())
    }

    pub fn curve(&self, kind: FacilityKind) -> Option<&FacilityCurve> {
        self.curves.get(&kind)
    }

    pub fn power_at(&self, kind: FacilityKind, level: Level) -> i64 {
        self.curve(kind).map_or(0, |c| at_level(&c.power, level))
    }

    pub fn capacity_at(&self, kind: FacilityKind, level: Level) -> u32 {
        self.curve(kind).map_or(0, |c| at_level(&c.capacity, level))
    }

    /// Highest level with reference data, or None when the kind is unknown.
    pub fn max_level(&self, kind: FacilityKind) -> Option<Level> {
        self.curve(kind).map(FacilityCurve::max_level)
    }
}
