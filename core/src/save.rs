//! The save document: the full editable state of one base layout.
//!
//! Field names follow the persisted JSON shape (camelCase, `char` for
//! character ids) so documents written by older builds still load.

use crate::types::{Level, SaveName, Timestamp};
use serde::{Deserialize, Serialize};

/// A persisted save as seen by the save list. Superseded wholesale
/// on every re-enumeration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveDescriptor {
    pub name:     SaveName,
    pub created:  Timestamp,
    pub modified: Timestamp,
}

/// Every kind of buildable facility in the base.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FacilityKind {
    Control,
    Dormitory,
    Hire,
    Manufacture,
    Meeting,
    Power,
    Trading,
    Training,
    Workshop,
}

impl FacilityKind {
    pub const ALL: [FacilityKind; 9] = [
        FacilityKind::Control,
        FacilityKind::Dormitory,
        FacilityKind::Hire,
        FacilityKind::Manufacture,
        FacilityKind::Meeting,
        FacilityKind::Power,
        FacilityKind::Trading,
        FacilityKind::Training,
        FacilityKind::Workshop,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            FacilityKind::Control     => "control",
            FacilityKind::Dormitory   => "dormitory",
            FacilityKind::Hire        => "hire",
            FacilityKind::Manufacture => "manufacture",
            FacilityKind::Meeting     => "meeting",
            FacilityKind::Power       => "power",
            FacilityKind::Trading     => "trading",
            FacilityKind::Training    => "training",
            FacilityKind::Workshop    => "workshop",
        }
    }
}

impl std::str::FromStr for FacilityKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FacilityKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| anyhow::anyhow!("Unknown facility kind '{s}'"))
    }
}

/// A time-bounded assignment of one character to a facility.
/// The range is half-open: `[start, end)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shift {
    #[serde(rename = "char")]
    pub character: String,
    pub start:     u32,
    pub end:       u32,
}

impl Shift {
    pub fn overlaps(&self, start: u32, end: u32) -> bool {
        self.start < end && start < self.end
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Facility {
    pub level:  Level,
    #[serde(default)]
    pub shifts: Vec<Shift>,
}

impl Facility {
    pub fn at_level(level: Level) -> Self {
        Self { level, shifts: Vec::new() }
    }

    pub fn is_built(&self) -> bool {
        self.level > 0
    }

    /// Most existing shifts running at any one moment within `[start, end)`.
    pub fn peak_concurrency(&self, start: u32, end: u32) -> usize {
        // (time, delta): ends sort before starts at the same instant,
        // so touching half-open ranges never count as simultaneous.
        let mut edges: Vec<(u32, i32)> = self
            .shifts
            .iter()
            .filter(|s| s.overlaps(start, end))
            .flat_map(|s| [(s.start.max(start), 1), (s.end.min(end), -1)])
            .collect();
        edges.sort_unstable();

        let mut running = 0i32;
        let mut peak = 0i32;
        for (_, delta) in edges {
            running += delta;
            peak = peak.max(running);
        }
        peak as usize
    }

    /// Whether the existing shifts never exceed `capacity` at once.
    pub fn fits_capacity(&self, capacity: u32) -> bool {
        self.peak_concurrency(0, u32::MAX) <= capacity as usize
    }

    pub fn can_add_shift(&self, shift: &Shift, capacity: u32) -> bool {
        self.is_built()
            && shift.start < shift.end
            && self.peak_concurrency(shift.start, shift.end) < capacity as usize
    }

    /// Append `shift` if the facility has room for it during its range.
    pub fn add_shift(&mut self, shift: Shift, capacity: u32) -> bool {
        if !self.can_add_shift(&shift, capacity) {
            return false;
        }
        self.shifts.push(shift);
        true
    }
}

/// Drone allocation for one column of a boostable facility.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Boost {
    pub drones: u32,
    pub col:    u32,
}

/// One scheduled output record of a boostable facility.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product<P> {
    pub kind:  P,
    #[serde(default)]
    pub start: u32,
    pub end:   u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradingProduct {
    Lmd,
    Orundum,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FactoryProduct {
    Exp200,
    Exp400,
    Exp1000,
    Gold,
    Shard,
}

/// A facility that also carries drone boosts and a production schedule
/// (trading posts and factories).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(bound(deserialize = "P: Deserialize<'de>"))]
pub struct BoostFacility<P> {
    #[serde(flatten)]
    pub facility: Facility,
    #[serde(default)]
    pub boosts:   Vec<Boost>,
    #[serde(default)]
    pub products: Vec<Product<P>>,
}

impl<P> BoostFacility<P> {
    pub fn at_level(level: Level) -> Self {
        Self {
            facility: Facility::at_level(level),
            boosts:   Vec::new(),
            products: Vec::new(),
        }
    }
}

/// A facility that is only ever levelled, never staffed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelOnly {
    pub level: Level,
}

/// The fixed set of facility slots in a base.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Layout {
    pub cc:       Facility,
    pub tp:       Vec<BoostFacility<TradingProduct>>,
    pub fac:      Vec<BoostFacility<FactoryProduct>>,
    pub pp:       Vec<Facility>,
    pub workshop: LevelOnly,
    pub rr:       Facility,
    pub office:   Facility,
    pub train:    LevelOnly,
    pub dorm:     Vec<Facility>,
}

impl Default for Layout {
    fn default() -> Self {
        Self {
            cc:       Facility::at_level(1),
            tp:       Vec::new(),
            fac:      Vec::new(),
            pp:       Vec::new(),
            workshop: LevelOnly::default(),
            rr:       Facility::default(),
            office:   Facility::default(),
            train:    LevelOnly::default(),
            dorm:     Vec::new(),
        }
    }
}

impl Layout {
    /// Every facility instance in the layout with its kind and level,
    /// including unbuilt ones.
    pub fn levels(&self) -> Vec<(FacilityKind, Level)> {
        let mut levels = vec![
            (FacilityKind::Control, self.cc.level),
            (FacilityKind::Workshop, self.workshop.level),
            (FacilityKind::Meeting, self.rr.level),
            (FacilityKind::Hire, self.office.level),
            (FacilityKind::Training, self.train.level),
        ];
        levels.extend(self.tp.iter().map(|f| (FacilityKind::Trading, f.facility.level)));
        levels.extend(self.fac.iter().map(|f| (FacilityKind::Manufacture, f.facility.level)));
        levels.extend(self.pp.iter().map(|f| (FacilityKind::Power, f.level)));
        levels.extend(self.dorm.iter().map(|f| (FacilityKind::Dormitory, f.level)));
        levels
    }

    /// The staffable facility at `index` within the `kind` slot.
    /// Single-instance slots only accept index 0.
    pub fn facility(&self, kind: FacilityKind, index: usize) -> Option<&Facility> {
        match kind {
            FacilityKind::Control     => (index == 0).then_some(&self.cc),
            FacilityKind::Meeting     => (index == 0).then_some(&self.rr),
            FacilityKind::Hire        => (index == 0).then_some(&self.office),
            FacilityKind::Trading     => self.tp.get(index).map(|f| &f.facility),
            FacilityKind::Manufacture => self.fac.get(index).map(|f| &f.facility),
            FacilityKind::Power       => self.pp.get(index),
            FacilityKind::Dormitory   => self.dorm.get(index),
            FacilityKind::Workshop | FacilityKind::Training => None,
        }
    }

    pub fn facility_mut(&mut self, kind: FacilityKind, index: usize) -> Option<&mut Facility> {
        match kind {
            FacilityKind::Control     => (index == 0).then_some(&mut self.cc),
            FacilityKind::Meeting     => (index == 0).then_some(&mut self.rr),
            FacilityKind::Hire        => (index == 0).then_some(&mut self.office),
            FacilityKind::Trading     => self.tp.get_mut(index).map(|f| &mut f.facility),
            FacilityKind::Manufacture => self.fac.get_mut(index).map(|f| &mut f.facility),
            FacilityKind::Power       => self.pp.get_mut(index),
            FacilityKind::Dormitory   => self.dorm.get_mut(index),
            FacilityKind::Workshop | FacilityKind::Training => None,
        }
    }

    /// Whether `index` names an existing facility of `kind`, or the next
    /// room of a multi-instance slot.
    pub fn can_set_level(&self, kind: FacilityKind, index: usize) -> bool {
        match kind {
            FacilityKind::Trading     => index <= self.tp.len(),
            FacilityKind::Manufacture => index <= self.fac.len(),
            FacilityKind::Power       => index <= self.pp.len(),
            FacilityKind::Dormitory   => index <= self.dorm.len(),
            FacilityKind::Control
            | FacilityKind::Meeting
            | FacilityKind::Hire
            | FacilityKind::Workshop
            | FacilityKind::Training  => index == 0,
        }
    }

    /// Set the level of a facility. Multi-instance slots grow by one
    /// when `index` equals their current length, so new rooms can be built.
    pub fn set_level(&mut self, kind: FacilityKind, index: usize, level: Level) -> bool {
        if !self.can_set_level(kind, index) {
            return false;
        }
        match kind {
            FacilityKind::Workshop => self.workshop.level = level,
            FacilityKind::Training => self.train.level = level,
            FacilityKind::Trading if index == self.tp.len() => {
                self.tp.push(BoostFacility::at_level(level));
            }
            FacilityKind::Manufacture if index == self.fac.len() => {
                self.fac.push(BoostFacility::at_level(level));
            }
            FacilityKind::Power if index == self.pp.len() => {
                self.pp.push(Facility::at_level(level));
            }
            FacilityKind::Dormitory if index == self.dorm.len() => {
                self.dorm.push(Facility::at_level(level));
            }
            _ => {
                if let Some(facility) = self.facility_mut(kind, index) {
                    facility.level = level;
                    // Unbuilt facilities host no shifts.
                    if level == 0 {
                        facility.shifts.clear();
                    }
                }
            }
        }
        true
    }
}

/// A character's promotion tier as recorded in the save.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharData {
    #[serde(rename = "char")]
    pub character: String,
    pub tier:      u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveDocument {
    pub layout:    Layout,
    #[serde(default)]
    pub chars:     Vec<CharData>,
    #[serde(default)]
    pub drones:    u32,
    #[serde(default = "default_max_shift")]
    pub max_shift: u32,
    #[serde(default = "default_interval")]
    pub interval:  u32,
}

fn default_max_shift() -> u32 { 3 }
fn default_interval() -> u32 { 1 }

impl Default for SaveDocument {
    fn default() -> Self {
        Self {
            layout:    Layout::default(),
            chars:     Vec::new(),
            drones:    0,
            max_shift: default_max_shift(),
            interval:  default_interval(),
        }
    }
}
