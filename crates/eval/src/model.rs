use serde::Serialize;

use crate::config::{AxisMapping, ToleranceConfig};
use crate::error::EvalError;

// ---------------------------------------------------------------------------
// Geometry
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::X => "x",
            Self::Y => "y",
            Self::Z => "z",
        }
    }
}

/// A point in millimeters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn component(&self, axis: Axis) -> f64 {
        match axis {
            Axis::X => self.x,
            Axis::Y => self.y,
            Axis::Z => self.z,
        }
    }

    /// Euclidean (2-norm) distance to `other`.
    pub fn distance(&self, other: &Vec3) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }
}

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// One simulated event as yielded by a truth source. Its identifier is the
/// stream position, tracked by the pipeline rather than carried here.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TruthEvent {
    pub is_distributed_clusters: bool,
    pub is_ideal_compton: bool,
    pub real_e_position: Vec3,
    pub real_p_position: Vec3,
    pub real_e_energy: f64,
    pub real_p_energy: f64,
}

/// One row of the reconstruction cone list, already mapped into the truth frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReconstructedCandidate {
    pub global_event_number: i64,
    pub e_position: Vec3,
    pub p_position: Vec3,
    pub e_energy: f64,
    pub p_energy: f64,
}

/// Run metadata stored alongside the candidates (`TreeStat`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReconMeta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input_filename: Option<String>,
    pub start_event: i64,
    /// Inclusive.
    pub stop_event: i64,
    pub total_sim_nev: i64,
}

impl ReconMeta {
    /// Half-open `[start, stop)` entry range, checked against `TotalSimNev`.
    ///
    /// Entries are stream positions, so `start` must be non-negative.
    pub fn entry_bounds(&self) -> Result<(i64, i64), EvalError> {
        let start = self.start_event;
        let invalid = || EvalError::InvalidBounds {
            start,
            stop: self.stop_event.saturating_add(1),
            total: self.total_sim_nev,
        };
        if start < 0 {
            return Err(invalid());
        }
        let stop = self.stop_event.checked_add(1).ok_or_else(invalid)?;
        let len = stop.checked_sub(start).ok_or_else(invalid)?;
        if len != self.total_sim_nev || stop < start {
            return Err(invalid());
        }
        Ok((start, stop))
    }
}

/// Pre-loaded reconstruction output.
#[derive(Debug, Clone)]
pub struct ReconTable {
    pub meta: ReconMeta,
    pub candidates: Vec<ReconstructedCandidate>,
}

// ---------------------------------------------------------------------------
// Criteria
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Criterion {
    EPosX,
    EPosY,
    EPosZ,
    PPosX,
    PPosY,
    PPosZ,
    EEnergy,
    PEnergy,
}

impl Criterion {
    pub const ALL: [Criterion; 8] = [
        Criterion::EPosX,
        Criterion::EPosY,
        Criterion::EPosZ,
        Criterion::PPosX,
        Criterion::PPosY,
        Criterion::PPosZ,
        Criterion::EEnergy,
        Criterion::PEnergy,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::EPosX => "e_pos_x",
            Self::EPosY => "e_pos_y",
            Self::EPosZ => "e_pos_z",
            Self::PPosX => "p_pos_x",
            Self::PPosY => "p_pos_y",
            Self::PPosZ => "p_pos_z",
            Self::EEnergy => "e_energy",
            Self::PEnergy => "p_energy",
        }
    }
}

impl std::fmt::Display for Criterion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

/// One value per [`Criterion`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PerCriterion<T> {
    pub e_pos_x: T,
    pub e_pos_y: T,
    pub e_pos_z: T,
    pub p_pos_x: T,
    pub p_pos_y: T,
    pub p_pos_z: T,
    pub e_energy: T,
    pub p_energy: T,
}

impl<T> PerCriterion<T> {
    pub fn from_fn(mut f: impl FnMut(Criterion) -> T) -> Self {
        Self {
            e_pos_x: f(Criterion::EPosX),
            e_pos_y: f(Criterion::EPosY),
            e_pos_z: f(Criterion::EPosZ),
            p_pos_x: f(Criterion::PPosX),
            p_pos_y: f(Criterion::PPosY),
            p_pos_z: f(Criterion::PPosZ),
            e_energy: f(Criterion::EEnergy),
            p_energy: f(Criterion::PEnergy),
        }
    }

    pub fn get(&self, criterion: Criterion) -> &T {
        match criterion {
            Criterion::EPosX => &self.e_pos_x,
            Criterion::EPosY => &self.e_pos_y,
            Criterion::EPosZ => &self.e_pos_z,
            Criterion::PPosX => &self.p_pos_x,
            Criterion::PPosY => &self.p_pos_y,
            Criterion::PPosZ => &self.p_pos_z,
            Criterion::EEnergy => &self.e_energy,
            Criterion::PEnergy => &self.p_energy,
        }
    }

    pub fn get_mut(&mut self, criterion: Criterion) -> &mut T {
        match criterion {
            Criterion::EPosX => &mut self.e_pos_x,
            Criterion::EPosY => &mut self.e_pos_y,
            Criterion::EPosZ => &mut self.e_pos_z,
            Criterion::PPosX => &mut self.p_pos_x,
            Criterion::PPosY => &mut self.p_pos_y,
            Criterion::PPosZ => &mut self.p_pos_z,
            Criterion::EEnergy => &mut self.e_energy,
            Criterion::PEnergy => &mut self.p_energy,
        }
    }

    /// Values in [`Criterion::ALL`] order.
    pub fn iter(&self) -> impl Iterator<Item = (Criterion, &T)> + '_ {
        Criterion::ALL.into_iter().map(move |c| (c, self.get(c)))
    }
}

// ---------------------------------------------------------------------------
// Matching
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MatchResult {
    /// `true` where the criterion holds.
    pub criteria: PerCriterion<bool>,
    pub matched: bool,
    pub e_distance: f64,
    pub p_distance: f64,
}

/// Terminal classification of one truth event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Outcome {
    /// Not distributed across modules; counted as processed only.
    Excluded,
    /// Distributed but not an ideal Compton event.
    ValidOnly,
    /// Ideal Compton event without a reconstructed candidate.
    Missing,
    /// Ideal Compton event compared against its candidate.
    Compared(MatchResult),
}

// ---------------------------------------------------------------------------
// Summary + Output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateStats {
    pub processed: u64,
    pub valid: u64,
    pub compton: u64,
    pub recon_total: u64,
    pub matches: u64,
    /// Ideal Compton events with no candidate at their identifier.
    pub missing: u64,
    /// `matches / compton`; `None` when undefined.
    pub efficiency: Option<f64>,
    /// `matches / recon_total`; `None` when undefined.
    pub purity: Option<f64>,
    pub euclidean_mean: Option<f64>,
    pub euclidean_std: Option<f64>,
    pub distance_samples: u64,
    /// `recon_total` minus the candidates passing each criterion.
    pub mismatches: PerCriterion<u64>,
    /// Per-event failures of each criterion, one per criterion for every missing event.
    pub criterion_failures: PerCriterion<u64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunMeta {
    pub engine_version: String,
    pub run_at: String,
    pub recon: ReconMeta,
    pub truth_source: String,
    pub tolerance: ToleranceConfig,
    pub frame: AxisMapping,
}

#[derive(Debug, Clone, Serialize)]
pub struct EvalReport {
    pub meta: RunMeta,
    pub stats: AggregateStats,
}
