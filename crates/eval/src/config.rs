use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::EvalError;
use crate::model::{Axis, Criterion, Vec3};

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EvalConfig {
    #[serde(default)]
    pub tolerance: ToleranceConfig,
    /// Transform from the cone-list frame into the truth frame.
    #[serde(default)]
    pub frame: AxisMapping,
}

// ---------------------------------------------------------------------------
// Tolerance
// ---------------------------------------------------------------------------

/// Absolute spatial limits in millimeters and energy limits relative to the
/// truth energy.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct ToleranceConfig {
    pub e_pos_x: f64,
    pub e_pos_y: f64,
    pub e_pos_z: f64,
    pub p_pos_x: f64,
    pub p_pos_y: f64,
    pub p_pos_z: f64,
    pub e_energy: f64,
    pub p_energy: f64,
}

impl Default for ToleranceConfig {
    fn default() -> Self {
        Self {
            e_pos_x: 2.6,
            e_pos_y: 10.0,
            e_pos_z: 2.6,
            p_pos_x: 2.6,
            p_pos_y: 10.0,
            p_pos_z: 2.6,
            e_energy: 0.12,
            p_energy: 0.12,
        }
    }
}

impl ToleranceConfig {
    /// Limit for `criterion`: millimeters for positions, a fraction for energies.
    pub fn limit(&self, criterion: Criterion) -> f64 {
        match criterion {
            Criterion::EPosX => self.e_pos_x,
            Criterion::EPosY => self.e_pos_y,
            Criterion::EPosZ => self.e_pos_z,
            Criterion::PPosX => self.p_pos_x,
            Criterion::PPosY => self.p_pos_y,
            Criterion::PPosZ => self.p_pos_z,
            Criterion::EEnergy => self.e_energy,
            Criterion::PEnergy => self.p_energy,
        }
    }

    pub fn limit_mut(&mut self, criterion: Criterion) -> &mut f64 {
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

    pub fn validate(&self) -> Result<(), EvalError> {
        for criterion in Criterion::ALL {
            let value = self.limit(criterion);
            if !value.is_finite() || value < 0.0 {
                return Err(EvalError::ConfigValidation(format!(
                    "tolerance.{criterion} must be a non-negative number, got {value}"
                )));
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Coordinate frame
// ---------------------------------------------------------------------------

/// One output component: a candidate axis, optionally negated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AxisSelector {
    pub axis: Axis,
    pub negate: bool,
}

impl AxisSelector {
    const fn new(axis: Axis, negate: bool) -> Self {
        Self { axis, negate }
    }
}

impl FromStr for AxisSelector {
    type Err = EvalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let (negate, name) = match trimmed.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
        };
        let axis = match name {
            "x" | "X" => Axis::X,
            "y" | "Y" => Axis::Y,
            "z" | "Z" => Axis::Z,
            _ => {
                return Err(EvalError::ConfigValidation(format!(
                    "invalid axis selector '{s}' (expected x, y or z with optional '-')"
                )))
            }
        };
        Ok(Self { axis, negate })
    }
}

impl std::fmt::Display for AxisSelector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.negate {
            f.write_str("-")?;
        }
        f.write_str(self.axis.as_str())
    }
}

/// Signed axis permutation applied to candidate positions.
///
/// Component `i` of the mapped vector is `selectors[i]` read from the
/// candidate vector. Accepts a preset name (`"detector"`, `"identity"`) or an
/// explicit list such as `["-z", "x", "-y"]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(try_from = "AxisMappingRepr")]
pub struct AxisMapping {
    pub selectors: [AxisSelector; 3],
}

impl AxisMapping {
    /// Cone list `(x, y, z)` → truth `(-z, x, -y)`.
    pub const DETECTOR: AxisMapping = AxisMapping {
        selectors: [
            AxisSelector::new(Axis::Z, true),
            AxisSelector::new(Axis::X, false),
            AxisSelector::new(Axis::Y, true),
        ],
    };

    pub const IDENTITY: AxisMapping = AxisMapping {
        selectors: [
            AxisSelector::new(Axis::X, false),
            AxisSelector::new(Axis::Y, false),
            AxisSelector::new(Axis::Z, false),
        ],
    };

    pub fn from_selectors(selectors: [AxisSelector; 3]) -> Result<Self, EvalError> {
        for axis in Axis::ALL {
            let uses = selectors.iter().filter(|s| s.axis == axis).count();
            if uses != 1 {
                let listed: Vec<String> = selectors.iter().map(|s| s.to_string()).collect();
                return Err(EvalError::ConfigValidation(format!(
                    "axis mapping [{}] must use each of x, y, z exactly once",
                    listed.join(", ")
                )));
            }
        }
        Ok(Self { selectors })
    }

    pub fn preset(name: &str) -> Option<Self> {
        match name {
            "detector" => Some(Self::DETECTOR),
            "identity" => Some(Self::IDENTITY),
            _ => None,
        }
    }

    pub fn apply(&self, v: Vec3) -> Vec3 {
        let pick = |s: &AxisSelector| {
            let value = v.component(s.axis);
            if s.negate {
                -value
            } else {
                value
            }
        };
        Vec3::new(
            pick(&self.selectors[0]),
            pick(&self.selectors[1]),
            pick(&self.selectors[2]),
        )
    }
}

impl Default for AxisMapping {
    fn default() -> Self {
        Self::DETECTOR
    }
}

impl std::fmt::Display for AxisMapping {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let [a, b, c] = &self.selectors;
        write!(f, "({a}, {b}, {c})")
    }
}

impl FromStr for AxisMapping {
    type Err = EvalError;

    /// Preset name or comma-separated selectors (`-z,x,-y`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(mapping) = Self::preset(s.trim()) {
            return Ok(mapping);
        }
        let parts: Vec<&str> = s.split(',').collect();
        AxisMapping::try_from(AxisMappingRepr::Axes(
            parts.iter().map(|p| p.to_string()).collect(),
        ))
    }
}

impl Serialize for AxisMapping {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let names: Vec<String> = self.selectors.iter().map(|s| s.to_string()).collect();
        names.serialize(serializer)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum AxisMappingRepr {
    Preset(String),
    Axes(Vec<String>),
}

impl TryFrom<AxisMappingRepr> for AxisMapping {
    type Error = EvalError;

    fn try_from(repr: AxisMappingRepr) -> Result<Self, Self::Error> {
        match repr {
            AxisMappingRepr::Preset(name) => Self::preset(&name).ok_or_else(|| {
                EvalError::ConfigValidation(format!(
                    "unknown frame preset '{name}' (expected \"detector\" or \"identity\")"
                ))
            }),
            AxisMappingRepr::Axes(names) => {
                if names.len() != 3 {
                    return Err(EvalError::ConfigValidation(format!(
                        "axis mapping needs 3 selectors, got {}",
                        names.len()
                    )));
                }
                let selectors = [names[0].parse()?, names[1].parse()?, names[2].parse()?];
                Self::from_selectors(selectors)
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl EvalConfig {
    pub fn from_toml(input: &str) -> Result<Self, EvalError> {
        let config: EvalConfig =
            toml::from_str(input).map_err(|e| EvalError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), EvalError> {
        self.tolerance.validate()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
