use crate::config::ToleranceConfig;
use crate::model::{Axis, Criterion, MatchResult, PerCriterion, ReconstructedCandidate, TruthEvent};

/// Compare one truth event against one candidate.
///
/// Spatial criteria are absolute per axis; energy criteria scale with the
/// truth energy. Distances are reported whether or not the match holds.
pub fn evaluate(
    truth: &TruthEvent,
    candidate: &ReconstructedCandidate,
    tolerance: &ToleranceConfig,
) -> MatchResult {
    let criteria = PerCriterion::from_fn(|criterion| check(criterion, truth, candidate, tolerance));
    let matched = criteria.iter().all(|(_, ok)| *ok);

    MatchResult {
        criteria,
        matched,
        e_distance: truth.real_e_position.distance(&candidate.e_position),
        p_distance: truth.real_p_position.distance(&candidate.p_position),
    }
}

fn check(
    criterion: Criterion,
    truth: &TruthEvent,
    candidate: &ReconstructedCandidate,
    tolerance: &ToleranceConfig,
) -> bool {
    let limit = tolerance.limit(criterion);
    let (real, recon) = match criterion {
        Criterion::EPosX | Criterion::EPosY | Criterion::EPosZ => {
            let axis = position_axis(criterion);
            (truth.real_e_position.component(axis), candidate.e_position.component(axis))
        }
        Criterion::PPosX | Criterion::PPosY | Criterion::PPosZ => {
            let axis = position_axis(criterion);
            (truth.real_p_position.component(axis), candidate.p_position.component(axis))
        }
        Criterion::EEnergy => {
            return within_relative(truth.real_e_energy, candidate.e_energy, limit);
        }
        Criterion::PEnergy => {
            return within_relative(truth.real_p_energy, candidate.p_energy, limit);
        }
    };
    (real - recon).abs() <= limit
}

fn position_axis(criterion: Criterion) -> Axis {
    match criterion {
        Criterion::EPosX | Criterion::PPosX => Axis::X,
        Criterion::EPosY | Criterion::PPosY => Axis::Y,
        _ => Axis::Z,
    }
}

fn within_relative(real: f64, recon: f64, fraction: f64) -> bool {
    (real - recon).abs() <= real * fraction
}
