use crate::model::{AggregateStats, Criterion, Outcome, PerCriterion};

/// Running counters for one evaluation pass. Fed by the pipeline only.
#[derive(Debug, Clone, Default)]
pub struct StatsAggregator {
    recon_total: u64,
    processed: u64,
    valid: u64,
    compton: u64,
    matches: u64,
    missing: u64,
    passes: PerCriterion<u64>,
    failures: PerCriterion<u64>,
    distances: Vec<f64>,
}

impl StatsAggregator {
    pub fn new(recon_total: u64) -> Self {
        Self {
            recon_total,
            ..Self::default()
        }
    }

    pub fn record(&mut self, outcome: &Outcome) {
        self.processed += 1;

        match outcome {
            Outcome::Excluded => {}
            Outcome::ValidOnly => self.valid += 1,
            Outcome::Missing => {
                self.valid += 1;
                self.compton += 1;
                self.missing += 1;
                for criterion in Criterion::ALL {
                    *self.failures.get_mut(criterion) += 1;
                }
            }
            Outcome::Compared(result) => {
                self.valid += 1;
                self.compton += 1;
                if result.matched {
                    self.matches += 1;
                }
                for (criterion, ok) in result.criteria.iter() {
                    let counter = if *ok {
                        self.passes.get_mut(criterion)
                    } else {
                        self.failures.get_mut(criterion)
                    };
                    *counter += 1;
                }
                self.distances.push(result.e_distance);
                self.distances.push(result.p_distance);
            }
        }
    }

    pub fn processed(&self) -> u64 {
        self.processed
    }

    pub fn finalize(self) -> AggregateStats {
        let (euclidean_mean, euclidean_std) = match population_mean_std(&self.distances) {
            Some((mean, std)) => (Some(mean), Some(std)),
            None => (None, None),
        };
        let recon_total = self.recon_total;

        AggregateStats {
            processed: self.processed,
            valid: self.valid,
            compton: self.compton,
            recon_total,
            matches: self.matches,
            missing: self.missing,
            efficiency: ratio(self.matches, self.compton),
            purity: ratio(self.matches, recon_total),
            euclidean_mean,
            euclidean_std,
            distance_samples: self.distances.len() as u64,
            mismatches: PerCriterion::from_fn(|c| {
                recon_total.saturating_sub(*self.passes.get(c))
            }),
            criterion_failures: self.failures,
        }
    }
}

/// `None` when the denominator is zero.
fn ratio(numerator: u64, denominator: u64) -> Option<f64> {
    if denominator == 0 {
        None
    } else {
        Some(numerator as f64 / denominator as f64)
    }
}

/// Population (not sample-corrected) mean and standard deviation.
fn population_mean_std(samples: &[f64]) -> Option<(f64, f64)> {
    if samples.is_empty() {
        return None;
    }
    let n = samples.len() as f64;
    let mean = samples.iter().sum::<f64>() / n;
    let variance = samples.iter().map(|x| (x - mean) * (x - mean)).sum::<f64>() / n;
    Some((mean, variance.sqrt()))
}
