use crate::aggregate::StatsAggregator;
use crate::config::EvalConfig;
use crate::error::EvalError;
use crate::index::CandidateIndex;
use crate::matcher::evaluate;
use crate::model::{AggregateStats, EvalReport, Outcome, ReconTable, RunMeta, TruthEvent};
use crate::source::TruthSource;

/// Evaluate `table` against the truth events of `source`.
///
/// All preconditions (entry bounds, unique identifiers) are checked before
/// the source is opened. Either the full pass completes or an error is
/// returned; no partial report is produced.
pub fn run<S: TruthSource>(
    config: &EvalConfig,
    table: ReconTable,
    source: S,
) -> Result<EvalReport, EvalError> {
    config.validate()?;
    let (start, stop) = table.meta.entry_bounds()?;
    let index = CandidateIndex::build(table.candidates)?;

    let truth_source = source.describe();
    tracing::info!(
        truth = %truth_source,
        start,
        stop,
        candidates = index.len(),
        frame = %config.frame,
        "evaluating reconstruction"
    );

    let mut pipeline = Pipeline::new(&index, config, start);
    let expected = (stop - start) as u64;

    for event in source.iterate(start, stop)? {
        pipeline.process(&event?);
        let done = pipeline.processed();
        if progress_due(done, expected) {
            tracing::info!("evaluated {done}/{expected} events");
        }
    }

    if pipeline.processed() != expected {
        return Err(EvalError::TruthExhausted {
            expected,
            consumed: pipeline.processed(),
        });
    }

    let stats = pipeline.finish();
    tracing::info!(
        matches = stats.matches,
        compton = stats.compton,
        "evaluation complete"
    );

    Ok(EvalReport {
        meta: RunMeta {
            engine_version: env!("CARGO_PKG_VERSION").to_string(),
            run_at: chrono::Utc::now().to_rfc3339(),
            recon: table.meta,
            truth_source,
            tolerance: config.tolerance,
            frame: config.frame,
        },
        stats,
    })
}

/// Progress is logged at every tenth of the run; short runs stay quiet.
fn progress_due(done: u64, expected: u64) -> bool {
    expected >= 10 && done % (expected / 10) == 0
}

/// Check the reconstruction table on its own: entry bounds and identifier
/// uniqueness. Returns the half-open entry range.
pub fn check_table(table: &ReconTable) -> Result<(i64, i64), EvalError> {
    let bounds = table.meta.entry_bounds()?;
    CandidateIndex::build(table.candidates.iter().copied())?;
    Ok(bounds)
}

/// Classify one truth event at identifier `id`.
pub fn classify(
    event: &TruthEvent,
    id: i64,
    index: &CandidateIndex,
    config: &EvalConfig,
) -> Outcome {
    if !event.is_distributed_clusters {
        return Outcome::Excluded;
    }
    if !event.is_ideal_compton {
        return Outcome::ValidOnly;
    }
    match index.lookup(id) {
        Some(candidate) => Outcome::Compared(evaluate(event, candidate, &config.tolerance)),
        None => {
            tracing::debug!(id, "ideal Compton event not reconstructed");
            Outcome::Missing
        }
    }
}

/// Single pass over the truth stream. The identifier of each event is its
/// stream position, advanced here in lock-step with consumption.
pub struct Pipeline<'a> {
    index: &'a CandidateIndex,
    config: &'a EvalConfig,
    next_id: i64,
    stats: StatsAggregator,
}

impl<'a> Pipeline<'a> {
    pub fn new(index: &'a CandidateIndex, config: &'a EvalConfig, start_entry: i64) -> Self {
        Self {
            index,
            config,
            next_id: start_entry,
            stats: StatsAggregator::new(index.len() as u64),
        }
    }

    pub fn process(&mut self, event: &TruthEvent) -> Outcome {
        let outcome = classify(event, self.next_id, self.index, self.config);
        self.stats.record(&outcome);
        self.next_id += 1;
        outcome
    }

    pub fn processed(&self) -> u64 {
        self.stats.processed()
    }

    pub fn finish(self) -> AggregateStats {
        self.stats.finalize()
    }
}
