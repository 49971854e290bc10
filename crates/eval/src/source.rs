//! Readers for the two inputs of an evaluation run.
//!
//! The reconstruction output is a directory holding `TreeStat.csv` (run
//! metadata) and `ConeList.csv` (one row per candidate). Truth events come
//! from any [`TruthSource`]; [`CsvTruthSource`] streams them from a CSV file
//! whose row `n` is entry `n`.

use std::fs::File;
use std::path::{Path, PathBuf};

use crate::config::AxisMapping;
use crate::error::EvalError;
use crate::model::{ReconMeta, ReconTable, ReconstructedCandidate, TruthEvent, Vec3};

pub const TREE_STAT_FILE: &str = "TreeStat.csv";
pub const CONE_LIST_FILE: &str = "ConeList.csv";

// ---------------------------------------------------------------------------
// Truth source capability
// ---------------------------------------------------------------------------

/// Produces a finite, non-restartable sequence of truth events.
pub trait TruthSource {
    type Events: Iterator<Item = Result<TruthEvent, EvalError>>;

    /// Human-readable name for logs and report metadata.
    fn describe(&self) -> String;

    /// Events for entries `start..stop`, in order. Consumes the source.
    fn iterate(self, start: i64, stop: i64) -> Result<Self::Events, EvalError>;
}

/// In-memory truth events; entry `n` is `events[n]`.
#[derive(Debug, Clone, Default)]
pub struct MemoryTruthSource {
    events: Vec<TruthEvent>,
}

impl MemoryTruthSource {
    pub fn new(events: Vec<TruthEvent>) -> Self {
        Self { events }
    }
}

impl TruthSource for MemoryTruthSource {
    type Events = std::iter::Map<
        std::iter::Take<std::iter::Skip<std::vec::IntoIter<TruthEvent>>>,
        fn(TruthEvent) -> Result<TruthEvent, EvalError>,
    >;

    fn describe(&self) -> String {
        format!("memory ({} events)", self.events.len())
    }

    fn iterate(self, start: i64, stop: i64) -> Result<Self::Events, EvalError> {
        let skip = start.max(0) as usize;
        let take = (stop - start).max(0) as usize;
        let wrap: fn(TruthEvent) -> Result<TruthEvent, EvalError> = Ok;
        Ok(self.events.into_iter().skip(skip).take(take).map(wrap))
    }
}

// ---------------------------------------------------------------------------
// CSV truth source
// ---------------------------------------------------------------------------

const TRUTH_TABLE: &str = "truth";

const TRUTH_COLUMNS: [&str; 10] = [
    "is_distributed_clusters",
    "is_ideal_compton",
    "real_e_x",
    "real_e_y",
    "real_e_z",
    "real_p_x",
    "real_p_y",
    "real_p_z",
    "real_e_energy",
    "real_p_energy",
];

/// Streams truth events from a CSV file, one row at a time.
#[derive(Debug, Clone)]
pub struct CsvTruthSource {
    path: PathBuf,
}

impl CsvTruthSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TruthSource for CsvTruthSource {
    type Events = CsvTruthEvents;

    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    fn iterate(self, start: i64, stop: i64) -> Result<Self::Events, EvalError> {
        let file = File::open(&self.path).map_err(|e| EvalError::source_open(&self.path, e))?;
        let mut reader = csv::ReaderBuilder::new().has_headers(true).from_reader(file);
        let headers = reader
            .headers()
            .map_err(|e| EvalError::source_open(&self.path, e))?
            .clone();

        let mut columns = [0usize; 10];
        for (slot, name) in columns.iter_mut().zip(TRUTH_COLUMNS) {
            *slot = column_index(&headers, TRUTH_TABLE, name)?;
        }

        tracing::debug!(path = %self.path.display(), start, stop, "opened truth source");

        Ok(CsvTruthEvents {
            records: reader.into_records(),
            columns,
            row: 0,
            start: start.max(0) as u64,
            stop: stop.max(0) as u64,
        })
    }
}

pub struct CsvTruthEvents {
    records: csv::StringRecordsIntoIter<File>,
    columns: [usize; 10],
    /// Index of the next data row.
    row: u64,
    start: u64,
    stop: u64,
}

impl std::fmt::Debug for CsvTruthEvents {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CsvTruthEvents")
            .field("columns", &self.columns)
            .field("row", &self.row)
            .field("start", &self.start)
            .field("stop", &self.stop)
            .finish_non_exhaustive()
    }
}

impl CsvTruthEvents {
    fn parse(&self, record: &csv::StringRecord, row: u64) -> Result<TruthEvent, EvalError> {
        let c = &self.columns;
        let num = |i: usize| parse_f64(record, c[i], TRUTH_TABLE, row, TRUTH_COLUMNS[i]);
        let flag = |i: usize| parse_bool(record, c[i], TRUTH_TABLE, row, TRUTH_COLUMNS[i]);

        Ok(TruthEvent {
            is_distributed_clusters: flag(0)?,
            is_ideal_compton: flag(1)?,
            real_e_position: Vec3::new(num(2)?, num(3)?, num(4)?),
            real_p_position: Vec3::new(num(5)?, num(6)?, num(7)?),
            real_e_energy: num(8)?,
            real_p_energy: num(9)?,
        })
    }
}

impl Iterator for CsvTruthEvents {
    type Item = Result<TruthEvent, EvalError>;

    fn next(&mut self) -> Option<Self::Item> {
        while self.row < self.stop {
            let row = self.row;
            let record = match self.records.next()? {
                Ok(record) => record,
                Err(e) => {
                    self.row = self.stop;
                    return Some(Err(EvalError::FieldParse {
                        table: TRUTH_TABLE.into(),
                        row,
                        column: "record".into(),
                        value: e.to_string(),
                    }));
                }
            };
            self.row += 1;
            if row < self.start {
                continue;
            }
            return Some(self.parse(&record, row));
        }
        None
    }
}

/// Truth file for a run: `source_dir/InputFilename` when the metadata names
/// one, otherwise `source` itself.
pub fn resolve_truth_path(source: &Path, meta: &ReconMeta) -> PathBuf {
    match &meta.input_filename {
        Some(name) if !name.is_empty() => source.join(name),
        _ => source.to_path_buf(),
    }
}

// ---------------------------------------------------------------------------
// Reconstruction table
// ---------------------------------------------------------------------------

/// Load `TreeStat.csv` and `ConeList.csv` from `dir`, mapping candidate
/// positions into the truth frame.
pub fn load_recon_table(dir: &Path, frame: &AxisMapping) -> Result<ReconTable, EvalError> {
    let stat_path = dir.join(TREE_STAT_FILE);
    let stat_data =
        std::fs::read_to_string(&stat_path).map_err(|e| EvalError::source_open(&stat_path, e))?;
    let meta = parse_tree_stat(&stat_data)?;

    let cone_path = dir.join(CONE_LIST_FILE);
    let cone_data =
        std::fs::read_to_string(&cone_path).map_err(|e| EvalError::source_open(&cone_path, e))?;
    let candidates = parse_cone_list(&cone_data, frame)?;

    tracing::debug!(
        dir = %dir.display(),
        candidates = candidates.len(),
        "loaded reconstruction table"
    );

    Ok(ReconTable { meta, candidates })
}

pub fn parse_tree_stat(csv_data: &str) -> Result<ReconMeta, EvalError> {
    const TABLE: &str = "TreeStat";

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(csv_data.as_bytes());
    let headers = reader.headers().map_err(|e| csv_error(TABLE, e))?.clone();

    let start_idx = column_index(&headers, TABLE, "StartEvent")?;
    let stop_idx = column_index(&headers, TABLE, "StopEvent")?;
    let total_idx = column_index(&headers, TABLE, "TotalSimNev")?;
    let input_idx = headers.iter().position(|h| h == "InputFilename");

    let record = match reader.records().next() {
        Some(record) => record.map_err(|e| csv_error(TABLE, e))?,
        None => return Err(EvalError::EmptyTable { table: TABLE.into() }),
    };

    Ok(ReconMeta {
        input_filename: input_idx
            .and_then(|i| record.get(i))
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty()),
        start_event: parse_i64(&record, start_idx, TABLE, 0, "StartEvent")?,
        stop_event: parse_i64(&record, stop_idx, TABLE, 0, "StopEvent")?,
        total_sim_nev: parse_i64(&record, total_idx, TABLE, 0, "TotalSimNev")?,
    })
}

pub fn parse_cone_list(
    csv_data: &str,
    frame: &AxisMapping,
) -> Result<Vec<ReconstructedCandidate>, EvalError> {
    const TABLE: &str = "ConeList";

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(csv_data.as_bytes());
    let headers = reader.headers().map_err(|e| csv_error(TABLE, e))?.clone();

    let idx = |name: &str| column_index(&headers, TABLE, name);
    let id_idx = idx("GlobalEventNumber")?;
    let e_idx = [idx("x_1")?, idx("y_1")?, idx("z_1")?, idx("E1")?];
    let p_idx = [idx("x_2")?, idx("y_2")?, idx("z_2")?, idx("E2")?];

    let mut candidates = Vec::new();
    for (row, record) in reader.records().enumerate() {
        let row = row as u64;
        let record = record.map_err(|e| csv_error(TABLE, e))?;
        let num = |i: usize, name: &str| parse_f64(&record, i, TABLE, row, name);

        let e_position = Vec3::new(num(e_idx[0], "x_1")?, num(e_idx[1], "y_1")?, num(e_idx[2], "z_1")?);
        let p_position = Vec3::new(num(p_idx[0], "x_2")?, num(p_idx[1], "y_2")?, num(p_idx[2], "z_2")?);

        candidates.push(ReconstructedCandidate {
            global_event_number: parse_i64(&record, id_idx, TABLE, row, "GlobalEventNumber")?,
            e_position: frame.apply(e_position),
            p_position: frame.apply(p_position),
            e_energy: num(e_idx[3], "E1")?,
            p_energy: num(p_idx[3], "E2")?,
        });
    }

    Ok(candidates)
}

// ---------------------------------------------------------------------------
// Field helpers
// ---------------------------------------------------------------------------

fn column_index(headers: &csv::StringRecord, table: &str, name: &str) -> Result<usize, EvalError> {
    headers
        .iter()
        .position(|h| h.trim() == name)
        .ok_or_else(|| EvalError::MissingColumn {
            table: table.into(),
            column: name.into(),
        })
}

fn csv_error(table: &str, e: csv::Error) -> EvalError {
    EvalError::SourceOpen {
        path: table.into(),
        detail: e.to_string(),
    }
}

fn field<'a>(record: &'a csv::StringRecord, idx: usize) -> &'a str {
    record.get(idx).unwrap_or("").trim()
}

fn parse_error(table: &str, row: u64, column: &str, value: &str) -> EvalError {
    EvalError::FieldParse {
        table: table.into(),
        row,
        column: column.into(),
        value: value.into(),
    }
}

fn parse_f64(
    record: &csv::StringRecord,
    idx: usize,
    table: &str,
    row: u64,
    column: &str,
) -> Result<f64, EvalError> {
    let value = field(record, idx);
    value.parse().map_err(|_| parse_error(table, row, column, value))
}

fn parse_i64(
    record: &csv::StringRecord,
    idx: usize,
    table: &str,
    row: u64,
    column: &str,
) -> Result<i64, EvalError> {
    let value = field(record, idx);
    value.parse().map_err(|_| parse_error(table, row, column, value))
}

fn parse_bool(
    record: &csv::StringRecord,
    idx: usize,
    table: &str,
    row: u64,
    column: &str,
) -> Result<bool, EvalError> {
    match field(record, idx) {
        "1" | "true" | "True" | "TRUE" => Ok(true),
        "0" | "false" | "False" | "FALSE" => Ok(false),
        other => Err(parse_error(table, row, column, other)),
    }
}
