use std::fmt;

/// Broad class of an [`EvalError`], used by callers to pick an exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// An input could not be opened or read.
    Source,
    /// Inputs were readable but violate a precondition of the run.
    Consistency,
    /// Configuration could not be parsed or is out of range.
    Config,
}

#[derive(Debug)]
pub enum EvalError {
    /// Reconstruction or truth file unreadable.
    SourceOpen { path: String, detail: String },
    /// Required column absent from a table header.
    MissingColumn { table: String, column: String },
    /// A field could not be parsed into its expected type.
    FieldParse { table: String, row: u64, column: String, value: String },
    /// A table that must carry at least one row has none.
    EmptyTable { table: String },
    /// `stop - start` does not agree with the simulated event total.
    InvalidBounds { start: i64, stop: i64, total: i64 },
    /// The same `GlobalEventNumber` appears more than once.
    DuplicateIdentifier { id: i64 },
    /// Truth source ended before `stop`.
    TruthExhausted { expected: u64, consumed: u64 },
    /// TOML parse / deserialization error.
    ConfigParse(String),
    /// Config validation error (negative tolerance, bad axis mapping, etc.).
    ConfigValidation(String),
}

impl EvalError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::SourceOpen { .. }
            | Self::MissingColumn { .. }
            | Self::FieldParse { .. }
            | Self::EmptyTable { .. } => ErrorCategory::Source,
            Self::InvalidBounds { .. }
            | Self::DuplicateIdentifier { .. }
            | Self::TruthExhausted { .. } => ErrorCategory::Consistency,
            Self::ConfigParse(_) | Self::ConfigValidation(_) => ErrorCategory::Config,
        }
    }

    pub(crate) fn source_open(path: &std::path::Path, detail: impl fmt::Display) -> Self {
        Self::SourceOpen {
            path: path.display().to_string(),
            detail: detail.to_string(),
        }
    }
}

impl fmt::Display for EvalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SourceOpen { path, detail } => write!(f, "cannot open '{path}': {detail}"),
            Self::MissingColumn { table, column } => {
                write!(f, "table '{table}': missing column '{column}'")
            }
            Self::FieldParse { table, row, column, value } => {
                write!(f, "table '{table}', row {row}: cannot parse {column} '{value}'")
            }
            Self::EmptyTable { table } => write!(f, "table '{table}' has no rows"),
            Self::InvalidBounds { start, stop, total } => write!(
                f,
                "TotalSimNev ({total}) does not match the difference between StartEvent and StopEvent ({start}..{stop})"
            ),
            Self::DuplicateIdentifier { id } => {
                write!(f, "duplicated reconstructed event: GlobalEventNumber {id}")
            }
            Self::TruthExhausted { expected, consumed } => write!(
                f,
                "truth source ended after {consumed} of {expected} events"
            ),
            Self::ConfigParse(msg) => write!(f, "config parse error: {msg}"),
            Self::ConfigValidation(msg) => write!(f, "config validation error: {msg}"),
        }
    }
}

impl std::error::Error for EvalError {}
