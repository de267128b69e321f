use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// One row of the benchmark dataset. Ordering is never defined on the record itself;
/// it is always supplied through a [`SortColumn`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
}

impl Record {
    pub fn new(id: i64, first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        Self {
            id,
            first_name: first_name.into(),
            last_name: last_name.into(),
        }
    }
}

/// Memoised sort key extracted from a [`Record`].
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum SortKey {
    Id(i64),
    Text(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum SortColumn {
    Id,
    FirstName,
    LastName,
}

impl SortColumn {
    /// Extract the key for this column. Names compare case-insensitively.
    pub fn key(self, record: &Record) -> SortKey {
        match self {
            SortColumn::Id => SortKey::Id(record.id),
            SortColumn::FirstName => SortKey::Text(record.first_name.to_lowercase()),
            SortColumn::LastName => SortKey::Text(record.last_name.to_lowercase()),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SortColumn::Id => "ID",
            SortColumn::FirstName => "FirstName",
            SortColumn::LastName => "LastName",
        }
    }
}

impl fmt::Display for SortColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

impl SortOrder {
    /// Strict "sorts before" relation for this order.
    pub fn is_less<K: Ord + ?Sized>(self, a: &K, b: &K) -> bool {
        match self {
            SortOrder::Ascending => a < b,
            SortOrder::Descending => b < a,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SortOrder::Ascending => "ascending",
            SortOrder::Descending => "descending",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum Algorithm {
    Bubble,
    Insertion,
    Merge,
}

impl Algorithm {
    pub const ALL: [Algorithm; 3] = [Algorithm::Bubble, Algorithm::Insertion, Algorithm::Merge];

    pub fn label(self) -> &'static str {
        match self {
            Algorithm::Bubble => "Bubble Sort",
            Algorithm::Insertion => "Insertion Sort",
            Algorithm::Merge => "Merge Sort",
        }
    }

    /// Whether equal keys keep their input order as part of the contract.
    pub fn is_stable(self) -> bool {
        !matches!(self, Algorithm::Bubble)
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Parameters of a single sort run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    pub algorithm: Algorithm,
    pub column: SortColumn,
    #[serde(default)]
    pub order: SortOrder,
    pub row_limit: usize,
    /// Name of the file (or generator) the dataset came from.
    #[serde(default)]
    pub source: Option<String>,
}

impl RunConfig {
    pub fn new(algorithm: Algorithm, column: SortColumn, row_limit: usize) -> Self {
        Self {
            algorithm,
            column,
            order: SortOrder::Ascending,
            row_limit,
            source: None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunState {
    #[default]
    Idle,
    Running,
    Paused,
    Cancelled,
    Completed,
}

impl RunState {
    /// A sort is in flight (possibly parked).
    pub fn is_active(self) -> bool {
        matches!(self, RunState::Running | RunState::Paused)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum SortEvent {
    RunStarted {
        algorithm: Algorithm,
        column: SortColumn,
        order: SortOrder,
        total: usize,
    },
    Progress {
        processed: usize,
        total: usize,
        #[serde(with = "humantime_serde")]
        elapsed: Duration,
    },
    Paused {
        #[serde(with = "humantime_serde")]
        elapsed: Duration,
    },
    Resumed {
        #[serde(with = "humantime_serde")]
        elapsed: Duration,
    },
    Info(InfoEvent),
    RunCompleted {
        // Boxed: the sorted records make RunResult large.
        result: Box<RunResult>,
    },
    RunCancelled {
        #[serde(with = "humantime_serde")]
        elapsed: Duration,
    },
}

impl SortEvent {
    /// Completed or cancelled: no further events belong to this run.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            SortEvent::RunCompleted { .. } | SortEvent::RunCancelled { .. }
        )
    }
}

/// Structured info events consumed by UI/CLI layers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum InfoEvent {
    Message(String),
    RowLimitClamped { requested: usize, available: usize },
    DatasetLoaded { records: usize, source: String },
}

impl InfoEvent {
    pub fn to_message(&self) -> String {
        match self {
            InfoEvent::Message(msg) => msg.clone(),
            InfoEvent::RowLimitClamped {
                requested,
                available,
            } => format!(
                "Row limit {} exceeds dataset; sorting all {} records",
                requested, available
            ),
            InfoEvent::DatasetLoaded { records, source } => {
                format!("{} records loaded from {}", records, source)
            }
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunResult {
    #[serde(default)]
    pub timestamp_utc: String,
    pub run_id: String,
    pub algorithm: Algorithm,
    pub column: SortColumn,
    #[serde(default)]
    pub order: SortOrder,
    pub record_count: usize,
    #[serde(with = "humantime_serde")]
    pub elapsed: Duration,
    #[serde(default)]
    pub source: Option<String>,
    // Omitted from saved history to keep it small.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub records: Vec<Record>,
}

impl RunResult {
    /// Copy of this result without the sorted records.
    pub fn summary(&self) -> RunResult {
        RunResult {
            records: Vec::new(),
            ..self.clone()
        }
    }
}
