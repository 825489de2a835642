// Core structs: Row, ColumnMapping, Offer, LookupResult and the per-layer errors
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One procurement line item, exactly as read from the input table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Row {
    pub cells: Vec<String>,
}

impl Row {
    pub fn new(cells: Vec<String>) -> Self {
        Self { cells }
    }

    /// Cell text at `index`; a column the row does not reach reads as empty.
    pub fn cell(&self, index: usize) -> &str {
        self.cells.get(index).map(String::as_str).unwrap_or("")
    }
}

/// Binds the logical roles to column indices of the input table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMapping {
    pub name: usize,
    pub spec: usize,
    pub maker: Option<usize>,
    pub model: Option<usize>,
}

/// Normalized view of a row, recomputed for every resolution.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CleanedRow {
    pub name: String,
    pub spec: String,
    pub maker: String,
    pub model: String,
    pub model_code: String,
}

/// Inclusive price bounds; `max_price == 0` means unbounded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PriceFilter {
    pub min_price: u64,
    pub max_price: u64,
}

/// A single offer returned by the shopping search, cheapest first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Offer {
    pub title: String,
    pub price: u64,
    pub link: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Match {
    pub title: String,
    pub price: u64,
    pub link: String,
    pub matched_query: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SkipReason {
    TooShort,
    Duplicate,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttemptOutcome {
    /// The lookup answered but no offer passed the price filter.
    Offers { returned: usize },
    Failed(LookupError),
    Skipped(SkipReason),
}

/// One candidate query and what happened to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attempt {
    pub query: String,
    pub outcome: AttemptOutcome,
}

impl Attempt {
    pub fn was_sent(&self) -> bool {
        !matches!(self.outcome, AttemptOutcome::Skipped(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MissReason {
    /// At least one lookup answered but nothing fell inside the price range.
    NoneInRange,
    /// Every lookup that was sent failed in transport.
    TransportFailed,
    /// Every candidate was skipped before reaching the lookup.
    NoUsableQuery,
    /// The lookup collaborator broke its contract (panicked).
    Fault(String),
}

impl MissReason {
    /// Marker written to the result sink in place of a matched query.
    pub fn marker(&self) -> String {
        match self {
            MissReason::NoneInRange => "no result in range".to_string(),
            MissReason::TransportFailed => "lookup failed".to_string(),
            MissReason::NoUsableQuery => "no usable query".to_string(),
            MissReason::Fault(msg) => format!("error: {}", msg),
        }
    }

    /// Whether a resumed batch should try the row again.
    pub fn is_retryable(&self) -> bool {
        matches!(self, MissReason::TransportFailed | MissReason::Fault(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Miss {
    pub reason: MissReason,
    pub attempts: Vec<Attempt>,
}

impl Miss {
    pub fn attempted_queries(&self) -> Vec<&str> {
        self.attempts
            .iter()
            .filter(|a| a.was_sent())
            .map(|a| a.query.as_str())
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LookupResult {
    Found(Match),
    NotFound(Miss),
}

impl LookupResult {
    pub fn is_found(&self) -> bool {
        matches!(self, LookupResult::Found(_))
    }

    /// Matched query for a hit, failure marker for a miss.
    pub fn query_or_marker(&self) -> String {
        match self {
            LookupResult::Found(m) => m.matched_query.clone(),
            LookupResult::NotFound(miss) => miss.reason.marker(),
        }
    }
}

/// An entry of the output collection; `index` is the zero-based input row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowResult {
    pub index: usize,
    pub row: Row,
    pub result: LookupResult,
}

#[derive(Debug, Clone, Error, PartialEq, Eq, Serialize, Deserialize)]
pub enum LookupError {
    #[error("HTTP error: {0}")]
    Http(String),
    #[error("request timed out")]
    Timeout,
    #[error("unexpected status {0}")]
    Status(u16),
    #[error("malformed response: {0}")]
    Malformed(String),
}

#[derive(Debug, Error)]
pub enum ParserError {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("missing field: {0}")]
    MissingField(String),
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),
    #[error("corrupt stored result: {0}")]
    Corrupt(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("cannot parse config: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Error)]
pub enum SheetError {
    #[error("cannot open workbook: {0}")]
    Open(#[from] calamine::Error),
    #[error("workbook has no worksheet")]
    NoWorksheet,
    #[error("worksheet is empty")]
    Empty,
    #[error("cannot determine the {role} column: {detail}")]
    Column { role: &'static str, detail: String },
    #[error("cannot write workbook: {0}")]
    Write(#[from] rust_xlsxwriter::XlsxError),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AccessError {
    #[error("an access code is required")]
    Missing,
    #[error("access code rejected")]
    Rejected,
}
