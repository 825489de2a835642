// Analyzer module: price-range filtering of offers and batch summaries.

pub mod price_filter;
pub mod summary;

pub use summary::BatchSummary;
