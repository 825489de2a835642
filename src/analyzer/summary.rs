use crate::model::{LookupResult, MissReason, RowResult};

/// Aggregate view of a finished batch, logged once at the end of a run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchSummary {
    pub total: usize,
    pub found: usize,
    pub none_in_range: usize,
    pub transport_failed: usize,
    pub no_usable_query: usize,
    pub faults: usize,
    pub avg_price: f64,
    pub lowest_price: Option<u64>,
    pub highest_price: Option<u64>,
}

impl BatchSummary {
    pub fn from_results(results: &[RowResult]) -> Self {
        let mut summary = Self { total: results.len(), ..Self::default() };
        let mut prices = Vec::new();

        for entry in results {
            match &entry.result {
                LookupResult::Found(m) => {
                    summary.found += 1;
                    prices.push(m.price);
                }
                LookupResult::NotFound(miss) => match miss.reason {
                    MissReason::NoneInRange => summary.none_in_range += 1,
                    MissReason::TransportFailed => summary.transport_failed += 1,
                    MissReason::NoUsableQuery => summary.no_usable_query += 1,
                    MissReason::Fault(_) => summary.faults += 1,
                },
            }
        }

        if !prices.is_empty() {
            summary.avg_price = prices.iter().map(|&p| p as f64).sum::<f64>() / prices.len() as f64;
            summary.lowest_price = prices.iter().copied().min();
            summary.highest_price = prices.iter().copied().max();
        }
        summary
    }

    pub fn missed(&self) -> usize {
        self.total - self.found
    }
}
