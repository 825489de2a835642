use crate::model::{
    Attempt, AttemptOutcome, CleanedRow, ColumnMapping, LookupResult, Match, Miss, MissReason,
    PriceFilter, Row, SkipReason,
};
use crate::planner::queries::build_queries;
use crate::scraper::OfferLookup;

use std::collections::HashSet;
use tracing::{debug, warn};

/// Candidates shorter than this (in characters, after trimming) are never sent.
pub const MIN_QUERY_CHARS: usize = 2;

/// Resolves one row to the first in-range offer of the first candidate query
/// that has one.
///
/// Candidates are tried strictly in priority order and the search stops at
/// the first accepted offer. A transport failure only disqualifies its own
/// candidate; it never aborts the row.
pub async fn resolve<L>(row: &Row, mapping: &ColumnMapping, filter: &PriceFilter, lookup: &L) -> LookupResult
where
    L: OfferLookup + ?Sized,
{
    let cleaned = CleanedRow::from_row(row, mapping);
    let candidates = build_queries(&cleaned);

    let mut attempts = Vec::with_capacity(candidates.len());
    let mut sent: HashSet<String> = HashSet::new();

    for candidate in candidates {
        let query = candidate.trim().to_string();

        if query.chars().count() < MIN_QUERY_CHARS {
            attempts.push(Attempt { query, outcome: AttemptOutcome::Skipped(SkipReason::TooShort) });
            continue;
        }
        if !sent.insert(query.clone()) {
            attempts.push(Attempt { query, outcome: AttemptOutcome::Skipped(SkipReason::Duplicate) });
            continue;
        }

        match lookup.search(&query).await {
            Ok(offers) => {
                let accepted = filter.first_acceptable(&offers);
                debug!(
                    "Query '{}': {} offers, in range: {}",
                    query,
                    offers.len(),
                    accepted.is_some()
                );
                if let Some(offer) = accepted {
                    return LookupResult::Found(Match {
                        title: offer.title.clone(),
                        price: offer.price,
                        link: offer.link.clone(),
                        matched_query: query,
                    });
                }
                attempts.push(Attempt {
                    query,
                    outcome: AttemptOutcome::Offers { returned: offers.len() },
                });
            }
            Err(e) => {
                warn!("Lookup for '{}' failed, trying next candidate: {}", query, e);
                attempts.push(Attempt { query, outcome: AttemptOutcome::Failed(e) });
            }
        }
    }

    LookupResult::NotFound(Miss { reason: miss_reason(&attempts), attempts })
}

fn miss_reason(attempts: &[Attempt]) -> MissReason {
    let mut sent = attempts.iter().filter(|a| a.was_sent()).peekable();
    if sent.peek().is_none() {
        return MissReason::NoUsableQuery;
    }
    if sent.all(|a| matches!(a.outcome, AttemptOutcome::Failed(_))) {
        MissReason::TransportFailed
    } else {
        MissReason::NoneInRange
    }
}
