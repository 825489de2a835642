// Batch orchestration: paces rows, resolves them and keeps the checkpoint
use crate::access::AccessGrant;
use crate::model::{CleanedRow, ColumnMapping, LookupResult, Miss, MissReason, PriceFilter, Row, RowResult};
use crate::planner::{build_queries, resolve};
use crate::scraper::OfferLookup;
use crate::sheet::Table;
use crate::storage::{SqliteStorage, StoredResult};

use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use futures::FutureExt;
use std::any::Any;
use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::{interval, Interval, MissedTickBehavior};
use tracing::{debug, error, info, warn};

#[derive(Debug, Clone)]
pub struct BatchOptions {
    pub filter: PriceFilter,
    /// Minimum spacing between the start of two row resolutions.
    pub row_delay: Duration,
    /// Rows resolved at once; results keep input order regardless.
    pub concurrency: usize,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            filter: PriceFilter::default(),
            row_delay: Duration::from_millis(300),
            concurrency: 1,
        }
    }
}

/// Where finished rows are recorded so an interrupted run can pick up again.
pub struct Checkpoint<'a> {
    pub storage: &'a Mutex<SqliteStorage>,
    pub batch_key: String,
    /// Stored results older than this are resolved again.
    pub max_age: Option<Duration>,
}

/// Resolves every row of `table` and returns exactly one result per row, in
/// input order.
///
/// One row's failure never stops the batch: transport faults become misses
/// inside `resolve`, and a panicking lookup becomes a `Fault` miss here.
/// `on_row` sees each result as soon as it is final, in order.
pub async fn run_batch<L, F>(
    _grant: &AccessGrant,
    table: &Table,
    mapping: &ColumnMapping,
    lookup: &L,
    options: &BatchOptions,
    checkpoint: Option<&Checkpoint<'_>>,
    mut on_row: F,
) -> Vec<RowResult>
where
    L: OfferLookup + ?Sized,
    F: FnMut(&RowResult),
{
    let total = table.rows.len();
    let filter = &options.filter;
    let mut stored = match checkpoint {
        Some(cp) => load_stored(cp).await,
        None => HashMap::new(),
    };

    let mut oldest: Option<DateTime<Utc>> = None;
    let jobs: Vec<(usize, &Row, String, Option<LookupResult>)> = table
        .rows
        .iter()
        .enumerate()
        .map(|(index, row)| {
            let fingerprint = row_fingerprint(row, mapping, filter);
            let previous = stored.remove(&index).and_then(|entry| {
                let at = entry.resolved_at;
                let reused = reusable(index, entry, &fingerprint, filter, checkpoint.and_then(|cp| cp.max_age));
                if reused.is_some() {
                    oldest = Some(oldest.map_or(at, |o| o.min(at)));
                }
                reused
            });
            (index, row, fingerprint, previous)
        })
        .collect();

    if let Some(oldest) = oldest {
        let reused = jobs.iter().filter(|job| job.3.is_some()).count();
        info!(
            "Resuming batch: {} of {} rows already resolved (oldest {} min ago)",
            reused,
            total,
            (Utc::now() - oldest).num_minutes()
        );
    }

    let pacer = pacer(options.row_delay);
    let pacer = pacer.as_ref();

    stream::iter(jobs)
        .map(|(index, row, fingerprint, previous)| async move {
            let result = match previous {
                Some(result) => result,
                None => {
                    let result = resolve_guarded(row, mapping, filter, lookup, pacer).await;
                    if let Some(cp) = checkpoint {
                        let saved = cp.storage.lock().await.save_result(&cp.batch_key, index, &fingerprint, &result);
                        if let Err(e) = saved {
                            warn!("Checkpoint save failed for row {}: {}", index + 1, e);
                        }
                    }
                    result
                }
            };
            log_outcome(index, total, &result);
            RowResult { index, row: row.clone(), result }
        })
        .buffered(options.concurrency.max(1))
        .inspect(|entry| on_row(entry))
        .collect()
        .await
}

/// Candidate queries per row, without any lookup.
pub fn plan_table(table: &Table, mapping: &ColumnMapping) -> Vec<Vec<String>> {
    table
        .rows
        .iter()
        .map(|row| build_queries(&CleanedRow::from_row(row, mapping)))
        .collect()
}

fn pacer(delay: Duration) -> Option<Mutex<Interval>> {
    if delay.is_zero() {
        return None;
    }
    let mut ticker = interval(delay);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    Some(Mutex::new(ticker))
}

async fn load_stored(cp: &Checkpoint<'_>) -> HashMap<usize, StoredResult> {
    match cp.storage.lock().await.load_results(&cp.batch_key) {
        Ok(stored) => stored,
        Err(e) => {
            warn!("Checkpoint unreadable, starting from scratch: {}", e);
            HashMap::new()
        }
    }
}

/// Identifies what a result was resolved from: the row cells, the columns
/// they were read through and the price bounds.
fn row_fingerprint(row: &Row, mapping: &ColumnMapping, filter: &PriceFilter) -> String {
    serde_json::json!({
        "cells": row.cells,
        "mapping": [mapping.name, mapping.spec, mapping.maker, mapping.model],
        "filter": filter,
    })
    .to_string()
}

/// A stored result is reused only when it was resolved from the same row
/// under the same mapping and filter, is fresh enough, and is not a miss
/// worth retrying.
fn reusable(
    index: usize,
    stored: StoredResult,
    fingerprint: &str,
    filter: &PriceFilter,
    max_age: Option<Duration>,
) -> Option<LookupResult> {
    if stored.fingerprint != fingerprint {
        debug!("Row {} changed since it was checkpointed, resolving again", index + 1);
        return None;
    }
    if let Some(max_age) = max_age {
        let age = (Utc::now() - stored.resolved_at).to_std().unwrap_or_default();
        if age > max_age {
            debug!("Checkpoint for row {} is {}s old, resolving again", index + 1, age.as_secs());
            return None;
        }
    }
    match &stored.result {
        LookupResult::Found(m) if !filter.accepts(m.price) => None,
        LookupResult::NotFound(miss) if miss.reason.is_retryable() => None,
        _ => Some(stored.result),
    }
}

async fn resolve_guarded<L>(
    row: &Row,
    mapping: &ColumnMapping,
    filter: &PriceFilter,
    lookup: &L,
    pacer: Option<&Mutex<Interval>>,
) -> LookupResult
where
    L: OfferLookup + ?Sized,
{
    if let Some(pacer) = pacer {
        pacer.lock().await.tick().await;
    }
    match AssertUnwindSafe(resolve(row, mapping, filter, lookup)).catch_unwind().await {
        Ok(result) => result,
        Err(payload) => {
            let message = panic_message(payload.as_ref());
            error!("Lookup broke down while resolving row: {}", message);
            LookupResult::NotFound(Miss { reason: MissReason::Fault(message), attempts: Vec::new() })
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "lookup panicked".to_string()
    }
}

fn log_outcome(index: usize, total: usize, result: &LookupResult) {
    match result {
        LookupResult::Found(m) => info!(
            "[{}/{}] {} for '{}': {}",
            index + 1,
            total,
            m.price,
            m.matched_query,
            m.title
        ),
        LookupResult::NotFound(miss) => info!(
            "[{}/{}] {} (tried {:?})",
            index + 1,
            total,
            miss.reason.marker(),
            miss.attempted_queries()
        ),
    }
}
