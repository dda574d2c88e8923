//! One poll cycle: load state, read table, evaluate, notify, save

use crate::config::WatchConfig;
use crate::models::GuestStates;
use crate::notify::Notifier;
use crate::severity::Thresholds;
use crate::source::TableSource;
use crate::store::{prune_stale, StateStore};
use crate::table;
use crate::transition::observe;
use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use std::collections::btree_map::Entry;
use tracing::{debug, info};

// keeps chrono's Duration::hours in range
const MAX_PRUNE_HOURS: u64 = 24 * 365 * 1000;

/// Outcome of a single poll
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PollReport {
    pub guests_seen: usize,
    pub guests_added: usize,
    pub notifications_sent: usize,
    pub notifications_failed: usize,
    pub guests_pruned: usize,
}

pub struct Monitor<N> {
    thresholds: Thresholds,
    notifier: N,
}

impl<N: Notifier> Monitor<N> {
    pub fn new(thresholds: Thresholds, notifier: N) -> Self {
        Self {
            thresholds,
            notifier,
        }
    }

    /// Apply one table to `states`. The table is parsed completely before
    /// anything is notified or mutated, so a malformed table changes nothing.
    pub async fn process(
        &self,
        table_text: &str,
        states: &mut GuestStates,
        now: DateTime<Utc>,
    ) -> Result<PollReport, crate::error::TableError> {
        let guests = table::read_guests(table_text)?;
        let mut report = PollReport {
            guests_seen: guests.len(),
            ..Default::default()
        };

        for guest in &guests {
            let snapshot = match states.entry(guest.id.clone()) {
                Entry::Occupied(entry) => entry.into_mut(),
                Entry::Vacant(entry) => {
                    debug!("Tracking new guest {} ({})", guest.id, guest.name);
                    report.guests_added += 1;
                    entry.insert(Default::default())
                }
            };

            for transition in observe(snapshot, guest, &self.thresholds, now) {
                match self.notifier.notify(&guest.name, &transition.to_string()).await {
                    Ok(()) => report.notifications_sent += 1,
                    Err(_) => report.notifications_failed += 1,
                }
            }
        }

        Ok(report)
    }
}

/// Run a full poll against the configured state file
pub async fn run_once<S, N>(config: &WatchConfig, source: &S, notifier: N) -> Result<PollReport>
where
    S: TableSource,
    N: Notifier,
{
    let store = StateStore::new(&config.state_file);
    let mut states = store.load().await.context("Failed to load previous state")?;

    let table_text = source.fetch().await.context("Failed to read resource table")?;

    let now = Utc::now();
    let monitor = Monitor::new(config.threshold, notifier);
    let mut report = monitor
        .process(&table_text, &mut states, now)
        .await
        .context("Failed to parse resource table")?;

    if let Some(hours) = config.prune_after_hours {
        let max_age = Duration::hours(hours.min(MAX_PRUNE_HOURS) as i64);
        report.guests_pruned = prune_stale(&mut states, max_age, now);
    }

    store
        .save(&states)
        .await
        .context("Failed to write state file")?;

    info!(
        "Poll complete: {} guests ({} new), {} notifications sent, {} failed, {} pruned",
        report.guests_seen,
        report.guests_added,
        report.notifications_sent,
        report.notifications_failed,
        report.guests_pruned
    );
    Ok(report)
}
