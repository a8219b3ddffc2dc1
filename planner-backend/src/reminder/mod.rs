//! Daily reminder scheduler.
//!
//! Polls the clock and emails a digest of the tasks due the day after a
//! trigger time. A trigger is due when its minute overlaps the span since the
//! previous tick, so a late poll still catches it. Each `(day, trigger)` pair
//! fires at most once; the record is kept in memory only, so a restart inside
//! a trigger minute can fire that trigger again.

mod clock;
mod trigger;

pub use clock::{Clock, SystemClock};
pub use trigger::TriggerTime;

use chrono::{Duration as TimeDelta, NaiveDate, NaiveDateTime};
use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::config::ReminderConfig;
use crate::mail::{Notifier, ReminderDelivery};
use crate::store::{StoreError, TaskStore};

#[derive(Debug, Error)]
pub enum ReminderError {
    #[error("could not load due tasks: {0}")]
    Store(#[from] StoreError),
    #[error("no calendar day after {0}")]
    DateOutOfRange(NaiveDate),
    #[error("reminder tick aborted: {0}")]
    Aborted(String),
}

/// Result of one scheduler pass
#[derive(Debug)]
pub enum TickOutcome {
    /// Not a trigger minute
    Idle,
    /// This trigger already fired today
    AlreadyFired(TriggerTime),
    /// Trigger fired but nothing is due tomorrow
    NothingDue { due_date: NaiveDate },
    Delivered(ReminderDelivery),
}

pub struct ReminderScheduler {
    store: Arc<dyn TaskStore>,
    notifier: Arc<Notifier>,
    clock: Arc<dyn Clock>,
    config: ReminderConfig,
    fired: Mutex<HashSet<(NaiveDate, TriggerTime)>>,
    last_tick: Mutex<Option<NaiveDateTime>>,
}

impl ReminderScheduler {
    pub fn new(
        store: Arc<dyn TaskStore>,
        notifier: Arc<Notifier>,
        clock: Arc<dyn Clock>,
        config: ReminderConfig,
    ) -> Self {
        Self {
            store,
            notifier,
            clock,
            config,
            fired: Mutex::new(HashSet::new()),
            last_tick: Mutex::new(None),
        }
    }

    /// Run one pass: fire the latest due trigger, if any, at most once per day
    pub async fn tick(&self) -> Result<TickOutcome, ReminderError> {
        let now = self.clock.now();
        let previous = self.last_tick.lock().replace(now);

        let mut due = self.due_triggers(now, previous);
        let Some((day, trigger)) = due.pop() else {
            return Ok(TickOutcome::Idle);
        };

        // Only the latest trigger is sent; older ones in a long gap are dropped
        for (missed_day, missed) in due {
            if self.mark_fired(missed_day, missed) {
                log::warn!("[REMINDER] Trigger {} on {} superseded by {}", missed, missed_day, trigger);
            }
        }

        // Recorded before any I/O so a slow store or mail server cannot
        // cause a second send within the same trigger minute.
        if !self.mark_fired(day, trigger) {
            return Ok(TickOutcome::AlreadyFired(trigger));
        }

        let due_date = day.succ_opt().ok_or(ReminderError::DateOutOfRange(day))?;
        let due_key = due_date.format("%Y-%m-%d").to_string();
        log::info!("[REMINDER] Trigger {} reached, checking tasks due {}", trigger, due_key);

        let due = self.store.tasks_due_on(&due_key).await?;
        if due.is_empty() {
            log::info!("[REMINDER] Nothing due {}", due_key);
            return Ok(TickOutcome::NothingDue { due_date });
        }

        Ok(TickOutcome::Delivered(self.notifier.send_reminder(&due).await))
    }

    /// Triggers whose minute overlaps `(previous, now]`, oldest first.
    /// Without a previous tick (or after the clock went back) only the
    /// current minute counts.
    fn due_triggers(
        &self,
        now: NaiveDateTime,
        previous: Option<NaiveDateTime>,
    ) -> Vec<(NaiveDate, TriggerTime)> {
        let since = previous.filter(|p| *p <= now).unwrap_or(now);

        let mut due = Vec::new();
        let mut day = since.date();
        while day <= now.date() {
            for &trigger in &self.config.trigger_times {
                if let Some(start) = trigger.on(day) {
                    if start <= now && start + TimeDelta::minutes(1) > since {
                        due.push((start, day, trigger));
                    }
                }
            }
            match day.succ_opt() {
                Some(next) => day = next,
                None => break,
            }
        }

        due.sort();
        due.into_iter().map(|(_, day, trigger)| (day, trigger)).collect()
    }

    /// Record `(today, trigger)`; false if it was already recorded.
    /// Records from earlier days are dropped.
    fn mark_fired(&self, today: NaiveDate, trigger: TriggerTime) -> bool {
        let mut fired = self.fired.lock();
        fired.retain(|(day, _)| *day >= today);
        fired.insert((today, trigger))
    }

    /// Log a tick result and pick the delay before the next one.
    /// A missing backend is expected, so that cycle is skipped quietly.
    fn next_wait(&self, result: &Result<TickOutcome, ReminderError>) -> Duration {
        match result {
            Ok(outcome) => {
                log::debug!("[REMINDER] Tick: {:?}", outcome);
                self.config.poll_interval
            }
            Err(ReminderError::Store(StoreError::Unavailable(reason))) => {
                log::debug!("[REMINDER] No storage backend ({}), skipping reminder", reason);
                self.config.poll_interval
            }
            Err(e) => {
                log::error!("[REMINDER] {}; retrying in {:?}", e, self.config.backoff);
                self.config.backoff
            }
        }
    }

    /// Poll until `cancel` fires. Each tick runs in its own task so a panic is
    /// contained; errors and panics are logged and followed by the backoff delay.
    pub async fn run(self: Arc<Self>, cancel: CancellationToken) {
        let triggers: Vec<String> = self.config.trigger_times.iter().map(|t| t.to_string()).collect();
        log::info!(
            "[REMINDER] Scheduler started (triggers: {}, poll every {:?})",
            triggers.join(", "),
            self.config.poll_interval
        );

        loop {
            let this = Arc::clone(&self);
            let result = tokio::spawn(async move { this.tick().await })
                .await
                .unwrap_or_else(|e| Err(ReminderError::Aborted(e.to_string())));

            let wait = self.next_wait(&result);

            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep(wait) => {}
            }
        }

        log::info!("[REMINDER] Scheduler stopped");
    }
}
