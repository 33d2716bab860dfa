//! The tally accounting engine: per-user counts in three windows, share of
//! total, and wall-clock rollover.

use crate::calendar::{days_since, is_first_of_month, is_monday, same_month};
use crate::errors::TallyError;
use crate::models::{PerUserSnapshot, TallyData, UserId, WindowKind, WindowShare, WindowTotals};
use chrono::{DateTime, Utc};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TallyStore {
    data: TallyData,
}

/// Windows cleared by one `maybe_reset_at` call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResetReport {
    pub cleared: Vec<WindowKind>,
}

impl ResetReport {
    pub fn is_empty(&self) -> bool {
        self.cleared.is_empty()
    }
}

impl TallyStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_data(data: TallyData) -> Self {
        Self { data }
    }

    pub fn data(&self) -> &TallyData {
        &self.data
    }

    pub fn count(&self, window: WindowKind, user: UserId) -> u64 {
        self.data.window(window).get(&user).copied().unwrap_or(0)
    }

    pub fn total(&self, window: WindowKind) -> u64 {
        self.data
            .window(window)
            .values()
            .fold(0u64, |acc, count| acc.saturating_add(*count))
    }

    /// Adds `amount` to the user's count in every window and returns where
    /// they now stand. Non-positive amounts are rejected untouched.
    pub fn record(&mut self, user: UserId, amount: i64) -> Result<PerUserSnapshot, TallyError> {
        if amount <= 0 {
            return Err(TallyError::InvalidAmount(amount));
        }
        let amount = amount as u64;

        for window in WindowKind::ALL {
            let entry = self.data.window_mut(window).entry(user).or_insert(0);
            *entry = entry.saturating_add(amount);
        }

        Ok(self.snapshot(user))
    }

    pub fn snapshot(&self, user: UserId) -> PerUserSnapshot {
        PerUserSnapshot {
            user_id: user,
            daily: self.share(WindowKind::Daily, user),
            weekly: self.share(WindowKind::Weekly, user),
            monthly: self.share(WindowKind::Monthly, user),
        }
    }

    pub fn share(&self, window: WindowKind, user: UserId) -> WindowShare {
        let count = self.count(window, user);
        let total = self.total(window);
        WindowShare {
            window,
            count,
            total,
            percent: percent_of(count, total),
        }
    }

    pub fn totals(&self) -> Vec<WindowTotals> {
        WindowKind::ALL
            .into_iter()
            .map(|window| WindowTotals {
                window,
                total: self.total(window),
                participants: self.data.window(window).len(),
                last_reset: self.data.last_reset.get(window),
            })
            .collect()
    }

    /// Clears every window whose period boundary has been crossed and stamps
    /// it with `now`. Repeated calls inside one period are no-ops.
    pub fn maybe_reset_at(&mut self, now: DateTime<Utc>) -> ResetReport {
        let mut report = ResetReport::default();
        for window in WindowKind::ALL {
            if reset_due(window, self.data.last_reset.get(window), now) {
                self.data.window_mut(window).clear();
                self.data.last_reset.set(window, now);
                report.cleared.push(window);
            }
        }
        report
    }
}

/// Boundary rule for one window: enough time has passed since the last
/// reset, and `now` falls on the day the period starts.
pub fn reset_due(window: WindowKind, last: Option<DateTime<Utc>>, now: DateTime<Utc>) -> bool {
    match window {
        // Every UTC instant is at or after that day's midnight, so elapsed
        // time is the whole rule. The window therefore runs from whenever the
        // last check fired (say 14:00 to 14:00), not midnight to midnight.
        WindowKind::Daily => last.is_none_or(|last| days_since(last, now) >= 1),
        WindowKind::Weekly => {
            last.is_none_or(|last| days_since(last, now) >= 7) && is_monday(now)
        }
        WindowKind::Monthly => {
            last.is_none_or(|last| !same_month(last, now)) && is_first_of_month(now)
        }
    }
}

/// `100 * count / total`, rounded to two decimals; 0 for an empty window.
pub fn percent_of(count: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let raw = count as f64 / total as f64 * 100.0;
    (raw * 100.0).round() / 100.0
}
