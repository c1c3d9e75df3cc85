//! Rolling-window spend tracking and emergency-mode latch
//!
//! Follows the `Arc<State>` + `Mutex`-guarded inner, `Clone`-able handle
//! shape of the gateway's `synapse-billing::circuit::CircuitBreaker`: one
//! small private struct holds every piece of mutable state behind a single
//! lock, and all mutating operations serialize against it.

#![allow(clippy::must_use_candidate)]

mod error;

use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, Mutex};

use cascadeflow_core::money::{round_micro_usd, round_percent};
use cascadeflow_core::time::now;
use cascadeflow_events::{Channel, EventHub};
use jiff::{Timestamp, ToSpan, Zoned};

pub use error::BudgetError;

/// Rolling window a [`BudgetStatus`] is computed over
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Period {
    Daily,
    Weekly,
    Monthly,
}

/// Action an [`AlertThreshold`] performs once crossed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertAction {
    Log,
    Notify,
    EmergencyMode,
}

/// One spend threshold watched by `checkAlerts`
#[derive(Debug, Clone)]
pub struct AlertThreshold {
    /// Unique key; an alert fires at most once per period per key
    pub key: String,
    /// Percent-used, in `[0, 100]`, at which this threshold fires
    pub percentage: f64,
    pub action: AlertAction,
}

/// Static budget configuration
#[derive(Debug, Clone)]
pub struct BudgetConfig {
    pub daily_limit: f64,
    pub weekly_limit: f64,
    pub monthly_limit: f64,
    pub thresholds: Vec<AlertThreshold>,
    /// Providers excluded from routing while emergency mode is latched
    pub disable_providers: BTreeSet<String>,
    pub retention_days: i64,
}

impl Default for BudgetConfig {
    fn default() -> Self {
        Self {
            daily_limit: 0.0,
            weekly_limit: 0.0,
            monthly_limit: 0.0,
            thresholds: Vec::new(),
            disable_providers: BTreeSet::new(),
            retention_days: 90,
        }
    }
}

/// A completed provider call's realized cost, appended to the budget log
#[derive(Debug, Clone)]
pub struct ActualCost {
    pub provider: String,
    pub model: String,
    pub input_tokens: u32,
    pub output_tokens: u32,
    pub total_cost: f64,
    pub timestamp: Timestamp,
}

/// Derived spend snapshot for one [`Period`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BudgetStatus {
    pub period: Period,
    pub limit: f64,
    pub spent: f64,
    pub remaining: f64,
    pub percent_used: f64,
    pub period_start: Timestamp,
    pub period_end: Timestamp,
}

struct State {
    config: BudgetConfig,
    log: Vec<ActualCost>,
    emergency_mode_active: bool,
    fired_alerts: BTreeSet<String>,
}

/// Handle to the shared budget tracker. Cheap to clone; all clones share one lock.
#[derive(Clone)]
pub struct BudgetTracker {
    state: Arc<Mutex<State>>,
    events: Arc<EventHub>,
}

fn period_bounds(period: Period, at: Timestamp) -> (Timestamp, Timestamp) {
    let zoned = Zoned::new(at, jiff::tz::TimeZone::UTC);
    let date = zoned.date();

    let (start_date, span) = match period {
        Period::Daily => (date, 1.day()),
        Period::Weekly => {
            let offset_from_monday = i64::from(date.weekday().to_monday_one_offset()) - 1;
            let monday = date
                .checked_sub(offset_from_monday.days())
                .expect("date within representable range");
            (monday, 1.week())
        }
        Period::Monthly => (date.first_of_month(), 1.month()),
    };

    let start = start_date
        .to_zoned(jiff::tz::TimeZone::UTC)
        .expect("valid calendar date");
    let end = start.checked_add(span).expect("date within representable range");
    (start.timestamp(), end.timestamp())
}

impl BudgetTracker {
    #[must_use]
    pub fn new(config: BudgetConfig, events: Arc<EventHub>) -> Self {
        Self {
            state: Arc::new(Mutex::new(State {
                config,
                log: Vec::new(),
                emergency_mode_active: false,
                fired_alerts: BTreeSet::new(),
            })),
            events,
        }
    }

    /// Append a realized cost and evaluate alert thresholds
    pub fn record_cost(&self, cost: ActualCost) {
        let mut state = self.state.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        state.log.push(cost);
        let fired = Self::check_alerts_locked(&mut state);
        Self::prune_locked(&mut state);
        drop(state);

        for (key, percent_used, action) in fired {
            self.events.publish(
                Channel::Budget,
                "budget_alert",
                serde_json::json!({ "key": key, "percentUsed": percent_used, "action": action }),
            );
        }
    }

    /// Spend snapshot for `period`, computed as of now
    pub fn get_status(&self, period: Period) -> BudgetStatus {
        let state = self.state.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        Self::status_locked(&state, period)
    }

    fn status_locked(state: &State, period: Period) -> BudgetStatus {
        let (period_start, period_end) = period_bounds(period, now());
        let limit = match period {
            Period::Daily => state.config.daily_limit,
            Period::Weekly => state.config.weekly_limit,
            Period::Monthly => state.config.monthly_limit,
        };

        let spent: f64 = state
            .log
            .iter()
            .filter(|c| c.timestamp >= period_start && c.timestamp < period_end)
            .map(|c| c.total_cost)
            .sum();

        let spent = round_micro_usd(spent);
        let remaining = round_micro_usd((limit - spent).max(0.0));
        let percent_used = if limit > 0.0 {
            round_percent(spent / limit * 100.0)
        } else {
            0.0
        };

        BudgetStatus {
            period,
            limit,
            spent,
            remaining,
            percent_used,
            period_start,
            period_end,
        }
    }

    /// Breakdown of spend by provider/model within `period`
    pub fn breakdown(&self, period: Period) -> HashMap<String, f64> {
        let state = self.state.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        let (start, end) = period_bounds(period, now());
        let mut totals: HashMap<String, f64> = HashMap::new();
        for cost in state
            .log
            .iter()
            .filter(|c| c.timestamp >= start && c.timestamp < end)
        {
            *totals.entry(cost.provider.clone()).or_insert(0.0) += cost.total_cost;
        }
        for value in totals.values_mut() {
            *value = round_micro_usd(*value);
        }
        totals
    }

    /// Evaluates every not-yet-fired threshold against current daily spend,
    /// returning `(key, percent_used, action_str)` for each one that fired
    /// this call, so the caller can fan those out to the event hub once the
    /// lock is dropped.
    fn check_alerts_locked(state: &mut State) -> Vec<(String, f64, &'static str)> {
        let daily = Self::status_locked(state, Period::Daily);
        let thresholds = state.config.thresholds.clone();
        let mut fired = Vec::new();

        for threshold in &thresholds {
            if daily.percent_used < threshold.percentage || state.fired_alerts.contains(&threshold.key) {
                continue;
            }
            state.fired_alerts.insert(threshold.key.clone());

            match threshold.action {
                AlertAction::Log => {
                    tracing::info!(key = %threshold.key, percent_used = daily.percent_used, "budget threshold reached");
                }
                AlertAction::Notify => {
                    tracing::warn!(key = %threshold.key, percent_used = daily.percent_used, "budget threshold notification");
                    fired.push((threshold.key.clone(), daily.percent_used, "notify"));
                }
                AlertAction::EmergencyMode => {
                    state.emergency_mode_active = true;
                    tracing::warn!(key = %threshold.key, percent_used = daily.percent_used, "emergency mode latched");
                    fired.push((threshold.key.clone(), daily.percent_used, "emergency_mode"));
                }
            }
        }

        fired
    }

    /// True only when emergency mode is latched and `provider` is on the disable list
    pub fn is_provider_disabled(&self, provider: &str) -> bool {
        let state = self.state.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        state.emergency_mode_active && state.config.disable_providers.contains(provider)
    }

    pub fn is_emergency_mode_active(&self) -> bool {
        let state = self.state.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        state.emergency_mode_active
    }

    fn prune_locked(state: &mut State) {
        let cutoff = now() - jiff::SignedDuration::from_hours(24 * state.config.retention_days);
        state.log.retain(|c| c.timestamp >= cutoff);
    }

    /// Clears fired alert-keys and the emergency latch, for period rollover
    pub fn reset_alerts(&self) {
        let mut state = self.state.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        state.fired_alerts.clear();
        state.emergency_mode_active = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cost(total: f64) -> ActualCost {
        ActualCost {
            provider: "anthropic".to_owned(),
            model: "claude-haiku".to_owned(),
            input_tokens: 100,
            output_tokens: 100,
            total_cost: total,
            timestamp: now(),
        }
    }

    fn hub() -> Arc<EventHub> {
        Arc::new(EventHub::new())
    }

    #[test]
    fn percent_used_rises_with_spend() {
        let tracker = BudgetTracker::new(
            BudgetConfig {
                daily_limit: 5.0,
                ..Default::default()
            },
            hub(),
        );
        tracker.record_cost(cost(4.99));
        let status = tracker.get_status(Period::Daily);
        assert!(status.percent_used < 100.0);

        tracker.record_cost(cost(0.02));
        let status = tracker.get_status(Period::Daily);
        assert!(status.percent_used >= 100.0);
    }

    #[test]
    fn emergency_mode_latches_once_and_disables_listed_providers() {
        let tracker = BudgetTracker::new(
            BudgetConfig {
                daily_limit: 10.0,
                thresholds: vec![AlertThreshold {
                    key: "daily_90".to_owned(),
                    percentage: 90.0,
                    action: AlertAction::EmergencyMode,
                }],
                disable_providers: ["anthropic".to_owned()].into_iter().collect(),
                ..Default::default()
            },
            hub(),
        );

        assert!(!tracker.is_provider_disabled("anthropic"));
        tracker.record_cost(cost(9.5));
        assert!(tracker.is_emergency_mode_active());
        assert!(tracker.is_provider_disabled("anthropic"));
        assert!(!tracker.is_provider_disabled("openai"));
    }

    #[test]
    fn reset_alerts_clears_latch_for_period_rollover() {
        let tracker = BudgetTracker::new(
            BudgetConfig {
                daily_limit: 10.0,
                thresholds: vec![AlertThreshold {
                    key: "daily_90".to_owned(),
                    percentage: 90.0,
                    action: AlertAction::EmergencyMode,
                }],
                ..Default::default()
            },
            hub(),
        );
        tracker.record_cost(cost(9.5));
        assert!(tracker.is_emergency_mode_active());
        tracker.reset_alerts();
        assert!(!tracker.is_emergency_mode_active());
    }

    #[test]
    fn notify_threshold_publishes_a_budget_event() {
        let events = hub();
        let mut sub = events.subscribe(Channel::Budget);
        let tracker = BudgetTracker::new(
            BudgetConfig {
                daily_limit: 10.0,
                thresholds: vec![AlertThreshold {
                    key: "daily_50".to_owned(),
                    percentage: 50.0,
                    action: AlertAction::Notify,
                }],
                ..Default::default()
            },
            events,
        );

        tracker.record_cost(cost(6.0));

        let envelope = sub.try_recv().expect("notify threshold should publish an event");
        assert_eq!(envelope.event_type, "budget_alert");
        assert_eq!(envelope.data["key"], "daily_50");
    }
}
