//! Minimum-interval gate between applied adjustments.
//!
//! The gate owns an append-only log. Only the latest entry per channel key is
//! consulted. Check-then-record is not atomic: hosts sharing one gate across
//! workers must serialize access per channel key.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::CooldownConfig;
use crate::record::ChannelKey;

/// One applied adjustment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CooldownEntry {
    pub channel_key: ChannelKey,
    pub last_adjustment_date: NaiveDate,
}

/// Suppresses re-adjustment of a channel inside its cooldown window.
#[derive(Debug, Clone)]
pub struct CooldownGate {
    min_interval_days: i64,
    log: Vec<CooldownEntry>,
}

impl Default for CooldownGate {
    fn default() -> Self {
        Self::new(&CooldownConfig::default())
    }
}

impl CooldownGate {
    #[must_use]
    pub fn new(config: &CooldownConfig) -> Self {
        Self { min_interval_days: i64::from(config.min_interval_days), log: Vec::new() }
    }

    /// Restores a gate from a previously exported log.
    #[must_use]
    pub fn from_entries(config: &CooldownConfig, entries: Vec<CooldownEntry>) -> Self {
        Self { min_interval_days: i64::from(config.min_interval_days), log: entries }
    }

    #[must_use]
    pub fn min_interval_days(&self) -> i64 {
        self.min_interval_days
    }

    /// Most recent adjustment date recorded for `key`.
    #[must_use]
    pub fn last_adjustment(&self, key: &ChannelKey) -> Option<NaiveDate> {
        self.log
            .iter()
            .rev()
            .find(|entry| &entry.channel_key == key)
            .map(|entry| entry.last_adjustment_date)
    }

    /// False iff the channel was adjusted fewer than `min_interval_days` before `as_of_date`.
    #[must_use]
    pub fn may_adjust(&self, key: &ChannelKey, as_of_date: NaiveDate) -> bool {
        match self.last_adjustment(key) {
            Some(last) => {
                let days = (as_of_date - last).num_days();
                let allowed = days >= self.min_interval_days;
                if !allowed {
                    debug!(channel = %key, days_since = days, "Channel in cooldown");
                }
                allowed
            }
            None => true,
        }
    }

    /// Appends an applied adjustment. Never call this for simulated runs.
    pub fn record_adjustment(&mut self, key: ChannelKey, date: NaiveDate) {
        debug!(channel = %key, %date, "Recorded adjustment");
        self.log.push(CooldownEntry { channel_key: key, last_adjustment_date: date });
    }

    /// Full log, oldest first.
    #[must_use]
    pub fn entries(&self) -> &[CooldownEntry] {
        &self.log
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn key() -> ChannelKey {
        ChannelKey::new("c1", "brand", "search")
    }

    #[test]
    fn test_unknown_channel_may_adjust() {
        let gate = CooldownGate::new(&CooldownConfig::default());
        assert!(gate.may_adjust(&key(), NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()));
    }

    #[test]
    fn test_cooldown_window_boundary() {
        let mut gate = CooldownGate::new(&CooldownConfig::default());
        let d0 = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
        gate.record_adjustment(key(), d0);

        assert!(!gate.may_adjust(&key(), d0));
        assert!(!gate.may_adjust(&key(), d0 + Duration::days(2)));
        assert!(gate.may_adjust(&key(), d0 + Duration::days(3)));
    }

    #[test]
    fn test_latest_entry_wins() {
        let mut gate = CooldownGate::new(&CooldownConfig { min_interval_days: 5 });
        let d0 = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        gate.record_adjustment(key(), d0);
        gate.record_adjustment(key(), d0 + Duration::days(10));

        assert_eq!(gate.last_adjustment(&key()), Some(d0 + Duration::days(10)));
        assert!(!gate.may_adjust(&key(), d0 + Duration::days(12)));
        assert_eq!(gate.entries().len(), 2);
    }

    #[test]
    fn test_gates_are_independent() {
        let d0 = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let mut first = CooldownGate::new(&CooldownConfig::default());
        let second = CooldownGate::new(&CooldownConfig::default());
        first.record_adjustment(key(), d0);
        assert!(!first.may_adjust(&key(), d0));
        assert!(second.may_adjust(&key(), d0));
    }

    #[test]
    fn test_from_entries_restores_state() {
        let d0 = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let entries = vec![CooldownEntry { channel_key: key(), last_adjustment_date: d0 }];
        let gate = CooldownGate::from_entries(&CooldownConfig::default(), entries);
        assert!(!gate.may_adjust(&key(), d0 + Duration::days(1)));
    }
}
