use crate::format::TallyCard;
use crate::serde_utils::{optional_utc, u64_from_str_or_number};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub type UserId = u64;

/// Per-user counts for one window. JSON object keys are strings on disk;
/// serde_json maps them back to integer ids on load.
pub type WindowCounts = BTreeMap<UserId, u64>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WindowKind {
    Daily,
    Weekly,
    Monthly,
}

impl WindowKind {
    pub const ALL: [WindowKind; 3] = [WindowKind::Daily, WindowKind::Weekly, WindowKind::Monthly];

    pub fn label(self) -> &'static str {
        match self {
            WindowKind::Daily => "Daily",
            WindowKind::Weekly => "Weekly",
            WindowKind::Monthly => "Monthly",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LastReset {
    #[serde(default, with = "optional_utc")]
    pub daily: Option<DateTime<Utc>>,
    #[serde(default, with = "optional_utc")]
    pub weekly: Option<DateTime<Utc>>,
    #[serde(default, with = "optional_utc")]
    pub monthly: Option<DateTime<Utc>>,
}

impl LastReset {
    pub fn get(&self, window: WindowKind) -> Option<DateTime<Utc>> {
        match window {
            WindowKind::Daily => self.daily,
            WindowKind::Weekly => self.weekly,
            WindowKind::Monthly => self.monthly,
        }
    }

    pub fn set(&mut self, window: WindowKind, at: DateTime<Utc>) {
        let slot = match window {
            WindowKind::Daily => &mut self.daily,
            WindowKind::Weekly => &mut self.weekly,
            WindowKind::Monthly => &mut self.monthly,
        };
        *slot = Some(at);
    }
}

/// The persisted snapshot: every window plus its last reset stamp.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TallyData {
    #[serde(default)]
    pub daily: WindowCounts,
    #[serde(default)]
    pub weekly: WindowCounts,
    #[serde(default)]
    pub monthly: WindowCounts,
    #[serde(default)]
    pub last_reset: LastReset,
}

impl TallyData {
    pub fn window(&self, window: WindowKind) -> &WindowCounts {
        match window {
            WindowKind::Daily => &self.daily,
            WindowKind::Weekly => &self.weekly,
            WindowKind::Monthly => &self.monthly,
        }
    }

    pub fn window_mut(&mut self, window: WindowKind) -> &mut WindowCounts {
        match window {
            WindowKind::Daily => &mut self.daily,
            WindowKind::Weekly => &mut self.weekly,
            WindowKind::Monthly => &mut self.monthly,
        }
    }
}

/// A user's standing in one window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowShare {
    pub window: WindowKind,
    pub count: u64,
    pub total: u64,
    /// Share of `total`, in percent, rounded to two decimals.
    pub percent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerUserSnapshot {
    pub user_id: UserId,
    pub daily: WindowShare,
    pub weekly: WindowShare,
    pub monthly: WindowShare,
}

impl PerUserSnapshot {
    pub fn windows(&self) -> [&WindowShare; 3] {
        [&self.daily, &self.weekly, &self.monthly]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowTotals {
    pub window: WindowKind,
    pub total: u64,
    pub participants: usize,
    pub last_reset: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TotalsResponse {
    pub windows: Vec<WindowTotals>,
}

/// A chat message forwarded by the gateway.
#[derive(Debug, Deserialize)]
pub struct CommandRequest {
    #[serde(deserialize_with = "u64_from_str_or_number")]
    pub user_id: UserId,
    pub display_name: String,
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct TallyRequest {
    #[serde(deserialize_with = "u64_from_str_or_number")]
    pub user_id: UserId,
    pub display_name: String,
    pub amount: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TallyResponse {
    pub snapshot: PerUserSnapshot,
    pub card: TallyCard,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

/// What the gateway should post back into the channel.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CommandReply {
    Card(TallyResponse),
    Error { message: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn snapshot_keys_are_strings_on_disk_and_integers_in_memory() {
        let mut data = TallyData::default();
        data.daily.insert(123_456_789_012_345_678, 8);
        data.last_reset.daily = Some(Utc.with_ymd_and_hms(2026, 1, 5, 0, 10, 0).unwrap());

        let json = serde_json::to_value(&data).unwrap();
        assert_eq!(json["daily"]["123456789012345678"], 8);
        assert_eq!(json["last_reset"]["daily"], "2026-01-05T00:10:00Z");
        assert!(json["last_reset"]["weekly"].is_null());

        let back: TallyData = serde_json::from_value(json).unwrap();
        assert_eq!(back, data);
    }

    #[test]
    fn missing_sections_default_to_empty() {
        let data: TallyData = serde_json::from_str(r#"{"daily": {"7": 2}}"#).unwrap();
        assert_eq!(data.daily.get(&7), Some(&2));
        assert!(data.weekly.is_empty());
        assert_eq!(data.last_reset, LastReset::default());
    }

    #[test]
    fn non_integer_user_key_is_rejected() {
        let parsed = serde_json::from_str::<TallyData>(r#"{"daily": {"alice": 2}}"#);
        assert!(parsed.is_err());
    }

    #[test]
    fn negative_count_is_rejected() {
        let parsed = serde_json::from_str::<TallyData>(r#"{"weekly": {"7": -1}}"#);
        assert!(parsed.is_err());
    }

    #[test]
    fn request_accepts_string_user_id() {
        let request: TallyRequest = serde_json::from_str(
            r#"{"user_id": "987654321098765432", "display_name": "A", "amount": 3}"#,
        )
        .unwrap();
        assert_eq!(request.user_id, 987_654_321_098_765_432);
    }
}
