use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Last known fix of one driver, as stored at `drivers/{username}` in the
/// realtime store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriverPosition {
    pub latitude: f64,
    pub longitude: f64,
    pub timestamp: DateTime<Utc>,
}

impl DriverPosition {
    pub fn new(latitude: f64, longitude: f64, timestamp: DateTime<Utc>) -> Self {
        Self {
            latitude,
            longitude,
            timestamp,
        }
    }
}

/// Live driver positions mirrored from the realtime subscription. Updates
/// arrive as whole snapshots; the last snapshot wins, absence means "not
/// currently broadcasting".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DriverFeed {
    drivers: HashMap<String, DriverPosition>,
}

impl DriverFeed {
    /// Replace the whole map. Never a merge: drivers missing from the
    /// snapshot disappear.
    pub fn replace_snapshot(&mut self, snapshot: HashMap<String, DriverPosition>) {
        self.drivers = snapshot;
    }

    pub fn remove(&mut self, driver_id: &str) {
        self.drivers.remove(driver_id);
    }

    pub fn get(&self, driver_id: &str) -> Option<&DriverPosition> {
        self.drivers.get(driver_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &DriverPosition)> {
        self.drivers.iter()
    }

    pub fn len(&self) -> usize {
        self.drivers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.drivers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn position(latitude: f64, longitude: f64, timestamp: &str) -> DriverPosition {
        DriverPosition::new(
            latitude,
            longitude,
            DateTime::parse_from_rfc3339(timestamp).unwrap().into(),
        )
    }

    #[test]
    fn snapshot_replaces_instead_of_merging() {
        let mut feed = DriverFeed::default();
        feed.replace_snapshot(HashMap::from([
            ("alice".to_string(), position(-7.41, 108.90, "2025-03-01T08:00:00Z")),
            ("bob".to_string(), position(-7.42, 108.91, "2025-03-01T08:00:05Z")),
        ]));
        assert_eq!(feed.len(), 2);

        feed.replace_snapshot(HashMap::from([(
            "bob".to_string(),
            position(-7.43, 108.92, "2025-03-01T08:00:10Z"),
        )]));
        assert!(feed.get("alice").is_none());
        assert_eq!(feed.get("bob").unwrap().latitude, -7.43);
    }

    #[test]
    fn empty_snapshot_clears_the_feed() {
        let mut feed = DriverFeed::default();
        feed.replace_snapshot(HashMap::from([(
            "alice".to_string(),
            position(-7.41, 108.90, "2025-03-01T08:00:00Z"),
        )]));
        feed.replace_snapshot(HashMap::new());
        assert!(feed.is_empty());
    }

    #[test]
    fn remove_drops_a_single_driver() {
        let mut feed = DriverFeed::default();
        feed.replace_snapshot(HashMap::from([(
            "alice".to_string(),
            position(-7.41, 108.90, "2025-03-01T08:00:00Z"),
        )]));
        feed.remove("alice");
        assert!(feed.get("alice").is_none());
    }

    #[test]
    fn position_round_trips_rfc3339_timestamps() {
        let json = r#"{"latitude": -7.413499, "longitude": 108.899023, "timestamp": "2025-03-01T08:00:00Z"}"#;
        let fix: DriverPosition = serde_json::from_str(json).unwrap();
        assert_eq!(fix.latitude, -7.413499);

        let serialized = serde_json::to_string(&fix).unwrap();
        let reparsed: DriverPosition = serde_json::from_str(&serialized).unwrap();
        assert_eq!(reparsed, fix);
    }
}
