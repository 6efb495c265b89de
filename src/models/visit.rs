use nanoid::nanoid;
use serde::{Deserialize, Serialize};

/// One logged page-view event. Immutable once written; leaves the ledger
/// only via store-side expiry.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct VisitRecord {
    pub ip: String,      // Truncated, coarse anonymization
    pub country: String, // From geolocation metadata
    pub city: String,
    pub path: String, // The visited page path
    #[serde(rename = "userAgent")]
    pub user_agent: String,
    pub referer: String,
    pub traffic: f64,   // Caller-supplied weight
    pub timestamp: i64, // Epoch milliseconds, server-assigned
}

impl VisitRecord {
    pub fn new(
        ip: &str,
        country: &str,
        city: &str,
        path: String,
        user_agent: &str,
        referer: &str,
        traffic: f64,
    ) -> Self {
        Self {
            ip: truncate_chars(ip, 15),
            country: country.to_string(),
            city: city.to_string(),
            path,
            user_agent: truncate_chars(user_agent, 50),
            referer: truncate_chars(referer, 100),
            traffic,
            timestamp: chrono::Utc::now().timestamp_millis(),
        }
    }

    /// Storage key: timestamp prefix keeps keys time-ordered, the random
    /// suffix makes same-millisecond writes collision-free without any
    /// coordination.
    pub fn storage_key(&self) -> String {
        format!("{}-{}", self.timestamp, nanoid!(6))
    }
}

/// Truncate to at most `max` characters, respecting char boundaries.
fn truncate_chars(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_truncates_oversized_fields() {
        let visit = VisitRecord::new(
            "2001:db8:85a3:8d3:1319:8a2e:370:7348",
            "DE",
            "Berlin",
            String::from("/about"),
            &"a".repeat(80),
            &"r".repeat(150),
            2.5,
        );
        assert_eq!(visit.ip.chars().count(), 15);
        assert_eq!(visit.user_agent.chars().count(), 50);
        assert_eq!(visit.referer.chars().count(), 100);
        assert_eq!(visit.path, "/about");
        assert_eq!(visit.traffic, 2.5);
    }

    #[test]
    fn truncation_is_char_boundary_safe() {
        assert_eq!(truncate_chars("ümlaut-ümlaut-ümlaut", 15).chars().count(), 15);
        assert_eq!(truncate_chars("short", 15), "short");
    }

    #[test]
    fn storage_keys_are_distinct_for_the_same_timestamp() {
        let visit = VisitRecord::new("1.2.3.4", "unknown", "unknown", String::from("/"), "ua", "", 0.0);
        // Both keys share the record's millisecond timestamp; only the random
        // suffix separates them.
        assert_ne!(visit.storage_key(), visit.storage_key());
    }

    #[test]
    fn serializes_with_camel_case_user_agent() {
        let visit = VisitRecord::new("1.2.3.4", "US", "NYC", String::from("/"), "ua", "", 0.0);
        let json = serde_json::to_value(&visit).unwrap();
        assert!(json.get("userAgent").is_some());
        assert!(json.get("user_agent").is_none());
    }
}
