//! Query modules for all Parley entities stored in Redis.

pub mod agents;
pub mod messages;
pub mod rooms;

pub use agents::AgentRow;
pub use messages::MessageRow;
pub use rooms::RoomRow;

/// Key prefix shared by every Parley key.
pub(crate) const PREFIX: &str = "parley";

/// Sorted-set score for an RFC 3339 timestamp, in microseconds.
///
/// Unparseable timestamps sort as "now" so a malformed row is still listed.
pub(crate) fn score_of(timestamp: &str) -> i64 {
    chrono::DateTime::parse_from_rfc3339(timestamp)
        .map(|t| t.timestamp_micros())
        .unwrap_or_else(|_| chrono::Utc::now().timestamp_micros())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_score_orders_timestamps() {
        let earlier = score_of("2024-05-01T10:00:00.000001Z");
        let later = score_of("2024-05-01T10:00:00.000002Z");
        assert!(earlier < later);
    }

    #[test]
    fn test_score_of_garbage_is_recent() {
        let before = chrono::Utc::now().timestamp_micros();
        assert!(score_of("not a timestamp") >= before);
    }
}
