//! When a discussion run stops.

use crate::config::DiscussionConfig;

/// Round budget for one run.
///
/// Every run plays at least `min_rounds` and never more than `max_rounds`.
/// Small rooms (at most `few_agents_threshold` agents) keep going until
/// `few_agents_rounds` so each agent gets enough turns to respond to the
/// others.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoundPolicy {
    pub min_rounds: u32,
    pub max_rounds: u32,
    pub few_agents_threshold: usize,
    pub few_agents_rounds: u32,
}

impl Default for RoundPolicy {
    fn default() -> Self {
        Self::from(&DiscussionConfig::default())
    }
}

impl From<&DiscussionConfig> for RoundPolicy {
    fn from(config: &DiscussionConfig) -> Self {
        Self {
            min_rounds: config.min_rounds,
            max_rounds: config.max_rounds,
            few_agents_threshold: config.few_agents_threshold,
            few_agents_rounds: config.few_agents_rounds,
        }
    }
}

impl RoundPolicy {
    /// Whether the run ends after completing `round` (1-based).
    pub fn should_stop_after(&self, round: u32, agent_count: usize) -> bool {
        if round >= self.max_rounds {
            return true;
        }
        if round < self.min_rounds {
            return false;
        }
        if agent_count <= self.few_agents_threshold {
            round >= self.few_agents_rounds
        } else {
            true
        }
    }

    /// Rounds a run with `agent_count` agents plays when nothing stops it.
    pub fn planned_rounds(&self, agent_count: usize) -> u32 {
        (1..=self.max_rounds)
            .find(|&round| self.should_stop_after(round, agent_count))
            .unwrap_or(self.max_rounds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_budget() {
        let policy = RoundPolicy::default();
        assert_eq!(policy.planned_rounds(1), 4);
        assert_eq!(policy.planned_rounds(2), 4);
        assert_eq!(policy.planned_rounds(3), 3);
        assert_eq!(policy.planned_rounds(7), 3);
    }

    #[test]
    fn test_never_before_min_never_after_max() {
        let policy = RoundPolicy {
            min_rounds: 2,
            max_rounds: 3,
            few_agents_threshold: 2,
            few_agents_rounds: 10,
        };
        assert!(!policy.should_stop_after(1, 1));
        assert!(!policy.should_stop_after(2, 1));
        assert!(policy.should_stop_after(3, 1));
        assert!(policy.should_stop_after(2, 5));
    }

    #[test]
    fn test_from_config() {
        let config = DiscussionConfig { min_rounds: 1, max_rounds: 1, ..Default::default() };
        let policy = RoundPolicy::from(&config);
        assert_eq!(policy.planned_rounds(2), 1);
    }
}
