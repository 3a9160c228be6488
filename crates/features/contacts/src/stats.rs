use moringa_domain::config::StatsConfig;

/// Derives the public "happy clients" figure from the number of stored contacts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatsAggregator {
    baseline: u64,
}

impl StatsAggregator {
    #[must_use]
    pub const fn new(baseline: u64) -> Self {
        Self { baseline }
    }

    #[must_use]
    pub const fn from_config(cfg: &StatsConfig) -> Self {
        Self::new(cfg.baseline)
    }

    #[must_use]
    pub const fn happy_clients(&self, contact_count: u64) -> u64 {
        self.baseline.saturating_add(contact_count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn adds_count_to_baseline() {
        let stats = StatsAggregator::from_config(&StatsConfig::default());
        assert_eq!(stats.happy_clients(0), 582);
        assert_eq!(stats.happy_clients(8), 590);
    }

    #[test]
    fn saturates_instead_of_overflowing() {
        assert_eq!(StatsAggregator::new(u64::MAX - 1).happy_clients(5), u64::MAX);
    }
}
