//! Protocol constants and network configuration

/// Number of elements sorted by the canonical network
pub const CANONICAL_WIDTH: usize = 8;

/// Participants needed by the canonical network (18 comparators plus root)
pub const CANONICAL_PARTICIPANTS: usize = 19;

/// Channel tag carried by every message
pub const CHANNEL_TAG: u16 = 1;

/// Most elements a single message may carry
pub const MAX_MESSAGE_ELEMENTS: usize = 2;

/// Network configuration shared by every participant
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NetworkConfig {
    /// Number of elements to sort
    pub width: usize,
    /// Tag stamped on and expected from every message
    pub tag: u16,
    /// Buffered messages per point-to-point link
    pub link_capacity: usize,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        NetworkConfig {
            width: CANONICAL_WIDTH,
            tag: CHANNEL_TAG,
            link_capacity: 4,
        }
    }
}

impl NetworkConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_width(mut self, width: usize) -> Self {
        self.width = width;
        self
    }

    pub fn with_tag(mut self, tag: u16) -> Self {
        self.tag = tag;
        self
    }

    /// Set link capacity (clamped to at least one message)
    pub fn with_link_capacity(mut self, capacity: usize) -> Self {
        self.link_capacity = capacity.max(1);
        self
    }

    /// Whether this configuration describes the hand-flattened 8-wide table
    pub fn is_canonical(&self) -> bool {
        self.width == CANONICAL_WIDTH
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_canonical() {
        let config = NetworkConfig::default();
        assert!(config.is_canonical());
        assert_eq!(config.tag, CHANNEL_TAG);
    }

    #[test]
    fn test_link_capacity_clamped() {
        let config = NetworkConfig::new().with_link_capacity(0);
        assert_eq!(config.link_capacity, 1);
    }
}
