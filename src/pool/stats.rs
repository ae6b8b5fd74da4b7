use serde::Serialize;

/// Pool statistics
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PoolStats {
    /// Fixed number of engines
    pub size: usize,
    /// Engines waiting in the idle queue
    pub available: usize,
    /// Engines currently checked out
    pub in_use: usize,
    /// Recognitions that produced a result
    pub processed: u64,
    /// Recognitions that failed (decode, engine error or panic)
    pub failed: u64,
    /// Whether shutdown has started
    pub shut_down: bool,
}

impl PoolStats {
    /// Share of engines currently busy (0.0 to 1.0)
    pub fn utilization(&self) -> f64 {
        if self.size == 0 {
            return 0.0;
        }
        self.in_use as f64 / self.size as f64
    }

    /// Every engine is either idle or checked out, never both and never missing
    pub fn is_balanced(&self) -> bool {
        self.shut_down || self.available + self.in_use == self.size
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats(available: usize, in_use: usize) -> PoolStats {
        PoolStats {
            size: 4,
            available,
            in_use,
            processed: 0,
            failed: 0,
            shut_down: false,
        }
    }

    #[test]
    fn test_utilization() {
        assert_eq!(stats(4, 0).utilization(), 0.0);
        assert_eq!(stats(1, 3).utilization(), 0.75);
    }

    #[test]
    fn test_balance() {
        assert!(stats(2, 2).is_balanced());
        assert!(!stats(2, 1).is_balanced());
    }
}
