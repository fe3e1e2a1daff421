use std::fmt;

use uuid::Uuid;

/// Worker priority hint. Lower numeric value = more urgent.
///
/// Four fixed levels, not an arbitrary value. A richer ranking has to be
/// mapped onto these levels or applied by a custom
/// [`SchedulingStrategy`](crate::SchedulingStrategy).
///
/// Only consulted by scheduling strategies; it affects launch order,
/// never concurrency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Priority {
    /// Launch before everything else.
    P0 = 0,
    P1 = 1,
    P2 = 2,
    /// Background work, launched last.
    P3 = 3,
}

impl Priority {
    /// All levels, most urgent first.
    pub const ALL: [Priority; 4] = [Priority::P0, Priority::P1, Priority::P2, Priority::P3];
}

/// Identity of a constructed [`Worker`](crate::Worker). Clones share it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WorkerId(Uuid);

impl WorkerId {
    pub(crate) fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for WorkerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn priority_ordering() {
        assert!(Priority::P0 < Priority::P1);
        assert!(Priority::P1 < Priority::P2);
        assert!(Priority::P2 < Priority::P3);
    }

    #[test]
    fn worker_ids_are_unique() {
        assert_ne!(WorkerId::new(), WorkerId::new());
    }
}
