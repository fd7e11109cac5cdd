use parking_lot::RwLock;
use std::fmt::{Display, Formatter};

/// The most recent lane geometry: which lane the vehicle occupies and how
/// many lanes are visible. Copied out whole, never field by field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LaneContext {
    pub ego: u32,
    pub total: u32,
}

impl Display for LaneContext {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "lane {} of {}", self.ego, self.total)
    }
}

/// Single-slot cache for the latest scan result, shared between the
/// pipeline (writer) and any consumer (readers).
///
/// The slot holds one `Option<LaneContext>` behind a read-write lock:
/// readers proceed concurrently, a writer takes the lock exclusively and
/// replaces the whole pair in one step, so a snapshot can never mix fields
/// from two different writes. Constructed once at startup and handed out
/// by `Arc`; there is no process-global instance.
pub struct LaneContextStore {
    slot: RwLock<Option<LaneContext>>,
}

impl LaneContextStore {
    pub fn new() -> Self {
        LaneContextStore {
            slot: RwLock::new(None),
        }
    }

    /// Replaces the stored pair. `ego` is clamped to at least 1 and
    /// `total` to at least 0 before the swap.
    pub fn update(&self, ego: i32, total: i32) {
        let context = LaneContext {
            ego: ego.max(1) as u32,
            total: total.max(0) as u32,
        };
        *self.slot.write() = Some(context);
    }

    /// The current pair, or `None` when no update has ever happened.
    pub fn snapshot(&self) -> Option<LaneContext> {
        *self.slot.read()
    }

    /// The formatted line handed to downstream prompt construction.
    pub fn context_line(&self) -> String {
        match self.snapshot() {
            Some(context) => format!(
                "Driving in lane {} of {} detected lanes.",
                context.ego, context.total
            ),
            None => "Lane context unavailable.".to_string(),
        }
    }
}

impl Default for LaneContextStore {
    fn default() -> Self {
        LaneContextStore::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};

    #[test]
    fn starts_unset() {
        let store = LaneContextStore::new();
        assert_eq!(store.snapshot(), None);
        assert_eq!(store.context_line(), "Lane context unavailable.");
    }

    #[test]
    fn update_then_snapshot() {
        let store = LaneContextStore::new();
        store.update(3, 5);
        assert_eq!(store.snapshot(), Some(LaneContext { ego: 3, total: 5 }));
        assert_eq!(
            store.context_line(),
            "Driving in lane 3 of 5 detected lanes."
        );
    }

    #[test]
    fn updates_are_clamped() {
        let store = LaneContextStore::new();
        store.update(0, -1);
        assert_eq!(store.snapshot(), Some(LaneContext { ego: 1, total: 0 }));
    }

    #[test]
    fn readers_never_observe_a_torn_pair() {
        let store = LaneContextStore::new();
        let first = LaneContext { ego: 1, total: 1 };
        let second = LaneContext { ego: 7, total: 9 };
        store.update(first.ego as i32, first.total as i32);

        let stop = AtomicBool::new(false);
        std::thread::scope(|scope| {
            for _ in 0..4 {
                scope.spawn(|| {
                    while !stop.load(Ordering::Relaxed) {
                        match store.snapshot() {
                            Some(context) => {
                                assert!(
                                    context == first || context == second,
                                    "torn pair observed: {context}"
                                );
                            }
                            None => panic!("slot lost its value"),
                        }
                    }
                });
            }

            for round in 0..2_000 {
                let context = if round % 2 == 0 { second } else { first };
                store.update(context.ego as i32, context.total as i32);
            }
            stop.store(true, Ordering::Relaxed);
        });
    }
}
