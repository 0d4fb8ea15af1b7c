use portable_atomic::{AtomicU32, Ordering};

/// Pulse count shared between an edge-counting task and the sampling loop.
///
/// The counting side only ever increments; the reading side takes the count
/// and resets it in one atomic swap, so no pulse is lost in between.
pub struct PulseCounter {
    count: AtomicU32,
}

impl Default for PulseCounter {
    fn default() -> Self {
        Self::new()
    }
}

impl PulseCounter {
    pub const fn new() -> Self {
        Self {
            count: AtomicU32::new(0),
        }
    }

    pub fn increment(&self) {
        self.count.fetch_add(1, Ordering::Relaxed);
    }

    pub fn peek(&self) -> u32 {
        self.count.load(Ordering::Relaxed)
    }

    pub fn take(&self) -> u32 {
        self.count.swap(0, Ordering::AcqRel)
    }

    /// [`Self::take`] saturated to the 16 bit payload field.
    pub fn take_u16(&self) -> u16 {
        u16::try_from(self.take()).unwrap_or(u16::MAX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn take_resets() {
        let counter = PulseCounter::new();
        counter.increment();
        counter.increment();
        counter.increment();

        assert_eq!(counter.peek(), 3);
        assert_eq!(counter.take(), 3);
        assert_eq!(counter.take(), 0);
    }

    #[test]
    fn concurrent_increments_are_not_lost() {
        static COUNTER: PulseCounter = PulseCounter::new();
        let mut taken = 0;

        std::thread::scope(|s| {
            for _ in 0..4 {
                s.spawn(|| {
                    for _ in 0..1000 {
                        COUNTER.increment();
                    }
                });
            }
            for _ in 0..10 {
                taken += COUNTER.take();
            }
        });

        taken += COUNTER.take();
        assert_eq!(taken, 4000);
    }

    #[test]
    fn u16_view_saturates() {
        let counter = PulseCounter::new();
        for _ in 0..70_000 {
            counter.increment();
        }
        assert_eq!(counter.take_u16(), u16::MAX);
    }
}
