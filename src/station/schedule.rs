//! Cycle timing on a free running millisecond clock. Elapsed time is taken
//! with wrapping arithmetic so a rollover of the clock never stalls a period.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Period {
    period_ms: u32,
    last_ms: u32,
}

impl Period {
    pub const fn new(period_ms: u32) -> Self {
        Self { period_ms, last_ms: 0 }
    }

    pub fn period_ms(&self) -> u32 {
        self.period_ms
    }

    pub fn since_last(&self, now_ms: u32) -> u32 {
        now_ms.wrapping_sub(self.last_ms)
    }

    /// True once per period; restarts the period at `now_ms` when it fires.
    pub fn elapsed(&mut self, now_ms: u32) -> bool {
        if self.since_last(now_ms) >= self.period_ms {
            self.last_ms = now_ms;
            true
        } else {
            false
        }
    }
}

/// Heartbeat, sampling and transmission periods. Sampling and transmission
/// are only considered on a heartbeat.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Schedule {
    system: Period,
    sampling: Period,
    transmission: Period,
    beat: bool,
}

impl Schedule {
    pub const fn new(system_ms: u32, sampling_ms: u32, transmission_ms: u32) -> Self {
        Self {
            system: Period::new(system_ms),
            sampling: Period::new(sampling_ms),
            transmission: Period::new(transmission_ms),
            beat: false,
        }
    }

    pub fn heartbeat(&mut self, now_ms: u32) -> bool {
        self.beat = self.system.elapsed(now_ms);
        self.beat
    }

    pub fn sampling_due(&mut self, now_ms: u32) -> bool {
        self.beat && self.sampling.elapsed(now_ms)
    }

    /// Sampling can take a while, pass a fresh clock reading.
    pub fn transmission_due(&mut self, now_ms: u32) -> bool {
        self.beat && self.transmission.elapsed(now_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn period_fires_once_per_interval() {
        let mut period = Period::new(1000);

        assert!(!period.elapsed(999));
        assert!(period.elapsed(1000));
        assert!(!period.elapsed(1500));
        assert!(period.elapsed(2000));
    }

    #[test]
    fn period_survives_clock_rollover() {
        let mut period = Period::new(1000);
        assert!(period.elapsed(u32::MAX - 200));

        assert!(!period.elapsed(500));
        assert!(period.elapsed(800));
    }

    #[test]
    fn sampling_and_transmission_follow_the_heartbeat() {
        let mut schedule = Schedule::new(1_000, 10_000, 50_000);
        let mut samples = 0;
        let mut transmissions = 0;

        for now in (0..=50_000).step_by(500) {
            if schedule.heartbeat(now) {
                if schedule.sampling_due(now) {
                    samples += 1;
                }
                if schedule.transmission_due(now) {
                    transmissions += 1;
                }
            }
        }

        assert_eq!(samples, 5);
        assert_eq!(transmissions, 1);
    }

    #[test]
    fn nothing_is_due_between_heartbeats() {
        let mut schedule = Schedule::new(1_000, 10_000, 50_000);
        assert!(!schedule.heartbeat(10));
        assert!(!schedule.sampling_due(60_000));
        assert!(!schedule.transmission_due(60_000));
    }
}
