//! Local burst-test driver
//!
//! Spreads a fixed number of live spawn requests evenly over a fixed number
//! of timer fires. The timer is advanced by the frame scheduler, so dropping
//! the driver cancels it synchronously.

use crate::config::BurstConfig;
use crate::queue::SpawnProducer;
use crate::rng::SimRng;

/// Outcome of advancing the burst timer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BurstProgress {
    Running,
    /// Every request was enqueued, or the session was cut off
    Finished { enqueued: u32 },
}

pub struct BurstDriver {
    producer: SpawnProducer,
    total: u32,
    per_fire: u32,
    interval: f64,
    elapsed: f64,
    enqueued: u32,
}

impl BurstDriver {
    pub fn new(producer: SpawnProducer, config: &BurstConfig) -> Self {
        let per_fire = (config.total as f64 / config.fires as f64).round().max(1.0) as u32;
        Self {
            producer,
            total: config.total,
            per_fire,
            interval: config.interval,
            elapsed: 0.0,
            enqueued: 0,
        }
    }

    pub fn per_fire(&self) -> u32 {
        self.per_fire
    }

    pub fn enqueued(&self) -> u32 {
        self.enqueued
    }

    /// Advance the timer by `dt` seconds, firing once per elapsed interval.
    pub fn advance(&mut self, dt: f64, kinds: &[String], rng: &mut SimRng) -> BurstProgress {
        self.elapsed += dt;
        while self.elapsed >= self.interval && self.enqueued < self.total {
            self.elapsed -= self.interval;
            if !self.fire(kinds, rng) {
                log::debug!("burst session cut off after {} requests", self.enqueued);
                return BurstProgress::Finished {
                    enqueued: self.enqueued,
                };
            }
        }

        if self.enqueued >= self.total {
            BurstProgress::Finished {
                enqueued: self.enqueued,
            }
        } else {
            BurstProgress::Running
        }
    }

    fn fire(&mut self, kinds: &[String], rng: &mut SimRng) -> bool {
        let count = self.per_fire.min(self.total - self.enqueued);
        for _ in 0..count {
            let Some(kind) = rng.pick(kinds) else {
                return false;
            };
            if !self.producer.enqueue(kind.clone(), false) {
                return false;
            }
            self.enqueued += 1;
        }
        log::debug!("burst fired {count} requests ({}/{})", self.enqueued, self.total);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queue::SpawnQueue;

    fn kinds() -> Vec<String> {
        vec!["🔥".to_string(), "✨".to_string()]
    }

    #[test]
    fn default_burst_fires_seventeen_per_second() {
        let queue = SpawnQueue::new();
        let mut driver = BurstDriver::new(queue.session_producer(), &BurstConfig::default());
        let mut rng = SimRng::new(1);
        assert_eq!(driver.per_fire(), 17);

        assert_eq!(driver.advance(0.5, &kinds(), &mut rng), BurstProgress::Running);
        assert!(queue.is_empty());
        assert_eq!(driver.advance(0.5, &kinds(), &mut rng), BurstProgress::Running);
        assert_eq!(queue.len(), 17);
        assert!(queue.drain(100).iter().all(|r| !r.presettled));
    }

    #[test]
    fn burst_stops_at_total() {
        let queue = SpawnQueue::new();
        let config = BurstConfig {
            total: 1000,
            fires: 60,
            interval: 1.0,
        };
        let mut driver = BurstDriver::new(queue.session_producer(), &config);
        let mut rng = SimRng::new(1);

        let mut finished_at = None;
        for second in 1..=70 {
            if let BurstProgress::Finished { enqueued } = driver.advance(1.0, &kinds(), &mut rng) {
                assert_eq!(enqueued, 1000);
                finished_at = Some(second);
                break;
            }
        }
        // 58 full fires of 17 plus a final partial fire of 14
        assert_eq!(finished_at, Some(59));
        assert_eq!(queue.len(), 1000);
    }

    #[test]
    fn cleared_session_finishes_early() {
        let queue = SpawnQueue::new();
        let mut driver = BurstDriver::new(queue.session_producer(), &BurstConfig::default());
        let mut rng = SimRng::new(1);

        driver.advance(1.0, &kinds(), &mut rng);
        queue.clear();
        assert_eq!(
            driver.advance(1.0, &kinds(), &mut rng),
            BurstProgress::Finished { enqueued: 17 }
        );
        assert!(queue.is_empty());
    }
}
