//! Fixed-cadence capture trigger.
//!
//! Fire-and-forget: one constant payload per tick, no backpressure, no
//! acknowledgment, no retry. A failed publish is logged and the next tick
//! proceeds. Runs until the shared running flag clears.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;

pub struct CaptureTrigger {
    interval: Duration,
}

impl CaptureTrigger {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// One tick: publish the capture request, log a failure, never propagate.
    pub fn tick<F>(&self, publish: &mut F)
    where
        F: FnMut() -> Result<()>,
    {
        if let Err(e) = publish() {
            log::warn!("capture request publish failed: {}", e);
        }
    }

    /// Tick until the running flag clears.
    pub fn run<F>(&self, running: Arc<AtomicBool>, mut publish: F)
    where
        F: FnMut() -> Result<()>,
    {
        while running.load(Ordering::SeqCst) {
            self.tick(&mut publish);
            std::thread::sleep(self.interval);
        }
        log::info!("capture trigger stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;

    #[test]
    fn tick_invokes_publish_exactly_once() {
        let trigger = CaptureTrigger::new(Duration::from_secs(1));
        let mut count = 0;
        trigger.tick(&mut || {
            count += 1;
            Ok(())
        });
        assert_eq!(count, 1);
    }

    #[test]
    fn tick_swallows_publish_errors() {
        let trigger = CaptureTrigger::new(Duration::from_secs(1));
        let mut count = 0;
        trigger.tick(&mut || {
            count += 1;
            Err(anyhow!("broker unavailable"))
        });
        trigger.tick(&mut || {
            count += 1;
            Ok(())
        });
        assert_eq!(count, 2, "a failed tick must not stop the cadence");
    }

    #[test]
    fn run_stops_when_flag_clears() {
        let trigger = CaptureTrigger::new(Duration::from_millis(1));
        let running = Arc::new(AtomicBool::new(true));
        let stop = running.clone();
        let mut count = 0u32;
        trigger.run(running, || {
            count += 1;
            if count >= 3 {
                stop.store(false, Ordering::SeqCst);
            }
            Ok(())
        });
        assert!(count >= 3);
    }
}
