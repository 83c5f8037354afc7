//! Background thread that ticks a shared session at a fixed period.

use std::{
    io,
    sync::mpsc::{self, Receiver, RecvTimeoutError, Sender},
    thread::{self, JoinHandle},
    time::Duration,
};

use crate::{controller::SessionController, session::TickReport};

const CLOCK_THREAD_NAME: &str = "deck-defence-clock";

/// Handle to the running clock. Dropping it stops the thread.
#[derive(Debug)]
pub struct SimulationClock {
    stop: Option<Sender<()>>,
    worker: Option<JoinHandle<()>>,
}

impl SimulationClock {
    /// Spawns the clock thread and returns it with a stream of tick reports.
    ///
    /// The thread waits outside the session lock, so foreground commands are
    /// never blocked by the period. It stops when asked to, when the handle is
    /// dropped, or when the session lock is poisoned.
    pub fn start(
        controller: SessionController,
        period: Duration,
    ) -> io::Result<(Self, Receiver<TickReport>)> {
        let (stop, stop_signal) = mpsc::channel::<()>();
        let (reports, report_stream) = mpsc::channel();

        let worker = thread::Builder::new()
            .name(CLOCK_THREAD_NAME.to_owned())
            .spawn(move || loop {
                match stop_signal.recv_timeout(period) {
                    Err(RecvTimeoutError::Timeout) => {}
                    Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                }

                match controller.tick() {
                    Ok(report) => {
                        // Nobody listening is fine; the session keeps advancing.
                        let _ = reports.send(report);
                    }
                    Err(error) => {
                        log::error!("simulation clock stopping: {error}");
                        break;
                    }
                }
            })?;

        log::debug!("simulation clock started with period {period:?}");
        let clock = Self {
            stop: Some(stop),
            worker: Some(worker),
        };
        Ok((clock, report_stream))
    }

    /// Stops the clock and waits for the in-flight tick to finish.
    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        drop(self.stop.take());
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                log::error!("simulation clock thread panicked");
            }
        }
    }
}

impl Drop for SimulationClock {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::SessionConfig, persistence::MemoryBestWaveStore};
    use std::sync::Arc;

    #[test]
    fn clock_ticks_until_stopped() {
        let store = Arc::new(MemoryBestWaveStore::default());
        let controller = SessionController::new(&SessionConfig::default(), store);
        let (clock, reports) =
            SimulationClock::start(controller.clone(), Duration::from_millis(5))
                .expect("spawn clock");

        let first = reports
            .recv_timeout(Duration::from_secs(5))
            .expect("first tick");
        let second = reports
            .recv_timeout(Duration::from_secs(5))
            .expect("second tick");
        assert_eq!(first.tick + 1, second.tick);

        clock.stop();
        let settled = controller.inspect(|session| session.hud().wave_number);
        assert_eq!(settled, 0);
        while reports.try_recv().is_ok() {}
        assert!(matches!(
            reports.try_recv(),
            Err(mpsc::TryRecvError::Disconnected)
        ));
    }
}
