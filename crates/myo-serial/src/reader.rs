//! Background sensor acquisition task

use crate::link::LineSource;
use myo_core::{parse_sensor_line, BridgeError, BridgeResult, SensorSample};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::interval;
use tracing::{debug, trace, warn};

/// Polls a [`LineSource`] at a fixed cadence and publishes the freshest
/// parsed value into a single-slot channel.
///
/// Last write wins: an unread sample is simply overwritten by the next
/// one. The consumer only ever cares about the freshest reading, so
/// there is no queueing and no backpressure.
pub struct SensorReader<S: LineSource> {
    source: S,
    poll_interval: Duration,
}

/// Handle to a running reader task
pub struct ReaderHandle {
    samples: watch::Receiver<Option<SensorSample>>,
    shutdown: Arc<AtomicBool>,
    task: JoinHandle<BridgeResult<()>>,
}

impl<S: LineSource + 'static> SensorReader<S> {
    /// Create a reader over `source`, polling every `poll_interval`
    pub fn new(source: S, poll_interval: Duration) -> Self {
        SensorReader {
            source,
            poll_interval,
        }
    }

    /// Start polling on a background task and return the handle
    pub fn spawn(self) -> ReaderHandle {
        let (tx, rx) = watch::channel(None);
        let shutdown = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&shutdown);
        let task = tokio::spawn(self.run(tx, flag));

        ReaderHandle {
            samples: rx,
            shutdown,
            task,
        }
    }

    async fn run(
        mut self,
        samples: watch::Sender<Option<SensorSample>>,
        shutdown: Arc<AtomicBool>,
    ) -> BridgeResult<()> {
        let mut ticker = interval(self.poll_interval);
        let mut sequence: u64 = 0;

        loop {
            ticker.tick().await;

            // Cooperative shutdown, checked once per cycle. An in-flight
            // poll is never interrupted.
            if shutdown.load(Ordering::Relaxed) {
                debug!("sensor reader stopping");
                return Ok(());
            }

            let line = match self.source.poll_line() {
                Ok(line) => line,
                Err(e) => {
                    warn!(error = %e, "sensor read failed, reader exiting");
                    return Err(e);
                }
            };

            let Some(line) = line else { continue };

            match parse_sensor_line(&line) {
                Some(value) => {
                    sequence += 1;
                    trace!(value, sequence, "sensor value published");
                    let _ = samples.send(Some(SensorSample::new(value, sequence)));
                }
                // Serial noise: drop the line, keep the last good value
                None => trace!(line = %line, "discarded unparseable line"),
            }
        }
    }
}

impl ReaderHandle {
    /// Most recent successfully parsed value, if any
    pub fn last_value(&self) -> Option<f64> {
        self.samples.borrow().as_ref().map(|s| s.value)
    }

    /// Snapshot of the freshest published sample
    pub fn latest_sample(&self) -> Option<SensorSample> {
        *self.samples.borrow()
    }

    /// Receiver over the single-slot sample channel
    pub fn subscribe(&self) -> watch::Receiver<Option<SensorSample>> {
        self.samples.clone()
    }

    /// Request cooperative shutdown and wait for the task to exit.
    ///
    /// Surfaces the connection error if the reader died on a failed
    /// read rather than on request.
    pub async fn stop(self) -> BridgeResult<()> {
        self.shutdown.store(true, Ordering::Relaxed);
        match self.task.await {
            Ok(result) => result,
            Err(e) => Err(BridgeError::Connection {
                port: "sensor reader".to_string(),
                reason: format!("reader task aborted: {}", e),
            }),
        }
    }
}
