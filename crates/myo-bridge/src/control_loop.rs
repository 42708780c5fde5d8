//! Pipeline orchestration
//!
//! Ties the reader's published value into filter, decider and actuation
//! state machine, then calls the downstream collaborator on committed
//! transitions. Only a connection failure or user cancellation ends the
//! loop; everything else is absorbed so sensing keeps running.

use crate::actuation::{GripperCommand, GripperController, TriggerGate};
use crate::actuator::{GripperActuator, InferenceRunner};
use myo_core::{BridgeConfig, BridgeError, BridgeResult, SensorSample};
use myo_serial::ReaderHandle;
use myo_signal::{SlidingWindow, ThresholdDecider};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::watch;
use tokio::time::{interval, sleep};
use tracing::{debug, info, warn};

/// Gap between applied inference actions, matching the sensor cadence
const ACTION_PACING: Duration = Duration::from_millis(33);

/// Actuation backend selected at startup
pub enum Backend {
    /// Debounced open/close gripper
    Gripper {
        controller: GripperController,
        actuator: Box<dyn GripperActuator>,
    },
    /// Rising-edge inference trigger
    Trigger {
        gate: TriggerGate,
        runner: Box<dyn InferenceRunner>,
    },
}

/// Orchestrator for one sensor-to-actuator pipeline.
///
/// Owns the reader handle for its whole life: whatever way the loop
/// exits, the reader is stopped and the serial link released.
pub struct ControlLoop {
    config: BridgeConfig,
    window: SlidingWindow,
    decider: ThresholdDecider,
    backend: Backend,
    reader: ReaderHandle,
    samples: watch::Receiver<Option<SensorSample>>,
    cancel: Arc<AtomicBool>,
    last_sequence: u64,
}

impl ControlLoop {
    /// Build the pipeline from a validated configuration
    pub fn new(
        config: BridgeConfig,
        reader: ReaderHandle,
        backend: Backend,
        cancel: Arc<AtomicBool>,
    ) -> BridgeResult<Self> {
        config.validate()?;
        let window = SlidingWindow::new(config.window_size)?;
        let decider = ThresholdDecider::new(config.threshold);
        let samples = reader.subscribe();

        Ok(ControlLoop {
            config,
            window,
            decider,
            backend,
            reader,
            samples,
            cancel,
            last_sequence: 0,
        })
    }

    /// Run until cancellation or a connection failure.
    ///
    /// The reader is stopped on every exit path; dropping its handle
    /// releases the serial link.
    pub async fn run(mut self) -> BridgeResult<()> {
        if !self.config.settle_delay.is_zero() {
            info!(delay = ?self.config.settle_delay, "waiting for the sensor to settle");
            sleep(self.config.settle_delay).await;
        }

        info!(
            threshold = self.config.threshold,
            filter_mode = ?self.config.filter_mode,
            window = self.config.window_size,
            observe_only = self.config.observe_only,
            "control loop running"
        );

        let outcome = self.drive().await;
        let reader_outcome = self.reader.stop().await;

        match (outcome, reader_outcome) {
            (Ok(()), reader) => reader,
            // When both failed, the reader's error is the root cause
            (Err(_), Err(reader_err)) => Err(reader_err),
            (Err(e), Ok(())) => Err(e),
        }
    }

    async fn drive(&mut self) -> BridgeResult<()> {
        let mut ticker = interval(self.config.loop_interval);

        loop {
            ticker.tick().await;

            // Cancellation is cooperative, checked once per iteration
            if self.cancel.load(Ordering::Relaxed) {
                info!("cancellation requested, control loop exiting");
                return Ok(());
            }

            let fresh = match self.samples.has_changed() {
                Ok(fresh) => fresh,
                // Sender gone: the reader died on a connection failure
                Err(_) => {
                    return Err(BridgeError::Connection {
                        port: self.config.port.clone(),
                        reason: "sensor reader stopped publishing".to_string(),
                    });
                }
            };
            if !fresh {
                continue;
            }

            let Some(sample) = *self.samples.borrow_and_update() else {
                continue;
            };
            if sample.sequence == self.last_sequence {
                continue;
            }
            self.last_sequence = sample.sequence;

            self.window.push(sample.value);
            let filtered = self.window.value(self.config.filter_mode)?;
            let active = self.decider.decide(filtered);
            debug!(
                raw = sample.value,
                filtered,
                threshold = self.config.threshold,
                active,
                "sample evaluated"
            );

            self.actuate(active).await;
        }
    }

    /// Step the state machine and, outside observe mode, call the
    /// collaborator. A failed call is logged and the committed state
    /// kept: intent, not confirmed physical state.
    async fn actuate(&mut self, active: bool) {
        let now = Instant::now();
        match &mut self.backend {
            Backend::Gripper {
                controller,
                actuator,
            } => {
                let Some(command) = controller.update(active, now) else {
                    return;
                };
                if self.config.observe_only {
                    info!(?command, "observe mode, command not sent");
                    return;
                }
                let open_fraction = match command {
                    GripperCommand::Open => 1.0,
                    GripperCommand::Close => 0.0,
                };
                if let Err(e) = actuator.set_gripper(open_fraction) {
                    warn!(error = %e, "gripper actuation failed");
                }
            }
            Backend::Trigger { gate, runner } => {
                if !gate.update(active, now) {
                    return;
                }
                if self.config.observe_only {
                    info!("observe mode, inference not triggered");
                    return;
                }
                if let Err(e) = run_inference(runner.as_mut()).await {
                    warn!(error = %e, "inference run failed");
                }
            }
        }
    }
}

/// One full inference pass: snapshot, infer, apply each action paced at
/// the sensor cadence.
async fn run_inference(runner: &mut dyn InferenceRunner) -> BridgeResult<()> {
    let (joints, frames) = runner.snapshot()?;
    let actions = runner.trigger_inference(&joints, &frames)?;
    info!(steps = actions.len(), "applying inference actions");
    for action in &actions {
        runner.apply_action(action)?;
        sleep(ACTION_PACING).await;
    }
    Ok(())
}
