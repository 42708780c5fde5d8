//! Collaborator seams for the downstream robot
//!
//! The HTTP robot client, the camera stack and the inference model live
//! outside this workspace. The control loop only ever sees these traits,
//! and the bundled implementations log instead of driving hardware.

use myo_core::BridgeResult;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Robot joint positions in radians
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JointAngles(pub Vec<f64>);

/// One captured camera image, opaque to the bridge
#[derive(Debug, Clone, Default)]
pub struct Frame {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

/// One inference output step: target joint angles to apply
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Action(pub Vec<f64>);

/// Gripper-side collaborator, an HTTP robot client in production
pub trait GripperActuator: Send {
    /// Command the gripper opening, 0.0 closed to 1.0 fully open
    fn set_gripper(&mut self, open_fraction: f64) -> BridgeResult<()>;
}

/// Inference-side collaborator: snapshots robot state, runs the policy
/// and applies its actions.
pub trait InferenceRunner: Send {
    /// Current joint state and camera frames for the next inference run
    fn snapshot(&mut self) -> BridgeResult<(JointAngles, Vec<Frame>)>;

    /// Run one inference pass over the given state and frames
    fn trigger_inference(
        &mut self,
        state: &JointAngles,
        images: &[Frame],
    ) -> BridgeResult<Vec<Action>>;

    /// Apply a single action step to the robot
    fn apply_action(&mut self, action: &Action) -> BridgeResult<()>;
}

/// Logs gripper commands instead of driving hardware.
///
/// The default backend until a robot client is wired in.
#[derive(Debug, Default)]
pub struct ConsoleGripper;

impl GripperActuator for ConsoleGripper {
    fn set_gripper(&mut self, open_fraction: f64) -> BridgeResult<()> {
        info!(open_fraction, "gripper command");
        Ok(())
    }
}

/// Stand-in inference runner that logs trigger events, letting the
/// trigger variant run end to end without the external model wired in.
#[derive(Debug, Default)]
pub struct ConsoleRunner;

impl InferenceRunner for ConsoleRunner {
    fn snapshot(&mut self) -> BridgeResult<(JointAngles, Vec<Frame>)> {
        Ok((JointAngles::default(), Vec::new()))
    }

    fn trigger_inference(
        &mut self,
        state: &JointAngles,
        images: &[Frame],
    ) -> BridgeResult<Vec<Action>> {
        info!(
            joints = state.0.len(),
            frames = images.len(),
            "inference triggered"
        );
        Ok(Vec::new())
    }

    fn apply_action(&mut self, action: &Action) -> BridgeResult<()> {
        info!(?action, "action applied");
        Ok(())
    }
}
