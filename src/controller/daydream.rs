//! # Daydream Controls Component
//!
//! Binds to a Daydream controller among the host's connected gamepads and
//! turns its raw button and axis notifications into [`ControllerEvent`]s.
//!
//! ## Lifecycle
//!
//! 1. [`DaydreamControls::activate`] subscribes to device updates and runs a
//!    first presence check.
//! 2. Each [`DaydreamControls::on_devices_updated`] re-resolves the binding.
//!    Attaching pushes the tracked-controls configuration to the
//!    [`PoseTracker`], requests the controller model and starts accepting
//!    button/axis notifications. Detaching stops accepting them and resets
//!    every button to idle.
//! 3. [`DaydreamControls::deactivate`] drops the subscription and the binding.
//!    No notification has any effect afterwards until the next activation.
//!
//! ## Usage
//!
//! ```
//! use daydream_controls::config::ControlsConfig;
//! use daydream_controls::controller::daydream::{DaydreamControls, Headless};
//! use daydream_controls::controller::device::{ButtonState, DeviceDescriptor, Hand};
//! use daydream_controls::events::ControllerEvent;
//!
//! let mut controls = DaydreamControls::new(ControlsConfig::default(), Headless, Headless);
//! let mut events: Vec<ControllerEvent> = Vec::new();
//!
//! let devices = vec![DeviceDescriptor::new("Daydream Controller", Hand::Right)];
//! controls.activate(&devices, &mut events);
//! assert!(controls.binding().is_some());
//!
//! controls.on_button_changed(0, ButtonState::pressed(), &mut events);
//! let channels: Vec<String> = events.iter().map(|e| e.channel()).collect();
//! assert_eq!(channels, ["controllerconnected", "trackpadchanged", "trackpaddown"]);
//! ```

use tracing::{debug, info, trace};

use super::calibration::Deadzone;
use super::device::{ButtonState, DeviceDescriptor, Hand};
use super::mapper::{ButtonPhase, InputReconciler};
use super::presence::{Binding, PresenceChange, PresenceTracker, GAMEPAD_ID_PREFIX};
use super::visual::{ButtonPalette, ButtonVisuals, ModelRoot, MODEL_MTL_URL, MODEL_OBJ_URL};
use crate::config::ControlsConfig;
use crate::events::{Button, ControllerEvent, EventSink};

/// Configuration pushed to the pose-tracking collaborator on attach.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackedControlsConfig {
    /// Apply the procedural arm model.
    pub arm_model: bool,
    /// Hand the controller is held in.
    pub hand: Hand,
    /// Identifier prefix of the tracked device.
    pub id_prefix: String,
    /// Rotation offset in degrees.
    pub rotation_offset: f32,
}

/// Load request sent to the model loader on attach.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelRequest {
    /// Geometry URL.
    pub obj: String,
    /// Material URL.
    pub mtl: String,
}

impl Default for ModelRequest {
    fn default() -> Self {
        Self {
            obj: MODEL_OBJ_URL.to_string(),
            mtl: MODEL_MTL_URL.to_string(),
        }
    }
}

/// Pose-tracking subsystem that follows the bound controller.
#[cfg_attr(test, mockall::automock)]
pub trait PoseTracker {
    /// Applies a configuration. Pushing the same configuration twice must be
    /// harmless.
    fn configure(&mut self, config: &TrackedControlsConfig);
}

/// Asynchronous model loader. Completion is reported back through
/// [`DaydreamControls::on_model_loaded`].
#[cfg_attr(test, mockall::automock)]
pub trait ModelLoader {
    fn load(&mut self, request: &ModelRequest);
}

/// Collaborator for hosts without pose tracking or a scene graph.
///
/// Logs what it is asked to do and does nothing else.
#[derive(Debug, Default, Clone, Copy)]
pub struct Headless;

impl PoseTracker for Headless {
    fn configure(&mut self, config: &TrackedControlsConfig) {
        debug!("Tracked controls configuration: {:?}", config);
    }
}

impl ModelLoader for Headless {
    fn load(&mut self, request: &ModelRequest) {
        debug!("Model load requested: {} / {}", request.obj, request.mtl);
    }
}

/// The Daydream controls component.
///
/// Owns the single device binding, the per-button state table and the cached
/// button meshes. All methods run synchronously; the host must deliver
/// notifications serially.
pub struct DaydreamControls<P, L> {
    config: ControlsConfig,
    palette: ButtonPalette,
    presence: PresenceTracker,
    reconciler: InputReconciler,
    visuals: Option<ButtonVisuals>,
    pose: P,
    loader: L,
    /// Subscribed to device updates.
    active: bool,
    /// Accepting button/axis notifications from the bound device.
    listening: bool,
}

impl<P, L> std::fmt::Debug for DaydreamControls<P, L> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DaydreamControls")
            .field("config", &self.config)
            .field("binding", &self.presence.binding())
            .field("active", &self.active)
            .field("listening", &self.listening)
            .finish_non_exhaustive()
    }
}

impl<P: PoseTracker, L: ModelLoader> DaydreamControls<P, L> {
    /// Creates an inactive, unbound component.
    #[must_use]
    pub fn new(config: ControlsConfig, pose: P, loader: L) -> Self {
        let palette = config.palette();
        let presence = PresenceTracker::new(GAMEPAD_ID_PREFIX, config.hand);
        Self {
            config,
            palette,
            presence,
            reconciler: InputReconciler::new(),
            visuals: None,
            pose,
            loader,
            active: false,
            listening: false,
        }
    }

    /// Flattens trackpad readings inside `deadzone` before change detection.
    #[must_use]
    pub fn with_deadzone(mut self, deadzone: Deadzone) -> Self {
        self.reconciler = InputReconciler::with_deadzone(deadzone);
        self
    }

    #[must_use]
    pub fn config(&self) -> &ControlsConfig {
        &self.config
    }

    #[must_use]
    pub fn binding(&self) -> Option<&Binding> {
        self.presence.binding()
    }

    /// Returns the bound device's entry in `devices`.
    #[must_use]
    pub fn bound_device<'a>(&self, devices: &'a [DeviceDescriptor]) -> Option<&'a DeviceDescriptor> {
        self.presence.bound_device(devices)
    }

    #[must_use]
    pub fn phase(&self, button: Button) -> ButtonPhase {
        self.reconciler.phase(button)
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active
    }

    #[must_use]
    pub fn is_listening(&self) -> bool {
        self.listening
    }

    #[must_use]
    pub fn has_visuals(&self) -> bool {
        self.visuals.is_some()
    }

    /// Subscribes to device updates and checks presence once.
    pub fn activate(&mut self, devices: &[DeviceDescriptor], sink: &mut impl EventSink) {
        info!("Activating Daydream controls (hand: {})", self.config.hand);
        self.active = true;
        self.check_presence(devices, sink);
    }

    /// Removes device listeners and the update subscription, and clears the
    /// binding.
    pub fn deactivate(&mut self, sink: &mut impl EventSink) {
        if !self.active && self.presence.binding().is_none() {
            return;
        }
        info!("Deactivating Daydream controls");
        self.active = false;
        if let Some(binding) = self.presence.clear() {
            self.detach(binding, sink);
        }
        self.listening = false;
    }

    /// "Devices updated" notification from the host.
    pub fn on_devices_updated(&mut self, devices: &[DeviceDescriptor], sink: &mut impl EventSink) {
        if !self.active {
            trace!("Ignoring device update while inactive");
            return;
        }
        self.check_presence(devices, sink);
    }

    fn check_presence(&mut self, devices: &[DeviceDescriptor], sink: &mut impl EventSink) {
        match self.presence.update(devices) {
            PresenceChange::Unchanged => {}
            PresenceChange::Attached(new) => self.attach(new, sink),
            PresenceChange::Detached(old) => self.detach(old, sink),
            PresenceChange::Replaced { old, new } => {
                self.detach(old, sink);
                self.attach(new, sink);
            }
        }
    }

    fn attach(&mut self, binding: Binding, sink: &mut impl EventSink) {
        self.inject_tracked_controls();
        self.listening = true;
        sink.emit(ControllerEvent::Connected {
            id: binding.id,
            hand: binding.hand,
        });
    }

    fn detach(&mut self, binding: Binding, sink: &mut impl EventSink) {
        self.listening = false;
        self.reconciler.reset();
        if let Some(visuals) = self.visuals.as_mut() {
            visuals.reset(&self.palette);
        }
        sink.emit(ControllerEvent::Disconnected { id: binding.id });
    }

    fn inject_tracked_controls(&mut self) {
        self.pose.configure(&TrackedControlsConfig {
            arm_model: self.config.arm_model,
            hand: self.config.hand,
            id_prefix: GAMEPAD_ID_PREFIX.to_string(),
            rotation_offset: self.config.rotation_offset,
        });
        if self.config.model {
            self.loader.load(&ModelRequest::default());
        }
    }

    /// Raw button notification for the bound device.
    ///
    /// Emits `<button>changed` for every mapped index, followed by
    /// `<button><transition>` when the button changed state.
    pub fn on_button_changed(&mut self, index: usize, state: ButtonState, sink: &mut impl EventSink) {
        if !self.listening {
            trace!("Ignoring button {} without a bound controller", index);
            return;
        }
        let Some(report) = self.reconciler.on_button_snapshot(index, state) else {
            return;
        };

        sink.emit(ControllerEvent::ButtonChanged {
            button: report.button,
            state: report.state,
        });

        if let Some(transition) = report.transition {
            debug!("{}{}", report.button, transition);
            sink.emit(ControllerEvent::Button {
                button: report.button,
                transition,
            });
            if self.config.model {
                match self.visuals.as_mut() {
                    Some(visuals) => visuals.update(report.button, transition, &self.palette),
                    None => trace!("Model not loaded, skipping visual update"),
                }
            }
        }
    }

    /// Raw axis notification for the bound device.
    pub fn on_axis_moved(&mut self, axes: &[f32], sink: &mut impl EventSink) {
        if !self.listening {
            trace!("Ignoring axis move without a bound controller");
            return;
        }
        for (group, values) in self.reconciler.on_axis_snapshot(axes) {
            sink.emit(ControllerEvent::AxisChanged { group, values });
        }
    }

    /// "Model loaded" notification from the model loader.
    pub fn on_model_loaded(&mut self, root: &mut dyn ModelRoot) {
        if !self.config.model {
            trace!("Model disabled, ignoring loaded model");
            return;
        }
        if !self.listening {
            trace!("Ignoring model loaded without a bound controller");
            return;
        }
        info!("Controller model loaded");
        self.visuals = Some(ButtonVisuals::from_model(root));
    }
}
