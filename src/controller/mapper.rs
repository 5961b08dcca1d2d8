//! # Controller Input Mapper Module
//!
//! Reconciles raw gamepad snapshots into edge-triggered button transitions and
//! axis-change reports for the Daydream controller.
//!
//! ## Button Mapping
//!
//! | Raw index | Button | Mesh |
//! |-----------|--------|------|
//! | 0 | trackpad | `TouchPad_TouchPad_Cylinder.003` |
//! | 1 | menu | `AppButton_AppButton_Cylinder.004` |
//! | 2 | system | `HomeButton_HomeButton_Cylinder.005` |
//!
//! ## Axis Mapping
//!
//! | Group | Raw indices | Labels |
//! |-------|-------------|--------|
//! | trackpad | 0, 1 | x, y |
//!
//! ## Button States
//!
//! Each button is in exactly one of `idle`, `touched` or `pressed`. A pressed
//! button counts as touched, so `(pressed, touched)` collapses to three
//! states and every change of state yields exactly one transition:
//!
//! | From | To | Transition |
//! |------|----|------------|
//! | idle | touched | touchstart |
//! | touched | idle | touchend |
//! | idle / touched | pressed | down |
//! | pressed | idle / touched | up |
//!
//! ## Usage
//!
//! ```
//! use daydream_controls::controller::device::ButtonState;
//! use daydream_controls::controller::mapper::InputReconciler;
//! use daydream_controls::events::Transition;
//!
//! let mut reconciler = InputReconciler::new();
//!
//! let report = reconciler.on_button_snapshot(0, ButtonState::pressed()).unwrap();
//! assert_eq!(report.transition, Some(Transition::Down));
//!
//! // Steady state: reported, but no edge
//! let report = reconciler.on_button_snapshot(0, ButtonState::pressed()).unwrap();
//! assert_eq!(report.transition, None);
//! ```

use tracing::trace;

use super::calibration::Deadzone;
use super::device::ButtonState;
use crate::events::{AxisGroup, AxisValues, Button, Transition};

/// Logical buttons indexed by raw button index.
pub const BUTTON_MAPPING: [Button; 3] = Button::ALL;

/// Axis groups and the raw axis indices that feed them.
pub const AXIS_MAPPING: [(AxisGroup, [usize; 2]); 1] = [(AxisGroup::Trackpad, [0, 1])];

/// Looks up the logical button for a raw index.
///
/// # Examples
///
/// ```
/// use daydream_controls::controller::mapper::button_for_index;
/// use daydream_controls::events::Button;
///
/// assert_eq!(button_for_index(1), Some(Button::Menu));
/// assert_eq!(button_for_index(7), None);
/// ```
#[must_use]
pub fn button_for_index(index: usize) -> Option<Button> {
    BUTTON_MAPPING.get(index).copied()
}

/// Logical state of a single button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ButtonPhase {
    #[default]
    Idle,
    Touched,
    Pressed,
}

impl ButtonPhase {
    /// Derives the phase from a raw state. Pressed wins over touched.
    #[must_use]
    pub fn from_state(state: &ButtonState) -> Self {
        if state.pressed {
            ButtonPhase::Pressed
        } else if state.touched {
            ButtonPhase::Touched
        } else {
            ButtonPhase::Idle
        }
    }

    /// The transition fired when moving from `self` to `next`, if any.
    #[must_use]
    pub fn transition_to(self, next: ButtonPhase) -> Option<Transition> {
        use ButtonPhase::{Idle, Pressed, Touched};

        match (self, next) {
            (Idle, Idle) | (Touched, Touched) | (Pressed, Pressed) => None,
            (Idle, Touched) => Some(Transition::TouchStart),
            (Touched, Idle) => Some(Transition::TouchEnd),
            (Idle, Pressed) | (Touched, Pressed) => Some(Transition::Down),
            (Pressed, Idle) | (Pressed, Touched) => Some(Transition::Up),
        }
    }
}

/// Result of reconciling one button snapshot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ButtonReport {
    /// Logical button the raw index maps to.
    pub button: Button,
    /// Raw state as delivered.
    pub state: ButtonState,
    /// Edge detected against the previously recorded phase.
    pub transition: Option<Transition>,
}

/// Compares the mapped components of two axis snapshots.
///
/// Returns one entry per axis group whose components are not bit-identical.
/// Indices missing from a snapshot read as `0.0` (resting position).
///
/// # Examples
///
/// ```
/// use daydream_controls::controller::mapper::changed_axis_groups;
///
/// assert_eq!(changed_axis_groups(&[0.5, 0.0], &[0.0, 0.0]).len(), 1);
/// assert!(changed_axis_groups(&[0.5, 0.0], &[0.5, 0.0]).is_empty());
/// ```
#[must_use]
pub fn changed_axis_groups(current: &[f32], previous: &[f32]) -> Vec<(AxisGroup, AxisValues)> {
    let read = |axes: &[f32], index: usize| axes.get(index).copied().unwrap_or(0.0);

    AXIS_MAPPING
        .iter()
        .filter(|(_, indices)| {
            indices
                .iter()
                .any(|&i| read(current, i).to_bits() != read(previous, i).to_bits())
        })
        .map(|&(group, [x, y])| (group, AxisValues { x: read(current, x), y: read(current, y) }))
        .collect()
}

/// Tracks per-button phases and the previous axis snapshot of the bound device.
///
/// # Thread Safety
///
/// `InputReconciler` is not thread-safe. Snapshots must be delivered serially.
#[derive(Debug, Default)]
pub struct InputReconciler {
    phases: [ButtonPhase; BUTTON_MAPPING.len()],
    axes: Vec<f32>,
    deadzone: Deadzone,
}

impl InputReconciler {
    /// Creates a reconciler with all buttons idle and exact axis comparison.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a reconciler that flattens axis readings inside `deadzone`
    /// before comparing them.
    #[must_use]
    pub fn with_deadzone(deadzone: Deadzone) -> Self {
        Self {
            deadzone,
            ..Self::default()
        }
    }

    /// Returns the recorded phase of a button.
    #[must_use]
    pub fn phase(&self, button: Button) -> ButtonPhase {
        self.phases[button as usize]
    }

    /// Returns the previous (calibrated) axis snapshot.
    #[must_use]
    pub fn axes(&self) -> &[f32] {
        &self.axes
    }

    /// Reconciles a raw button notification.
    ///
    /// Returns `None` for indices outside the button mapping. For mapped
    /// indices a report is always returned; its `transition` is set only when
    /// the phase changed.
    pub fn on_button_snapshot(&mut self, index: usize, state: ButtonState) -> Option<ButtonReport> {
        let Some(button) = button_for_index(index) else {
            trace!("Ignoring unmapped button index {}", index);
            return None;
        };

        let next = ButtonPhase::from_state(&state);
        let previous = std::mem::replace(&mut self.phases[index], next);
        let transition = previous.transition_to(next);

        if let Some(t) = transition {
            trace!("Button {} {:?} -> {:?} ({})", button, previous, next, t);
        }

        Some(ButtonReport {
            button,
            state,
            transition,
        })
    }

    /// Reconciles a raw axis snapshot against the previous one.
    ///
    /// The snapshot is stored as the new baseline whether or not anything
    /// changed.
    pub fn on_axis_snapshot(&mut self, raw_axes: &[f32]) -> Vec<(AxisGroup, AxisValues)> {
        let current: Vec<f32> = raw_axes.iter().map(|&v| self.deadzone.apply(v)).collect();
        let changed = changed_axis_groups(&current, &self.axes);
        if changed.is_empty() {
            trace!("Axis snapshot unchanged");
        }
        self.axes = current;
        changed
    }

    /// Returns every button to idle and forgets the axis baseline.
    pub fn reset(&mut self) {
        self.phases = Default::default();
        self.axes.clear();
    }
}
