//! # Device Descriptors
//!
//! Point-in-time readouts of connected gamepads as delivered by the host:
//! identifier, handedness, per-index button state and axis values.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{ControlsError, Result};

/// Which hand a controller is held in (or is configured for).
///
/// The empty string parses to [`Hand::Unspecified`], matching the configuration
/// default where no hand filter is applied.
///
/// # Examples
///
/// ```
/// use daydream_controls::controller::device::Hand;
///
/// assert_eq!("left".parse::<Hand>().unwrap(), Hand::Left);
/// assert_eq!("".parse::<Hand>().unwrap(), Hand::Unspecified);
/// assert!("both".parse::<Hand>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Hand {
    Left,
    Right,
    #[default]
    Unspecified,
}

impl Hand {
    /// Returns the lowercase name, empty for [`Hand::Unspecified`].
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Hand::Left => "left",
            Hand::Right => "right",
            Hand::Unspecified => "",
        }
    }

    /// Returns `true` unless this is [`Hand::Unspecified`].
    #[must_use]
    pub fn is_specified(&self) -> bool {
        *self != Hand::Unspecified
    }
}

impl FromStr for Hand {
    type Err = ControlsError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "left" => Ok(Hand::Left),
            "right" => Ok(Hand::Right),
            "" | "unspecified" => Ok(Hand::Unspecified),
            other => Err(ControlsError::InvalidHand(other.to_string())),
        }
    }
}

impl TryFrom<String> for Hand {
    type Error = ControlsError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<Hand> for String {
    fn from(hand: Hand) -> Self {
        hand.as_str().to_string()
    }
}

impl fmt::Display for Hand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Hand::Unspecified => f.write_str("unspecified"),
            other => f.write_str(other.as_str()),
        }
    }
}

/// Raw state of a single gamepad button.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ButtonState {
    /// Button is fully pressed.
    pub pressed: bool,
    /// Finger is resting on the button (capacitive touch).
    pub touched: bool,
    /// Analog value, 0.0 released to 1.0 fully pressed.
    pub value: f32,
}

impl ButtonState {
    /// A pressed (and therefore touched) button.
    #[must_use]
    pub fn pressed() -> Self {
        Self {
            pressed: true,
            touched: true,
            value: 1.0,
        }
    }

    /// A touched but not pressed button.
    #[must_use]
    pub fn touched() -> Self {
        Self {
            pressed: false,
            touched: true,
            value: 0.0,
        }
    }

    /// A released, untouched button.
    #[must_use]
    pub fn released() -> Self {
        Self::default()
    }
}

/// Snapshot of one connected input device.
///
/// # Examples
///
/// ```
/// use daydream_controls::controller::device::{ButtonState, DeviceDescriptor, Hand};
///
/// let device = DeviceDescriptor::new("Daydream Controller", Hand::Left)
///     .with_buttons(vec![ButtonState::released(); 3])
///     .with_axes(vec![0.0, 0.0]);
///
/// assert_eq!(device.buttons.len(), 3);
/// assert_eq!(device.axes, vec![0.0, 0.0]);
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DeviceDescriptor {
    /// Identifier string reported by the device (e.g. `"Daydream Controller"`).
    pub id: String,
    /// Host key that stays stable while the device is connected (e.g. its
    /// evdev node path). Empty when the host cannot tell identical devices
    /// apart.
    pub key: String,
    /// Reported handedness.
    pub hand: Hand,
    /// Connection flag.
    pub connected: bool,
    /// Button states indexed by raw button index.
    pub buttons: Vec<ButtonState>,
    /// Axis values indexed by raw axis index.
    pub axes: Vec<f32>,
}

impl DeviceDescriptor {
    /// Creates a connected device with no buttons or axes.
    #[must_use]
    pub fn new(id: impl Into<String>, hand: Hand) -> Self {
        Self {
            id: id.into(),
            key: String::new(),
            hand,
            connected: true,
            buttons: Vec::new(),
            axes: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }

    #[must_use]
    pub fn with_buttons(mut self, buttons: Vec<ButtonState>) -> Self {
        self.buttons = buttons;
        self
    }

    #[must_use]
    pub fn with_axes(mut self, axes: Vec<f32>) -> Self {
        self.axes = axes;
        self
    }
}

/// Source of the current device list ("list current devices").
///
/// Each call is one "devices updated" notification from the host's point of view.
#[cfg_attr(test, mockall::automock)]
pub trait DeviceProvider {
    /// Enumerate the currently connected devices, in host order.
    fn devices(&mut self) -> Result<Vec<DeviceDescriptor>>;
}
