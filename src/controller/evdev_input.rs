//! # Linux evdev Device Provider
//!
//! Enumerates `/dev/input/event*` devices and reads their current button and
//! axis state as [`DeviceDescriptor`]s.
//!
//! ## Mapping
//!
//! - **Identifier**: the evdev device name (e.g. `"Daydream Controller"`).
//! - **Key**: the device node path, which tells identically named
//!   controllers apart.
//! - **Handedness**: a `left` or `right` word in the name, otherwise unspecified.
//! - **Buttons**: supported `BTN_*` keys in kernel code order (keyboard
//!   `KEY_*` codes are skipped). evdev has no
//!   capacitive touch for buttons, so `touched` mirrors `pressed`.
//! - **Axes**: supported absolute axes in kernel code order, normalized from
//!   the reported `minimum..=maximum` to `-1.0..=1.0`.
//!
//! Devices are kept open between calls and dropped when their node disappears
//! or stops answering.

use evdev::{Device, Key};
use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use super::device::{ButtonState, DeviceDescriptor, DeviceProvider, Hand};
use crate::error::{ControlsError, Result};

/// Directory scanned for event devices
const INPUT_DIR: &str = "/dev/input";

/// Kernel key code ranges reserved for buttons: `BTN_MISC..=BTN_GEAR_UP`
/// and `BTN_TRIGGER_HAPPY1..=BTN_TRIGGER_HAPPY40`.
const BUTTON_CODE_RANGES: [std::ops::RangeInclusive<u16>; 2] = [0x100..=0x15f, 0x2c0..=0x2e7];

/// Returns `true` for `BTN_*` codes, `false` for keyboard `KEY_*` codes.
///
/// # Examples
///
/// ```
/// use daydream_controls::controller::evdev_input::is_button_code;
///
/// assert!(is_button_code(0x130)); // BTN_SOUTH
/// assert!(!is_button_code(0x160)); // KEY_OK
/// ```
#[must_use]
pub fn is_button_code(code: u16) -> bool {
    BUTTON_CODE_RANGES.iter().any(|range| range.contains(&code))
}

/// Infers handedness from a device name.
///
/// # Examples
///
/// ```
/// use daydream_controls::controller::device::Hand;
/// use daydream_controls::controller::evdev_input::hand_from_name;
///
/// assert_eq!(hand_from_name("Daydream Controller-left"), Hand::Left);
/// assert_eq!(hand_from_name("Daydream Controller (Right)"), Hand::Right);
/// assert_eq!(hand_from_name("Daydream Controller"), Hand::Unspecified);
/// ```
#[must_use]
pub fn hand_from_name(name: &str) -> Hand {
    name.to_ascii_lowercase()
        .split(|c: char| !c.is_ascii_alphanumeric())
        .find_map(|word| match word {
            "left" => Some(Hand::Left),
            "right" => Some(Hand::Right),
            _ => None,
        })
        .unwrap_or(Hand::Unspecified)
}

/// Normalizes a raw absolute axis value to `-1.0..=1.0`.
///
/// Degenerate ranges (`maximum <= minimum`) read as center.
///
/// # Examples
///
/// ```
/// use daydream_controls::controller::evdev_input::normalize_axis;
///
/// assert_eq!(normalize_axis(0, 0, 255), -1.0);
/// assert_eq!(normalize_axis(255, 0, 255), 1.0);
/// assert_eq!(normalize_axis(0, -512, 512), 0.0);
/// ```
#[must_use]
pub fn normalize_axis(value: i32, minimum: i32, maximum: i32) -> f32 {
    if maximum <= minimum {
        return 0.0;
    }
    let span = i64::from(maximum) - i64::from(minimum);
    let offset = i64::from(value) - i64::from(minimum);
    let normalized = (offset as f64 / span as f64) * 2.0 - 1.0;
    normalized.clamp(-1.0, 1.0) as f32
}

/// Reads a device's current state into a descriptor.
fn describe(path: &Path, device: &Device) -> io::Result<DeviceDescriptor> {
    let name = device.name().unwrap_or_default().to_string();
    let hand = hand_from_name(&name);

    let buttons = match device.supported_keys() {
        Some(supported) => {
            let state = device.get_key_state()?;
            supported
                .iter()
                .filter(|key| is_button_code(key.code()))
                .map(|key: Key| {
                    let pressed = state.contains(key);
                    ButtonState {
                        pressed,
                        touched: pressed,
                        value: if pressed { 1.0 } else { 0.0 },
                    }
                })
                .collect()
        }
        None => Vec::new(),
    };

    let axes = match device.supported_absolute_axes() {
        Some(supported) => {
            let state = device.get_abs_state()?;
            supported
                .iter()
                .map(|axis| {
                    let info = state[axis.0 as usize];
                    normalize_axis(info.value, info.minimum, info.maximum)
                })
                .collect()
        }
        None => Vec::new(),
    };

    Ok(DeviceDescriptor::new(name, hand)
        .with_key(path.to_string_lossy())
        .with_buttons(buttons)
        .with_axes(axes))
}

/// [`DeviceProvider`] backed by Linux evdev.
pub struct EvdevProvider {
    /// Single device to read, or `None` to scan [`INPUT_DIR`].
    device_path: Option<PathBuf>,
    /// Open devices keyed by path; `BTreeMap` keeps host order deterministic.
    open: BTreeMap<PathBuf, Device>,
}

impl std::fmt::Debug for EvdevProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EvdevProvider")
            .field("device_path", &self.device_path)
            .field("open", &self.open.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl EvdevProvider {
    /// Creates a provider that scans every event device.
    #[must_use]
    pub fn scan() -> Self {
        Self {
            device_path: None,
            open: BTreeMap::new(),
        }
    }

    /// Creates a provider for a single device node.
    ///
    /// An empty path falls back to scanning.
    #[must_use]
    pub fn with_path(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        if path.as_os_str().is_empty() {
            return Self::scan();
        }
        Self {
            device_path: Some(path.to_path_buf()),
            open: BTreeMap::new(),
        }
    }

    /// Event device nodes currently present.
    fn candidate_paths(&self) -> Result<Vec<PathBuf>> {
        if let Some(path) = &self.device_path {
            return Ok(if path.exists() { vec![path.clone()] } else { Vec::new() });
        }

        let input_dir = Path::new(INPUT_DIR);
        if !input_dir.exists() {
            return Err(ControlsError::Device(format!("{} directory not found", INPUT_DIR)));
        }

        let mut paths = Vec::new();
        for entry in std::fs::read_dir(input_dir)
            .map_err(|e| ControlsError::Device(format!("Failed to read {}: {}", INPUT_DIR, e)))?
        {
            let path = entry
                .map_err(|e| ControlsError::Device(format!("Failed to read directory entry: {}", e)))?
                .path();
            let is_event = path
                .file_name()
                .map(|name| name.to_string_lossy().starts_with("event"))
                .unwrap_or(false);
            if is_event {
                paths.push(path);
            }
        }
        Ok(paths)
    }

    /// Opens new nodes and forgets vanished ones.
    fn refresh(&mut self) -> Result<()> {
        let present = self.candidate_paths()?;

        self.open.retain(|path, _| {
            let keep = present.contains(path);
            if !keep {
                info!("Input device {} removed", path.display());
            }
            keep
        });

        for path in present {
            if self.open.contains_key(&path) {
                continue;
            }
            match Device::open(&path) {
                Ok(device) => {
                    debug!(
                        "Opened input device {} ({})",
                        path.display(),
                        device.name().unwrap_or("unnamed")
                    );
                    self.open.insert(path, device);
                }
                Err(e) => {
                    // Permission denied or other errors - skip device
                    debug!("Could not open {}: {}", path.display(), e);
                }
            }
        }
        Ok(())
    }
}

impl DeviceProvider for EvdevProvider {
    fn devices(&mut self) -> Result<Vec<DeviceDescriptor>> {
        self.refresh()?;

        let mut devices = Vec::with_capacity(self.open.len());
        let mut failed = Vec::new();
        for (path, device) in &self.open {
            match describe(path, device) {
                Ok(descriptor) => devices.push(descriptor),
                Err(e) => {
                    warn!("Failed to read {}: {}", path.display(), e);
                    failed.push(path.clone());
                }
            }
        }
        for path in failed {
            self.open.remove(&path);
        }
        Ok(devices)
    }
}
