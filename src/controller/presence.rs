//! # Presence Tracker
//!
//! Resolves which connected device, if any, the component is bound to.
//!
//! ## Matching Rules
//!
//! 1. The device identifier must start with the id prefix.
//! 2. With a hand configured, the device must report exactly that hand.
//!    Devices reporting no hand do not qualify.
//! 3. Without a hand configured, any handedness qualifies.
//! 4. Among qualifying devices the first in host order wins. The list is
//!    never re-sorted.

use tracing::{debug, info};

use super::device::{DeviceDescriptor, Hand};

/// Identifier prefix reported by Daydream controllers.
pub const GAMEPAD_ID_PREFIX: &str = "Daydream Controller";

/// The device the component is currently bound to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
    /// Identifier string of the bound device.
    pub id: String,
    /// Host key of the bound device.
    pub key: String,
    /// Handedness reported by the device.
    pub hand: Hand,
    /// Position of the device in the host list when it was last resolved.
    pub index: usize,
}

impl Binding {
    /// Returns `true` when `device` is the bound device.
    ///
    /// Matches on the host key as well as id and hand, so two identically
    /// named controllers are told apart when the host provides keys.
    #[must_use]
    pub fn is_device(&self, device: &DeviceDescriptor) -> bool {
        device.connected && device.key == self.key && device.id == self.id && device.hand == self.hand
    }
}

/// What a presence update did to the binding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PresenceChange {
    /// The binding is unchanged (bound to the same device, or still unbound).
    Unchanged,
    /// A device was bound where none was before.
    Attached(Binding),
    /// The bound device disappeared and nothing replaced it.
    Detached(Binding),
    /// The bound device disappeared and another matching one was bound.
    Replaced { old: Binding, new: Binding },
}

/// Returns `true` when `device` satisfies the prefix and hand filters.
#[must_use]
pub fn is_candidate(device: &DeviceDescriptor, id_prefix: &str, hand: Hand) -> bool {
    if !device.connected || !device.id.starts_with(id_prefix) {
        return false;
    }
    !hand.is_specified() || device.hand == hand
}

/// Finds the device to bind among `candidates`.
///
/// # Examples
///
/// ```
/// use daydream_controls::controller::device::{DeviceDescriptor, Hand};
/// use daydream_controls::controller::presence::resolve_presence;
///
/// let devices = vec![
///     DeviceDescriptor::new("OpenVR Gamepad", Hand::Left),
///     DeviceDescriptor::new("Daydream Controller", Hand::Right),
///     DeviceDescriptor::new("Daydream Controller", Hand::Left),
/// ];
///
/// let (index, device) = resolve_presence(&devices, "Daydream Controller", Hand::Left).unwrap();
/// assert_eq!(index, 2);
/// assert_eq!(device.hand, Hand::Left);
///
/// let (index, _) = resolve_presence(&devices, "Daydream Controller", Hand::Unspecified).unwrap();
/// assert_eq!(index, 1);
/// ```
#[must_use]
pub fn resolve_presence<'a>(
    candidates: &'a [DeviceDescriptor],
    id_prefix: &str,
    hand: Hand,
) -> Option<(usize, &'a DeviceDescriptor)> {
    candidates
        .iter()
        .enumerate()
        .find(|(_, device)| is_candidate(device, id_prefix, hand))
}

/// Holds at most one [`Binding`] and updates it from device lists.
#[derive(Debug, Clone)]
pub struct PresenceTracker {
    id_prefix: String,
    hand: Hand,
    binding: Option<Binding>,
}

impl PresenceTracker {
    /// Creates an unbound tracker.
    #[must_use]
    pub fn new(id_prefix: impl Into<String>, hand: Hand) -> Self {
        Self {
            id_prefix: id_prefix.into(),
            hand,
            binding: None,
        }
    }

    #[must_use]
    pub fn id_prefix(&self) -> &str {
        &self.id_prefix
    }

    #[must_use]
    pub fn hand(&self) -> Hand {
        self.hand
    }

    #[must_use]
    pub fn binding(&self) -> Option<&Binding> {
        self.binding.as_ref()
    }

    /// Returns the bound device's entry in `devices`, if still present.
    #[must_use]
    pub fn bound_device<'a>(&self, devices: &'a [DeviceDescriptor]) -> Option<&'a DeviceDescriptor> {
        let binding = self.binding.as_ref()?;
        devices.iter().find(|d| binding.is_device(d))
    }

    /// Re-resolves the binding against the current device list.
    ///
    /// A still-present bound device is kept even if an earlier device in the
    /// list would also match. A vanished one is detached before a replacement
    /// is considered.
    pub fn update(&mut self, devices: &[DeviceDescriptor]) -> PresenceChange {
        let still_present = self
            .binding
            .as_ref()
            .and_then(|binding| devices.iter().position(|d| binding.is_device(d)));
        if let (Some(index), Some(binding)) = (still_present, self.binding.as_mut()) {
            if index != binding.index {
                debug!("Bound device {} moved to index {}", binding.id, index);
                binding.index = index;
            }
            return PresenceChange::Unchanged;
        }

        let old = self.binding.take();
        if let Some(old) = &old {
            info!("Controller {} ({}) no longer present", old.id, old.hand);
        }

        let new = resolve_presence(devices, &self.id_prefix, self.hand).map(|(index, device)| Binding {
            id: device.id.clone(),
            key: device.key.clone(),
            hand: device.hand,
            index,
        });
        if let Some(new) = &new {
            info!("Controller {} ({}) found at index {}", new.id, new.hand, new.index);
        }
        self.binding = new.clone();

        match (old, new) {
            (None, None) => PresenceChange::Unchanged,
            (None, Some(new)) => PresenceChange::Attached(new),
            (Some(old), None) => PresenceChange::Detached(old),
            (Some(old), Some(new)) => PresenceChange::Replaced { old, new },
        }
    }

    /// Drops the binding, returning it.
    pub fn clear(&mut self) -> Option<Binding> {
        self.binding.take()
    }
}
