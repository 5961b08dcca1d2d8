//! # Controller Module
//!
//! Daydream controller input handling.
//!
//! This module handles:
//! - Device descriptors and the host enumeration seam ([`device`])
//! - Binding one matching controller at a time ([`presence`])
//! - Turning raw button/axis snapshots into edge events ([`mapper`])
//! - Trackpad deadzone shaping ([`calibration`])
//! - Button mesh coloring on the loaded model ([`visual`])
//! - The component tying it together ([`daydream`])
//! - Reading real controllers through Linux evdev ([`evdev_input`])

pub mod calibration;
pub mod daydream;
pub mod device;
pub mod evdev_input;
pub mod mapper;
pub mod presence;
pub mod visual;
