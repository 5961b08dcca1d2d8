//! # Controller Events
//!
//! Typed event channels emitted by the Daydream component and the observer
//! trait that receives them.
//!
//! ## Channels
//!
//! | Event | Channel name | Payload |
//! |-------|--------------|---------|
//! | [`ControllerEvent::Connected`] | `controllerconnected` | device id, hand |
//! | [`ControllerEvent::Disconnected`] | `controllerdisconnected` | device id |
//! | [`ControllerEvent::ButtonChanged`] | `<button>changed` | raw button state |
//! | [`ControllerEvent::Button`] | `<button><transition>` | transition kind |
//! | [`ControllerEvent::AxisChanged`] | `<group>changed` | `{x, y}` |
//!
//! Every `ButtonChanged` is paired with the raw `buttonchanged` notification it
//! came from. `Button` fires only on an edge.

use serde::Serialize;
use std::fmt;
use tracing::info;

use crate::controller::device::{ButtonState, Hand};

/// Logical buttons of the Daydream controller, in raw index order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Button {
    /// Clickable touchpad (raw index 0).
    Trackpad,
    /// App/menu button (raw index 1).
    Menu,
    /// Home/system button (raw index 2).
    System,
}

impl Button {
    /// All buttons, ordered by raw index.
    pub const ALL: [Button; 3] = [Button::Trackpad, Button::Menu, Button::System];

    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Button::Trackpad => "trackpad",
            Button::Menu => "menu",
            Button::System => "system",
        }
    }
}

impl fmt::Display for Button {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Named axis groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AxisGroup {
    /// Touchpad position, raw axes 0 (x) and 1 (y).
    Trackpad,
}

impl AxisGroup {
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            AxisGroup::Trackpad => "trackpad",
        }
    }
}

impl fmt::Display for AxisGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Edge-triggered button transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Transition {
    Down,
    Up,
    TouchStart,
    TouchEnd,
}

impl Transition {
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Transition::Down => "down",
            Transition::Up => "up",
            Transition::TouchStart => "touchstart",
            Transition::TouchEnd => "touchend",
        }
    }
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Labelled values of a two-component axis group.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct AxisValues {
    pub x: f32,
    pub y: f32,
}

impl From<[f32; 2]> for AxisValues {
    fn from([x, y]: [f32; 2]) -> Self {
        Self { x, y }
    }
}

/// Semantic event emitted by the component.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ControllerEvent {
    /// A matching device was bound.
    Connected { id: String, hand: Hand },
    /// The bound device went away or the component was deactivated.
    Disconnected { id: String },
    /// Raw state notification for a mapped button, edge or not.
    ButtonChanged { button: Button, state: ButtonState },
    /// Edge-triggered transition of a mapped button.
    Button { button: Button, transition: Transition },
    /// One of the mapped components of an axis group changed.
    AxisChanged { group: AxisGroup, values: AxisValues },
}

impl ControllerEvent {
    /// Channel name the event is published on.
    ///
    /// # Examples
    ///
    /// ```
    /// use daydream_controls::events::{Button, ControllerEvent, Transition};
    ///
    /// let event = ControllerEvent::Button {
    ///     button: Button::Trackpad,
    ///     transition: Transition::Down,
    /// };
    /// assert_eq!(event.channel(), "trackpaddown");
    /// ```
    #[must_use]
    pub fn channel(&self) -> String {
        match self {
            ControllerEvent::Connected { .. } => "controllerconnected".to_string(),
            ControllerEvent::Disconnected { .. } => "controllerdisconnected".to_string(),
            ControllerEvent::ButtonChanged { button, .. } => format!("{}changed", button),
            ControllerEvent::Button { button, transition } => format!("{}{}", button, transition),
            ControllerEvent::AxisChanged { group, .. } => format!("{}changed", group),
        }
    }
}

/// Receiver of component events.
pub trait EventSink {
    fn emit(&mut self, event: ControllerEvent);
}

/// Collects events in order. Handy for hosts that drain after each update.
impl EventSink for Vec<ControllerEvent> {
    fn emit(&mut self, event: ControllerEvent) {
        self.push(event);
    }
}

/// Writes every event through `tracing` at INFO level.
#[derive(Debug, Default)]
pub struct LoggingSink;

impl EventSink for LoggingSink {
    fn emit(&mut self, event: ControllerEvent) {
        info!(channel = %event.channel(), "{:?}", event);
    }
}

/// Forwards every event to two sinks.
#[derive(Debug)]
pub struct Tee<A, B>(pub A, pub B);

impl<A: EventSink, B: EventSink> EventSink for Tee<A, B> {
    fn emit(&mut self, event: ControllerEvent) {
        self.0.emit(event.clone());
        self.1.emit(event);
    }
}

/// A disabled sink drops events.
impl<S: EventSink> EventSink for Option<S> {
    fn emit(&mut self, event: ControllerEvent) {
        if let Some(sink) = self {
            sink.emit(event);
        }
    }
}

impl<S: EventSink + ?Sized> EventSink for &mut S {
    fn emit(&mut self, event: ControllerEvent) {
        (**self).emit(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_button_order_matches_raw_indices() {
        assert_eq!(Button::ALL[0], Button::Trackpad);
        assert_eq!(Button::ALL[1], Button::Menu);
        assert_eq!(Button::ALL[2], Button::System);
    }

    #[test]
    fn test_channel_names() {
        let changed = ControllerEvent::ButtonChanged {
            button: Button::Menu,
            state: ButtonState::pressed(),
        };
        assert_eq!(changed.channel(), "menuchanged");

        let edge = ControllerEvent::Button {
            button: Button::System,
            transition: Transition::TouchEnd,
        };
        assert_eq!(edge.channel(), "systemtouchend");

        let axis = ControllerEvent::AxisChanged {
            group: AxisGroup::Trackpad,
            values: [0.5, 0.0].into(),
        };
        assert_eq!(axis.channel(), "trackpadchanged");

        let connected = ControllerEvent::Connected {
            id: "Daydream Controller".into(),
            hand: Hand::Left,
        };
        assert_eq!(connected.channel(), "controllerconnected");
        assert_eq!(
            ControllerEvent::Disconnected { id: "x".into() }.channel(),
            "controllerdisconnected"
        );
    }

    #[test]
    fn test_vec_sink_preserves_order() {
        let mut sink: Vec<ControllerEvent> = Vec::new();
        sink.emit(ControllerEvent::Disconnected { id: "a".into() });
        sink.emit(ControllerEvent::Disconnected { id: "b".into() });
        assert_eq!(
            sink,
            vec![
                ControllerEvent::Disconnected { id: "a".into() },
                ControllerEvent::Disconnected { id: "b".into() },
            ]
        );
    }

    #[test]
    fn test_tee_forwards_to_both() {
        let mut tee: Tee<Vec<ControllerEvent>, Vec<ControllerEvent>> = Tee(Vec::new(), Vec::new());
        tee.emit(ControllerEvent::Disconnected { id: "a".into() });
        assert_eq!(tee.0.len(), 1);
        assert_eq!(tee.0, tee.1);
    }

    #[test]
    fn test_optional_sink() {
        let mut disabled: Option<Vec<ControllerEvent>> = None;
        disabled.emit(ControllerEvent::Disconnected { id: "a".into() });
        assert!(disabled.is_none());

        let mut enabled: Option<Vec<ControllerEvent>> = Some(Vec::new());
        enabled.emit(ControllerEvent::Disconnected { id: "a".into() });
        assert_eq!(enabled.map(|events| events.len()), Some(1));
    }

    #[test]
    fn test_event_serializes_with_type_tag() {
        let event = ControllerEvent::Button {
            button: Button::Trackpad,
            transition: Transition::TouchStart,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "button");
        assert_eq!(json["button"], "trackpad");
        assert_eq!(json["transition"], "touchstart");
    }
}
