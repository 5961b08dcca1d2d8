//! # Visual Feedback
//!
//! Reflects button transitions onto the loaded controller model by recoloring
//! the mesh of each button.
//!
//! The scene graph itself belongs to the host. This module only sees it
//! through [`ModelRoot`] (to look up meshes by name once the model is loaded)
//! and [`ButtonMesh`] (to set a material color).
//!
//! ## Color Selection
//!
//! | Transition | Color |
//! |------------|-------|
//! | down | `button_highlight_color` |
//! | touchstart | `button_touched_color` |
//! | anything else | `button_color` |

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use tracing::{debug, trace};

use crate::error::{ControlsError, Result};
use crate::events::{Button, Transition};

/// Geometry file requested from the model loader.
pub const MODEL_OBJ_URL: &str = "vr_controller_daydream.obj";

/// Material file requested from the model loader.
pub const MODEL_MTL_URL: &str = "vr_controller_daydream.mtl";

/// Pivot offset applied to the model root once loaded.
pub const MODEL_PIVOT_OFFSET: [f32; 3] = [0.0, 0.0, -0.04];

/// Mesh names of each button in the Daydream controller model.
pub const BUTTON_MESH_NAMES: [(Button, &str); 3] = [
    (Button::Trackpad, "TouchPad_TouchPad_Cylinder.003"),
    (Button::Menu, "AppButton_AppButton_Cylinder.004"),
    (Button::System, "HomeButton_HomeButton_Cylinder.005"),
];

/// 24-bit RGB color parsed from `#RGB` or `#RRGGBB`.
///
/// # Examples
///
/// ```
/// use daydream_controls::controller::visual::Color;
///
/// let color: Color = "#777777".parse().unwrap();
/// assert_eq!(color, Color::new(0x77, 0x77, 0x77));
/// assert_eq!("#fff".parse::<Color>().unwrap(), Color::WHITE);
/// assert_eq!(color.to_string(), "#777777");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Color = Color::new(0x00, 0x00, 0x00);
    pub const WHITE: Color = Color::new(0xff, 0xff, 0xff);

    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

impl FromStr for Color {
    type Err = ControlsError;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || ControlsError::InvalidColor(s.to_string());

        let hex = s.trim().strip_prefix('#').ok_or_else(invalid)?;
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(invalid());
        }

        let channel = |digits: &str| u8::from_str_radix(digits, 16).map_err(|_| invalid());
        match hex.len() {
            3 => {
                // #RGB expands each digit: #abc == #aabbcc
                let mut rgb = [0u8; 3];
                for (slot, i) in rgb.iter_mut().zip(0..3) {
                    *slot = channel(&hex[i..=i])? * 0x11;
                }
                Ok(Color::new(rgb[0], rgb[1], rgb[2]))
            }
            6 => Ok(Color::new(
                channel(&hex[0..2])?,
                channel(&hex[2..4])?,
                channel(&hex[4..6])?,
            )),
            _ => Err(invalid()),
        }
    }
}

impl TryFrom<String> for Color {
    type Error = ControlsError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_string()
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// The three button colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ButtonPalette {
    pub idle: Color,
    pub touched: Color,
    pub highlight: Color,
}

impl Default for ButtonPalette {
    fn default() -> Self {
        Self {
            idle: Color::BLACK,
            touched: Color::new(0x77, 0x77, 0x77),
            highlight: Color::WHITE,
        }
    }
}

impl ButtonPalette {
    /// Picks the color for a transition.
    #[must_use]
    pub fn color_for(&self, transition: Transition) -> Color {
        match transition {
            Transition::Down => self.highlight,
            Transition::TouchStart => self.touched,
            Transition::Up | Transition::TouchEnd => self.idle,
        }
    }
}

/// A button mesh in the host's scene graph.
pub trait ButtonMesh {
    /// Sets the color of the mesh's material.
    fn set_color(&mut self, color: Color);
}

/// Root object of a loaded controller model.
pub trait ModelRoot {
    /// Looks up a descendant by name, returning a handle to its mesh.
    fn object_by_name(&mut self, name: &str) -> Option<Box<dyn ButtonMesh>>;

    /// Sets the root's local position.
    fn set_position(&mut self, position: [f32; 3]);
}

/// Meshes cached from the loaded model, keyed by button.
///
/// Buttons without a mesh are absent; updates for them are no-ops.
#[derive(Default)]
pub struct ButtonVisuals {
    meshes: HashMap<Button, Box<dyn ButtonMesh>>,
}

impl fmt::Debug for ButtonVisuals {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ButtonVisuals")
            .field("buttons", &self.meshes.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

impl ButtonVisuals {
    /// Caches the button meshes of a freshly loaded model and applies the
    /// pivot offset.
    ///
    /// Setting the same absolute position again is harmless, so reloading
    /// the model does not drift it.
    pub fn from_model(root: &mut dyn ModelRoot) -> Self {
        let mut meshes = HashMap::new();
        for (button, name) in BUTTON_MESH_NAMES {
            match root.object_by_name(name) {
                Some(mesh) => {
                    meshes.insert(button, mesh);
                }
                None => debug!("Model has no mesh {} for {}", name, button),
            }
        }
        root.set_position(MODEL_PIVOT_OFFSET);
        Self { meshes }
    }

    #[must_use]
    pub fn has_mesh(&self, button: Button) -> bool {
        self.meshes.contains_key(&button)
    }

    /// Recolors `button` for `transition`. No-op without a mesh.
    pub fn update(&mut self, button: Button, transition: Transition, palette: &ButtonPalette) {
        let Some(mesh) = self.meshes.get_mut(&button) else {
            trace!("No mesh for {}, skipping visual update", button);
            return;
        };
        mesh.set_color(palette.color_for(transition));
    }

    /// Sets every cached mesh back to the idle color.
    pub fn reset(&mut self, palette: &ButtonPalette) {
        for mesh in self.meshes.values_mut() {
            mesh.set_color(palette.idle);
        }
    }
}

#[cfg(test)]
pub(crate) mod mocks {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    /// Shared record of colors applied to one mesh.
    pub type ColorLog = Rc<RefCell<Vec<Color>>>;

    /// Mesh that records every color set on it.
    pub struct MockMesh {
        pub colors: ColorLog,
    }

    impl ButtonMesh for MockMesh {
        fn set_color(&mut self, color: Color) {
            self.colors.borrow_mut().push(color);
        }
    }

    /// Model with a configurable set of named meshes.
    #[derive(Default)]
    pub struct MockModel {
        pub meshes: HashMap<String, ColorLog>,
        pub positions: Vec<[f32; 3]>,
    }

    impl MockModel {
        /// Model containing every Daydream button mesh.
        pub fn daydream() -> Self {
            let mut model = Self::default();
            for (_, name) in BUTTON_MESH_NAMES {
                model.meshes.insert(name.to_string(), ColorLog::default());
            }
            model
        }

        pub fn colors(&self, button: Button) -> Vec<Color> {
            let name = BUTTON_MESH_NAMES
                .iter()
                .find(|(b, _)| *b == button)
                .map(|(_, n)| *n)
                .unwrap();
            self.meshes
                .get(name)
                .map(|log| log.borrow().clone())
                .unwrap_or_default()
        }
    }

    impl ModelRoot for MockModel {
        fn object_by_name(&mut self, name: &str) -> Option<Box<dyn ButtonMesh>> {
            self.meshes.get(name).map(|colors| {
                Box::new(MockMesh {
                    colors: Rc::clone(colors),
                }) as Box<dyn ButtonMesh>
            })
        }

        fn set_position(&mut self, position: [f32; 3]) {
            self.positions.push(position);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::mocks::MockModel;
    use super::*;

    // ==================== Color Tests ====================

    #[test]
    fn test_parse_long_form() {
        assert_eq!("#000000".parse::<Color>().unwrap(), Color::BLACK);
        assert_eq!("#FFFFFF".parse::<Color>().unwrap(), Color::WHITE);
        assert_eq!("#12abEF".parse::<Color>().unwrap(), Color::new(0x12, 0xab, 0xef));
    }

    #[test]
    fn test_parse_short_form() {
        assert_eq!("#777".parse::<Color>().unwrap(), Color::new(0x77, 0x77, 0x77));
        assert_eq!("#f0a".parse::<Color>().unwrap(), Color::new(0xff, 0x00, 0xaa));
    }

    #[test]
    fn test_parse_rejects_malformed() {
        for bad in ["", "#", "777777", "#7777", "#GGGGGG", "#1234567", "red", "#ééé"] {
            match bad.parse::<Color>() {
                Err(ControlsError::InvalidColor(s)) => assert_eq!(s, bad),
                other => panic!("Expected InvalidColor for {:?}, got: {:?}", bad, other),
            }
        }
    }

    #[test]
    fn test_display_is_lowercase_long_form() {
        assert_eq!(Color::new(0xAB, 0x01, 0xFF).to_string(), "#ab01ff");
    }

    // ==================== Palette Tests ====================

    #[test]
    fn test_palette_defaults() {
        let palette = ButtonPalette::default();
        assert_eq!(palette.idle, Color::BLACK);
        assert_eq!(palette.touched, Color::new(0x77, 0x77, 0x77));
        assert_eq!(palette.highlight, Color::WHITE);
    }

    #[test]
    fn test_color_for_transition() {
        let palette = ButtonPalette::default();
        assert_eq!(palette.color_for(Transition::Down), palette.highlight);
        assert_eq!(palette.color_for(Transition::TouchStart), palette.touched);
        assert_eq!(palette.color_for(Transition::Up), palette.idle);
        assert_eq!(palette.color_for(Transition::TouchEnd), palette.idle);
    }

    // ==================== ButtonVisuals Tests ====================

    #[test]
    fn test_from_model_caches_all_meshes_and_offsets_pivot() {
        let mut model = MockModel::daydream();
        let visuals = ButtonVisuals::from_model(&mut model);

        for button in Button::ALL {
            assert!(visuals.has_mesh(button));
        }
        assert_eq!(model.positions, vec![MODEL_PIVOT_OFFSET]);
    }

    #[test]
    fn test_pivot_offset_is_idempotent() {
        let mut model = MockModel::daydream();
        ButtonVisuals::from_model(&mut model);
        ButtonVisuals::from_model(&mut model);
        assert_eq!(model.positions, vec![MODEL_PIVOT_OFFSET, MODEL_PIVOT_OFFSET]);
    }

    #[test]
    fn test_update_colors_mesh() {
        let mut model = MockModel::daydream();
        let palette = ButtonPalette::default();
        let mut visuals = ButtonVisuals::from_model(&mut model);

        visuals.update(Button::Trackpad, Transition::TouchStart, &palette);
        visuals.update(Button::Trackpad, Transition::Down, &palette);
        visuals.update(Button::Trackpad, Transition::Up, &palette);

        assert_eq!(
            model.colors(Button::Trackpad),
            vec![palette.touched, palette.highlight, palette.idle]
        );
        assert!(model.colors(Button::Menu).is_empty());
    }

    #[test]
    fn test_missing_mesh_is_noop() {
        let mut model = MockModel::daydream();
        model.meshes.remove("HomeButton_HomeButton_Cylinder.005");
        let mut visuals = ButtonVisuals::from_model(&mut model);

        assert!(!visuals.has_mesh(Button::System));
        visuals.update(Button::System, Transition::Down, &ButtonPalette::default());
        assert!(model.colors(Button::System).is_empty());
    }

    #[test]
    fn test_reset_sets_idle_everywhere() {
        let mut model = MockModel::daydream();
        let palette = ButtonPalette {
            idle: Color::new(1, 2, 3),
            ..ButtonPalette::default()
        };
        let mut visuals = ButtonVisuals::from_model(&mut model);
        visuals.update(Button::Menu, Transition::Down, &palette);

        visuals.reset(&palette);

        for button in Button::ALL {
            assert_eq!(model.colors(button).last(), Some(&palette.idle));
        }
    }
}
