//! Visual style lookup for dice (shape and crystal color).

use serde::{Deserialize, Serialize};

use super::DiceType;

/// Solid used to render a die.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DieShape {
    Tetrahedron,
    Cube,
    Octahedron,
    Trapezohedron,
    Dodecahedron,
    Icosahedron,
    /// Used for d100 and any face count without a dedicated solid.
    Sphere,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DiceStyle {
    pub shape: DieShape,
    /// sRGBA, each channel in `[0, 1]`.
    pub color: [f32; 4],
}

impl DiceStyle {
    pub const DEFAULT: DiceStyle = DiceStyle {
        shape: DieShape::Sphere,
        color: [0.7, 0.7, 0.75, 0.92],
    };

    /// Style for any face count; non-canonical counts get [`DiceStyle::DEFAULT`].
    pub fn for_faces(faces: u32) -> DiceStyle {
        DiceType::from_faces(faces)
            .map(DiceStyle::for_type)
            .unwrap_or(DiceStyle::DEFAULT)
    }

    pub fn for_type(die_type: DiceType) -> DiceStyle {
        // Slightly translucent crystal-like colors
        let (shape, color) = match die_type {
            DiceType::D4 => (DieShape::Tetrahedron, [0.3, 0.4, 0.9, 0.92]), // Blue crystal
            DiceType::D6 => (DieShape::Cube, [0.1, 0.1, 0.1, 0.95]),       // Smoke crystal
            DiceType::D8 => (DieShape::Octahedron, [0.6, 0.2, 0.8, 0.92]), // Purple crystal
            DiceType::D10 => (DieShape::Trapezohedron, [0.95, 0.95, 0.95, 0.92]),
            DiceType::D12 => (DieShape::Dodecahedron, [0.95, 0.5, 0.1, 0.92]), // Orange crystal
            DiceType::D20 => (DieShape::Icosahedron, [0.95, 0.85, 0.2, 0.92]), // Yellow crystal
            DiceType::D100 => (DieShape::Sphere, [0.2, 0.75, 0.7, 0.92]),
        };
        DiceStyle { shape, color }
    }

    /// Color as 8-bit RGB, for terminal truecolor output.
    pub fn rgb8(&self) -> (u8, u8, u8) {
        let c = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        (c(self.color[0]), c(self.color[1]), c(self.color[2]))
    }
}
