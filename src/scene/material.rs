//! Surface materials as the scene graph stores them.
//!
//! A node's material is either [`Material::Standard`] (opaque-capable) or
//! [`Material::Physical`] (adds transmission, thickness and index of
//! refraction). Promotion from standard to physical is explicit through
//! [`Material::promote`]; nothing ever demotes a physical material.

use serde::{Deserialize, Serialize};

/// Display color with channels in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    pub const WHITE: Self = Self::new(1.0, 1.0, 1.0);

    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    pub fn from_srgb8(rgb: [u8; 3]) -> Self {
        Self::new(
            rgb[0] as f32 / 255.0,
            rgb[1] as f32 / 255.0,
            rgb[2] as f32 / 255.0,
        )
    }

    pub fn to_srgb8(&self) -> [u8; 3] {
        [
            channel_to_u8(self.r),
            channel_to_u8(self.g),
            channel_to_u8(self.b),
        ]
    }

    /// Parse `#rrggbb`, `#rgb`, or either form without the leading `#`.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let digits = hex.trim().trim_start_matches('#');
        if !digits.is_ascii() {
            return None;
        }
        let rgb = match digits.len() {
            6 => [
                u8::from_str_radix(&digits[0..2], 16).ok()?,
                u8::from_str_radix(&digits[2..4], 16).ok()?,
                u8::from_str_radix(&digits[4..6], 16).ok()?,
            ],
            3 => {
                let mut rgb = [0u8; 3];
                for (slot, digit) in rgb.iter_mut().zip(digits.chars()) {
                    let value = digit.to_digit(16)? as u8;
                    *slot = value * 17;
                }
                rgb
            }
            _ => return None,
        };
        Some(Self::from_srgb8(rgb))
    }

    /// Set from a hex string. An unparsable string leaves the color as it was.
    pub fn set_hex(&mut self, hex: &str) {
        match Self::from_hex(hex) {
            Some(color) => *self = color,
            None => log::warn!("Unknown color '{}', keeping {}", hex, self.to_hex()),
        }
    }

    pub fn to_hex(&self) -> String {
        let [r, g, b] = self.to_srgb8();
        format!("#{:02x}{:02x}{:02x}", r, g, b)
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::WHITE
    }
}

fn channel_to_u8(value: f32) -> u8 {
    (value.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// Opaque handle to a texture owned by the rendering engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureHandle(pub u32);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TextureMaps {
    pub base_color: Option<TextureHandle>,
    pub normal: Option<TextureHandle>,
    pub roughness: Option<TextureHandle>,
    pub metalness: Option<TextureHandle>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StandardMaterial {
    pub name: String,
    pub color: Color,
    pub roughness: f32,
    pub metalness: f32,
    pub opacity: f32,
    pub transparent: bool,
    pub maps: TextureMaps,
}

impl StandardMaterial {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

impl Default for StandardMaterial {
    fn default() -> Self {
        Self {
            name: String::new(),
            color: Color::WHITE,
            roughness: 1.0,
            metalness: 0.0,
            opacity: 1.0,
            transparent: false,
            maps: TextureMaps::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PhysicalMaterial {
    pub base: StandardMaterial,
    pub transmission: f32,
    pub thickness: f32,
    pub ior: f32,
}

impl PhysicalMaterial {
    /// Carries over name, color, texture maps, roughness and metalness.
    /// Everything else starts from physical defaults.
    pub fn from_standard(standard: &StandardMaterial) -> Self {
        Self {
            base: StandardMaterial {
                name: standard.name.clone(),
                color: standard.color,
                roughness: standard.roughness,
                metalness: standard.metalness,
                maps: standard.maps,
                ..StandardMaterial::default()
            },
            ..Self::default()
        }
    }
}

impl Default for PhysicalMaterial {
    fn default() -> Self {
        Self {
            base: StandardMaterial::default(),
            transmission: 0.0,
            thickness: 0.0,
            ior: 1.5,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Material {
    Standard(StandardMaterial),
    Physical(PhysicalMaterial),
}

impl Material {
    pub fn name(&self) -> &str {
        &self.standard().name
    }

    pub fn standard(&self) -> &StandardMaterial {
        match self {
            Material::Standard(standard) => standard,
            Material::Physical(physical) => &physical.base,
        }
    }

    pub fn standard_mut(&mut self) -> &mut StandardMaterial {
        match self {
            Material::Standard(standard) => standard,
            Material::Physical(physical) => &mut physical.base,
        }
    }

    pub fn physical(&self) -> Option<&PhysicalMaterial> {
        match self {
            Material::Physical(physical) => Some(physical),
            Material::Standard(_) => None,
        }
    }

    pub fn is_physical(&self) -> bool {
        matches!(self, Material::Physical(_))
    }

    /// Replace a standard material with an equivalent physical one.
    ///
    /// Returns `false` when the material was already physical.
    pub fn promote(&mut self) -> bool {
        let Material::Standard(standard) = self else {
            return false;
        };
        let physical = PhysicalMaterial::from_standard(standard);
        *self = Material::Physical(physical);
        true
    }

    /// Resolved values as the material editor shows them.
    pub fn read_config(&self) -> MaterialConfig {
        let base = self.standard();
        let (transmission, ior) = match self {
            Material::Physical(physical) => (
                non_zero_or(physical.transmission, 0.0),
                non_zero_or(physical.ior, 1.0),
            ),
            Material::Standard(_) => (0.0, 1.0),
        };
        MaterialConfig {
            color: base.color.to_hex(),
            roughness: base.roughness,
            metalness: base.metalness,
            transmission,
            ior,
            opacity: base.opacity,
        }
    }
}

fn non_zero_or(value: f32, fallback: f32) -> f32 {
    if value == 0.0 || value.is_nan() {
        fallback
    } else {
        value
    }
}

impl From<StandardMaterial> for Material {
    fn from(material: StandardMaterial) -> Self {
        Material::Standard(material)
    }
}

impl From<PhysicalMaterial> for Material {
    fn from(material: PhysicalMaterial) -> Self {
        Material::Physical(material)
    }
}

/// Fully resolved appearance of one surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialConfig {
    pub color: String,
    pub roughness: f32,
    pub metalness: f32,
    pub transmission: f32,
    pub ior: f32,
    pub opacity: f32,
}

impl Default for MaterialConfig {
    fn default() -> Self {
        Self {
            color: "#ffffff".to_string(),
            roughness: 0.5,
            metalness: 0.0,
            transmission: 0.0,
            ior: 1.0,
            opacity: 1.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_parsing_accepts_long_and_short_forms() {
        assert_eq!(Color::from_hex("#ff8000").unwrap().to_hex(), "#ff8000");
        assert_eq!(Color::from_hex("00ff00").unwrap().to_hex(), "#00ff00");
        assert_eq!(Color::from_hex("#fff").unwrap(), Color::WHITE);
        assert!(Color::from_hex("#ggg000").is_none());
        assert!(Color::from_hex("#12345").is_none());
        assert!(Color::from_hex("").is_none());
    }

    #[test]
    fn set_hex_keeps_previous_color_on_garbage() {
        let mut color = Color::new(1.0, 0.0, 0.0);
        color.set_hex("not-a-color");
        assert_eq!(color.to_hex(), "#ff0000");
        color.set_hex("#0000ff");
        assert_eq!(color.to_hex(), "#0000ff");
    }

    #[test]
    fn promotion_copies_surface_values() {
        let mut standard = StandardMaterial::named("Lid");
        standard.color = Color::from_hex("#336699").unwrap();
        standard.roughness = 0.4;
        standard.metalness = 0.7;
        standard.opacity = 0.3;
        standard.maps = TextureMaps {
            base_color: Some(TextureHandle(1)),
            normal: Some(TextureHandle(2)),
            roughness: Some(TextureHandle(3)),
            metalness: None,
        };
        let mut material = Material::from(standard.clone());

        assert!(material.promote());
        let physical = material.physical().unwrap();
        assert_eq!(physical.base.color, standard.color);
        assert_eq!(physical.base.maps, standard.maps);
        assert_eq!(physical.base.roughness, 0.4);
        assert_eq!(physical.base.metalness, 0.7);
        assert_eq!(physical.base.opacity, 1.0);
        assert_eq!(physical.transmission, 0.0);

        assert!(!material.promote());
        assert!(material.is_physical());
    }

    #[test]
    fn read_config_defaults_missing_physical_values() {
        let standard = Material::from(StandardMaterial::named("Frame"));
        let config = standard.read_config();
        assert_eq!(config.transmission, 0.0);
        assert_eq!(config.ior, 1.0);
        assert_eq!(config.color, "#ffffff");

        let physical = Material::from(PhysicalMaterial {
            transmission: 0.6,
            ior: 0.0,
            ..PhysicalMaterial::default()
        });
        let config = physical.read_config();
        assert_eq!(config.transmission, 0.6);
        assert_eq!(config.ior, 1.0);
    }
}
