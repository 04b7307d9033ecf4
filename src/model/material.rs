//! Materials extension types: colors, base materials and display properties

use super::core::ResourceId;

/// An 8-bit sRGB color with straight alpha
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    /// Red channel
    pub r: u8,
    /// Green channel
    pub g: u8,
    /// Blue channel
    pub b: u8,
    /// Alpha channel, 0 is fully transparent
    pub a: u8,
}

impl Color {
    /// Opaque white, the fallback appearance for unresolvable properties
    pub const WHITE: Color = Color::rgb(0xFF, 0xFF, 0xFF);

    /// Create an opaque color
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 0xFF }
    }

    /// Create a color with alpha
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Parse color from hex string format (#RRGGBB or #RRGGBBAA)
    ///
    /// # Example
    ///
    /// ```
    /// use threemf_scene::Color;
    ///
    /// assert_eq!(Color::from_hex("#FF000080"), Some(Color::rgba(255, 0, 0, 128)));
    /// assert_eq!(Color::from_hex("red"), None);
    /// ```
    pub fn from_hex(color_str: &str) -> Option<Self> {
        let hex = color_str.trim().strip_prefix('#')?;
        if !hex.is_ascii() {
            return None;
        }
        let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&hex[range], 16).ok();

        match hex.len() {
            6 => Some(Self::rgb(channel(0..2)?, channel(2..4)?, channel(4..6)?)),
            8 => Some(Self::rgba(
                channel(0..2)?,
                channel(2..4)?,
                channel(4..6)?,
                channel(6..8)?,
            )),
            _ => None,
        }
    }

    /// Whether the alpha channel is zero
    pub fn is_fully_transparent(&self) -> bool {
        self.a == 0
    }

    /// Whether the alpha channel is at its maximum
    pub fn is_opaque(&self) -> bool {
        self.a == 0xFF
    }

    /// Channels scaled linearly to `0.0..=1.0`, without gamma decoding
    pub fn to_unit_rgba(&self) -> [f32; 4] {
        [
            f32::from(self.r) / 255.0,
            f32::from(self.g) / 255.0,
            f32::from(self.b) / 255.0,
            f32::from(self.a) / 255.0,
        ]
    }

    /// Color channels decoded from sRGB to linear light; alpha is scaled linearly
    pub fn to_linear_rgba(&self) -> [f32; 4] {
        [
            srgb_to_linear(self.r),
            srgb_to_linear(self.g),
            srgb_to_linear(self.b),
            f32::from(self.a) / 255.0,
        ]
    }
}

/// Decode one 8-bit sRGB channel with the standard transfer function
pub fn srgb_to_linear(channel: u8) -> f32 {
    let c = f32::from(channel) / 255.0;
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

/// Color group from the materials extension
#[derive(Debug, Clone, PartialEq)]
pub struct ColorGroup {
    /// Color group ID
    pub id: ResourceId,
    /// Colors indexed by property index
    pub colors: Vec<Color>,
    /// Display properties indexed in parallel with `colors`
    pub display_properties_id: Option<ResourceId>,
}

impl ColorGroup {
    /// Create a new color group
    pub fn new(id: ResourceId) -> Self {
        Self {
            id,
            colors: Vec::new(),
            display_properties_id: None,
        }
    }
}

/// An entry of a base material group
#[derive(Debug, Clone, PartialEq)]
pub struct BaseMaterial {
    /// Material name
    pub name: String,
    /// Color used to display the material
    pub display_color: Color,
}

impl BaseMaterial {
    /// Create a new base material
    pub fn new(name: impl Into<String>, display_color: Color) -> Self {
        Self {
            name: name.into(),
            display_color,
        }
    }
}

/// Base materials group (`<basematerials>`)
#[derive(Debug, Clone, PartialEq)]
pub struct BaseMaterialGroup {
    /// Group ID
    pub id: ResourceId,
    /// Materials indexed by property index
    pub materials: Vec<BaseMaterial>,
    /// Display properties indexed in parallel with `materials`
    pub display_properties_id: Option<ResourceId>,
}

impl BaseMaterialGroup {
    /// Create a new base material group
    pub fn new(id: ResourceId) -> Self {
        Self {
            id,
            materials: Vec::new(),
            display_properties_id: None,
        }
    }
}

/// Metallic/roughness parameters for one material entry
#[derive(Debug, Clone, PartialEq)]
pub struct MetallicDisplayProperty {
    /// Optional display name
    pub name: Option<String>,
    /// Metallicness in `0.0..=1.0`
    pub metallicness: f64,
    /// Roughness in `0.0..=1.0`
    pub roughness: f64,
}

impl Default for MetallicDisplayProperty {
    fn default() -> Self {
        Self {
            name: None,
            metallicness: 0.0,
            roughness: 1.0,
        }
    }
}

/// `<pbmetallicdisplayproperties>` group
#[derive(Debug, Clone, PartialEq)]
pub struct MetallicDisplayProperties {
    /// Group ID
    pub id: ResourceId,
    /// Entries indexed in parallel with the referencing color or base group
    pub metallics: Vec<MetallicDisplayProperty>,
}

impl MetallicDisplayProperties {
    /// Create a new, empty group
    pub fn new(id: ResourceId) -> Self {
        Self {
            id,
            metallics: Vec::new(),
        }
    }
}

/// Specular/glossiness parameters for one material entry
#[derive(Debug, Clone, PartialEq)]
pub struct SpecularDisplayProperty {
    /// Optional display name
    pub name: Option<String>,
    /// Specular color
    pub specular_color: Color,
    /// Glossiness in `0.0..=1.0`
    pub glossiness: f64,
}

impl Default for SpecularDisplayProperty {
    fn default() -> Self {
        Self {
            name: None,
            specular_color: Color::rgb(0x38, 0x38, 0x38),
            glossiness: 0.0,
        }
    }
}

/// `<pbspeculardisplayproperties>` group
#[derive(Debug, Clone, PartialEq)]
pub struct SpecularDisplayProperties {
    /// Group ID
    pub id: ResourceId,
    /// Entries indexed in parallel with the referencing color or base group
    pub speculars: Vec<SpecularDisplayProperty>,
}

impl SpecularDisplayProperties {
    /// Create a new, empty group
    pub fn new(id: ResourceId) -> Self {
        Self {
            id,
            speculars: Vec::new(),
        }
    }
}
