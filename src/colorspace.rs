use std::fmt;

/// Color space a texture resource or shading result is expressed in.
///
/// Everything inside the renderer works in linear RGB; data tagged with any
/// other space is converted on its way in. `Spectral` has no tile conversion:
/// spectral resources are resolved to RGB before they reach a texture store.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ColorSpace {
    LinearRgb,
    Srgb,
    CieXyz,
    Spectral,
}

impl fmt::Display for ColorSpace {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match *self {
            ColorSpace::LinearRgb => "linear RGB",
            ColorSpace::Srgb => "sRGB",
            ColorSpace::CieXyz => "CIE XYZ",
            ColorSpace::Spectral => "spectral",
        };
        write!(f, "{}", name)
    }
}

/// Inverse of the sRGB electro-optical transfer function: decode an encoded
/// channel value to linear light.
pub fn srgb_to_linear(v: f32) -> f32 {
    if v <= 0.04045 {
        v * (1.0 / 12.92)
    } else {
        ((v + 0.055) / 1.055).powf(2.4)
    }
}

/// Encode a linear channel value with the sRGB transfer function.
pub fn linear_to_srgb(v: f32) -> f32 {
    if v <= 0.003_130_8 {
        12.92 * v
    } else {
        1.055 * v.powf(1.0 / 2.4) - 0.055
    }
}

const SRGB_TABLE_SIZE: usize = 256;

lazy_static! {
    static ref SRGB_TO_LINEAR_TABLE: [f32; SRGB_TABLE_SIZE] = {
        let mut table = [0.0; SRGB_TABLE_SIZE];
        for (i, entry) in table.iter_mut().enumerate() {
            *entry = srgb_to_linear(i as f32 / 255.0);
        }
        table
    };
}

/// Decode an 8-bit sRGB channel value through a precomputed table.
pub fn srgb_u8_to_linear(v: u8) -> f32 {
    SRGB_TO_LINEAR_TABLE[v as usize]
}
