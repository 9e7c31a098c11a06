//! Colours and colour maps for the renderers.

use std::fmt;
use std::str::FromStr;

use image::Rgb;
use thiserror::Error;

/// Error for unparseable colour or palette names.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ColorError {
    #[error("unknown colour '{0}'\n  Suggestion: use a name like 'white' or a hex value like '#1f77b4'")]
    UnknownColor(String),
    #[error("unknown palette '{0}'\n  Suggestion: use one of viridis, plasma, inferno, magma, cividis")]
    UnknownPalette(String),
}

/// 24-bit RGB colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color(pub [u8; 3]);

impl Color {
    pub const WHITE: Self = Self([255, 255, 255]);
    pub const BLACK: Self = Self([0, 0, 0]);

    #[must_use]
    pub fn rgb(self) -> Rgb<u8> {
        Rgb(self.0)
    }

    /// `#rrggbb` form used in SVG output.
    #[must_use]
    pub fn to_hex(self) -> String {
        let [r, g, b] = self.0;
        format!("#{r:02x}{g:02x}{b:02x}")
    }

    fn lerp(self, other: Self, t: f64) -> Self {
        let mix = |a: u8, b: u8| {
            let value = f64::from(a) + (f64::from(b) - f64::from(a)) * t;
            // Clamped to the channel range before the cast.
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let channel = value.round().clamp(0.0, 255.0) as u8;
            channel
        };
        Self([
            mix(self.0[0], other.0[0]),
            mix(self.0[1], other.0[1]),
            mix(self.0[2], other.0[2]),
        ])
    }
}

impl From<Rgb<u8>> for Color {
    fn from(value: Rgb<u8>) -> Self {
        Self(value.0)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for Color {
    type Err = ColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().to_ascii_lowercase();
        let named = match name.as_str() {
            "white" => Some([255, 255, 255]),
            "black" => Some([0, 0, 0]),
            "gray" | "grey" => Some([128, 128, 128]),
            "lightgray" | "lightgrey" => Some([211, 211, 211]),
            "ivory" => Some([255, 255, 240]),
            "beige" => Some([245, 245, 220]),
            "navy" => Some([0, 0, 128]),
            _ => None,
        };
        if let Some(rgb) = named {
            return Ok(Self(rgb));
        }

        let hex = name.strip_prefix('#').unwrap_or(&name);
        if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(ColorError::UnknownColor(s.to_string()));
        }
        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&hex[range], 16).map_err(|_| ColorError::UnknownColor(s.to_string()))
        };
        Ok(Self([channel(0..2)?, channel(2..4)?, channel(4..6)?]))
    }
}

/// Sequential colour maps sampled for word colours.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Palette {
    #[default]
    Viridis,
    Plasma,
    Inferno,
    Magma,
    Cividis,
}

const VIRIDIS: [u32; 9] = [
    0x44_01_54, 0x47_2d_7b, 0x3b_52_8b, 0x2c_72_8e, 0x21_91_8c, 0x28_ae_80, 0x5e_c9_62, 0xad_dc_30,
    0xfd_e7_25,
];
const PLASMA: [u32; 10] = [
    0x0d_08_87, 0x46_03_9f, 0x72_01_a8, 0x9c_17_9e, 0xbd_37_86, 0xd8_57_6b, 0xed_79_53, 0xfb_9f_3a,
    0xfd_ca_26, 0xf0_f9_21,
];
const INFERNO: [u32; 10] = [
    0x00_00_04, 0x1b_0c_41, 0x4a_0c_6b, 0x78_1c_6d, 0xa5_2c_60, 0xcf_44_46, 0xed_69_25, 0xfb_9b_06,
    0xf7_d1_3d, 0xfc_ff_a4,
];
const MAGMA: [u32; 10] = [
    0x00_00_04, 0x18_0f_3d, 0x44_0f_76, 0x72_1f_81, 0x9e_2f_7f, 0xcd_40_71, 0xf1_60_5d, 0xfd_96_68,
    0xfe_ca_8d, 0xfc_fd_bf,
];
const CIVIDIS: [u32; 10] = [
    0x00_22_4e, 0x12_35_70, 0x3b_49_6c, 0x57_5d_6d, 0x70_71_73, 0x8a_87_79, 0xa6_9d_75, 0xc4_b5_6c,
    0xe4_cf_5b, 0xfe_e8_38,
];

impl Palette {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Viridis => "viridis",
            Self::Plasma => "plasma",
            Self::Inferno => "inferno",
            Self::Magma => "magma",
            Self::Cividis => "cividis",
        }
    }

    fn stops(self) -> &'static [u32] {
        match self {
            Self::Viridis => &VIRIDIS,
            Self::Plasma => &PLASMA,
            Self::Inferno => &INFERNO,
            Self::Magma => &MAGMA,
            Self::Cividis => &CIVIDIS,
        }
    }

    /// Colour at position `t` in `[0, 1]`, linearly interpolated between stops.
    #[must_use]
    pub fn sample(self, t: f64) -> Color {
        let stops = self.stops();
        let t = t.clamp(0.0, 1.0);
        #[allow(clippy::cast_precision_loss)]
        let scaled = t * (stops.len() - 1) as f64;
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let lower = (scaled.floor() as usize).min(stops.len() - 2);
        #[allow(clippy::cast_precision_loss)]
        let frac = scaled - lower as f64;
        unpack(stops[lower]).lerp(unpack(stops[lower + 1]), frac)
    }
}

fn unpack(packed: u32) -> Color {
    let [_, r, g, b] = packed.to_be_bytes();
    Color([r, g, b])
}

impl fmt::Display for Palette {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Palette {
    type Err = ColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "viridis" => Ok(Self::Viridis),
            "plasma" => Ok(Self::Plasma),
            "inferno" => Ok(Self::Inferno),
            "magma" => Ok(Self::Magma),
            "cividis" => Ok(Self::Cividis),
            _ => Err(ColorError::UnknownPalette(s.to_string())),
        }
    }
}
