use crate::source::Status;

/// Straight-alpha sRGB colour, components in 0..=1.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Rgba {
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// CSS `rgba(...)` notation, 8-bit channels.
    pub fn to_css(self) -> String {
        format!(
            "rgba({}, {}, {}, {})",
            to_u8(self.r),
            to_u8(self.g),
            to_u8(self.b),
            (self.a.clamp(0.0, 1.0) * 100.0).round() / 100.0
        )
    }
}

pub const WHITE: Rgba = Rgba::new(1.0, 1.0, 1.0, 1.0);

/// Invasive species: translucent red.
pub const INVASIVE: Rgba = Rgba::new(220.0 / 255.0, 38.0 / 255.0, 38.0 / 255.0, 0.8);
/// Native species: translucent green.
pub const NATIVE: Rgba = Rgba::new(34.0 / 255.0, 197.0 / 255.0, 94.0 / 255.0, 0.8);

/// Palette cycled for data without a status tag.
const RANK_PALETTE: [Rgba; 4] = [
    Rgba::new(14.0 / 255.0, 116.0 / 255.0, 144.0 / 255.0, 1.0),
    Rgba::new(56.0 / 255.0, 189.0 / 255.0, 248.0 / 255.0, 1.0),
    Rgba::new(45.0 / 255.0, 212.0 / 255.0, 191.0 / 255.0, 1.0),
    Rgba::new(245.0 / 255.0, 158.0 / 255.0, 11.0 / 255.0, 1.0),
];

pub fn status_color(status: Status) -> Rgba {
    match status {
        Status::Invasive => INVASIVE,
        Status::Native => NATIVE,
    }
}

pub fn rank_color(rank: usize) -> Rgba {
    RANK_PALETTE[rank % RANK_PALETTE.len()]
}

fn to_u8(c: f32) -> u8 {
    (c.clamp(0.0, 1.0) * 255.0).round() as u8
}
