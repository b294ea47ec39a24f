use super::Rgb;
use crate::options::ColorOptions;

/// Lowest hue (degrees) any palette produces.
pub const HUE_START: f32 = 20.0;
/// Hue (degrees) no palette reaches.
pub const HUE_END: f32 = 340.0;

/// HSV → RGB with `h`, `s`, `v` in `[0, 1]`. `h` wraps.
#[must_use]
pub fn hsv_to_rgb(h: f32, s: f32, v: f32) -> Rgb {
    if s <= 0.0 {
        return [v, v, v];
    }
    let h6 = h.rem_euclid(1.0) * 6.0;
    let sector = h6.floor();
    let f = h6 - sector;
    let p = v * (1.0 - s);
    let q = v * (1.0 - s * f);
    let t = v * (1.0 - s * (1.0 - f));
    match sector as u32 % 6 {
        0 => [v, t, p],
        1 => [q, v, p],
        2 => [p, v, t],
        3 => [p, q, v],
        4 => [t, p, v],
        _ => [v, p, q],
    }
}

/// Hue-partitioned palette keyed by entity id.
///
/// Ids are folded modulo `size`, and slot `i` gets hue
/// `20° + i/size · 320°`. Negative ids map to the neutral gray.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IdPalette {
    size: u32,
    saturation: f32,
    value: f32,
    neutral: Rgb,
    single_point_hue: f32,
}

impl Default for IdPalette {
    fn default() -> Self {
        Self::from_options(&ColorOptions::default())
    }
}

impl IdPalette {
    /// Palette with the configured size, saturation and value.
    #[must_use]
    pub fn from_options(colors: &ColorOptions) -> Self {
        Self {
            size: colors.palette_size.max(1),
            saturation: colors.saturation,
            value: colors.value,
            neutral: colors.neutral,
            single_point_hue: colors.single_point_hue,
        }
    }

    /// Number of hue slots.
    #[must_use]
    pub fn size(&self) -> u32 {
        self.size
    }

    /// Color for an entity id.
    #[must_use]
    pub fn color(&self, id: i64) -> Rgb {
        if id < 0 {
            return self.neutral;
        }
        let slot = id % i64::from(self.size);
        let frac = slot as f32 / self.size as f32;
        let hue = HUE_START + frac * (HUE_END - HUE_START);
        hsv_to_rgb(hue / 360.0, self.saturation, self.value)
    }

    pub(super) fn saturation(&self) -> f32 {
        self.saturation
    }

    pub(super) fn value(&self) -> f32 {
        self.value
    }

    pub(super) fn single_point_hue(&self) -> f32 {
        self.single_point_hue
    }
}

/// Color for `id` with the default saturation/value and the given palette
/// size.
#[must_use]
pub fn id_to_color(id: i64, palette_size: u32) -> Rgb {
    IdPalette {
        size: palette_size.max(1),
        ..IdPalette::default()
    }
    .color(id)
}
