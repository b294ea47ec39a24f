use super::palette::{hsv_to_rgb, IdPalette, HUE_END, HUE_START};
use super::Rgb;

const GOLDEN_RATIO_CONJUGATE: f64 = 0.618_033_988_749_895;

/// Above this many points saturation and value are modulated as well.
const MODULATION_THRESHOLD: usize = 100;

/// One color per point, spread along a golden-ratio hue sequence inside the
/// non-red band.
///
/// Hue gaps stay wide for small clouds. For large clouds colors repeat
/// approximately; saturation/value modulation spreads them a little further
/// but does not make them unique.
#[must_use]
pub fn distinct_point_colors(n: usize, palette: &IdPalette) -> Vec<Rgb> {
    match n {
        0 => Vec::new(),
        1 => vec![hsv_to_rgb(
            palette.single_point_hue() / 360.0,
            palette.saturation(),
            palette.value(),
        )],
        _ => (0..n).map(|i| point_color(i, n, palette)).collect(),
    }
}

fn point_color(i: usize, n: usize, palette: &IdPalette) -> Rgb {
    let raw = (i as f64 * GOLDEN_RATIO_CONJUGATE).fract();
    let span = f64::from(HUE_END - HUE_START);
    let hue = (f64::from(HUE_START) + raw * span) / 360.0;

    let (mut s, mut v) = (palette.saturation(), palette.value());
    if n > MODULATION_THRESHOLD {
        s *= 0.7 + 0.3 * (i % 3) as f32 / 2.0;
        v *= 0.8 + 0.2 * (i % 5) as f32 / 4.0;
    }
    hsv_to_rgb(hue as f32, s, v)
}
