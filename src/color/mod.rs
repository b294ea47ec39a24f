//! Color assignment: id palettes, per-point distinct colors and
//! match-propagated coloring.
//!
//! Both palettes confine hues to `[20°, 340°)`, which leaves pure red free
//! to mean "no counterpart" on map geometry.

mod distinct;
mod palette;
mod propagate;

pub use distinct::distinct_point_colors;
pub use palette::{hsv_to_rgb, id_to_color, IdPalette, HUE_END, HUE_START};
pub use propagate::{propagate_point_colors, ColorTable, UNMATCHED};

/// Linear RGB color with components in `[0, 1]`.
pub type Rgb = [f32; 3];

/// Clamp every component into `[0, 1]`. Non-finite components become 0.
#[must_use]
pub fn clamp_rgb(c: Rgb) -> Rgb {
    c.map(|v| if v.is_finite() { v.clamp(0.0, 1.0) } else { 0.0 })
}

/// Whether two colors agree within `tolerance` on every channel.
#[must_use]
pub fn rgb_approx_eq(a: Rgb, b: Rgb, tolerance: f32) -> bool {
    a.iter().zip(&b).all(|(x, y)| (x - y).abs() <= tolerance)
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamp_handles_out_of_range_and_nan() {
        assert_eq!(clamp_rgb([1.5, -0.2, f32::NAN]), [1.0, 0.0, 0.0]);
        assert_eq!(clamp_rgb([0.25, 0.5, 0.75]), [0.25, 0.5, 0.75]);
    }

    #[test]
    fn approx_eq_uses_tolerance() {
        assert!(rgb_approx_eq([0.5; 3], [0.500_000_5; 3], 1e-6));
        assert!(!rgb_approx_eq([0.5; 3], [0.51, 0.5, 0.5], 1e-6));
    }
}
