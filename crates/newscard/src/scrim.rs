//! Readability scrim.
//!
//! The scrim is a black vertical gradient from a top edge down to the
//! bottom of the canvas. Row `i` of an `h`-row ramp gets
//!
//! ```text
//! alpha(i) = start + (max - start) * clamp(steepness * i / (h - 1), 0, 1)
//! ```
//!
//! rounded to the nearest integer, so a steepness above 1 saturates before
//! the bottom edge. Rows above the top edge are untouched.

use newscard_core::geometry::Size;

use crate::config::ScrimConfig;

/// Per-row scrim opacity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlphaRamp {
    top: u32,
    alphas: Vec<u8>,
}

impl AlphaRamp {
    /// First canvas row covered by the ramp.
    pub fn top(&self) -> u32 {
        self.top
    }

    /// Number of rows covered.
    pub fn height(&self) -> u32 {
        self.alphas.len() as u32
    }

    /// Alpha of each covered row, top to bottom.
    pub fn alphas(&self) -> &[u8] {
        &self.alphas
    }

    /// Alpha at canvas row `y`; zero above the ramp and below the canvas.
    pub fn alpha_at(&self, y: u32) -> u8 {
        y.checked_sub(self.top)
            .and_then(|row| self.alphas.get(row as usize))
            .copied()
            .unwrap_or(0)
    }
}

/// Builds the ramp from `top_y` to the bottom of a `canvas`-sized image.
///
/// `top_y` is rounded up to a whole row and clamped into the canvas, so the
/// gradient never starts above the requested edge. The ramp is
/// non-decreasing for any config that passes [`ScrimConfig::validate`].
pub fn generate_scrim(top_y: f32, canvas: Size, config: &ScrimConfig) -> AlphaRamp {
    let canvas_height = canvas.height().max(0.0) as u32;
    let top = (top_y.max(0.0).ceil() as u32).min(canvas_height);
    let rows = canvas_height - top;

    let start = f32::from(config.start_alpha());
    let range = f32::from(config.max_alpha()) - start;
    let span = rows.saturating_sub(1).max(1) as f32;

    let alphas = (0..rows)
        .map(|row| {
            let progress = (config.steepness() * row as f32 / span).clamp(0.0, 1.0);
            (start + range * progress).round().clamp(0.0, 255.0) as u8
        })
        .collect();

    AlphaRamp { top, alphas }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ScrimAnchor;

    fn config(start: u8, max: u8, steepness: f32) -> ScrimConfig {
        ScrimConfig::new(ScrimAnchor::TextTop, start, max, steepness)
    }

    #[test]
    fn test_linear_ramp() {
        let ramp = generate_scrim(5.0, Size::new(10.0, 10.0), &config(0, 255, 1.0));

        assert_eq!(ramp.top(), 5);
        assert_eq!(ramp.height(), 5);
        assert_eq!(ramp.alphas(), &[0, 64, 128, 191, 255]);
    }

    #[test]
    fn test_steep_ramp_saturates_early() {
        let ramp = generate_scrim(0.0, Size::new(1.0, 5.0), &config(0, 200, 2.0));
        assert_eq!(ramp.alphas(), &[0, 100, 200, 200, 200]);
    }

    #[test]
    fn test_start_alpha_offsets_ramp() {
        let ramp = generate_scrim(0.0, Size::new(1.0, 3.0), &config(100, 200, 1.0));
        assert_eq!(ramp.alphas(), &[100, 150, 200]);
    }

    #[test]
    fn test_alpha_at_outside_ramp() {
        let ramp = generate_scrim(8.0, Size::new(1.0, 10.0), &config(0, 255, 1.0));

        assert_eq!(ramp.alpha_at(0), 0);
        assert_eq!(ramp.alpha_at(7), 0);
        assert_eq!(ramp.alpha_at(8), 0);
        assert_eq!(ramp.alpha_at(9), 255);
        assert_eq!(ramp.alpha_at(10), 0);
    }

    #[test]
    fn test_fractional_top_rounds_down_the_canvas() {
        let ramp = generate_scrim(4.2, Size::new(1.0, 10.0), &config(0, 255, 1.0));
        assert_eq!(ramp.top(), 5);
    }

    #[test]
    fn test_top_outside_canvas() {
        let below = generate_scrim(50.0, Size::new(1.0, 10.0), &config(0, 255, 1.0));
        assert_eq!(below.height(), 0);
        assert_eq!(below.alpha_at(9), 0);

        let above = generate_scrim(-20.0, Size::new(1.0, 10.0), &config(0, 255, 1.0));
        assert_eq!(above.top(), 0);
        assert_eq!(above.height(), 10);
    }

    #[test]
    fn test_single_row_ramp() {
        let ramp = generate_scrim(9.0, Size::new(1.0, 10.0), &config(10, 90, 1.0));
        assert_eq!(ramp.alphas(), &[10]);
    }
}

#[cfg(test)]
mod proptest_tests {
    use proptest::prelude::*;

    use super::*;
    use crate::config::ScrimAnchor;

    fn check_ramp_is_monotonic(
        top: f32,
        height: u32,
        start: u8,
        max: u8,
        steepness: f32,
    ) -> Result<(), TestCaseError> {
        let config = ScrimConfig::new(ScrimAnchor::TextTop, start, max, steepness);
        if config.validate().is_err() {
            prop_assert!(start > max);
            return Ok(());
        }
        let ramp = generate_scrim(top, Size::new(10.0, height as f32), &config);

        prop_assert!(ramp.top() as f32 >= top.min(height as f32));
        prop_assert_eq!(ramp.top() + ramp.height(), height);
        prop_assert!(ramp.alphas().windows(2).all(|pair| pair[0] <= pair[1]));
        prop_assert!(ramp.alphas().iter().all(|&alpha| alpha >= start && alpha <= max));
        if let Some(&first) = ramp.alphas().first() {
            prop_assert_eq!(first, start);
        }
        Ok(())
    }

    proptest! {
        #[test]
        fn ramp_is_monotonic(
            top in -100.0f32..600.0,
            height in 1u32..512,
            start in any::<u8>(),
            max in any::<u8>(),
            steepness in 0.0f32..4.0,
        ) {
            check_ramp_is_monotonic(top, height, start, max, steepness)?;
        }
    }
}
