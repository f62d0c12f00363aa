/// Number of bit-reversed passes each light is refined over; also the height
/// of the scanline tile the passes cycle through.
pub const REFINEMENT_STEPS: usize = 32;

const LOG2_STEPS: u32 = REFINEMENT_STEPS.trailing_zeros();

/// Precomputed scanline tables for the interleaved refinement scheme.
///
/// Pass `k` computes the scanline whose row-within-tile index is `k` with
/// its bits reversed, so pass 0 covers row 0, pass 1 row 16, pass 2 row 8
/// and so on, doubling the effective vertical resolution each time.
#[derive(Debug)]
pub struct RefinementSchedule {
    line_mask: [u32; REFINEMENT_STEPS],
    closest_line: [[u8; REFINEMENT_STEPS + 1]; REFINEMENT_STEPS],
}

impl RefinementSchedule {
    pub fn new() -> Self {
        let mut line_mask = [0; REFINEMENT_STEPS];
        let mut calculated = 0;

        for (level, mask) in line_mask.iter_mut().enumerate() {
            let row = (level as u32).reverse_bits() >> (u32::BITS - LOG2_STEPS);

            calculated |= 1 << row;
            *mask = calculated;
        }

        // For every level and row-within-tile, which already-calculated row
        // to sample from when the row itself hasn't been computed yet
        let mut closest_line = [[0; REFINEMENT_STEPS + 1]; REFINEMENT_STEPS];

        for (level, table) in closest_line.iter_mut().enumerate() {
            for (row, closest) in table.iter_mut().enumerate() {
                *closest = (0..REFINEMENT_STEPS)
                    .filter(|line| line_mask[level] & (1 << line) != 0)
                    .min_by_key(|line| line.abs_diff(row))
                    .unwrap_or(0) as u8;
            }
        }

        Self {
            line_mask,
            closest_line,
        }
    }

    /// Rows-within-tile produced by all passes up to and including `level`.
    pub fn line_mask(&self, level: usize) -> u32 {
        self.line_mask[level]
    }

    /// The computed row closest to `row` at the given level.
    pub fn closest_line(&self, level: usize, row: usize) -> usize {
        self.closest_line[level][row] as usize
    }
}

impl Default for RefinementSchedule {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn masks_grow_monotonically() {
        let target = RefinementSchedule::new();

        for level in 1..REFINEMENT_STEPS {
            let prev = target.line_mask(level - 1);
            let curr = target.line_mask(level);

            assert_eq!(prev & curr, prev, "level {level}");
            assert_ne!(prev, curr, "level {level}");
        }

        assert_eq!(target.line_mask(REFINEMENT_STEPS - 1), u32::MAX);
    }

    #[test]
    fn early_levels_follow_bit_reversal() {
        let target = RefinementSchedule::new();

        assert_eq!(target.line_mask(0), 1 << 0);
        assert_eq!(target.line_mask(1), (1 << 0) | (1 << 16));
        assert_eq!(target.line_mask(2), (1 << 0) | (1 << 8) | (1 << 16));
        assert_eq!(
            target.line_mask(3),
            (1 << 0) | (1 << 8) | (1 << 16) | (1 << 24),
        );
    }

    #[test]
    fn closest_line_is_the_argmin() {
        let target = RefinementSchedule::new();

        for level in 0..REFINEMENT_STEPS {
            let mask = target.line_mask(level);

            for row in 0..=REFINEMENT_STEPS {
                let closest = target.closest_line(level, row);

                assert_ne!(mask & (1 << closest), 0, "level {level}, row {row}");

                // No other computed line is closer, and ties break downward
                for line in 0..REFINEMENT_STEPS {
                    if mask & (1 << line) == 0 {
                        continue;
                    }

                    let best = closest.abs_diff(row);
                    let other = line.abs_diff(row);

                    assert!(other > best || (other == best && line >= closest));
                }
            }
        }
    }

    #[test]
    fn full_level_resamples_identically() {
        let target = RefinementSchedule::new();

        for row in 0..REFINEMENT_STEPS {
            assert_eq!(target.closest_line(REFINEMENT_STEPS - 1, row), row);
        }
    }
}
