/// Number of quantile buckets in the tone-mapping table.
const BUCKETS: usize = 100;

/// Histogram-equalizing tone map.
///
/// `rebuild` samples the displayed field at 100 evenly spaced rank
/// positions, giving a piecewise-linear approximation of its inverse
/// empirical CDF; `normalize` looks a raw value up in that table.
/// Values near the low end of the observed distribution land near 0,
/// values near the high end near 1, regardless of the field's absolute
/// scale.
pub(crate) struct Equalizer {
    lut: [f64; BUCKETS],
    scratch: Vec<f64>,
}

impl Equalizer {
    /// Starts from a linear ramp so the display is defined before the
    /// first rebuild.
    pub(crate) fn new() -> Self {
        let mut lut = [0.0; BUCKETS];
        for (i, slot) in lut.iter_mut().enumerate() {
            *slot = 10.0 * i as f64 / BUCKETS as f64;
        }
        Self {
            lut,
            scratch: Vec::new(),
        }
    }

    /// Resample the table from the first `activated` cells of `field`.
    ///
    /// Only the activated prefix is sorted, so cells the stepper has not
    /// reached yet never skew the quantiles. With `activated == 0` every
    /// bucket falls back to the field's first cell.
    pub(crate) fn rebuild(&mut self, field: &[f64], activated: usize) {
        let activated = activated.min(field.len());
        self.scratch.clear();
        self.scratch.extend_from_slice(field);
        self.scratch[..activated].sort_unstable_by(f64::total_cmp);
        assert!(
            self.scratch[0] >= 0.0,
            "negative concentration fed to the tone map"
        );
        for (i, slot) in self.lut.iter_mut().enumerate() {
            *slot = self.scratch[i * activated / BUCKETS];
        }
    }

    /// Map a raw field value to a display intensity in [0, 1].
    pub(crate) fn normalize(&self, v: f64) -> f64 {
        let d = self.lut.partition_point(|b| *b < v);
        if d == BUCKETS {
            return 1.0;
        }
        if d == 0 {
            return 0.0;
        }
        let frac = if d + 1 < BUCKETS {
            let len = self.lut[d + 1] - self.lut[d];
            if len > 0.0 {
                // uneven quantile spacing can push w past the interval
                let w = (self.lut[d] - v).min(len);
                1.0 - w / len
            } else {
                0.0
            }
        } else {
            0.0
        };
        (d as f64 + frac) / BUCKETS as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp_field(n: usize) -> Vec<f64> {
        (0..n).map(|i| i as f64).collect()
    }

    #[test]
    fn rebuild_yields_monotone_buckets() {
        let mut eq = Equalizer::new();
        // deliberately scrambled input
        let field: Vec<f64> = (0..5000).map(|i| ((i * 7919) % 5000) as f64).collect();
        eq.rebuild(&field, field.len());
        for w in eq.lut.windows(2) {
            assert!(w[0] <= w[1]);
        }
    }

    #[test]
    fn normalize_clamps_at_the_ends() {
        let mut eq = Equalizer::new();
        let field = ramp_field(10_000);
        eq.rebuild(&field, field.len());

        assert_eq!(eq.normalize(-5.0), 0.0);
        assert_eq!(eq.normalize(1.0e9), 1.0);

        // non-decreasing across a sweep of the observed range
        let mut prev = 0.0;
        for k in 0..=200 {
            let out = eq.normalize(k as f64 * 50.0);
            assert!(out >= prev);
            assert!((0.0..=1.0).contains(&out));
            prev = out;
        }
    }

    #[test]
    fn normalize_matches_the_interpolation_formula() {
        let mut eq = Equalizer::new();
        let field = ramp_field(10_000);
        eq.rebuild(&field, field.len());

        // bucket[i] = i * 100 here; hitting a bucket exactly gives
        // w = 0, frac = 1, so the result is (i + 1) / 100
        for i in 1..BUCKETS - 1 {
            let out = eq.normalize(eq.lut[i]);
            let want = (i + 1) as f64 / BUCKETS as f64;
            assert!((out - want).abs() < 1e-12, "bucket {i}: {out} vs {want}");
        }

        // halfway into the [100, 200) span: d = 2, w = 50, len = 100
        let mid = eq.normalize(150.0);
        assert!((mid - 0.025).abs() < 1e-12, "mid = {mid}");
    }

    #[test]
    fn activated_prefix_gates_the_statistics() {
        let mut eq = Equalizer::new();
        let mut field = vec![1000.0; 10_000];
        field[..100].fill(1.0);
        eq.rebuild(&field, 100);
        assert!(eq.lut.iter().all(|b| *b == 1.0));
    }

    #[test]
    fn flat_field_stays_defined() {
        let mut eq = Equalizer::new();
        let field = vec![2.5; 400];
        eq.rebuild(&field, 400);
        for v in [0.0, 2.5, 7.0] {
            let out = eq.normalize(v);
            assert!(out.is_finite());
            assert!((0.0..=1.0).contains(&out));
        }
    }

    #[test]
    fn empty_activated_region_falls_back_to_the_first_cell() {
        let mut eq = Equalizer::new();
        let mut field = vec![9.0; 64];
        field[0] = 3.0;
        eq.rebuild(&field, 0);
        assert!(eq.lut.iter().all(|b| *b == 3.0));
    }
}
