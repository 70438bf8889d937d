use crate::params::{RdParams, Scheme};
use rand::{rngs::StdRng, Rng};

/// Which field a caller wants to read.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Field {
    A,
    B,
    S,
}

impl Field {
    pub(crate) fn label(self) -> &'static str {
        match self {
            Field::A => "A",
            Field::B => "B",
            Field::S => "S",
        }
    }
}

/// Square toroidal board advanced one scanline at a time.
///
/// Fields are row-major, `index(x, y) = x + y * size`. The stepper at
/// clock `g` reads row `g % size` and writes row `(g + 1) % size`, so
/// rows are always produced in strictly increasing clock order; step
/// t+1 depends on the row step t wrote.
pub(crate) struct RdSystem {
    size: usize,
    a: Vec<f64>,
    b: Vec<f64>,
    s: Vec<f64>,
    generation: u64,
    params: RdParams,
    scheme: Scheme,
    delta: f64,
    substeps: u32,
    // scratch rows reused across steps
    row_a: Vec<f64>,
    row_b: Vec<f64>,
    d2a: Vec<f64>,
    d2b: Vec<f64>,
}

impl RdSystem {
    pub(crate) fn new(
        size: usize,
        params: RdParams,
        scheme: Scheme,
        delta: f64,
        substeps: u32,
        rng: &mut StdRng,
    ) -> Self {
        let n = size * size;
        let mut sys = Self {
            size,
            a: vec![0.0; n],
            b: vec![0.0; n],
            s: vec![0.0; n],
            generation: 0,
            params,
            scheme,
            delta,
            substeps,
            row_a: vec![0.0; size],
            row_b: vec![0.0; size],
            d2a: vec![0.0; size],
            d2b: vec![0.0; size],
        };
        sys.reset(params, rng);
        sys
    }

    /// Refill both fields with their base concentrations, bump row 0 to
    /// break symmetry, redraw the rate field, zero the clock.
    pub(crate) fn reset(&mut self, params: RdParams, rng: &mut StdRng) {
        self.params = params;
        self.a.fill(params.base_a);
        self.b.fill(params.base_b);

        let n = self.size as f64;
        for x in 0..self.size {
            let t = x as f64 / n;
            self.a[x] += (0.1 * (10.0 * t).sin()).abs();
            self.b[x] += (0.1 * (100.0 * t).cos()).abs();
        }

        // One perturbation draw per row, broadcast across it.
        for y in 0..self.size {
            let jitter: f64 = rng.gen_range(-0.1..0.1);
            let row = y * self.size;
            self.s[row..row + self.size].fill(params.reduce_a + jitter);
        }

        self.generation = 0;
    }

    /// Advance the clock by `rows` scanlines, strictly in order.
    pub(crate) fn advance(&mut self, rows: u64) {
        for _ in 0..rows {
            let line = (self.generation % self.size as u64) as usize;
            let next = (line + 1) % self.size;
            match self.scheme {
                Scheme::Direct => self.step_direct(line, next),
                Scheme::Stabilized => self.step_stabilized(line, next),
            }
            self.generation += 1;
        }
    }

    /// One Euler step of `delta` with the uniform rate. Boundary columns
    /// of the destination row keep whatever the board already holds
    /// there.
    fn step_direct(&mut self, line: usize, next: usize) {
        let p = self.params;
        let src = line * self.size;
        let dst = next * self.size;
        for x in 1..self.size - 1 {
            let ax = self.a[src + x];
            let bx = self.b[src + x];
            debug_assert!(bx != 0.0, "inhibitor hit zero; base_b too small for reduce_b");
            let d2a = self.a[src + x - 1] - 2.0 * ax + self.a[src + x + 1];
            let d2b = self.b[src + x - 1] - 2.0 * bx + self.b[src + x + 1];
            let axsq = ax * ax;
            let da = p.s * (axsq / bx + p.base_a) - p.reduce_a * ax + p.diffuse_a * d2a;
            let db = p.s * axsq - p.reduce_b * bx + p.diffuse_b * d2b + p.base_b;
            self.a[dst + x] = ax + self.delta * da;
            self.b[dst + x] = bx + self.delta * db;
        }
    }

    /// Sub-stepped row integration: `substeps` micro-steps of
    /// `1/substeps` on a scratch copy of the row. Boundaries are
    /// re-pinned from the source row's interior neighbors before every
    /// micro-step, the per-row rate field supplies the rate coefficient,
    /// and results land clamped at zero.
    fn step_stabilized(&mut self, line: usize, next: usize) {
        let p = self.params;
        let size = self.size;
        let src = line * size;
        let dst = next * size;
        let h = 1.0 / f64::from(self.substeps);

        self.row_a.copy_from_slice(&self.a[src..src + size]);
        self.row_b.copy_from_slice(&self.b[src..src + size]);
        let pin_a = (self.a[src + 1], self.a[src + size - 2]);
        let pin_b = (self.b[src + 1], self.b[src + size - 2]);

        for _ in 0..self.substeps {
            self.row_a[0] = pin_a.0;
            self.row_a[size - 1] = pin_a.1;
            self.row_b[0] = pin_b.0;
            self.row_b[size - 1] = pin_b.1;

            for x in 1..size - 1 {
                self.d2a[x] = self.row_a[x - 1] - 2.0 * self.row_a[x] + self.row_a[x + 1];
                self.d2b[x] = self.row_b[x - 1] - 2.0 * self.row_b[x] + self.row_b[x + 1];
            }
            for x in 1..size - 1 {
                let ax = self.row_a[x];
                let bx = self.row_b[x];
                debug_assert!(bx != 0.0, "inhibitor hit zero; base_b too small for reduce_b");
                let axsq = ax * ax;
                let rate = self.s[src + x];
                let da = rate * (axsq / bx + p.base_a) - p.reduce_a * ax + p.diffuse_a * self.d2a[x];
                let db = rate * axsq - p.reduce_b * bx + p.diffuse_b * self.d2b[x] + p.base_b;
                self.row_a[x] += h * da;
                self.row_b[x] += h * db;
            }
        }

        for x in 0..size {
            self.a[dst + x] = self.row_a[x].max(0.0);
            self.b[dst + x] = self.row_b[x].max(0.0);
        }
    }

    pub(crate) fn size(&self) -> usize {
        self.size
    }

    pub(crate) fn generation(&self) -> u64 {
        self.generation
    }

    pub(crate) fn params(&self) -> &RdParams {
        &self.params
    }

    pub(crate) fn scheme(&self) -> Scheme {
        self.scheme
    }

    /// Newest fully computed row.
    pub(crate) fn scan_row(&self) -> usize {
        (self.generation % self.size as u64) as usize
    }

    /// Cells that have received at least one computed value.
    /// Conservative: the freshly written row is not counted until the
    /// clock moves past it, so default cells never skew the histogram.
    pub(crate) fn activated_cells(&self) -> usize {
        let total = (self.size * self.size) as u64;
        (self.size as u64)
            .saturating_mul(self.generation)
            .min(total) as usize
    }

    pub(crate) fn field(&self, which: Field) -> &[f64] {
        match which {
            Field::A => &self.a,
            Field::B => &self.b,
            Field::S => &self.s,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::PRESETS;
    use rand::SeedableRng;

    fn test_params() -> RdParams {
        RdParams {
            s: 0.2,
            diffuse_a: 0.1,
            base_a: 0.5,
            reduce_a: 0.2,
            diffuse_b: 0.01,
            reduce_b: 0.1,
            base_b: 0.1,
        }
    }

    #[test]
    fn hand_evaluated_first_row() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut sys = RdSystem::new(4, test_params(), Scheme::Direct, 0.01, 1, &mut rng);
        sys.a[..4].fill(1.0);
        sys.b[..4].fill(1.0);
        sys.advance(1);

        // flat row, so d2 = 0 and only the reaction terms act:
        //   da = 0.2 * (1/1 + 0.5) - 0.2 * 1          = 0.1
        //   db = 0.2 * 1 - 0.1 * 1 + 0.1              = 0.2
        for x in 1..3 {
            assert!((sys.a[4 + x] - 1.001).abs() < 1e-12, "a[{x}] = {}", sys.a[4 + x]);
            assert!((sys.b[4 + x] - 1.002).abs() < 1e-12, "b[{x}] = {}", sys.b[4 + x]);
        }
        // boundary columns of the new row keep their base concentrations
        assert_eq!(sys.a[4], 0.5);
        assert_eq!(sys.a[7], 0.5);
        assert_eq!(sys.b[4], 0.1);
        assert_eq!(sys.b[7], 0.1);
    }

    #[test]
    fn advance_granularity_does_not_change_results() {
        let p = test_params();
        let mut r1 = StdRng::seed_from_u64(7);
        let mut r2 = StdRng::seed_from_u64(7);
        let mut batch = RdSystem::new(16, p, Scheme::Stabilized, 0.01, 50, &mut r1);
        let mut single = RdSystem::new(16, p, Scheme::Stabilized, 0.01, 50, &mut r2);

        batch.advance(5);
        for _ in 0..5 {
            single.advance(1);
        }

        assert_eq!(batch.generation(), single.generation());
        assert_eq!(batch.a, single.a);
        assert_eq!(batch.b, single.b);
    }

    #[test]
    fn stabilized_scheme_stays_non_negative() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut sys = RdSystem::new(24, PRESETS[0].p, Scheme::Stabilized, 0.01, 200, &mut rng);
        // wrap the frontier past the seam twice
        sys.advance(3 * 24);
        assert_eq!(sys.generation(), 72);
        assert_eq!(sys.scan_row(), 0);
        assert!(sys.a.iter().all(|v| *v >= 0.0));
        assert!(sys.b.iter().all(|v| *v >= 0.0));
    }

    #[test]
    fn rate_field_is_seeded_and_row_broadcast() {
        let p = test_params();
        let mut r1 = StdRng::seed_from_u64(42);
        let mut r2 = StdRng::seed_from_u64(42);
        let one = RdSystem::new(8, p, Scheme::Stabilized, 0.01, 10, &mut r1);
        let two = RdSystem::new(8, p, Scheme::Stabilized, 0.01, 10, &mut r2);

        assert_eq!(one.s, two.s);
        for y in 0..8 {
            let row = &one.s[y * 8..(y + 1) * 8];
            assert!(row.iter().all(|v| *v == row[0]));
            assert!((row[0] - p.reduce_a).abs() <= 0.1);
        }
    }

    #[test]
    fn activated_count_trails_the_clock() {
        let mut rng = StdRng::seed_from_u64(9);
        let mut sys = RdSystem::new(100, test_params(), Scheme::Direct, 0.01, 1, &mut rng);
        assert_eq!(sys.activated_cells(), 0);
        sys.advance(1);
        assert_eq!(sys.activated_cells(), 100);
        sys.advance(200);
        assert_eq!(sys.activated_cells(), 100 * 100);
    }
}
