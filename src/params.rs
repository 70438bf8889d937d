use clap::ValueEnum;

/// Reaction and diffusion coefficients, fixed for the lifetime of a run.
#[derive(Clone, Copy, Debug)]
pub(crate) struct RdParams {
    /// uniform autocatalysis rate (direct scheme)
    pub(crate) s: f64,
    pub(crate) diffuse_a: f64,
    pub(crate) base_a: f64,
    pub(crate) reduce_a: f64,
    pub(crate) diffuse_b: f64,
    pub(crate) reduce_b: f64,
    pub(crate) base_b: f64,
}

/// Row integration scheme. The two are materially different numerics,
/// not approximations of each other.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub(crate) enum Scheme {
    /// one Euler step per row, uniform rate, unclamped output
    Direct,
    /// sub-stepped row integration, per-row rate field, clamped output
    Stabilized,
}

impl Scheme {
    pub(crate) fn label(self) -> &'static str {
        match self {
            Scheme::Direct => "direct",
            Scheme::Stabilized => "stabilized",
        }
    }
}

#[derive(Clone, Copy)]
pub(crate) struct Preset {
    pub(crate) name: &'static str,
    pub(crate) p: RdParams,
}

pub(crate) const PRESETS: &[Preset] = &[
    Preset {
        name: "Plume",
        p: RdParams {
            s: 0.2,
            diffuse_a: 0.1,
            base_a: 0.5,
            reduce_a: 0.2,
            diffuse_b: 0.01,
            reduce_b: 0.1,
            base_b: 0.1,
        },
    },
    Preset {
        name: "Filigree",
        p: RdParams {
            s: 0.005,
            diffuse_a: 0.02,
            base_a: 0.198,
            reduce_a: 0.82,
            diffuse_b: 0.084,
            reduce_b: 0.0061,
            base_b: 0.01,
        },
    },
    Preset {
        name: "Banding",
        p: RdParams {
            s: 0.2,
            diffuse_a: 0.5,
            base_a: 0.1,
            reduce_a: 0.8,
            diffuse_b: 0.01,
            reduce_b: 0.1,
            base_b: 0.05,
        },
    },
];
