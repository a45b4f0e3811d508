//! Double-sum (trigonometric superposition) surfaces.

use std::f64::consts::TAU;

use ndarray::Array2;
use rand::Rng;
use tracing::{debug, warn};

use crate::config::ParametricSpec;
use crate::errors::Result;
use crate::grid::{linspace, Surface};

/// Generates surfaces as a sum of cosine modes with power-law amplitudes.
///
/// For every mode pair `(m, n)` with `m, n ∈ [-N, N]` and neither index zero:
///
/// ```text
/// f(s1, s2) += (m² + n²)^(-b/2) · cos(2π(m·s1 + n·s2) + φ_mn)
/// ```
///
/// with `φ_mn ~ U[0, 2π)`, then the whole field is scaled by `factor`.
/// Both axes cover `[0, 1]`.
///
/// Every call draws new phases from the supplied random source, so two calls
/// with the same parameters give different fields unless the source is seeded the
/// same way before each call.
#[derive(Debug, Clone)]
pub struct ParametricGenerator {
    spec: ParametricSpec,
}

impl ParametricGenerator {
    /// Creates a generator after validating its parameters.
    pub fn new(spec: ParametricSpec) -> Result<Self> {
        spec.validate()?;
        Ok(Self { spec })
    }

    pub fn spec(&self) -> &ParametricSpec {
        &self.spec
    }

    /// Samples one surface, consuming `4N²` phases from `rng`.
    pub fn generate(&self, rng: &mut impl Rng) -> Surface {
        let ParametricSpec {
            modes,
            exponent,
            factor,
            points,
        } = self.spec;

        debug!(modes, exponent, factor, points, "generating parametric surface");

        let s1 = linspace(0.0, 1.0, points);
        let s2 = linspace(0.0, 1.0, points);
        let mut heights = Array2::<f64>::zeros((points, points));

        for m in -modes..=modes {
            for n in -modes..=modes {
                if m == 0 || n == 0 {
                    continue;
                }

                let (mf, nf) = (f64::from(m), f64::from(n));
                let amplitude = (mf * mf + nf * nf).powf(-exponent / 2.0);
                let phase = rng.gen_range(0.0..TAU);

                // cos(a + b) with a along columns and b along rows
                for ((row, col), h) in heights.indexed_iter_mut() {
                    *h += amplitude * (TAU * (mf * s1[col] + nf * s2[row]) + phase).cos();
                }
            }
        }

        heights *= factor;

        if modes > 0 {
            if let Some(reason) = crate::grid::degeneracy(&heights) {
                warn!(modes, exponent, factor, "parametric surface looks degenerate: {reason}");
            }
        }

        Surface {
            x: s1,
            y: s2,
            heights,
        }
    }
}

/// Validates `spec` and samples one parametric surface.
pub fn generate_parametric(spec: &ParametricSpec, rng: &mut impl Rng) -> Result<Surface> {
    Ok(ParametricGenerator::new(*spec)?.generate(rng))
}
