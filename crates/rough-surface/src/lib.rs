//! Synthetic rough-surface generation.
//!
//! This crate generates random rough-surface height fields for simulation and
//! visualization work. It provides two generators and an STL exporter:
//!
//! - [`generators::ParametricGenerator`]: double sum of cosine modes with
//!   power-law amplitudes and random phases over the unit square
//! - [`generators::SpectralGenerator`]: Gaussian noise convolved (via FFT)
//!   with an exponential correlation kernel, scaled to a target RMS height
//! - [`export`]: closes a height field into a watertight solid and writes
//!   binary STL
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use rand::SeedableRng;
//! use rand_chacha::ChaCha8Rng;
//! use rough_surface::prelude::*;
//!
//! let mut rng = ChaCha8Rng::seed_from_u64(42);
//! let surface = generate_spectral(&SpectralSpec::isotropic(256, 40.0, 0.001, 1.0), &mut rng)?;
//! let stats = SurfaceStats::from_heights(&surface.heights);
//! export_surface_stl(&surface, Path::new("surface.stl"), 1.0)?;
//! ```
//!
//! Randomness always comes from the caller's `rng`. Two calls with equally
//! seeded sources give identical surfaces.

pub mod config;
pub mod errors;
pub mod export;
pub mod fft;
pub mod generators;
pub mod grid;
pub mod stats;

pub use errors::{Result, SurfaceError};

pub mod prelude {
    //! Convenient re-exports for common usage.

    pub use crate::config::{Method, ParametricSpec, RunConfig, SpectralSpec, StlOutput};
    pub use crate::errors::{Result, SurfaceError};
    pub use crate::export::{export_surface_stl, read_stl, write_stl, SolidMesh};
    pub use crate::generators::{
        generate_parametric, generate_spectral, Normalization, ParametricGenerator,
        SpectralGenerator,
    };
    pub use crate::grid::{Grid, HeightField, Surface};
    pub use crate::stats::{
        correlation_length, height_histogram, Direction, Histogram, SurfaceStats,
    };
}
