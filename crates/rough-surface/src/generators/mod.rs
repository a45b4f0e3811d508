//! Surface generators.
//!
//! - [`ParametricGenerator`]: cosine double sum with power-law amplitudes and random phases
//! - [`SpectralGenerator`]: Gaussian noise convolved with an exponential correlation kernel
//!
//! Both take the random source as an argument; seed it to reproduce a surface.

pub mod parametric;
pub mod spectral;

pub use parametric::{generate_parametric, ParametricGenerator};
pub use spectral::{generate_spectral, Normalization, SpectralGenerator};
