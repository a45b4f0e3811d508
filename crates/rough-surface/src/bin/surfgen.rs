//! Generates one rough surface, logs its statistics and optionally writes STL.
//!
//! Run with:
//! ```
//! cargo run -p rough-surface --bin surfgen -- [run-config.json]
//! ```
//!
//! Without a config file the default parametric surface is generated.

use std::path::PathBuf;

use anyhow::Context;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rough_surface::prelude::*;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = match std::env::args_os().nth(1) {
        Some(path) => {
            let path = PathBuf::from(path);
            tracing::info!("Loading run config from {}", path.display());
            RunConfig::load(&path)
                .with_context(|| format!("failed to load {}", path.display()))?
        }
        None => RunConfig::default(),
    };
    config.validate().context("invalid input")?;

    let mut rng = match config.seed {
        Some(seed) => ChaCha8Rng::seed_from_u64(seed),
        None => ChaCha8Rng::from_entropy(),
    };

    let surface = match &config.method {
        Method::Parametric(spec) => {
            tracing::info!("Generating parametric surface (N = {}, b = {})", spec.modes, spec.exponent);
            generate_parametric(spec, &mut rng)?
        }
        Method::Spectral(spec) => {
            tracing::info!(
                "Generating {} spectral surface ({} x {})",
                if spec.is_isotropic() { "isotropic" } else { "anisotropic" },
                spec.points_x(),
                spec.points_y()
            );
            generate_spectral(spec, &mut rng)?
        }
    };

    if let Err(e) = surface.ensure_nontrivial() {
        tracing::warn!("Generation succeeded but the result looks degenerate: {e}");
    }

    let (rows, cols) = surface.dim();
    let stats = SurfaceStats::from_heights(&surface.heights);
    tracing::info!("Surface generated: {rows} x {cols}");
    tracing::info!("  RMS height: {:.6}", stats.rms);
    tracing::info!("  Mean height: {:.6}", stats.mean);
    tracing::info!("  Peak-to-valley: {:.6}", stats.peak_to_valley);
    tracing::info!("  Skewness: {:.3}", stats.skewness);
    tracing::info!("  Kurtosis: {:.3}", stats.kurtosis);

    let dx = surface.x[1] - surface.x[0];
    let dy = surface.y[1] - surface.y[0];
    if let (Some(clx), Some(cly)) = (
        correlation_length(&surface.heights, dx, Direction::X),
        correlation_length(&surface.heights, dy, Direction::Y),
    ) {
        tracing::info!("  Correlation length: {clx:.4} (x), {cly:.4} (y)");
    }

    let histogram = height_histogram(&surface.heights, config.histogram_bins)?;
    tracing::debug!(?histogram, "height distribution");

    if let Some(stl) = &config.stl {
        let mesh = export_surface_stl(&surface, &stl.path, stl.base_thickness)
            .with_context(|| format!("failed to export {}", stl.path.display()))?;
        tracing::info!(
            "Wrote {} triangles to {}",
            mesh.triangle_count(),
            stl.path.display()
        );
    }

    Ok(())
}
