//! Headless streaming demo.
//!
//! Generates noise terrain around a viewer that walks along +X, streaming
//! chunks into in-memory mesh and collider sinks, then logs a summary.
//! Configuration is loaded from `config.ron` and can be overridden via CLI flags.
//! Run with `cargo run -p strata-demo -- --ticks 300 --render-distance 4`.

mod sinks;

use std::process::ExitCode;

use clap::Parser;
use glam::{Mat4, Vec3};
use strata_config::{CliArgs, Config};
use strata_mesh::SurfaceExtractor;
use strata_terrain::NoiseTerrain;
use strata_voxel::MaterialCatalog;
use strata_world::{StreamerMetrics, Viewer, WorldStreamer};
use tracing::info;

use crate::sinks::{MemoryColliders, MemoryMeshes};

/// World units the viewer advances along +X each tick.
const WALK_SPEED: f32 = 2.0;

fn view_projection(eye: Vec3) -> Mat4 {
    let proj = Mat4::perspective_rh(std::f32::consts::FRAC_PI_3, 16.0 / 9.0, 0.1, 2000.0);
    let view = Mat4::look_to_rh(eye, Vec3::X, Vec3::Y);
    proj * view
}

fn main() -> ExitCode {
    let args = CliArgs::parse();

    // Resolve config directory
    let config_dir = args.config.clone().unwrap_or_else(|| {
        dirs::config_dir()
            .expect("Failed to resolve config directory")
            .join("strata")
    });

    // Load or create config, then apply CLI overrides
    let mut config = Config::load_or_create(&config_dir).unwrap_or_else(|e| {
        eprintln!("Failed to load config: {e}, using defaults");
        Config::default()
    });
    config.apply_cli_overrides(&args);
    if let Err(e) = config.validate() {
        eprintln!("Invalid configuration: {e}");
        return ExitCode::FAILURE;
    }

    let log_dir = config_dir.join("logs");
    strata_log::init_logging(Some(&log_dir), cfg!(debug_assertions), Some(&config));

    info!(
        render_distance = config.streaming.render_distance,
        seed = config.terrain.seed,
        ticks = args.ticks,
        "starting streaming demo"
    );

    let terrain = NoiseTerrain::new(config.terrain.clone());
    let mut streamer = WorldStreamer::new(
        terrain,
        SurfaceExtractor::new(MaterialCatalog::with_defaults()),
        MemoryMeshes::default(),
        MemoryColliders::default(),
        config.streaming.clone(),
        StreamerMetrics::new(),
    );

    let mut viewer = Viewer::new(Vec3::ZERO);
    for tick in 0..args.ticks {
        viewer.set_view_projection(&view_projection(viewer.position));
        let report = match streamer.tick(&mut viewer) {
            Ok(report) => report,
            Err(e) => {
                tracing::error!(tick, "streamer tick failed: {e}");
                return ExitCode::FAILURE;
            }
        };
        if config.debug.log_tick_stats {
            info!(
                tick,
                viewer_chunk = %report.viewer_chunk,
                visible = report.visible,
                generated = report.generated.len(),
                meshed = report.meshed.len(),
                evicted = report.evicted,
                pending = report.pending,
                "tick"
            );
        }
        viewer.position.x += WALK_SPEED;
    }

    let metrics = streamer.metrics();
    let meshes = streamer.mesh_sink();
    let colliders = streamer.collider_sink();
    info!(
        viewer = ?viewer.position,
        resident = streamer.resident_count(),
        loaded = streamer.loaded_count(),
        pending = streamer.pending_count(),
        "final world state"
    );
    info!(
        generated = metrics.chunks_generated,
        meshed = metrics.chunks_meshed,
        frozen = metrics.chunks_frozen,
        unfrozen = metrics.chunks_unfrozen,
        evictions = metrics.evictions,
        palette_miss_retries = metrics.palette_miss_retries,
        frozen_bytes = metrics.frozen_bytes,
        "streamer metrics"
    );
    info!(
        live_meshes = meshes.live(),
        renderable = meshes.renderable(),
        triangles = meshes.live_triangles(),
        meshes_created = meshes.total_created,
        meshes_removed = meshes.total_removed,
        live_colliders = colliders.live(),
        collider_vertices = colliders.live_vertices(),
        "sink totals"
    );

    ExitCode::SUCCESS
}
