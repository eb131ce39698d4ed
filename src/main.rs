use anyhow::Result;
use glam::DVec3;
use tracing_subscriber::EnvFilter;
use viewsync_engine::cli::CliOptions;
use viewsync_engine::config::SyncConfig;
use viewsync_engine::geometry::{CropTransform, WindowRect};
use viewsync_engine::host::ViewHost;
use viewsync_engine::sim::{SimView, SimulatedHost};
use viewsync_engine::view::{DepthPlane, FarClip, PlanViewRange, ViewId, ViewKind};
use viewsync_engine::{SyncCommand, ViewSyncApp};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let options = match CliOptions::parse_from_env() {
        Ok(parsed) => parsed,
        Err(err) => {
            eprintln!("[cli] {err}");
            std::process::exit(2);
        }
    };
    if let Err(err) = run(options) {
        tracing::error!("viewsync error: {err:?}");
        std::process::exit(1);
    }
}

fn run(options: CliOptions) -> Result<()> {
    let mut config = options.config.as_ref().map(SyncConfig::load_or_default).unwrap_or_default();
    let overrides = options.config_overrides();
    if !overrides.is_empty() {
        tracing::info!(fields = ?overrides.applied_fields(), "applying command-line overrides");
        config.apply_overrides(&overrides);
    }

    let mut host = match &options.scenario {
        Some(path) => SimulatedHost::load(path)?,
        None => demo_host(),
    };
    if let Some(document) = host.active_document() {
        println!("document: {}{}", document.title, if document.is_family { " (family)" } else { "" });
    }
    let mut app = ViewSyncApp::new(config);

    let commands = if options.commands.is_empty() { vec![SyncCommand::SyncNow] } else { options.commands };
    for command in commands {
        let outcome = app.execute(&mut host, command);
        println!("{}: {outcome}", command.label());
    }

    for tick in 0..options.ticks {
        if !host.is_idle_subscribed() {
            break;
        }
        if let Some(outcome) = app.on_idle(&mut host) {
            tracing::debug!(tick, ?outcome, "idle tick");
        }
    }

    for view in host.views() {
        let center = view.crop.of_point(view.visible_center());
        let (half_w, half_h) = view.visible_half_size();
        println!(
            "{:>6} {:<12} center=({:.3}, {:.3}, {:.3}) half=({:.3} x {:.3}) zooms={}",
            view.id.to_string(),
            view.name,
            center.x,
            center.y,
            center.z,
            half_w,
            half_h,
            host.zoom_calls(view.id)
        );
    }
    Ok(())
}

/// Small project used when no scenario file is given: a zoomed plan, an elevation, a 3D view and a schedule.
fn demo_host() -> SimulatedHost {
    let mut host = SimulatedHost::new();
    host.add_view(
        SimView::new(101, ViewKind::Section, WindowRect::from_size(900, 600))
            .with_crop(CropTransform::section(DVec3::new(0.0, -40.0, 0.0), DVec3::Y))
            .with_visible(DVec3::new(-30.0, -20.0, 0.0), DVec3::new(30.0, 20.0, 0.0))
            .with_far_clip(FarClip::enabled(30.0)),
    );
    host.add_view(
        SimView::new(102, ViewKind::ThreeD, WindowRect::from_size(640, 640))
            .with_crop(CropTransform::section(DVec3::new(-50.0, -50.0, 40.0), DVec3::new(1.0, 1.0, -0.8))),
    );
    host.add_view(SimView::new(103, ViewKind::Schedule, WindowRect::from_size(500, 700)));
    host.add_view(
        SimView::new(100, ViewKind::Plan, WindowRect::from_size(1200, 800))
            .with_visible(DVec3::new(-12.0, -8.0, 0.0), DVec3::new(12.0, 8.0, 0.0))
            .with_view_range(PlanViewRange::new(DepthPlane::at_level(0.0, 10.0), DepthPlane::at_level(0.0, 0.0))),
    );
    host.activate(ViewId(100));
    host
}
