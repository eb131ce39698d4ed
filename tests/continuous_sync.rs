use glam::DVec3;
use viewsync_engine::comparison::ComparisonPolicy;
use viewsync_engine::config::{ContinuousConfig, SyncConfig};
use viewsync_engine::geometry::{CropTransform, WindowRect};
use viewsync_engine::host::ViewHost;
use viewsync_engine::sim::{SimView, SimulatedHost};
use viewsync_engine::{CommandOutcome, HostError, SyncCommand, SyncSession, TickOutcome, ViewId, ViewKind, ViewSyncApp};

/// Active plan #1 followed by four compatible views #2..#5, in window open order.
fn five_window_host() -> SimulatedHost {
    let mut host = SimulatedHost::new();
    host.add_view(SimView::new(1, ViewKind::Plan, WindowRect::from_size(1000, 600)));
    host.add_view(SimView::new(2, ViewKind::Plan, WindowRect::from_size(400, 400)));
    host.add_view(
        SimView::new(3, ViewKind::Section, WindowRect::from_size(600, 300))
            .with_crop(CropTransform::section(DVec3::new(0.0, -10.0, 0.0), DVec3::Y)),
    );
    host.add_view(
        SimView::new(4, ViewKind::ThreeD, WindowRect::from_size(800, 800))
            .with_crop(CropTransform::section(DVec3::new(-20.0, -20.0, 20.0), DVec3::new(1.0, 1.0, -1.0))),
    );
    host.add_view(SimView::new(5, ViewKind::Plan, WindowRect::from_size(300, 500)));
    host.activate(ViewId(1));
    host
}

#[test]
fn fan_out_applies_one_view_per_tick_until_settled() {
    let mut host = five_window_host();
    let mut session = SyncSession::new(ComparisonPolicy::default());

    assert_eq!(session.tick(&mut host), TickOutcome::Applied { view: ViewId(2), new_epoch: true });
    assert_eq!(host.zoom_log().len(), 1);
    assert_eq!(session.cursor(), 2);

    for expected in [3, 4, 5] {
        assert_eq!(session.tick(&mut host), TickOutcome::Applied { view: ViewId(expected), new_epoch: false });
    }
    assert_eq!(host.zoom_log(), &[ViewId(2), ViewId(3), ViewId(4), ViewId(5)]);

    assert_eq!(session.tick(&mut host), TickOutcome::Settled { new_epoch: false });
    assert_eq!(host.zoom_log().len(), 4, "steady state applies nothing");
}

#[test]
fn cursor_continues_where_the_previous_epoch_stopped() {
    let mut host = five_window_host();
    let mut session = SyncSession::new(ComparisonPolicy::default());
    session.tick(&mut host);
    session.tick(&mut host);
    assert_eq!(session.cursor(), 3);

    host.scale_visible(ViewId(1), 0.5);
    host.clear_logs();
    let mut applied = Vec::new();
    for _ in 0..4 {
        if let TickOutcome::Applied { view, .. } = session.tick(&mut host) {
            applied.push(view);
        }
    }
    assert_eq!(applied, vec![ViewId(4), ViewId(5), ViewId(2), ViewId(3)]);
}

#[test]
fn switching_the_active_view_drives_the_others() {
    let mut host = five_window_host();
    let mut session = SyncSession::new(ComparisonPolicy::default());
    for _ in 0..5 {
        session.tick(&mut host);
    }
    host.activate(ViewId(3));
    host.pan(ViewId(3), DVec3::new(0.0, 2.0, 0.0));
    host.clear_logs();
    for _ in 0..5 {
        session.tick(&mut host);
    }
    assert_eq!(host.zoom_calls(ViewId(3)), 0, "the driving view is never re-framed");
    assert_eq!(host.zoom_log().len(), 4);
}

#[test]
fn reads_noise_below_change_tolerance_does_not_restart_the_epoch() {
    let mut host = five_window_host();
    let mut session = SyncSession::new(ComparisonPolicy::new(0.01));
    for _ in 0..5 {
        session.tick(&mut host);
    }
    host.pan(ViewId(1), DVec3::new(0.001, 0.0, 0.0));
    assert_eq!(session.tick(&mut host), TickOutcome::Settled { new_epoch: false });

    host.pan(ViewId(1), DVec3::new(1.0, 0.0, 0.0));
    assert!(matches!(session.tick(&mut host), TickOutcome::Applied { new_epoch: true, .. }));
}

#[test]
fn minimized_active_view_makes_ticks_no_ops() {
    let mut host = five_window_host();
    host.set_window(ViewId(1), WindowRect::new(0, 0, 0, 0));
    let mut session = SyncSession::new(ComparisonPolicy::default());
    assert_eq!(session.tick(&mut host), TickOutcome::Skipped);
    assert!(host.zoom_log().is_empty());
    assert!(!session.previous_box().is_set());
}

#[test]
fn collapsed_active_framing_keeps_the_last_good_box() {
    let mut host = five_window_host();
    let mut session = SyncSession::new(ComparisonPolicy::default());
    session.tick(&mut host);
    let last_good = *session.previous_box();

    host.scale_visible(ViewId(1), 0.0);
    host.clear_logs();
    assert_eq!(session.tick(&mut host), TickOutcome::Skipped);
    assert_eq!(*session.previous_box(), last_good);
    assert!(!session.is_synced(ViewId(3)), "pending views stay pending");
    assert!(host.zoom_log().is_empty());
}

#[test]
fn host_failures_are_swallowed_and_the_view_is_passed_over() {
    let mut host = five_window_host();
    host.fail_zoom(ViewId(2), HostError::Failed("locked".into()));
    let mut session = SyncSession::new(ComparisonPolicy::default());
    assert_eq!(session.tick(&mut host), TickOutcome::Applied { view: ViewId(3), new_epoch: true });
    assert!(session.is_synced(ViewId(2)));

    host.fail_reads(ViewId(1), HostError::Cancelled);
    assert_eq!(session.tick(&mut host), TickOutcome::Skipped);
}

#[test]
fn app_toggle_drives_idle_ticks() {
    let mut host = five_window_host();
    let config = SyncConfig { continuous: ContinuousConfig { change_tolerance: Some(1e-6) }, ..SyncConfig::default() };
    let mut app = ViewSyncApp::new(config);
    assert!(app.on_idle(&mut host).is_none());

    assert_eq!(app.execute(&mut host, SyncCommand::SyncContinuously), CommandOutcome::Succeeded);
    assert!(app.is_continuous_active());
    assert!(host.is_idle_subscribed());

    let mut ticks = 0;
    while host.zoom_log().len() < 4 {
        app.on_idle(&mut host).expect("running");
        ticks += 1;
        assert!(ticks <= 4, "fan-out should finish in four ticks");
    }

    assert_eq!(app.execute(&mut host, SyncCommand::SyncContinuously), CommandOutcome::Succeeded);
    assert!(!host.is_idle_subscribed());
    host.pan(ViewId(1), DVec3::new(5.0, 5.0, 0.0));
    assert!(app.on_idle(&mut host).is_none());
    assert_eq!(host.zoom_log().len(), 4);
    assert_eq!(host.active_view(), Some(ViewId(1)));
}
