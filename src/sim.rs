//! In-memory host used by the driver binary and the test suite.
//!
//! Every view keeps its visible region in crop-local coordinates. Zooming fits the requested rectangle into
//! the window's aspect ratio the way an interactive host would, and leaves the view's depth untouched.

use anyhow::{bail, Context, Result};
use glam::DVec3;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;

use crate::geometry::{corner_bounds, CropTransform, WindowRect};
use crate::host::{DocumentInfo, HostError, HostResult, ViewHost};
use crate::view::{FarClip, PlanViewRange, ViewId, ViewKind};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimDocument {
    pub title: String,
    #[serde(default)]
    pub is_family: bool,
}

impl Default for SimDocument {
    fn default() -> Self {
        Self { title: "Project1".to_string(), is_family: false }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimView {
    pub id: ViewId,
    #[serde(default)]
    pub name: String,
    pub kind: ViewKind,
    #[serde(default)]
    pub crop: CropTransform,
    /// `None` when the view has no open window.
    #[serde(default)]
    pub window: Option<WindowRect>,
    pub visible_min: DVec3,
    pub visible_max: DVec3,
    #[serde(default)]
    pub view_range: PlanViewRange,
    #[serde(default)]
    pub far_clip: FarClip,
}

impl SimView {
    pub fn new(id: i64, kind: ViewKind, window: WindowRect) -> Self {
        let half = DVec3::new(window.width() as f64, window.height() as f64, 0.0) / 200.0;
        Self {
            id: ViewId(id),
            name: format!("{} {id}", kind.label()),
            kind,
            crop: CropTransform::IDENTITY,
            window: Some(window),
            visible_min: -half,
            visible_max: half,
            view_range: PlanViewRange::default(),
            far_clip: FarClip::default(),
        }
    }

    pub fn with_crop(mut self, crop: CropTransform) -> Self {
        self.crop = crop;
        self
    }

    pub fn with_visible(mut self, min: DVec3, max: DVec3) -> Self {
        let (min, max) = corner_bounds(min, max);
        self.visible_min = min;
        self.visible_max = max;
        self
    }

    pub fn with_view_range(mut self, range: PlanViewRange) -> Self {
        self.view_range = range;
        self
    }

    pub fn with_far_clip(mut self, far_clip: FarClip) -> Self {
        self.far_clip = far_clip;
        self
    }

    pub fn closed(mut self) -> Self {
        self.window = None;
        self
    }

    /// Half size of the visible region along the local right and up axes.
    pub fn visible_half_size(&self) -> (f64, f64) {
        let size = self.visible_max - self.visible_min;
        (size.x / 2.0, size.y / 2.0)
    }

    pub fn visible_center(&self) -> DVec3 {
        (self.visible_min + self.visible_max) / 2.0
    }

    fn fit_to_window(&mut self, local_min: DVec3, local_max: DVec3, window: WindowRect) {
        let center = (local_min + local_max) / 2.0;
        let mut half_w = (local_max.x - local_min.x) / 2.0;
        let mut half_h = (local_max.y - local_min.y) / 2.0;
        let aspect = window.aspect();
        if half_h <= 0.0 || half_w / half_h < aspect {
            half_w = half_h * aspect;
        } else {
            half_h = half_w / aspect;
        }
        self.visible_min = DVec3::new(center.x - half_w, center.y - half_h, self.visible_min.z);
        self.visible_max = DVec3::new(center.x + half_w, center.y + half_h, self.visible_max.z);
    }
}

/// Scenario file consumed by [`SimulatedHost::load`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SimScenario {
    #[serde(default)]
    pub document: Option<SimDocument>,
    #[serde(default)]
    pub views: Vec<SimView>,
    /// Window open order; defaults to the order of views that have a window.
    #[serde(default)]
    pub window_order: Vec<ViewId>,
    #[serde(default)]
    pub active_view: Option<ViewId>,
}

#[derive(Debug, Default)]
pub struct SimulatedHost {
    document: Option<SimDocument>,
    views: BTreeMap<ViewId, SimView>,
    window_order: Vec<ViewId>,
    active_view: Option<ViewId>,
    idle_subscribed: bool,
    zoom_log: Vec<ViewId>,
    activation_log: Vec<ViewId>,
    zoom_failures: HashMap<ViewId, HostError>,
    read_failures: HashMap<ViewId, HostError>,
}

impl SimulatedHost {
    pub fn new() -> Self {
        Self { document: Some(SimDocument::default()), ..Self::default() }
    }

    pub fn from_scenario(scenario: SimScenario) -> Result<Self> {
        let mut host = Self { document: scenario.document, ..Self::default() };
        let explicit_order = !scenario.window_order.is_empty();
        for view in scenario.views {
            if host.views.contains_key(&view.id) {
                bail!("Duplicate view id {} in scenario", view.id);
            }
            if !explicit_order && view.window.is_some() {
                host.window_order.push(view.id);
            }
            host.views.insert(view.id, view);
        }
        if explicit_order {
            for id in scenario.window_order {
                match host.views.get(&id) {
                    Some(view) if view.window.is_some() => host.window_order.push(id),
                    Some(_) => bail!("View {id} is listed in window_order but has no window"),
                    None => bail!("Unknown view {id} in window_order"),
                }
            }
        }
        if let Some(active) = scenario.active_view {
            if !host.window_order.contains(&active) {
                bail!("Active view {active} is not open");
            }
        }
        host.active_view = scenario.active_view.or_else(|| host.window_order.last().copied());
        Ok(host)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = fs::read(path).with_context(|| format!("Failed to read scenario file {}", path.display()))?;
        let scenario: SimScenario = serde_json::from_slice(&bytes)
            .with_context(|| format!("Failed to parse scenario file {}", path.display()))?;
        Self::from_scenario(scenario).with_context(|| format!("Invalid scenario {}", path.display()))
    }

    pub fn set_document(&mut self, document: Option<SimDocument>) {
        self.document = document;
    }

    /// Adds a view and opens its window on top when it has one. The first open view becomes active.
    pub fn add_view(&mut self, view: SimView) {
        let id = view.id;
        let has_window = view.window.is_some();
        self.views.insert(id, view);
        if has_window {
            self.window_order.push(id);
            if self.active_view.is_none() {
                self.active_view = Some(id);
            }
        }
    }

    /// Opens an additional window entry for an already open view.
    pub fn open_duplicate_window(&mut self, id: ViewId) {
        if self.views.get(&id).is_some_and(|view| view.window.is_some()) {
            self.window_order.push(id);
        }
    }

    pub fn activate(&mut self, id: ViewId) {
        self.active_view = Some(id);
    }

    pub fn view(&self, id: ViewId) -> Option<&SimView> {
        self.views.get(&id)
    }

    pub fn view_mut(&mut self, id: ViewId) -> Option<&mut SimView> {
        self.views.get_mut(&id)
    }

    pub fn views(&self) -> impl Iterator<Item = &SimView> {
        self.views.values()
    }

    pub fn set_window(&mut self, id: ViewId, window: WindowRect) {
        if let Some(view) = self.views.get_mut(&id) {
            view.window = Some(window);
        }
    }

    /// Moves the visible region of a view by `delta` in its crop-local frame, as a user pan would.
    pub fn pan(&mut self, id: ViewId, delta: DVec3) {
        if let Some(view) = self.views.get_mut(&id) {
            let delta = DVec3::new(delta.x, delta.y, 0.0);
            view.visible_min += delta;
            view.visible_max += delta;
        }
    }

    /// Scales the visible region of a view about its center, as a user zoom would.
    pub fn scale_visible(&mut self, id: ViewId, factor: f64) {
        if let Some(view) = self.views.get_mut(&id) {
            let center = view.visible_center();
            let scale = DVec3::new(factor, factor, 1.0);
            view.visible_min = center + (view.visible_min - center) * scale;
            view.visible_max = center + (view.visible_max - center) * scale;
        }
    }

    pub fn fail_zoom(&mut self, id: ViewId, error: HostError) {
        self.zoom_failures.insert(id, error);
    }

    pub fn fail_reads(&mut self, id: ViewId, error: HostError) {
        self.read_failures.insert(id, error);
    }

    pub fn clear_failures(&mut self) {
        self.zoom_failures.clear();
        self.read_failures.clear();
    }

    pub fn is_idle_subscribed(&self) -> bool {
        self.idle_subscribed
    }

    /// Views successfully re-framed, in call order.
    pub fn zoom_log(&self) -> &[ViewId] {
        &self.zoom_log
    }

    pub fn zoom_calls(&self, id: ViewId) -> usize {
        self.zoom_log.iter().filter(|logged| **logged == id).count()
    }

    pub fn activation_log(&self) -> &[ViewId] {
        &self.activation_log
    }

    pub fn clear_logs(&mut self) {
        self.zoom_log.clear();
        self.activation_log.clear();
    }

    fn get(&self, id: ViewId) -> HostResult<&SimView> {
        self.views.get(&id).ok_or(HostError::ViewNotFound(id))
    }

    fn open(&self, id: ViewId) -> HostResult<(&SimView, WindowRect)> {
        let view = self.get(id)?;
        let window = view.window.ok_or(HostError::NoOpenWindow(id))?;
        Ok((view, window))
    }

    fn check_reads(&self, id: ViewId) -> HostResult<()> {
        match self.read_failures.get(&id) {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}

impl ViewHost for SimulatedHost {
    fn active_document(&self) -> Option<DocumentInfo> {
        self.document.as_ref().map(|doc| DocumentInfo { title: doc.title.clone(), is_family: doc.is_family })
    }

    fn active_view(&self) -> Option<ViewId> {
        self.active_view
    }

    fn set_active_view(&mut self, view: ViewId) -> HostResult<()> {
        self.open(view)?;
        self.active_view = Some(view);
        self.activation_log.push(view);
        Ok(())
    }

    fn open_views(&self) -> HostResult<Vec<ViewId>> {
        Ok(self.window_order.clone())
    }

    fn view_kind(&self, view: ViewId) -> HostResult<ViewKind> {
        Ok(self.get(view)?.kind)
    }

    fn window_rect(&self, view: ViewId) -> HostResult<Option<WindowRect>> {
        Ok(self.get(view)?.window)
    }

    fn visible_corners(&self, view: ViewId) -> HostResult<[DVec3; 2]> {
        self.check_reads(view)?;
        let (sim, _) = self.open(view)?;
        Ok([sim.crop.of_point(sim.visible_min), sim.crop.of_point(sim.visible_max)])
    }

    fn crop_transform(&self, view: ViewId) -> HostResult<CropTransform> {
        Ok(self.get(view)?.crop)
    }

    fn plan_view_range(&self, view: ViewId) -> HostResult<PlanViewRange> {
        Ok(self.get(view)?.view_range)
    }

    fn far_clip(&self, view: ViewId) -> HostResult<FarClip> {
        Ok(self.get(view)?.far_clip)
    }

    fn zoom_and_center_rectangle(&mut self, view: ViewId, first: DVec3, second: DVec3) -> HostResult<()> {
        if let Some(err) = self.zoom_failures.get(&view) {
            return Err(err.clone());
        }
        let (sim, window) = self.open(view)?;
        let crop = sim.crop;
        let to_local = |point: DVec3| {
            crop.to_local(point).ok_or_else(|| HostError::Failed(format!("view {view} has a degenerate crop box")))
        };
        let (local_min, local_max) = corner_bounds(to_local(first)?, to_local(second)?);
        if let Some(sim) = self.views.get_mut(&view) {
            sim.fit_to_window(local_min, local_max, window);
        }
        self.zoom_log.push(view);
        Ok(())
    }

    fn subscribe_idle(&mut self) {
        self.idle_subscribed = true;
    }

    fn unsubscribe_idle(&mut self) {
        self.idle_subscribed = false;
    }
}
