use std::{collections::BTreeMap, time::Duration};

use log::{debug, info};
use serde::Serialize;

use super::{
  coordinates::{PixelPosition, WGS84Coordinate},
  map_event::EventKind,
  region::RegionId,
};
use crate::{
  config::ZoomBounds,
  store::{LocationId, SavedLocation},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Projection {
  Globe,
  Mercator,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimationKind {
  /// Zoom out and back in along the way.
  Fly,
  /// Straight interpolation.
  Ease,
  /// No animation at all.
  Jump,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraAnimation {
  pub kind: AnimationKind,
  pub center: WGS84Coordinate,
  pub zoom: f64,
  pub duration: Duration,
  pub pitch: f64,
  pub bearing: f64,
}

impl CameraAnimation {
  #[must_use]
  pub fn new(kind: AnimationKind, center: WGS84Coordinate, zoom: f64, duration: Duration) -> Self {
    Self {
      kind,
      center,
      zoom,
      duration,
      pitch: 0.0,
      bearing: 0.0,
    }
  }
}

/// Paint state of a region, read by the fill layer's paint expressions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeatureState {
  Hover(bool),
  Selected(bool),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Tooltip {
  pub text: String,
  pub at: PixelPosition,
}

/// Identifies a marker the surface has placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MarkerHandle(pub u64);

/// What the controller needs from a map rendering library.
///
/// Events flow the other way: the adapter forwards the [`EventKind`]s it was
/// subscribed to as [`super::map_event::MapEvent`]s.
pub trait MapSurface {
  fn subscribe(&mut self, kinds: &[EventKind]);
  fn set_style(&mut self, style: &str);
  fn set_projection(&mut self, projection: Projection);
  fn set_zoom_bounds(&mut self, bounds: ZoomBounds);
  fn animate_camera(&mut self, animation: CameraAnimation);
  /// Adds the country source with its fill and border layers. A style swap drops them.
  fn add_region_layers(&mut self);
  fn set_feature_state(&mut self, region: &RegionId, state: FeatureState);
  fn show_tooltip(&mut self, tooltip: Tooltip);
  fn hide_tooltip(&mut self);
  fn add_marker(&mut self, location: &SavedLocation) -> MarkerHandle;
  fn remove_marker(&mut self, marker: MarkerHandle);
  fn set_markers_visible(&mut self, visible: bool);
  /// Asks the user to name a location. Answered by a `name_entered` or `name_cancelled` event.
  fn request_location_name(&mut self, at: WGS84Coordinate);
  /// Tells the user to zoom in to at least `min_zoom`.
  fn prompt_zoom_in(&mut self, min_zoom: f64);
}

/// Every call a [`HeadlessSurface`] received, in order.
#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceCall {
  Subscribe(Vec<EventKind>),
  SetStyle(String),
  SetProjection(Projection),
  SetZoomBounds(ZoomBounds),
  AnimateCamera(CameraAnimation),
  AddRegionLayers,
  SetFeatureState(RegionId, FeatureState),
  ShowTooltip(Tooltip),
  HideTooltip,
  AddMarker(MarkerHandle, LocationId),
  RemoveMarker(MarkerHandle),
  SetMarkersVisible(bool),
  RequestLocationName(WGS84Coordinate),
  PromptZoomIn(f64),
}

/// A map without pixels. Keeps the state a real map would end up in and logs
/// every call, optionally recording them for inspection.
#[derive(Debug, Default)]
pub struct HeadlessSurface {
  record: bool,
  calls: Vec<SurfaceCall>,
  subscriptions: Vec<EventKind>,
  style: Option<String>,
  projection: Option<Projection>,
  zoom_bounds: Option<ZoomBounds>,
  camera: Option<CameraAnimation>,
  region_layers: bool,
  hovered: Option<RegionId>,
  selected: Option<RegionId>,
  tooltip: Option<Tooltip>,
  next_marker: u64,
  markers: BTreeMap<MarkerHandle, (LocationId, WGS84Coordinate)>,
  markers_visible: bool,
}

impl HeadlessSurface {
  #[must_use]
  pub fn new() -> Self {
    Self::default()
  }

  /// Also keeps a list of all calls, see [`Self::calls`].
  #[must_use]
  pub fn recording() -> Self {
    Self {
      record: true,
      ..Self::default()
    }
  }

  fn push(&mut self, call: SurfaceCall) {
    debug!("Surface: {call:?}");
    if self.record {
      self.calls.push(call);
    }
  }

  #[must_use]
  pub fn calls(&self) -> &[SurfaceCall] {
    &self.calls
  }

  pub fn take_calls(&mut self) -> Vec<SurfaceCall> {
    std::mem::take(&mut self.calls)
  }

  #[must_use]
  pub fn subscriptions(&self) -> &[EventKind] {
    &self.subscriptions
  }

  #[must_use]
  pub fn style(&self) -> Option<&str> {
    self.style.as_deref()
  }

  #[must_use]
  pub fn projection(&self) -> Option<Projection> {
    self.projection
  }

  #[must_use]
  pub fn zoom_bounds(&self) -> Option<ZoomBounds> {
    self.zoom_bounds
  }

  #[must_use]
  pub fn camera(&self) -> Option<CameraAnimation> {
    self.camera
  }

  #[must_use]
  pub fn has_region_layers(&self) -> bool {
    self.region_layers
  }

  #[must_use]
  pub fn hovered(&self) -> Option<&RegionId> {
    self.hovered.as_ref()
  }

  #[must_use]
  pub fn selected(&self) -> Option<&RegionId> {
    self.selected.as_ref()
  }

  #[must_use]
  pub fn tooltip(&self) -> Option<&Tooltip> {
    self.tooltip.as_ref()
  }

  #[must_use]
  pub fn marker_count(&self) -> usize {
    self.markers.len()
  }

  #[must_use]
  pub fn marker_locations(&self) -> Vec<&LocationId> {
    self.markers.values().map(|(id, _)| id).collect()
  }

  #[must_use]
  pub fn markers_visible(&self) -> bool {
    self.markers_visible
  }
}

impl MapSurface for HeadlessSurface {
  fn subscribe(&mut self, kinds: &[EventKind]) {
    self.subscriptions.extend_from_slice(kinds);
    self.push(SurfaceCall::Subscribe(kinds.to_vec()));
  }

  fn set_style(&mut self, style: &str) {
    info!("Map style: {style}");
    self.style = Some(style.to_string());
    self.region_layers = false;
    self.hovered = None;
    self.selected = None;
    self.push(SurfaceCall::SetStyle(style.to_string()));
  }

  fn set_projection(&mut self, projection: Projection) {
    info!("Map projection: {projection:?}");
    self.projection = Some(projection);
    self.push(SurfaceCall::SetProjection(projection));
  }

  fn set_zoom_bounds(&mut self, bounds: ZoomBounds) {
    self.zoom_bounds = Some(bounds);
    self.push(SurfaceCall::SetZoomBounds(bounds));
  }

  fn animate_camera(&mut self, animation: CameraAnimation) {
    info!(
      "Camera {:?} to {} at zoom {:.2}",
      animation.kind, animation.center, animation.zoom
    );
    self.camera = Some(animation);
    self.push(SurfaceCall::AnimateCamera(animation));
  }

  fn add_region_layers(&mut self) {
    self.region_layers = true;
    self.push(SurfaceCall::AddRegionLayers);
  }

  fn set_feature_state(&mut self, region: &RegionId, state: FeatureState) {
    match state {
      FeatureState::Hover(true) => self.hovered = Some(region.clone()),
      FeatureState::Hover(false) if self.hovered.as_ref() == Some(region) => self.hovered = None,
      FeatureState::Selected(true) => self.selected = Some(region.clone()),
      FeatureState::Selected(false) if self.selected.as_ref() == Some(region) => {
        self.selected = None;
      }
      FeatureState::Hover(false) | FeatureState::Selected(false) => {}
    }
    self.push(SurfaceCall::SetFeatureState(region.clone(), state));
  }

  fn show_tooltip(&mut self, tooltip: Tooltip) {
    self.tooltip = Some(tooltip.clone());
    self.push(SurfaceCall::ShowTooltip(tooltip));
  }

  fn hide_tooltip(&mut self) {
    self.tooltip = None;
    self.push(SurfaceCall::HideTooltip);
  }

  fn add_marker(&mut self, location: &SavedLocation) -> MarkerHandle {
    let handle = MarkerHandle(self.next_marker);
    self.next_marker += 1;
    self
      .markers
      .insert(handle, (location.id.clone(), location.coordinates));
    self.push(SurfaceCall::AddMarker(handle, location.id.clone()));
    handle
  }

  fn remove_marker(&mut self, marker: MarkerHandle) {
    self.markers.remove(&marker);
    self.push(SurfaceCall::RemoveMarker(marker));
  }

  fn set_markers_visible(&mut self, visible: bool) {
    self.markers_visible = visible;
    self.push(SurfaceCall::SetMarkersVisible(visible));
  }

  fn request_location_name(&mut self, at: WGS84Coordinate) {
    info!("Waiting for a name for the location at {at}");
    self.push(SurfaceCall::RequestLocationName(at));
  }

  fn prompt_zoom_in(&mut self, min_zoom: f64) {
    info!("Zoom in to at least {min_zoom} to add a location");
    self.push(SurfaceCall::PromptZoomIn(min_zoom));
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use chrono::Utc;

  fn location(id: &str) -> SavedLocation {
    SavedLocation {
      id: LocationId::from(id),
      name: id.to_string(),
      coordinates: WGS84Coordinate::new(1.0, 2.0),
      description: None,
      created_at: Utc::now(),
    }
  }

  #[test]
  fn style_swap_drops_layers_and_feature_state() {
    let mut surface = HeadlessSurface::new();
    surface.add_region_layers();
    surface.set_feature_state(&RegionId::from("DE"), FeatureState::Selected(true));
    assert_eq!(surface.selected(), Some(&RegionId::from("DE")));

    surface.set_style("flat");
    assert!(!surface.has_region_layers());
    assert_eq!(surface.selected(), None);
    assert!(surface.calls().is_empty());
  }

  #[test]
  fn markers_get_distinct_handles() {
    let mut surface = HeadlessSurface::recording();
    let a = surface.add_marker(&location("a"));
    let b = surface.add_marker(&location("b"));
    assert_ne!(a, b);
    surface.remove_marker(a);
    assert_eq!(surface.marker_locations(), vec![&LocationId::from("b")]);
    assert_eq!(surface.take_calls().len(), 3);
    assert!(surface.calls().is_empty());
  }

  #[test]
  fn stale_hover_clear_keeps_newer_hover() {
    let mut surface = HeadlessSurface::new();
    surface.set_feature_state(&RegionId::from("FR"), FeatureState::Hover(true));
    surface.set_feature_state(&RegionId::from("DE"), FeatureState::Hover(false));
    assert_eq!(surface.hovered(), Some(&RegionId::from("FR")));
  }
}
