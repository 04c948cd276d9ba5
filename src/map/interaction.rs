use std::time::{Duration, Instant};

use log::{debug, warn};

use super::{
  coordinates::{PixelPosition, WGS84Coordinate},
  region::{RegionFeature, RegionId},
  surface::{AnimationKind, CameraAnimation, FeatureState, MapSurface, Tooltip},
};
use crate::{config::MapSettings, timer::Cooldown};

/// What a click did.
#[derive(Debug, Clone, PartialEq)]
pub enum ClickOutcome {
  Selected(RegionId),
  /// Clicked outside any region, selection cleared and view reset.
  Cleared,
  /// Waiting for the user to name the location.
  NameRequested(WGS84Coordinate),
  /// Placement is armed but the map is zoomed out too far.
  ZoomTooLow,
  Ignored,
}

/// Hover highlighting, region selection and marker placement.
pub struct InteractionHandler {
  settings: MapSettings,
  hovered: Option<RegionId>,
  selected: Option<RegionId>,
  cooldown: Cooldown,
  placement_armed: bool,
  pending_placement: Option<WGS84Coordinate>,
}

impl InteractionHandler {
  #[must_use]
  pub fn new(settings: MapSettings) -> Self {
    Self {
      cooldown: Cooldown::new(settings.click_cooldown()),
      settings,
      hovered: None,
      selected: None,
      placement_armed: false,
      pending_placement: None,
    }
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
  pub fn is_placement_armed(&self) -> bool {
    self.placement_armed
  }

  #[must_use]
  pub fn pending_placement(&self) -> Option<WGS84Coordinate> {
    self.pending_placement
  }

  /// While armed, clicks place markers instead of selecting regions.
  pub fn arm_placement(&mut self, armed: bool) {
    debug!("Placement armed: {armed}");
    self.placement_armed = armed;
    if !armed {
      self.pending_placement = None;
    }
  }

  pub fn take_pending_placement(&mut self) -> Option<WGS84Coordinate> {
    self.pending_placement.take()
  }

  pub fn on_mouse_move<S: MapSurface + ?Sized>(
    &mut self,
    region: Option<&RegionFeature>,
    point: PixelPosition,
    surface: &mut S,
  ) {
    let Some(region) = region else {
      self.on_mouse_leave(surface);
      return;
    };
    if self.hovered.as_ref() != Some(&region.id) {
      if let Some(previous) = self.hovered.take() {
        surface.set_feature_state(&previous, FeatureState::Hover(false));
      }
      surface.set_feature_state(&region.id, FeatureState::Hover(true));
      self.hovered = Some(region.id.clone());
    }
    surface.show_tooltip(Tooltip {
      text: region.name.clone(),
      at: point,
    });
  }

  pub fn on_mouse_leave<S: MapSurface + ?Sized>(&mut self, surface: &mut S) {
    if let Some(previous) = self.hovered.take() {
      surface.set_feature_state(&previous, FeatureState::Hover(false));
      surface.hide_tooltip();
    }
  }

  pub fn on_click<S: MapSurface + ?Sized>(
    &mut self,
    coordinates: WGS84Coordinate,
    region: Option<&RegionFeature>,
    zoom: f64,
    now: Instant,
    surface: &mut S,
  ) -> ClickOutcome {
    if self.placement_armed {
      return self.place(coordinates, zoom, surface);
    }
    match region {
      Some(region) => self.select(region, now, surface),
      None => {
        self.clear_selection(surface);
        let view = self.settings.default_view;
        surface.animate_camera(CameraAnimation::new(
          AnimationKind::Ease,
          view.center,
          view.zoom,
          Duration::from_millis(self.settings.reset_duration_ms),
        ));
        ClickOutcome::Cleared
      }
    }
  }

  fn place<S: MapSurface + ?Sized>(
    &mut self,
    coordinates: WGS84Coordinate,
    zoom: f64,
    surface: &mut S,
  ) -> ClickOutcome {
    if zoom < self.settings.flat_zoom_threshold {
      debug!("Placement at zoom {zoom:.2} refused");
      surface.prompt_zoom_in(self.settings.flat_zoom_threshold);
      return ClickOutcome::ZoomTooLow;
    }
    self.pending_placement = Some(coordinates);
    surface.request_location_name(coordinates);
    ClickOutcome::NameRequested(coordinates)
  }

  fn select<S: MapSurface + ?Sized>(
    &mut self,
    region: &RegionFeature,
    now: Instant,
    surface: &mut S,
  ) -> ClickOutcome {
    if !self.cooldown.is_ready(now) {
      debug!("Click on {} within cooldown", region.id);
      return ClickOutcome::Ignored;
    }
    if self.selected.as_ref() == Some(&region.id) {
      return ClickOutcome::Ignored;
    }
    let target = match region.camera_target() {
      Ok(target) => target,
      Err(e) => {
        warn!("Ignoring click: {e}");
        return ClickOutcome::Ignored;
      }
    };
    self.cooldown.try_accept(now);

    if let Some(previous) = self.selected.take() {
      surface.set_feature_state(&previous, FeatureState::Selected(false));
    }
    surface.set_feature_state(&region.id, FeatureState::Selected(true));
    self.selected = Some(region.id.clone());

    debug!(
      "Selected {} ({}), extent {:.1} degrees",
      region.name, region.id, target.max_diff
    );
    surface.animate_camera(CameraAnimation::new(
      AnimationKind::Fly,
      target.center,
      self.settings.flat_zoom_bounds.clamp(target.zoom),
      Duration::from_millis(self.settings.fly_duration_ms),
    ));
    ClickOutcome::Selected(region.id.clone())
  }

  pub fn clear_selection<S: MapSurface + ?Sized>(&mut self, surface: &mut S) {
    if let Some(previous) = self.selected.take() {
      surface.set_feature_state(&previous, FeatureState::Selected(false));
    }
  }

  /// Puts hover and selection back after a style swap wiped the feature state.
  pub fn restore_feature_state<S: MapSurface + ?Sized>(&self, surface: &mut S) {
    if let Some(hovered) = &self.hovered {
      surface.set_feature_state(hovered, FeatureState::Hover(true));
    }
    if let Some(selected) = &self.selected {
      surface.set_feature_state(selected, FeatureState::Selected(true));
    }
  }
}
