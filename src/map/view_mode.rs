use std::time::Instant;

use log::{debug, info};
use serde::Serialize;

use super::surface::{MapSurface, Projection};
use crate::{
  config::{MapSettings, ZoomBounds},
  timer::PendingTimer,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewMode {
  /// Spherical projection, coarse zoom range. Markers are hidden.
  Globe,
  /// Mercator projection, fine zoom range. Markers are shown.
  Flat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
  /// Waiting for zooming to stop.
  Settling,
  /// Style swapped, waiting for the map to finish loading it.
  AwaitingStyle,
}

#[derive(Debug, Clone, Copy)]
struct Transition {
  target: ViewMode,
  phase: Phase,
}

/// Derives globe or flat from the zoom level and drives the style swap between them.
///
/// At most one transition is in flight. Zoom events while settling restart the
/// settle window; the target is re-derived from the latest zoom once it
/// expires. Zoom events while the new style loads are only remembered and
/// checked again when the load completes.
#[derive(Debug)]
pub struct ViewModeMachine {
  settings: MapSettings,
  mode: ViewMode,
  zoom: f64,
  transition: Option<Transition>,
  settle: PendingTimer,
}

impl ViewModeMachine {
  #[must_use]
  pub fn new(settings: MapSettings, zoom: f64) -> Self {
    let mode = derive_mode(&settings, zoom);
    Self {
      settings,
      mode,
      zoom,
      transition: None,
      settle: PendingTimer::new(),
    }
  }

  /// Style, projection and zoom range of the initial mode.
  pub fn apply_initial<S: MapSurface + ?Sized>(&self, surface: &mut S) {
    surface.set_zoom_bounds(self.zoom_bounds(self.mode));
    surface.set_style(self.style(self.mode));
    surface.set_projection(projection(self.mode));
  }

  #[must_use]
  pub fn mode(&self) -> ViewMode {
    self.mode
  }

  #[must_use]
  pub fn is_transitioning(&self) -> bool {
    self.transition.is_some()
  }

  #[must_use]
  pub fn next_deadline(&self) -> Option<Instant> {
    self.settle.due()
  }

  #[must_use]
  pub fn zoom_bounds(&self, mode: ViewMode) -> ZoomBounds {
    match mode {
      ViewMode::Globe => self.settings.globe_zoom_bounds,
      ViewMode::Flat => self.settings.flat_zoom_bounds,
    }
  }

  fn style(&self, mode: ViewMode) -> &str {
    match mode {
      ViewMode::Globe => &self.settings.globe_style,
      ViewMode::Flat => &self.settings.flat_style,
    }
  }

  pub fn on_zoom<S: MapSurface + ?Sized>(&mut self, zoom: f64, now: Instant, surface: &mut S) {
    self.zoom = zoom;
    let desired = derive_mode(&self.settings, zoom);
    match self.transition.map(|t| t.phase) {
      None if desired != self.mode => self.begin(desired, now, surface),
      None => {}
      Some(Phase::Settling) => {
        self.settle.schedule(now + self.settings.settle_delay());
      }
      Some(Phase::AwaitingStyle) => {
        debug!("Zoom {zoom:.2} while the style loads, checked once it is done");
      }
    }
  }

  fn begin<S: MapSurface + ?Sized>(&mut self, target: ViewMode, now: Instant, surface: &mut S) {
    debug!("Zoom {:.2}: {:?} -> {target:?}", self.zoom, self.mode);
    self.transition = Some(Transition {
      target,
      phase: Phase::Settling,
    });
    surface.set_zoom_bounds(self.zoom_bounds(target));
    self.settle.schedule(now + self.settings.settle_delay());
  }

  /// Applies the style swap once the settle window expired.
  /// Returns the new mode when the style was swapped.
  pub fn poll<S: MapSurface + ?Sized>(&mut self, now: Instant, surface: &mut S) -> Option<ViewMode> {
    self.settle.take_due(now)?;
    let recorded = self.transition.map(|t| t.target);
    let target = derive_mode(&self.settings, self.zoom);

    if target == self.mode {
      debug!("Zoom settled at {:.2}, staying {:?}", self.zoom, self.mode);
      self.transition = None;
      if recorded != Some(self.mode) {
        surface.set_zoom_bounds(self.zoom_bounds(self.mode));
      }
      return None;
    }

    if recorded != Some(target) {
      surface.set_zoom_bounds(self.zoom_bounds(target));
    }
    info!("Switching to {target:?} at zoom {:.2}", self.zoom);
    self.mode = target;
    self.transition = Some(Transition {
      target,
      phase: Phase::AwaitingStyle,
    });
    surface.set_style(self.style(target));
    surface.set_projection(projection(target));
    Some(target)
  }

  /// Clears the guard after a swap. Starts the next transition right away if
  /// the zoom moved across the threshold meanwhile. Returns whether a
  /// transition completed.
  pub fn on_style_load<S: MapSurface + ?Sized>(&mut self, now: Instant, surface: &mut S) -> bool {
    if self.transition.map(|t| t.phase) != Some(Phase::AwaitingStyle) {
      return false;
    }
    self.transition = None;
    let desired = derive_mode(&self.settings, self.zoom);
    if desired != self.mode {
      self.begin(desired, now, surface);
    }
    true
  }
}

fn derive_mode(settings: &MapSettings, zoom: f64) -> ViewMode {
  if zoom >= settings.flat_zoom_threshold {
    ViewMode::Flat
  } else {
    ViewMode::Globe
  }
}

fn projection(mode: ViewMode) -> Projection {
  match mode {
    ViewMode::Globe => Projection::Globe,
    ViewMode::Flat => Projection::Mercator,
  }
}
