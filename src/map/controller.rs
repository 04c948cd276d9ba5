use std::{
  rc::Rc,
  sync::mpsc::{Receiver, RecvTimeoutError},
  time::{Duration, Instant},
};

use log::{debug, error, info, warn};
use serde::Serialize;

use super::{
  coordinates::WGS84Coordinate,
  interaction::InteractionHandler,
  map_event::{EventKind, MapEvent},
  markers::MarkerLayer,
  region::RegionId,
  surface::{AnimationKind, CameraAnimation, MapSurface},
  view_mode::{ViewMode, ViewModeMachine},
};
use crate::{
  config::MapSettings,
  store::{LocationId, LocationStore, SavedLocation, StoreError},
  timer::Clock,
};

/// What the controller currently shows, for whoever watches from outside.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ControllerSnapshot {
  pub mode: ViewMode,
  pub zoom: f64,
  pub transitioning: bool,
  pub hovered: Option<RegionId>,
  pub selected: Option<RegionId>,
  pub placement_armed: bool,
  pub awaiting_name: Option<WGS84Coordinate>,
  pub markers_visible: bool,
  pub edit_mode: bool,
  pub marked: Vec<LocationId>,
  pub locations: Vec<SavedLocation>,
}

/// Owns one map for its whole lifetime.
///
/// Events are handled one at a time, deferred work runs from [`Self::poll`].
pub struct MapController<S: MapSurface> {
  surface: S,
  clock: Rc<dyn Clock>,
  settings: MapSettings,
  zoom: f64,
  loaded: bool,
  view: ViewModeMachine,
  interaction: InteractionHandler,
  markers: MarkerLayer,
  store: LocationStore,
}

impl<S: MapSurface> MapController<S> {
  /// Subscribes to the map events and moves the camera to the default view.
  /// Unusable settings are replaced by the defaults.
  pub fn new(
    mut surface: S,
    clock: Rc<dyn Clock>,
    settings: MapSettings,
    store: LocationStore,
  ) -> Self {
    let settings = settings.validated();
    let default_view = settings.default_view;
    let view = ViewModeMachine::new(settings.clone(), default_view.zoom);
    let mut markers = MarkerLayer::new();

    surface.subscribe(&EventKind::ALL);
    view.apply_initial(&mut surface);
    markers.set_visible(view.mode() == ViewMode::Flat, &mut surface);
    surface.animate_camera(CameraAnimation::new(
      AnimationKind::Jump,
      default_view.center,
      default_view.zoom,
      Duration::ZERO,
    ));
    info!(
      "Map controller started in {:?} with {} saved locations of {}",
      view.mode(),
      store.len(),
      store.owner().unwrap_or("a visitor")
    );

    Self {
      surface,
      clock,
      zoom: default_view.zoom,
      loaded: false,
      view,
      interaction: InteractionHandler::new(settings.clone()),
      markers,
      store,
      settings,
    }
  }

  #[must_use]
  pub fn surface(&self) -> &S {
    &self.surface
  }

  pub fn surface_mut(&mut self) -> &mut S {
    &mut self.surface
  }

  #[must_use]
  pub fn mode(&self) -> ViewMode {
    self.view.mode()
  }

  #[must_use]
  pub fn zoom(&self) -> f64 {
    self.zoom
  }

  #[must_use]
  pub fn is_loaded(&self) -> bool {
    self.loaded
  }

  #[must_use]
  pub fn locations(&self) -> &LocationStore {
    &self.store
  }

  #[must_use]
  pub fn markers(&self) -> &MarkerLayer {
    &self.markers
  }

  #[must_use]
  pub fn now(&self) -> Instant {
    self.clock.now()
  }

  /// When [`Self::poll`] has work to do next.
  #[must_use]
  pub fn next_deadline(&self) -> Option<Instant> {
    self.view.next_deadline()
  }

  pub fn handle_event(&mut self, event: MapEvent) {
    let now = self.clock.now();
    match event {
      MapEvent::Load => {
        info!("Map loaded");
        self.loaded = true;
        self.on_style_ready();
      }
      MapEvent::StyleLoad => {
        if self.view.on_style_load(now, &mut self.surface) {
          debug!("Style swap to {:?} complete", self.view.mode());
          self.on_style_ready();
        }
      }
      MapEvent::Zoom { zoom } => {
        self.zoom = zoom;
        self.view.on_zoom(zoom, now, &mut self.surface);
      }
      MapEvent::MouseMove { point, region } => {
        self
          .interaction
          .on_mouse_move(region.as_ref(), point, &mut self.surface);
      }
      MapEvent::MouseLeave => self.interaction.on_mouse_leave(&mut self.surface),
      MapEvent::Click {
        coordinates,
        region,
        ..
      } => {
        let outcome = self.interaction.on_click(
          coordinates,
          region.as_ref(),
          self.zoom,
          now,
          &mut self.surface,
        );
        debug!("Click at {coordinates}: {outcome:?}");
      }
      MapEvent::MarkerClick { id } => {
        if self.markers.edit_mode() {
          self.markers.toggle_mark(&id);
        } else {
          self.remove_location(&id);
        }
      }
      MapEvent::GeocoderResult { center, place_name } => {
        self.save_location(center, &place_name, None);
        let zoom = self
          .settings
          .flat_zoom_bounds
          .clamp(self.zoom.max(self.settings.flat_zoom_threshold));
        self.fly_to(center, zoom);
      }
      MapEvent::FlyTo { coordinates, zoom } => self.fly_to(coordinates, zoom),
      MapEvent::ArmPlacement { armed } => self.interaction.arm_placement(armed),
      MapEvent::NameEntered { name, description } => {
        let Some(at) = self.interaction.take_pending_placement() else {
          warn!("Got the name {name} but no location is waiting for one");
          return;
        };
        self.save_location(at, &name, description.filter(|d| !d.trim().is_empty()));
      }
      MapEvent::NameCancelled => {
        if let Some(at) = self.interaction.take_pending_placement() {
          debug!("Placement at {at} cancelled");
        }
      }
      MapEvent::SetEditMode { enabled } => {
        info!("Edit mode: {enabled}");
        self.markers.set_edit_mode(enabled);
      }
      MapEvent::DeleteMarked => self.delete_marked(),
      MapEvent::Shutdown => debug!("Shutdown is handled by the event loop"),
    }
  }

  /// Runs deferred work that is due. Returns the new mode after a style swap.
  pub fn poll(&mut self) -> Option<ViewMode> {
    let now = self.clock.now();
    let mode = self.view.poll(now, &mut self.surface)?;
    self
      .markers
      .set_visible(mode == ViewMode::Flat, &mut self.surface);
    Some(mode)
  }

  #[must_use]
  pub fn snapshot(&self) -> ControllerSnapshot {
    ControllerSnapshot {
      mode: self.view.mode(),
      zoom: self.zoom,
      transitioning: self.view.is_transitioning(),
      hovered: self.interaction.hovered().cloned(),
      selected: self.interaction.selected().cloned(),
      placement_armed: self.interaction.is_placement_armed(),
      awaiting_name: self.interaction.pending_placement(),
      markers_visible: self.markers.is_visible(),
      edit_mode: self.markers.edit_mode(),
      marked: self.markers.marked().iter().cloned().collect(),
      locations: self.store.list().to_vec(),
    }
  }

  /// Removes every marker and hands the surface back.
  pub fn teardown(mut self) -> S {
    self.interaction.on_mouse_leave(&mut self.surface);
    self.markers.clear(&mut self.surface);
    info!("Map controller stopped");
    self.surface
  }

  /// A fresh style comes without custom layers and markers.
  fn on_style_ready(&mut self) {
    self.surface.add_region_layers();
    self.markers.replay(self.store.list(), &mut self.surface);
    self.interaction.restore_feature_state(&mut self.surface);
  }

  fn fly_to(&mut self, center: WGS84Coordinate, zoom: f64) {
    self.surface.animate_camera(CameraAnimation::new(
      AnimationKind::Fly,
      center,
      zoom,
      Duration::from_millis(self.settings.fly_duration_ms),
    ));
  }

  fn save_location(
    &mut self,
    coordinates: WGS84Coordinate,
    name: &str,
    description: Option<String>,
  ) {
    let name = name.trim();
    if name.is_empty() {
      debug!("Empty name, location at {coordinates} not saved");
      return;
    }
    if !coordinates.is_valid() {
      warn!("Not saving {name}, {coordinates} is off the map");
      return;
    }
    match self.store.add(coordinates, name, description) {
      Ok(_) => {}
      Err(StoreError::Duplicate(at)) => debug!("Not saving {name}, {at} is already saved"),
      Err(e) => error!("Failed to persist location {name}: {e}"),
    }
    self.markers.reconcile(self.store.list(), &mut self.surface);
  }

  fn remove_location(&mut self, id: &LocationId) {
    if let Err(e) = self.store.remove(id) {
      error!("Failed to persist removal of {id}: {e}");
    }
    if self.store.get(id).is_none() {
      self.markers.remove(id, &mut self.surface);
    }
  }

  fn delete_marked(&mut self) {
    let marked = self.markers.take_marked();
    info!("Deleting {} marked locations", marked.len());
    for id in &marked {
      if let Err(e) = self.store.remove(id) {
        error!("Failed to persist removal of {id}: {e}");
      }
    }
    self.markers.reconcile(self.store.list(), &mut self.surface);
  }
}

/// Feeds events from `events` into the controller and fires its timers in
/// between. `publish` sees a snapshot after every change. Returns on
/// [`MapEvent::Shutdown`] or when every sender is gone.
pub fn run_event_loop<S, F>(
  controller: &mut MapController<S>,
  events: &Receiver<MapEvent>,
  mut publish: F,
) where
  S: MapSurface,
  F: FnMut(ControllerSnapshot),
{
  publish(controller.snapshot());
  loop {
    if controller.poll().is_some() {
      publish(controller.snapshot());
    }
    let event = match controller.next_deadline() {
      Some(due) => {
        let timeout = due.saturating_duration_since(controller.now());
        match events.recv_timeout(timeout) {
          Ok(event) => event,
          Err(RecvTimeoutError::Timeout) => continue,
          Err(RecvTimeoutError::Disconnected) => break,
        }
      }
      None => match events.recv() {
        Ok(event) => event,
        Err(_) => break,
      },
    };
    if event == MapEvent::Shutdown {
      info!("Shutting down the map controller");
      break;
    }
    debug!("Map event: {event:?}");
    controller.handle_event(event);
    publish(controller.snapshot());
  }
}
