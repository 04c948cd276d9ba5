use std::{rc::Rc, time::Duration};

use assert_approx_eq::assert_approx_eq;
use geo_types::{Geometry, MultiPolygon, polygon};
use influmap::{
  MapEvent,
  config::MapSettings,
  map::{
    controller::MapController,
    coordinates::{PixelPosition, WGS84Coordinate},
    region::{RegionFeature, RegionId},
    surface::{AnimationKind, HeadlessSurface, SurfaceCall},
  },
  store::LocationStore,
  timer::ManualClock,
};

fn controller() -> (MapController<HeadlessSurface>, Rc<ManualClock>) {
  let clock = Rc::new(ManualClock::new());
  let settings = MapSettings::default();
  let mut controller = MapController::new(
    HeadlessSurface::recording(),
    clock.clone(),
    settings.clone(),
    LocationStore::in_memory(settings.duplicate_epsilon),
  );
  controller.handle_event(MapEvent::Load);
  controller.surface_mut().take_calls();
  (controller, clock)
}

/// Mainland plus an exclave across the antimeridian, like the real outline.
fn russia() -> RegionFeature {
  RegionFeature {
    id: RegionId::from("RUS"),
    name: "Russia".to_string(),
    geometry: Some(Geometry::MultiPolygon(MultiPolygon(vec![
      polygon![
        (x: 27.0, y: 41.0),
        (x: 180.0, y: 41.0),
        (x: 180.0, y: 82.0),
        (x: 27.0, y: 82.0),
      ],
      polygon![
        (x: -180.0, y: 64.0),
        (x: -169.0, y: 64.0),
        (x: -169.0, y: 69.0),
        (x: -180.0, y: 69.0),
      ],
    ]))),
  }
}

fn germany() -> RegionFeature {
  RegionFeature {
    id: RegionId::from("DEU"),
    name: "Germany".to_string(),
    geometry: Some(Geometry::Polygon(polygon![
      (x: 5.9, y: 47.3),
      (x: 15.0, y: 47.3),
      (x: 15.0, y: 55.1),
      (x: 5.9, y: 55.1),
    ])),
  }
}

fn click(region: Option<RegionFeature>, coordinates: WGS84Coordinate) -> MapEvent {
  MapEvent::Click {
    coordinates,
    point: PixelPosition::new(400.0, 300.0),
    region,
  }
}

fn selection_changes(calls: &[SurfaceCall]) -> usize {
  calls
    .iter()
    .filter(|c| matches!(c, SurfaceCall::AnimateCamera(a) if a.kind == AnimationKind::Fly))
    .count()
}

#[test]
fn russia_centers_on_its_heartland() {
  let (mut controller, _) = controller();
  controller.handle_event(click(Some(russia()), WGS84Coordinate::new(90.0, 60.0)));

  let camera = controller.surface().camera().unwrap();
  assert_eq!(camera.center, WGS84Coordinate::new(100.0, 60.0));
  assert_approx_eq!(camera.zoom, 1.5);
  assert_eq!(camera.duration, Duration::from_millis(2000));
  assert_eq!(controller.surface().selected(), Some(&RegionId::from("RUS")));
}

#[test]
fn double_click_within_cooldown_selects_once() {
  let (mut controller, clock) = controller();
  let inside = WGS84Coordinate::new(10.0, 51.0);
  controller.handle_event(click(Some(germany()), inside));
  clock.advance(Duration::from_millis(200));
  controller.handle_event(click(Some(germany()), inside));

  let calls = controller.surface_mut().take_calls();
  assert_eq!(selection_changes(&calls), 1);
}

#[test]
fn other_region_within_cooldown_is_ignored() {
  let (mut controller, clock) = controller();
  controller.handle_event(click(Some(germany()), WGS84Coordinate::new(10.0, 51.0)));
  clock.advance(Duration::from_millis(999));
  controller.handle_event(click(Some(russia()), WGS84Coordinate::new(90.0, 60.0)));
  assert_eq!(controller.surface().selected(), Some(&RegionId::from("DEU")));

  clock.advance(Duration::from_millis(1));
  controller.handle_event(click(Some(russia()), WGS84Coordinate::new(90.0, 60.0)));
  assert_eq!(controller.surface().selected(), Some(&RegionId::from("RUS")));
}

#[test]
fn ocean_click_resets_to_the_global_view() {
  let (mut controller, _) = controller();
  controller.handle_event(click(Some(germany()), WGS84Coordinate::new(10.0, 51.0)));
  controller.handle_event(click(None, WGS84Coordinate::new(-30.0, 30.0)));

  let camera = controller.surface().camera().unwrap();
  assert_eq!(camera.kind, AnimationKind::Ease);
  assert_eq!(camera.center, WGS84Coordinate::new(0.0, 20.0));
  assert_approx_eq!(camera.zoom, 2.0);
  assert_eq!(controller.snapshot().selected, None);
}

#[test]
fn hover_survives_a_style_swap() {
  let (mut controller, clock) = controller();
  controller.handle_event(MapEvent::MouseMove {
    point: PixelPosition::new(1.0, 1.0),
    region: Some(germany()),
  });
  controller.handle_event(click(Some(germany()), WGS84Coordinate::new(10.0, 51.0)));

  controller.handle_event(MapEvent::Zoom { zoom: 4.0 });
  clock.advance(Duration::from_millis(100));
  controller.poll();
  assert_eq!(controller.surface().hovered(), None);
  controller.handle_event(MapEvent::StyleLoad);

  assert_eq!(controller.surface().hovered(), Some(&RegionId::from("DEU")));
  assert_eq!(controller.surface().selected(), Some(&RegionId::from("DEU")));
  assert!(controller.surface().has_region_layers());
}

#[test]
fn placement_below_threshold_prompts_instead() {
  let (mut controller, _) = controller();
  controller.handle_event(MapEvent::ArmPlacement { armed: true });
  controller.handle_event(click(None, WGS84Coordinate::new(13.4, 52.5)));
  controller.handle_event(MapEvent::NameEntered {
    name: "Berlin".to_string(),
    description: None,
  });

  assert!(controller.locations().is_empty());
  assert!(
    controller
      .surface()
      .calls()
      .contains(&SurfaceCall::PromptZoomIn(2.5))
  );
}
