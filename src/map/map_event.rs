use serde::{Deserialize, Serialize};

use super::{
  coordinates::{PixelPosition, WGS84Coordinate},
  region::RegionFeature,
};
use crate::store::LocationId;

/// Map library events the controller subscribes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
  Load,
  StyleLoad,
  Zoom,
  Click,
  MouseMove,
  MouseLeave,
  GeocoderResult,
}

impl EventKind {
  pub const ALL: [EventKind; 7] = [
    EventKind::Load,
    EventKind::StyleLoad,
    EventKind::Zoom,
    EventKind::Click,
    EventKind::MouseMove,
    EventKind::MouseLeave,
    EventKind::GeocoderResult,
  ];
}

/// Everything the map controller reacts to: events of the map library,
/// user commands from the surrounding UI and the fly-to signal of the
/// location list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MapEvent {
  Load,
  StyleLoad,
  Zoom {
    zoom: f64,
  },
  MouseMove {
    point: PixelPosition,
    #[serde(default)]
    region: Option<RegionFeature>,
  },
  MouseLeave,
  Click {
    coordinates: WGS84Coordinate,
    point: PixelPosition,
    #[serde(default)]
    region: Option<RegionFeature>,
  },
  MarkerClick {
    id: LocationId,
  },
  GeocoderResult {
    center: WGS84Coordinate,
    place_name: String,
  },
  FlyTo {
    coordinates: WGS84Coordinate,
    zoom: f64,
  },
  ArmPlacement {
    armed: bool,
  },
  NameEntered {
    name: String,
    #[serde(default)]
    description: Option<String>,
  },
  NameCancelled,
  SetEditMode {
    enabled: bool,
  },
  DeleteMarked,
  Shutdown,
}
