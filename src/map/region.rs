use geo_types::{Geometry, LineString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::coordinates::{BoundingBox, WGS84Coordinate};

#[derive(Error, Debug, PartialEq)]
pub enum RegionError {
  #[error("Region {0} has no geometry.")]
  MissingGeometry(RegionId),
  #[error("Region {0} is neither a polygon nor a multi-polygon.")]
  UnsupportedGeometry(RegionId),
  #[error("Region {0} has an empty outer ring.")]
  EmptyRing(RegionId),
}

/// Stable identifier of a region feature, used for hover and selection state.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RegionId(pub String);

impl std::fmt::Display for RegionId {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(&self.0)
  }
}

impl From<&str> for RegionId {
  fn from(id: &str) -> Self {
    Self(id.to_string())
  }
}

/// A country polygon as delivered by the map on hover or click.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionFeature {
  pub id: RegionId,
  pub name: String,
  #[serde(default)]
  pub geometry: Option<Geometry<f64>>,
}

/// Where the camera goes when a region gets selected.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraTarget {
  pub center: WGS84Coordinate,
  pub zoom: f64,
  pub max_diff: f64,
}

/// Countries whose bounding box center lands in the ocean or in a corner of
/// the territory, because of overseas parts or the antimeridian.
const CENTER_OVERRIDES: [(&str, WGS84Coordinate); 6] = [
  ("Russia", WGS84Coordinate { lon: 100.0, lat: 60.0 }),
  ("United States", WGS84Coordinate { lon: -98.5, lat: 39.8 }),
  ("Canada", WGS84Coordinate { lon: -106.0, lat: 56.0 }),
  ("France", WGS84Coordinate { lon: 2.2, lat: 46.6 }),
  ("Norway", WGS84Coordinate { lon: 8.5, lat: 61.0 }),
  ("Chile", WGS84Coordinate { lon: -71.0, lat: -35.7 }),
];

/// Zoom per extent in degrees, from the coarsest geometry down.
const ZOOM_STEPS: [(f64, f64); 5] = [(100.0, 1.5), (50.0, 2.0), (25.0, 2.5), (10.0, 3.5), (5.0, 4.5)];
const FINEST_ZOOM: f64 = 5.5;

impl RegionFeature {
  /// Bounding box of the outer ring, or of the first polygon's outer ring for multi-polygons.
  pub fn bounding_box(&self) -> Result<BoundingBox, RegionError> {
    let ring = self.outer_ring()?;
    let bb = BoundingBox::from_iterator(ring.coords().copied().map(WGS84Coordinate::from));
    if bb.is_valid() {
      Ok(bb)
    } else {
      Err(RegionError::EmptyRing(self.id.clone()))
    }
  }

  pub fn camera_target(&self) -> Result<CameraTarget, RegionError> {
    let bb = self.bounding_box()?;
    let max_diff = bb.max_diff();
    let center = center_override(&self.name).unwrap_or_else(|| bb.center());
    Ok(CameraTarget {
      center,
      zoom: zoom_for_extent(max_diff),
      max_diff,
    })
  }

  fn outer_ring(&self) -> Result<&LineString<f64>, RegionError> {
    match &self.geometry {
      None => Err(RegionError::MissingGeometry(self.id.clone())),
      Some(Geometry::Polygon(polygon)) => Ok(polygon.exterior()),
      Some(Geometry::MultiPolygon(multi)) => multi
        .0
        .first()
        .map(geo_types::Polygon::exterior)
        .ok_or_else(|| RegionError::EmptyRing(self.id.clone())),
      Some(_) => Err(RegionError::UnsupportedGeometry(self.id.clone())),
    }
  }
}

#[must_use]
pub fn center_override(name: &str) -> Option<WGS84Coordinate> {
  CENTER_OVERRIDES
    .iter()
    .find(|(country, _)| country.eq_ignore_ascii_case(name))
    .map(|(_, center)| *center)
}

/// Larger regions get a lower zoom.
#[must_use]
pub fn zoom_for_extent(max_diff: f64) -> f64 {
  ZOOM_STEPS
    .iter()
    .find(|(extent, _)| max_diff > *extent)
    .map_or(FINEST_ZOOM, |(_, zoom)| *zoom)
}

#[cfg(test)]
mod tests {
  use super::*;
  use geo_types::{MultiPolygon, Point, polygon};
  use rstest::rstest;

  fn feature(name: &str, geometry: Option<Geometry<f64>>) -> RegionFeature {
    RegionFeature {
      id: RegionId::from(name),
      name: name.to_string(),
      geometry,
    }
  }

  #[test]
  fn russia_uses_fixed_center() {
    let russia = feature(
      "Russia",
      Some(Geometry::Polygon(polygon![
        (x: 27.0, y: 41.0),
        (x: 180.0, y: 41.0),
        (x: 180.0, y: 82.0),
        (x: 27.0, y: 82.0),
      ])),
    );
    let target = russia.camera_target().unwrap();
    assert!(target.max_diff > 100.0);
    assert_eq!(target.center, WGS84Coordinate::new(100.0, 60.0));
    assert!((target.zoom - 1.5).abs() < f64::EPSILON);
  }

  #[test]
  fn multi_polygon_uses_first_ring() {
    let first = polygon![(x: 0.0, y: 0.0), (x: 4.0, y: 0.0), (x: 4.0, y: 2.0), (x: 0.0, y: 2.0)];
    let second = polygon![(x: 50.0, y: 50.0), (x: 60.0, y: 50.0), (x: 60.0, y: 60.0)];
    let region = feature(
      "Somewhere",
      Some(Geometry::MultiPolygon(MultiPolygon(vec![first, second]))),
    );
    let target = region.camera_target().unwrap();
    assert_eq!(target.center, WGS84Coordinate::new(2.0, 1.0));
    assert!((target.max_diff - 4.0).abs() < f64::EPSILON);
    assert!((target.zoom - FINEST_ZOOM).abs() < f64::EPSILON);
  }

  #[test]
  fn invalid_geometry_is_reported() {
    assert_eq!(
      feature("Nowhere", None).camera_target(),
      Err(RegionError::MissingGeometry(RegionId::from("Nowhere")))
    );
    assert_eq!(
      feature("Dot", Some(Geometry::Point(Point::new(1.0, 1.0)))).camera_target(),
      Err(RegionError::UnsupportedGeometry(RegionId::from("Dot")))
    );
    assert_eq!(
      feature("Empty", Some(Geometry::MultiPolygon(MultiPolygon(vec![])))).camera_target(),
      Err(RegionError::EmptyRing(RegionId::from("Empty")))
    );
  }

  #[rstest]
  #[case(170.0, 1.5)]
  #[case(60.0, 2.0)]
  #[case(30.0, 2.5)]
  #[case(12.0, 3.5)]
  #[case(7.0, 4.5)]
  #[case(1.0, 5.5)]
  fn zoom_decreases_with_extent(#[case] max_diff: f64, #[case] expected: f64) {
    assert!((zoom_for_extent(max_diff) - expected).abs() < f64::EPSILON);
  }

  #[test]
  fn override_lookup_ignores_case() {
    assert_eq!(center_override("russia"), Some(WGS84Coordinate::new(100.0, 60.0)));
    assert_eq!(center_override("Germany"), None);
  }
}
