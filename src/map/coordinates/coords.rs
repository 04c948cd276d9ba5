use serde::{Deserialize, Serialize};

/// Two coordinates closer than this on both axes are the same place.
pub const DUPLICATE_EPSILON: f64 = 1e-4;

/// The standard WGS84 coordinate system.
///
/// Serialized as a `[lon, lat]` pair, the order map libraries and `GeoJSON` use.
#[derive(Debug, Default, PartialEq, Copy, Clone, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct WGS84Coordinate {
  pub lon: f64,
  pub lat: f64,
}

impl WGS84Coordinate {
  #[must_use]
  pub fn new(lon: f64, lat: f64) -> Self {
    Self { lon, lat }
  }

  #[must_use]
  pub fn is_valid(&self) -> bool {
    (-90.0..=90.0).contains(&self.lat) && (-180.0..=180.0).contains(&self.lon)
  }

  /// Whether `other` lies within `epsilon` degrees on both axes.
  #[must_use]
  pub fn approx_eq(&self, other: &Self, epsilon: f64) -> bool {
    (self.lon - other.lon).abs() < epsilon && (self.lat - other.lat).abs() < epsilon
  }
}

impl From<[f64; 2]> for WGS84Coordinate {
  fn from([lon, lat]: [f64; 2]) -> Self {
    Self { lon, lat }
  }
}

impl From<WGS84Coordinate> for [f64; 2] {
  fn from(coord: WGS84Coordinate) -> Self {
    [coord.lon, coord.lat]
  }
}

impl From<geo_types::Coord<f64>> for WGS84Coordinate {
  fn from(coord: geo_types::Coord<f64>) -> Self {
    Self {
      lon: coord.x,
      lat: coord.y,
    }
  }
}

impl std::fmt::Display for WGS84Coordinate {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{:.4}, {:.4}", self.lon, self.lat)
  }
}

/// A position on screen, in pixels from the top left corner of the map.
#[derive(Debug, Default, PartialEq, Copy, Clone, Serialize, Deserialize)]
pub struct PixelPosition {
  pub x: f32,
  pub y: f32,
}

impl PixelPosition {
  #[must_use]
  pub fn new(x: f32, y: f32) -> Self {
    Self { x, y }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn serializes_as_lon_lat_pair() {
    let coord = WGS84Coordinate::new(-73.9654, 40.7829);
    let json = serde_json::to_string(&coord).unwrap();
    assert_eq!(json, "[-73.9654,40.7829]");
    let back: WGS84Coordinate = serde_json::from_str(&json).unwrap();
    assert_eq!(back, coord);
  }

  #[test]
  fn approx_eq_uses_both_axes() {
    let a = WGS84Coordinate::new(10.0, 20.0);
    assert!(a.approx_eq(&WGS84Coordinate::new(10.000_05, 19.999_95), DUPLICATE_EPSILON));
    assert!(!a.approx_eq(&WGS84Coordinate::new(10.000_05, 20.001), DUPLICATE_EPSILON));
    assert!(!a.approx_eq(&WGS84Coordinate::new(10.0002, 20.0), DUPLICATE_EPSILON));
  }

  #[test]
  fn validity() {
    assert!(WGS84Coordinate::new(180.0, -90.0).is_valid());
    assert!(!WGS84Coordinate::new(181.0, 0.0).is_valid());
    assert!(!WGS84Coordinate::new(0.0, 91.0).is_valid());
  }
}
