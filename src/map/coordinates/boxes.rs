use super::WGS84Coordinate;

/// An axis aligned box in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
  max_lon: f64,
  min_lon: f64,
  max_lat: f64,
  min_lat: f64,
}

impl Default for BoundingBox {
  fn default() -> Self {
    Self::new()
  }
}

impl BoundingBox {
  #[must_use]
  pub fn new() -> Self {
    Self::get_invalid()
  }

  #[must_use]
  pub fn get_invalid() -> Self {
    Self {
      max_lon: f64::MIN,
      min_lon: f64::MAX,
      max_lat: f64::MIN,
      min_lat: f64::MAX,
    }
  }

  pub fn from_iterator<I: IntoIterator<Item = WGS84Coordinate>>(positions: I) -> Self {
    let mut bb = Self::get_invalid();
    positions
      .into_iter()
      .for_each(|pos| bb.add_coordinate(pos));
    bb
  }

  #[must_use]
  pub fn center(&self) -> WGS84Coordinate {
    WGS84Coordinate {
      lon: f64::midpoint(self.max_lon, self.min_lon),
      lat: f64::midpoint(self.max_lat, self.min_lat),
    }
  }

  #[must_use]
  pub fn is_valid(&self) -> bool {
    self.min_lat <= self.max_lat && self.min_lon <= self.max_lon
  }

  pub fn add_coordinate(&mut self, coord: WGS84Coordinate) {
    self.min_lat = self.min_lat.min(coord.lat);
    self.min_lon = self.min_lon.min(coord.lon);
    self.max_lat = self.max_lat.max(coord.lat);
    self.max_lon = self.max_lon.max(coord.lon);
  }

  #[must_use]
  pub fn width(&self) -> f64 {
    self.max_lon - self.min_lon
  }

  #[must_use]
  pub fn height(&self) -> f64 {
    self.max_lat - self.min_lat
  }

  /// The larger of the two extents.
  #[must_use]
  pub fn max_diff(&self) -> f64 {
    self.width().max(self.height())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn empty_box_is_invalid() {
    assert!(!BoundingBox::new().is_valid());
    assert!(BoundingBox::from_iterator([WGS84Coordinate::new(1.0, 2.0)]).is_valid());
  }

  #[test]
  fn center_and_extent() {
    let bb = BoundingBox::from_iterator([
      WGS84Coordinate::new(-10.0, 40.0),
      WGS84Coordinate::new(30.0, 50.0),
      WGS84Coordinate::new(0.0, 45.0),
    ]);
    assert_eq!(bb.center(), WGS84Coordinate::new(10.0, 45.0));
    assert!((bb.width() - 40.0).abs() < f64::EPSILON);
    assert!((bb.height() - 10.0).abs() < f64::EPSILON);
    assert!((bb.max_diff() - 40.0).abs() < f64::EPSILON);
  }
}
