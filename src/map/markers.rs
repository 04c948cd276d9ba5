use std::collections::BTreeSet;

use log::debug;

use super::surface::{MapSurface, MarkerHandle};
use crate::store::{LocationId, SavedLocation};

/// Keeps exactly one surface marker per saved location.
///
/// A style swap drops the markers of a real map, so they are replayed after
/// every style swap. They are only shown in flat mode. In edit mode clicking
/// a marker marks it for bulk deletion instead of deleting it right away.
#[derive(Debug, Default)]
pub struct MarkerLayer {
  markers: Vec<(LocationId, MarkerHandle)>,
  visible: bool,
  edit_mode: bool,
  marked: BTreeSet<LocationId>,
}

impl MarkerLayer {
  #[must_use]
  pub fn new() -> Self {
    Self::default()
  }

  #[must_use]
  pub fn len(&self) -> usize {
    self.markers.len()
  }

  #[must_use]
  pub fn is_empty(&self) -> bool {
    self.markers.is_empty()
  }

  #[must_use]
  pub fn contains(&self, id: &LocationId) -> bool {
    self.markers.iter().any(|(m, _)| m == id)
  }

  #[must_use]
  pub fn is_visible(&self) -> bool {
    self.visible
  }

  /// Removes every marker and places one per location. Marks of locations
  /// that still exist are kept.
  pub fn replay<S: MapSurface + ?Sized>(&mut self, locations: &[SavedLocation], surface: &mut S) {
    for (_, handle) in self.markers.drain(..) {
      surface.remove_marker(handle);
    }
    self.marked.retain(|id| locations.iter().any(|l| &l.id == id));
    for location in locations {
      let handle = surface.add_marker(location);
      self.markers.push((location.id.clone(), handle));
    }
    surface.set_markers_visible(self.visible);
    debug!("Placed {} markers", self.markers.len());
  }

  /// Adds markers for new locations and drops markers whose location is gone.
  pub fn reconcile<S: MapSurface + ?Sized>(
    &mut self,
    locations: &[SavedLocation],
    surface: &mut S,
  ) {
    let mut stale = Vec::new();
    self.markers.retain(|(id, handle)| {
      let keep = locations.iter().any(|l| &l.id == id);
      if !keep {
        stale.push(*handle);
      }
      keep
    });
    for handle in stale {
      surface.remove_marker(handle);
    }
    self.marked.retain(|id| locations.iter().any(|l| &l.id == id));

    let mut added = false;
    for location in locations {
      if !self.contains(&location.id) {
        let handle = surface.add_marker(location);
        self.markers.push((location.id.clone(), handle));
        added = true;
      }
    }
    if added {
      surface.set_markers_visible(self.visible);
    }
  }

  /// Removes the marker of `id`. Returns false when there was none.
  pub fn remove<S: MapSurface + ?Sized>(&mut self, id: &LocationId, surface: &mut S) -> bool {
    let Some(idx) = self.markers.iter().position(|(m, _)| m == id) else {
      return false;
    };
    let (_, handle) = self.markers.remove(idx);
    self.marked.remove(id);
    surface.remove_marker(handle);
    true
  }

  pub fn set_visible<S: MapSurface + ?Sized>(&mut self, visible: bool, surface: &mut S) {
    self.visible = visible;
    surface.set_markers_visible(visible);
  }

  pub fn clear<S: MapSurface + ?Sized>(&mut self, surface: &mut S) {
    for (_, handle) in self.markers.drain(..) {
      surface.remove_marker(handle);
    }
    self.marked.clear();
  }

  #[must_use]
  pub fn edit_mode(&self) -> bool {
    self.edit_mode
  }

  /// Leaving edit mode forgets the marks.
  pub fn set_edit_mode(&mut self, enabled: bool) {
    self.edit_mode = enabled;
    if !enabled {
      self.marked.clear();
    }
  }

  /// Flips the mark of a marker. Unknown ids are ignored.
  pub fn toggle_mark(&mut self, id: &LocationId) -> bool {
    if !self.contains(id) {
      return false;
    }
    if !self.marked.remove(id) {
      self.marked.insert(id.clone());
    }
    true
  }

  #[must_use]
  pub fn marked(&self) -> &BTreeSet<LocationId> {
    &self.marked
  }

  pub fn take_marked(&mut self) -> BTreeSet<LocationId> {
    std::mem::take(&mut self.marked)
  }
}
