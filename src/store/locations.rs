use chrono::{DateTime, Utc};
use log::{debug, info};
use serde::{Deserialize, Serialize};

use super::{ProfileRepository, StoreError};
use crate::map::coordinates::WGS84Coordinate;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LocationId(pub String);

impl std::fmt::Display for LocationId {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(&self.0)
  }
}

impl From<&str> for LocationId {
  fn from(id: &str) -> Self {
    Self(id.to_string())
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedLocation {
  pub id: LocationId,
  pub name: String,
  pub coordinates: WGS84Coordinate,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub description: Option<String>,
  pub created_at: DateTime<Utc>,
}

/// The saved locations of one user, in insertion order.
///
/// No two entries lie within `epsilon` degrees of each other. Entries are
/// never changed in place, only added and removed. With an owner every
/// mutation writes the whole collection back to the [`ProfileRepository`].
pub struct LocationStore {
  owner: Option<(ProfileRepository, String)>,
  locations: Vec<SavedLocation>,
  epsilon: f64,
}

impl LocationStore {
  /// A store that lives only as long as the map, for visitors without an account.
  #[must_use]
  pub fn in_memory(epsilon: f64) -> Self {
    Self {
      owner: None,
      locations: Vec::new(),
      epsilon,
    }
  }

  /// Loads the locations of `email`. Unknown users start empty.
  pub fn open(repo: ProfileRepository, email: &str, epsilon: f64) -> Result<Self, StoreError> {
    let locations = repo
      .get(email)?
      .map(|profile| profile.saved_locations)
      .unwrap_or_default();
    debug!("Loaded {} locations of {email}", locations.len());
    Ok(Self {
      owner: Some((repo, email.to_string())),
      locations,
      epsilon,
    })
  }

  #[must_use]
  pub fn owner(&self) -> Option<&str> {
    self.owner.as_ref().map(|(_, email)| email.as_str())
  }

  pub fn add(
    &mut self,
    coordinates: WGS84Coordinate,
    name: &str,
    description: Option<String>,
  ) -> Result<LocationId, StoreError> {
    if self.exists(coordinates) {
      return Err(StoreError::Duplicate(coordinates));
    }
    let now = Utc::now();
    let id = self.next_id(now);
    self.locations.push(SavedLocation {
      id: id.clone(),
      name: name.to_string(),
      coordinates,
      description,
      created_at: now,
    });
    info!("Saved location {name} ({coordinates}) as {id}");
    self.persist()?;
    Ok(id)
  }

  /// Removes the location with `id`, a missing id changes nothing.
  pub fn remove(&mut self, id: &LocationId) -> Result<Option<SavedLocation>, StoreError> {
    let Some(idx) = self.locations.iter().position(|l| &l.id == id) else {
      debug!("No location {id} to remove");
      return Ok(None);
    };
    let removed = self.locations.remove(idx);
    info!("Removed location {} ({id})", removed.name);
    self.persist()?;
    Ok(Some(removed))
  }

  #[must_use]
  pub fn list(&self) -> &[SavedLocation] {
    &self.locations
  }

  #[must_use]
  pub fn get(&self, id: &LocationId) -> Option<&SavedLocation> {
    self.locations.iter().find(|l| &l.id == id)
  }

  #[must_use]
  pub fn exists(&self, coordinates: WGS84Coordinate) -> bool {
    self
      .locations
      .iter()
      .any(|l| l.coordinates.approx_eq(&coordinates, self.epsilon))
  }

  #[must_use]
  pub fn len(&self) -> usize {
    self.locations.len()
  }

  #[must_use]
  pub fn is_empty(&self) -> bool {
    self.locations.is_empty()
  }

  /// Ids are the creation time in milliseconds, bumped until unique.
  fn next_id(&self, now: DateTime<Utc>) -> LocationId {
    let mut millis = now.timestamp_millis();
    while self.locations.iter().any(|l| l.id.0 == millis.to_string()) {
      millis += 1;
    }
    LocationId(millis.to_string())
  }

  fn persist(&self) -> Result<(), StoreError> {
    let Some((repo, email)) = &self.owner else {
      return Ok(());
    };
    let locations = self.locations.clone();
    if repo
      .update(email, |profile| profile.saved_locations = locations)?
      .is_none()
    {
      debug!("{email} has no profile, locations are not persisted");
    }
    Ok(())
  }
}
