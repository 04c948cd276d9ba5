use thiserror::Error;

use crate::map::coordinates::WGS84Coordinate;

/// Raw key-value persistence.
mod kv;
/// The saved locations of one user.
mod locations;
/// User records kept in the key-value store.
mod profiles;

pub use kv::{FileStore, KeyValueStore, MemoryStore};
pub use locations::{LocationId, LocationStore, SavedLocation};
pub use profiles::{ProfileRepository, UserProfile};

#[derive(Error, Debug)]
pub enum StoreError {
  #[error("A location already exists at {0}.")]
  Duplicate(WGS84Coordinate),
  #[error("Failed to access the store: {0}")]
  Io(#[from] std::io::Error),
  #[error("Stored record is malformed: {0}")]
  Serialization(#[from] serde_json::Error),
}
