use std::{cell::RefCell, rc::Rc};

use serde::{Deserialize, Serialize};

use super::{KeyValueStore, SavedLocation, StoreError};

const USERS_KEY: &str = "users";
const SESSION_KEY: &str = "session";

fn profile_key(email: &str) -> String {
  format!("user:{email}")
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
  pub id: String,
  pub username: String,
  pub email: String,
  pub password: String,
  #[serde(default)]
  pub followed_influencers: Vec<String>,
  #[serde(default)]
  pub saved_locations: Vec<SavedLocation>,
}

/// Every user exists twice: as `user:<email>` and inside the `users` collection.
/// Writes go to both, profile first.
#[derive(Clone)]
pub struct ProfileRepository {
  kv: Rc<RefCell<dyn KeyValueStore>>,
}

impl ProfileRepository {
  pub fn new(kv: impl KeyValueStore + 'static) -> Self {
    Self {
      kv: Rc::new(RefCell::new(kv)),
    }
  }

  #[must_use]
  pub fn from_shared(kv: Rc<RefCell<dyn KeyValueStore>>) -> Self {
    Self { kv }
  }

  pub fn all(&self) -> Result<Vec<UserProfile>, StoreError> {
    let users = self.kv.borrow().get(USERS_KEY)?;
    match users {
      Some(users) => Ok(serde_json::from_str(&users)?),
      None => Ok(Vec::new()),
    }
  }

  pub fn get(&self, email: &str) -> Result<Option<UserProfile>, StoreError> {
    if let Some(profile) = self.kv.borrow().get(&profile_key(email))? {
      return Ok(Some(serde_json::from_str(&profile)?));
    }
    Ok(self.all()?.into_iter().find(|u| u.email == email))
  }

  /// Writes the profile record and its mirror in the collection.
  pub fn save(&self, profile: &UserProfile) -> Result<(), StoreError> {
    self
      .kv
      .borrow_mut()
      .set(&profile_key(&profile.email), serde_json::to_string(profile)?)?;

    let mut users = self.all()?;
    match users.iter_mut().find(|u| u.email == profile.email) {
      Some(existing) => existing.clone_from(profile),
      None => users.push(profile.clone()),
    }
    self
      .kv
      .borrow_mut()
      .set(USERS_KEY, serde_json::to_string(&users)?)
  }

  /// Loads, changes and writes back a profile. Returns `None` for unknown users.
  pub fn update<F: FnOnce(&mut UserProfile)>(
    &self,
    email: &str,
    f: F,
  ) -> Result<Option<UserProfile>, StoreError> {
    let Some(mut profile) = self.get(email)? else {
      return Ok(None);
    };
    f(&mut profile);
    self.save(&profile)?;
    Ok(Some(profile))
  }

  pub fn session(&self) -> Result<Option<String>, StoreError> {
    self.kv.borrow().get(SESSION_KEY)
  }

  pub fn set_session(&self, email: Option<&str>) -> Result<(), StoreError> {
    let mut kv = self.kv.borrow_mut();
    match email {
      Some(email) => kv.set(SESSION_KEY, email.to_string()),
      None => kv.remove(SESSION_KEY),
    }
  }
}
