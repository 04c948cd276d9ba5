//! Users, sessions and who follows whom.

use chrono::Utc;
use log::info;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::store::{ProfileRepository, SavedLocation, StoreError, UserProfile};

#[derive(Error, Debug)]
pub enum AccountError {
  #[error("User {0} already exists.")]
  UserExists(String),
  #[error("Invalid credentials.")]
  InvalidCredentials,
  #[error("Nobody is logged in.")]
  NotLoggedIn,
  #[error("No influencer or user with id {0}.")]
  UnknownInfluencer(String),
  #[error(transparent)]
  Store(#[from] StoreError),
}

/// Anyone that can be followed: configured influencers and registered users.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Influencer {
  pub id: String,
  pub name: String,
  pub location: String,
  #[serde(default)]
  pub avatar: String,
}

impl Influencer {
  fn from_user(user: &UserProfile) -> Self {
    Self {
      id: user.id.clone(),
      name: user.username.clone(),
      location: user.email.clone(),
      avatar: format!(
        "https://i.pravatar.cc/150?u={}",
        urlencoding::encode(&user.email)
      ),
    }
  }

  fn matches(&self, query: &str) -> bool {
    let query = query.to_lowercase();
    self.name.to_lowercase().contains(&query) || self.location.to_lowercase().contains(&query)
  }
}

/// A location saved by somebody else.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SharedLocation {
  pub username: String,
  pub location: SavedLocation,
}

pub struct Accounts {
  repo: ProfileRepository,
  influencers: Vec<Influencer>,
}

impl Accounts {
  #[must_use]
  pub fn new(repo: ProfileRepository, influencers: Vec<Influencer>) -> Self {
    Self { repo, influencers }
  }

  /// Creates the user and logs them in.
  pub fn register(
    &self,
    username: &str,
    email: &str,
    password: &str,
  ) -> Result<UserProfile, AccountError> {
    let users = self.repo.all()?;
    if users.iter().any(|u| u.email == email) {
      return Err(AccountError::UserExists(email.to_string()));
    }
    let mut id = Utc::now().timestamp_millis();
    while users.iter().any(|u| u.id == id.to_string()) {
      id += 1;
    }
    let profile = UserProfile {
      id: id.to_string(),
      username: username.to_string(),
      email: email.to_string(),
      password: password.to_string(),
      followed_influencers: Vec::new(),
      saved_locations: Vec::new(),
    };
    self.repo.save(&profile)?;
    self.repo.set_session(Some(email))?;
    info!("Registered {username} <{email}>");
    Ok(profile)
  }

  pub fn login(&self, email: &str, password: &str) -> Result<UserProfile, AccountError> {
    let user = self
      .repo
      .all()?
      .into_iter()
      .find(|u| u.email == email && u.password == password)
      .ok_or(AccountError::InvalidCredentials)?;
    self.repo.set_session(Some(email))?;
    info!("{email} logged in");
    Ok(user)
  }

  pub fn logout(&self) -> Result<(), AccountError> {
    self.repo.set_session(None)?;
    Ok(())
  }

  pub fn current(&self) -> Result<Option<UserProfile>, AccountError> {
    match self.repo.session()? {
      Some(email) => Ok(self.repo.get(&email)?),
      None => Ok(None),
    }
  }

  fn require_current(&self) -> Result<UserProfile, AccountError> {
    self.current()?.ok_or(AccountError::NotLoggedIn)
  }

  /// Configured influencers plus every registered user except the current one.
  pub fn directory(&self) -> Result<Vec<Influencer>, AccountError> {
    let current = self.repo.session()?;
    let users = self.repo.all()?;
    Ok(
      self
        .influencers
        .iter()
        .cloned()
        .chain(
          users
            .iter()
            .filter(|u| current.as_deref() != Some(u.email.as_str()))
            .map(Influencer::from_user),
        )
        .collect(),
    )
  }

  /// Case insensitive match on name or location.
  pub fn search(&self, query: &str) -> Result<Vec<Influencer>, AccountError> {
    Ok(
      self
        .directory()?
        .into_iter()
        .filter(|i| i.matches(query))
        .collect(),
    )
  }

  /// Returns whether anything changed.
  pub fn follow(&self, id: &str) -> Result<bool, AccountError> {
    let user = self.require_current()?;
    if !self.directory()?.iter().any(|i| i.id == id) {
      return Err(AccountError::UnknownInfluencer(id.to_string()));
    }
    if user.followed_influencers.iter().any(|f| f == id) {
      return Ok(false);
    }
    self
      .repo
      .update(&user.email, |p| p.followed_influencers.push(id.to_string()))?;
    info!("{} follows {id}", user.email);
    Ok(true)
  }

  /// Returns whether anything changed.
  pub fn unfollow(&self, id: &str) -> Result<bool, AccountError> {
    let user = self.require_current()?;
    if !user.followed_influencers.iter().any(|f| f == id) {
      return Ok(false);
    }
    self
      .repo
      .update(&user.email, |p| p.followed_influencers.retain(|f| f != id))?;
    info!("{} unfollowed {id}", user.email);
    Ok(true)
  }

  /// Followed entries that still exist in the directory.
  pub fn followed(&self) -> Result<Vec<Influencer>, AccountError> {
    let user = self.require_current()?;
    let directory = self.directory()?;
    Ok(
      user
        .followed_influencers
        .iter()
        .filter_map(|id| directory.iter().find(|i| &i.id == id).cloned())
        .collect(),
    )
  }

  pub fn locations_of_others(&self) -> Result<Vec<SharedLocation>, AccountError> {
    let current = self.repo.session()?;
    Ok(
      self
        .repo
        .all()?
        .into_iter()
        .filter(|u| current.as_deref() != Some(u.email.as_str()))
        .flat_map(|u| {
          let username = u.username;
          u.saved_locations.into_iter().map(move |location| SharedLocation {
            username: username.clone(),
            location,
          })
        })
        .collect(),
    )
  }
}
