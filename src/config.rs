use std::{path::PathBuf, time::Duration};

use dirs::home_dir;
use log::error;
use thiserror::Error;

use crate::{accounts::Influencer, map::coordinates::WGS84Coordinate};

/// Allowed zoom range of the map.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ZoomBounds {
  pub min: f64,
  pub max: f64,
}

impl ZoomBounds {
  #[must_use]
  pub fn clamp(&self, zoom: f64) -> f64 {
    zoom.clamp(self.min, self.max)
  }

  fn is_valid(&self) -> bool {
    self.min.is_finite() && self.max.is_finite() && self.min <= self.max
  }
}

/// Longest delay or animation accepted from the config, one day.
const MAX_DURATION_MS: u64 = 86_400_000;

#[derive(Error, Debug, PartialEq)]
pub enum SettingsError {
  #[error("{name} {bounds:?} is not a finite range")]
  ZoomBounds {
    name: &'static str,
    bounds: ZoomBounds,
  },
  #[error("{name} {value} is not a finite number")]
  NotFinite { name: &'static str, value: f64 },
  #[error("{name} {value} ms is longer than a day")]
  TooLong { name: &'static str, value: u64 },
}

/// Camera position the map starts at and returns to when a selection is cleared.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct DefaultView {
  pub center: WGS84Coordinate,
  pub zoom: f64,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct MapSettings {
  /// Zoom at and above which the map is flat.
  pub flat_zoom_threshold: f64,
  pub globe_zoom_bounds: ZoomBounds,
  pub flat_zoom_bounds: ZoomBounds,
  pub settle_delay_ms: u64,
  pub click_cooldown_ms: u64,
  pub default_view: DefaultView,
  pub globe_style: String,
  pub flat_style: String,
  pub fly_duration_ms: u64,
  pub reset_duration_ms: u64,
  pub duplicate_epsilon: f64,
}

impl MapSettings {
  #[must_use]
  pub fn settle_delay(&self) -> Duration {
    Duration::from_millis(self.settle_delay_ms)
  }

  #[must_use]
  pub fn click_cooldown(&self) -> Duration {
    Duration::from_millis(self.click_cooldown_ms)
  }

  /// Checks the values the map does arithmetic with.
  ///
  /// # Errors
  /// Names the first unusable value.
  pub fn validate(&self) -> Result<(), SettingsError> {
    for (name, bounds) in [
      ("globe_zoom_bounds", self.globe_zoom_bounds),
      ("flat_zoom_bounds", self.flat_zoom_bounds),
    ] {
      if !bounds.is_valid() {
        return Err(SettingsError::ZoomBounds { name, bounds });
      }
    }
    for (name, value) in [
      ("flat_zoom_threshold", self.flat_zoom_threshold),
      ("default_view.zoom", self.default_view.zoom),
      ("duplicate_epsilon", self.duplicate_epsilon),
    ] {
      if !value.is_finite() {
        return Err(SettingsError::NotFinite { name, value });
      }
    }
    for (name, value) in [
      ("settle_delay_ms", self.settle_delay_ms),
      ("click_cooldown_ms", self.click_cooldown_ms),
      ("fly_duration_ms", self.fly_duration_ms),
      ("reset_duration_ms", self.reset_duration_ms),
    ] {
      if value > MAX_DURATION_MS {
        return Err(SettingsError::TooLong { name, value });
      }
    }
    Ok(())
  }

  /// Returns `self`, or the defaults when a value is unusable.
  #[must_use]
  pub fn validated(self) -> Self {
    match self.validate() {
      Ok(()) => self,
      Err(e) => {
        error!("Invalid map settings, using the defaults: {e}");
        Self::default()
      }
    }
  }
}

impl Default for MapSettings {
  fn default() -> Self {
    Self {
      flat_zoom_threshold: 2.5,
      globe_zoom_bounds: ZoomBounds { min: 1.5, max: 3.0 },
      flat_zoom_bounds: ZoomBounds {
        min: 1.5,
        max: 10.0,
      },
      settle_delay_ms: 100,
      click_cooldown_ms: 1000,
      default_view: DefaultView {
        center: WGS84Coordinate::new(0.0, 20.0),
        zoom: 2.0,
      },
      globe_style: DEFAULT_GLOBE_STYLE.to_string(),
      flat_style: DEFAULT_FLAT_STYLE.to_string(),
      fly_duration_ms: 2000,
      reset_duration_ms: 1500,
      duplicate_epsilon: crate::map::coordinates::DUPLICATE_EPSILON,
    }
  }
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Config {
  pub config_path: Option<PathBuf>,
  pub data_dir: Option<PathBuf>,
  pub port: Option<u16>,
  #[serde(default)]
  pub map: MapSettings,
  #[serde(default)]
  pub influencers: Vec<Influencer>,
}

const DEFAULT_GLOBE_STYLE: &str = "mapbox://styles/mapbox/light-v11";
const DEFAULT_FLAT_STYLE: &str = "mapbox://styles/mapbox/streets-v12";

impl Config {
  #[must_use]
  pub fn new() -> Self {
    let from_env = Self::from_env();
    let from_file = Self::from_file();
    let default = Self::default();

    let mut merged = from_env;
    if let Some(from_file) = &from_file {
      merged = merged.merge(from_file);
    }
    merged = merged.merge(&default);
    merged.map = merged.map.validated();

    if merged.config_path.is_some() && from_file.is_none() {
      merged.init_cfg_file();
    }

    merged
  }

  #[must_use]
  pub fn port(&self) -> u16 {
    self.port.unwrap_or(crate::remote::DEFAULT_PORT)
  }

  fn from_env() -> Self {
    let config_path = std::env::var("INFLUMAP_CONFIG").ok().map(PathBuf::from);
    let data_dir = std::env::var("INFLUMAP_DATA_DIR").ok().map(PathBuf::from);
    let port = std::env::var("INFLUMAP_PORT")
      .ok()
      .and_then(|p| p.parse().inspect_err(|e| error!("Invalid INFLUMAP_PORT: {e}")).ok());

    Self {
      config_path,
      data_dir,
      port,
      map: MapSettings::default(),
      influencers: Vec::new(),
    }
  }

  /// Fills in whatever `self` leaves open. Map settings only come from the
  /// config file or the defaults, so a file value beats the default one.
  fn merge(mut self, other: &Self) -> Self {
    self.config_path = self.config_path.or(other.config_path.clone());
    self.data_dir = self.data_dir.or(other.data_dir.clone());
    self.port = self.port.or(other.port);

    if self.map == MapSettings::default() {
      self.map = other.map.clone();
    }

    for influencer in &other.influencers {
      if !self.influencers.iter().any(|i| i.id == influencer.id) {
        self.influencers.push(influencer.clone());
      }
    }

    self
  }

  fn from_file() -> Option<Self> {
    let config_path = std::env::var("INFLUMAP_CONFIG")
      .ok()
      .map(PathBuf::from)
      .or_else(|| home_dir().map(|p| p.join(".config").join("influmap")))?;
    let config_path = config_path.join("config.json");

    serde_json::from_str(&std::fs::read_to_string(&config_path).ok()?)
      .inspect_err(|e| error!("Failed to read config file: {e}"))
      .ok()?
  }

  fn init_cfg_file(&self) {
    if let Some(path) = &self.config_path
      && !path.exists()
    {
      let _ = std::fs::create_dir_all(path).inspect_err(|e| {
        error!("Failed to create config directory: {e}");
      });
    }

    if let Some(path) = &self.data_dir
      && !path.exists()
    {
      let _ = std::fs::create_dir_all(path).inspect_err(|e| {
        error!("Failed to create data directory: {e}");
      });
    }

    if let Some(path) = &self.config_path {
      let path = path.join("config.json");
      if !path.exists() {
        let config = serde_json::to_string_pretty(self);
        if let Ok(config) = config {
          let _ = std::fs::write(path, config).inspect_err(|e| {
            error!("Failed to write config file: {e}");
          });
        } else {
          error!("Failed to serialize config");
        }
      }
    }
  }
}

impl Default for Config {
  fn default() -> Self {
    let config_path = home_dir().map(|p| p.join(".config").join("influmap"));
    let data_dir = config_path.as_ref().map(|p| p.join("data"));
    Self {
      config_path,
      data_dir,
      port: None,
      map: MapSettings::default(),
      influencers: Vec::new(),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn env_values_win_over_defaults() {
    let from_env = Config {
      config_path: None,
      data_dir: Some(PathBuf::from("/tmp/influmap-data")),
      port: Some(4000),
      map: MapSettings::default(),
      influencers: Vec::new(),
    };
    let merged = from_env.merge(&Config::default());
    assert_eq!(merged.data_dir, Some(PathBuf::from("/tmp/influmap-data")));
    assert_eq!(merged.port(), 4000);
    assert_eq!(merged.config_path, Config::default().config_path);
  }

  #[test]
  fn file_map_settings_replace_defaults() {
    let mut from_file = Config::default();
    from_file.map.flat_zoom_threshold = 4.0;
    let merged = Config::default().merge(&from_file);
    assert!((merged.map.flat_zoom_threshold - 4.0).abs() < f64::EPSILON);
  }

  #[test]
  fn partial_map_settings_fall_back_to_defaults() {
    let settings: MapSettings = serde_json::from_str(r#"{"click_cooldown_ms": 250}"#).unwrap();
    assert_eq!(settings.click_cooldown(), Duration::from_millis(250));
    assert_eq!(settings.settle_delay(), Duration::from_millis(100));
    assert!((settings.flat_zoom_bounds.max - 10.0).abs() < f64::EPSILON);
  }

  #[test]
  fn inverted_zoom_bounds_fall_back_to_defaults() {
    let settings: MapSettings =
      serde_json::from_str(r#"{"flat_zoom_bounds": {"min": 10.0, "max": 1.5}}"#).unwrap();
    assert!(matches!(
      settings.validate(),
      Err(SettingsError::ZoomBounds {
        name: "flat_zoom_bounds",
        ..
      })
    ));
    let settings = settings.validated();
    assert_eq!(settings, MapSettings::default());
    assert!((settings.flat_zoom_bounds.clamp(20.0) - 10.0).abs() < f64::EPSILON);
  }

  #[test]
  fn huge_settle_delay_is_rejected() {
    let settings = MapSettings {
      settle_delay_ms: u64::MAX,
      ..MapSettings::default()
    };
    assert_eq!(
      settings.validate(),
      Err(SettingsError::TooLong {
        name: "settle_delay_ms",
        value: u64::MAX
      })
    );
    assert_eq!(settings.validated().settle_delay_ms, 100);
  }

  #[test]
  fn defaults_are_valid() {
    assert_eq!(MapSettings::default().validate(), Ok(()));
  }

  #[test]
  fn influencers_are_merged_by_id() {
    let influencer = |id: &str| Influencer {
      id: id.to_string(),
      name: format!("Influencer {id}"),
      location: "Berlin".to_string(),
      avatar: String::new(),
    };
    let mut a = Config::default();
    a.influencers = vec![influencer("1")];
    let mut b = Config::default();
    b.influencers = vec![influencer("1"), influencer("2")];
    let merged = a.merge(&b);
    assert_eq!(merged.influencers.len(), 2);
  }
}
