use std::rc::Rc;

use influmap::{
  MapEvent,
  accounts::{AccountError, Accounts, Influencer},
  config::MapSettings,
  map::{controller::MapController, coordinates::WGS84Coordinate, surface::HeadlessSurface},
  store::{FileStore, KeyValueStore, LocationStore, ProfileRepository},
  timer::ManualClock,
};

fn influencers() -> Vec<Influencer> {
  vec![Influencer {
    id: "1".to_string(),
    name: "John Doe".to_string(),
    location: "New York".to_string(),
    avatar: "https://i.pravatar.cc/150?img=1".to_string(),
  }]
}

fn open(dir: &std::path::Path) -> (Accounts, ProfileRepository) {
  let repo = ProfileRepository::new(FileStore::open(dir).unwrap());
  (Accounts::new(repo.clone(), influencers()), repo)
}

#[test]
fn accounts_survive_a_restart() {
  let dir = tempfile::tempdir().unwrap();
  {
    let (accounts, _) = open(dir.path());
    accounts.register("ada", "ada@example.com", "pw").unwrap();
    assert!(accounts.follow("1").unwrap());
  }

  let (accounts, _) = open(dir.path());
  let current = accounts.current().unwrap().unwrap();
  assert_eq!(current.username, "ada");
  assert_eq!(current.followed_influencers, vec!["1"]);

  let users_file = FileStore::open(dir.path()).unwrap().get("users").unwrap().unwrap();
  assert!(users_file.contains("\"followedInfluencers\":[\"1\"]"));

  accounts.logout().unwrap();
  assert!(matches!(accounts.follow("1"), Err(AccountError::NotLoggedIn)));
}

#[test]
fn controller_saves_into_the_profile() {
  let dir = tempfile::tempdir().unwrap();
  let (accounts, repo) = open(dir.path());
  accounts.register("ada", "ada@example.com", "pw").unwrap();

  let settings = MapSettings::default();
  let store =
    LocationStore::open(repo.clone(), "ada@example.com", settings.duplicate_epsilon).unwrap();
  let mut controller = MapController::new(
    HeadlessSurface::new(),
    Rc::new(ManualClock::new()),
    settings.clone(),
    store,
  );
  for (lon, name) in [(2.35, "Paris"), (2.350_01, "Paris again"), (-0.13, "London")] {
    controller.handle_event(MapEvent::GeocoderResult {
      center: WGS84Coordinate::new(lon, 48.85),
      place_name: name.to_string(),
    });
  }
  assert_eq!(controller.locations().len(), 2);
  let paris = controller.locations().list()[0].id.clone();
  controller.handle_event(MapEvent::MarkerClick { id: paris });
  controller.teardown();

  let reopened = LocationStore::open(repo, "ada@example.com", settings.duplicate_epsilon).unwrap();
  assert_eq!(reopened.len(), 1);
  assert_eq!(reopened.list()[0].name, "London");
}

#[test]
fn removing_an_unknown_id_changes_nothing() {
  let settings = MapSettings::default();
  let mut controller = MapController::new(
    HeadlessSurface::new(),
    Rc::new(ManualClock::new()),
    settings.clone(),
    LocationStore::in_memory(settings.duplicate_epsilon),
  );
  controller.handle_event(MapEvent::GeocoderResult {
    center: WGS84Coordinate::new(2.35, 48.85),
    place_name: "Paris".to_string(),
  });
  controller.handle_event(MapEvent::MarkerClick {
    id: "does-not-exist".into(),
  });
  assert_eq!(controller.locations().len(), 1);
  assert_eq!(controller.surface().marker_count(), 1);
}

#[test]
fn other_users_locations_are_browsable() {
  let dir = tempfile::tempdir().unwrap();
  let (accounts, repo) = open(dir.path());
  accounts.register("grace", "grace@example.com", "pw").unwrap();
  let mut store = LocationStore::open(repo, "grace@example.com", 1e-4).unwrap();
  store.add(WGS84Coordinate::new(-77.0, 38.9), "Washington", Some("Navy".to_string())).unwrap();

  accounts.register("ada", "ada@example.com", "pw").unwrap();
  let shared = accounts.locations_of_others().unwrap();
  assert_eq!(shared.len(), 1);
  assert_eq!(shared[0].username, "grace");
  assert_eq!(shared[0].location.description.as_deref(), Some("Navy"));
  assert!(accounts.directory().unwrap().iter().any(|i| i.name == "grace"));
}
