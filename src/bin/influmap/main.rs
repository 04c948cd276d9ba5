use std::{
  rc::Rc,
  sync::mpsc::{Sender, channel},
};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use influmap::{
  MapEvent,
  accounts::Accounts,
  config::Config,
  map::{
    controller::{MapController, run_event_loop},
    surface::HeadlessSurface,
  },
  remote::{Remote, spawn_remote_runner},
  store::{FileStore, LocationStore, ProfileRepository},
  timer::SystemClock,
};
use log::info;
use tracing_subscriber::EnvFilter;

#[derive(clap::Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Runs the map controller and accepts events over HTTP.
  Serve {
    /// Port of the remote. Overrides the config.
    #[arg(short, long)]
    port: Option<u16>,
  },
  Register {
    username: String,
    email: String,
    password: String,
  },
  Login {
    email: String,
    password: String,
  },
  Logout,
  /// Follows an influencer or another user by id.
  Follow { id: String },
  Unfollow { id: String },
  /// Lists who the current user follows.
  Following,
  /// Searches influencers and users by name or location.
  Search { query: String },
  /// Lists saved locations, with --all those of everybody else.
  Locations {
    #[arg(short, long)]
    all: bool,
  },
}

fn accounts(config: &Config) -> Result<(Accounts, ProfileRepository)> {
  let data_dir = config
    .data_dir
    .clone()
    .context("No data directory configured")?;
  let repo = ProfileRepository::new(FileStore::open(data_dir)?);
  Ok((
    Accounts::new(repo.clone(), config.influencers.clone()),
    repo,
  ))
}

async fn shutdown_signal(sender: Sender<MapEvent>) {
  if tokio::signal::ctrl_c().await.is_ok() {
    let _ = sender.send(MapEvent::Shutdown);
  }
}

fn serve(config: &Config, port: Option<u16>) -> Result<()> {
  tracing_subscriber::fmt()
    .with_target(false)
    .with_env_filter(EnvFilter::from_default_env())
    .compact()
    .init();

  let (accounts, repo) = accounts(config)?;
  let store = match accounts.current()? {
    Some(user) => LocationStore::open(repo, &user.email, config.map.duplicate_epsilon)?,
    None => {
      info!("Nobody is logged in, saved locations are not persisted");
      LocationStore::in_memory(config.map.duplicate_epsilon)
    }
  };

  let (tx, rx) = channel();
  let remote = Remote::new(tx.clone());
  let port = port.unwrap_or_else(|| config.port());
  let rt = tokio::runtime::Runtime::new()?;
  rt.spawn(shutdown_signal(tx));
  spawn_remote_runner(rt, remote.clone(), port);
  info!("Listening on http://localhost:{port}/");

  let mut controller = MapController::new(
    HeadlessSurface::new(),
    Rc::new(SystemClock),
    config.map.clone(),
    store,
  );
  run_event_loop(&mut controller, &rx, |snapshot| remote.publish(snapshot));
  controller.teardown();
  Ok(())
}

fn main() -> Result<()> {
  let args = Args::parse();
  let config = Config::new();

  match args.command {
    Command::Serve { port } => serve(&config, port),
    command => {
      env_logger::init();
      account_command(&config, command)
    }
  }
}

fn account_command(config: &Config, command: Command) -> Result<()> {
  let (accounts, repo) = accounts(config)?;
  match command {
    Command::Serve { .. } => {}
    Command::Register {
      username,
      email,
      password,
    } => {
      let user = accounts.register(&username, &email, &password)?;
      println!("Registered {} with id {}", user.username, user.id);
    }
    Command::Login { email, password } => {
      let user = accounts.login(&email, &password)?;
      println!("Welcome back, {}", user.username);
    }
    Command::Logout => accounts.logout()?,
    Command::Follow { id } => {
      if !accounts.follow(&id)? {
        println!("Already following {id}");
      }
    }
    Command::Unfollow { id } => {
      if !accounts.unfollow(&id)? {
        println!("Not following {id}");
      }
    }
    Command::Following => {
      for influencer in accounts.followed()? {
        println!("{}\t{}\t{}", influencer.id, influencer.name, influencer.location);
      }
    }
    Command::Search { query } => {
      for influencer in accounts.search(&query)? {
        println!("{}\t{}\t{}", influencer.id, influencer.name, influencer.location);
      }
    }
    Command::Locations { all: true } => {
      for shared in accounts.locations_of_others()? {
        let l = shared.location;
        println!("{}\t{}\t{}", shared.username, l.name, l.coordinates);
      }
    }
    Command::Locations { all: false } => {
      let user = accounts
        .current()?
        .context("Log in to list your saved locations")?;
      let store = LocationStore::open(repo, &user.email, config.map.duplicate_epsilon)?;
      println!("{}", serde_json::to_string_pretty(store.list())?);
    }
  }
  Ok(())
}
