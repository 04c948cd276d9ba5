use std::{
  fs::File,
  io::{BufRead, BufReader},
};

use anyhow::{Context, Result};
use clap::Parser as CliParser;
use influmap::{MapEvent, remote::DEFAULT_PORT};
use log::warn;

mod sender;

/// Sends map events to a running influmap, one JSON object per line.
#[derive(clap::Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
  /// Port of the influmap remote.
  #[arg(short, long, default_value_t = DEFAULT_PORT)]
  port: u16,

  /// Skips lines that are not valid events instead of stopping.
  #[arg(short, long)]
  lenient: bool,

  /// Prints the controller state after all events were sent.
  #[arg(short, long)]
  state: bool,

  /// A file with events. stdin is used if this is not provided.
  file: Option<std::path::PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
  let args = Args::parse();
  env_logger::init();

  let sender = sender::MapSender::connect(args.port, 25).await?;

  let reader: Box<dyn BufRead> = if let Some(file) = &args.file {
    let file = File::open(file).with_context(|| format!("Cannot open {}", file.display()))?;
    Box::new(BufReader::new(file))
  } else {
    Box::new(std::io::stdin().lock())
  };

  for (number, line) in reader.lines().enumerate() {
    let line = line?;
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
      continue;
    }
    match serde_json::from_str::<MapEvent>(line) {
      Ok(event) => sender.send_event(&event).await?,
      Err(e) if args.lenient => warn!("Skipping line {}: {e}", number + 1),
      Err(e) => return Err(e).with_context(|| format!("Line {} is not an event", number + 1)),
    }
  }

  if args.state {
    println!("{}", serde_json::to_string_pretty(&sender.state().await?)?);
  }
  Ok(())
}
