use std::time::Duration;

use anyhow::{Result, anyhow, bail};
use influmap::MapEvent;
use log::debug;

/// Posts events to a running `influmap serve`, one at a time and in order.
pub struct MapSender {
  base: String,
}

impl MapSender {
  /// Waits until the remote answers its healthcheck.
  pub async fn connect(port: u16, attempts: u32) -> Result<MapSender> {
    let sender = Self {
      base: format!("http://localhost:{port}"),
    };
    for attempt in 1..=attempts {
      match surf::get(format!("{}/healthcheck", sender.base)).send().await {
        Ok(res) if res.status().is_success() => return Ok(sender),
        Ok(res) => debug!("Healthcheck {attempt}: {}", res.status()),
        Err(e) => debug!("Healthcheck {attempt}: {e}"),
      }
      tokio::time::sleep(Duration::from_millis(200)).await;
    }
    bail!("No influmap listening on port {port}")
  }

  pub async fn send_event(&self, event: &MapEvent) -> Result<()> {
    let res = surf::post(format!("{}/", self.base))
      .body_json(event)
      .map_err(|e| anyhow!("Cannot serialize event: {e}"))?
      .await
      .map_err(|e| anyhow!("Failed to send event: {e}"))?;
    if !res.status().is_success() {
      bail!("Event rejected with {}", res.status());
    }
    Ok(())
  }

  pub async fn state(&self) -> Result<serde_json::Value> {
    surf::get(format!("{}/state", self.base))
      .recv_json()
      .await
      .map_err(|e| anyhow!("Failed to fetch state: {e}"))
  }
}
