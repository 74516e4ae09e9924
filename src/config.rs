//! Loading trainer configuration (pacing, feedback labels, static dir) from TOML.
//!
//! Every section is optional; missing keys fall back to the defaults below.

use std::time::Duration;

use serde::Deserialize;
use tracing::{info, error};

#[derive(Clone, Debug, Deserialize, Default)]
pub struct TrainerConfig {
  #[serde(default)]
  pub pacing: Pacing,
  #[serde(default)]
  pub feedback: FeedbackLabels,
  #[serde(default)]
  pub server: ServerCfg,
}

/// Delay between a correct answer and the next challenge.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Pacing {
  pub next_challenge_delay_ms: u64,
}

impl Default for Pacing {
  fn default() -> Self { Self { next_challenge_delay_ms: 500 } }
}

impl Pacing {
  pub fn delay(&self) -> Duration { Duration::from_millis(self.next_challenge_delay_ms) }
}

/// Text shown next to the verdict.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct FeedbackLabels {
  pub correct_text: String,
  pub wrong_text: String,
}

impl Default for FeedbackLabels {
  fn default() -> Self {
    Self { correct_text: "Correct!".into(), wrong_text: "Wrong!".into() }
  }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct ServerCfg {
  pub static_dir: String,
}

impl Default for ServerCfg {
  fn default() -> Self { Self { static_dir: "./static".into() } }
}

pub fn parse_trainer_config(s: &str) -> Result<TrainerConfig, toml::de::Error> {
  toml::from_str::<TrainerConfig>(s)
}

/// Attempt to load `TrainerConfig` from TRAINER_CONFIG_PATH. On any parsing/IO error, returns None.
pub fn load_trainer_config_from_env() -> Option<TrainerConfig> {
  let path = std::env::var("TRAINER_CONFIG_PATH").ok()?;
  match std::fs::read_to_string(&path) {
    Ok(s) => match parse_trainer_config(&s) {
      Ok(cfg) => {
        info!(target: "quadrant_trainer", %path, delay_ms = cfg.pacing.next_challenge_delay_ms, "Loaded trainer config (TOML)");
        Some(cfg)
      }
      Err(e) => {
        error!(target: "quadrant_trainer", %path, error = %e, "Failed to parse TOML config");
        None
      }
    },
    Err(e) => {
      error!(target: "quadrant_trainer", %path, error = %e, "Failed to read TOML config file");
      None
    }
  }
}
