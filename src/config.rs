//! Explorer configuration.

use log::{Level, warn};
use serde::{Deserialize, Serialize};

/// Name of the `<meta>` tag whose `content` holds the JSON config.
pub const META_NAME: &str = "society-explorer-config";

/// Runtime settings; every field has a default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExplorerConfig {
	/// Base URL of the simulation backend.
	pub api_base_url: String,
	pub demo_seed: u32,
	pub demo_timesteps: usize,
	/// Size of the offline sample society.
	pub sample_agents: usize,
	/// Playback frame interval at speed 1.
	pub frame_interval_ms: f64,
	pub default_top_n: usize,
	pub log_level: String,
}

impl Default for ExplorerConfig {
	fn default() -> Self {
		Self {
			api_base_url: option_env!("SOCIETY_API_URL")
				.unwrap_or("http://localhost:8000")
				.to_string(),
			demo_seed: 42,
			demo_timesteps: 30,
			sample_agents: 120,
			frame_interval_ms: 400.0,
			default_top_n: 10,
			log_level: "debug".to_string(),
		}
	}
}

impl ExplorerConfig {
	/// Parse `raw`, falling back to defaults when it is malformed.
	pub fn from_json(raw: &str) -> Self {
		serde_json::from_str(raw).unwrap_or_else(|e| {
			warn!("ignoring malformed explorer config: {e}");
			Self::default()
		})
	}

	/// Config from a meta tag's `content`; absent or blank gives the defaults.
	pub fn from_meta_content(content: Option<&str>) -> Self {
		match content.map(str::trim).filter(|c| !c.is_empty()) {
			Some(raw) => Self::from_json(raw),
			None => Self::default(),
		}
	}

	/// Read the host page's `<meta name="society-explorer-config">` tag.
	pub fn load() -> Self {
		let content = web_sys::window()
			.and_then(|w| w.document())
			.and_then(|d| d.query_selector(&format!("meta[name=\"{META_NAME}\"]")).ok().flatten())
			.and_then(|el| el.get_attribute("content"));
		Self::from_meta_content(content.as_deref())
	}

	pub fn level(&self) -> Level {
		self.log_level.parse().unwrap_or(Level::Debug)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn partial_json_keeps_defaults() {
		let cfg = ExplorerConfig::from_json(r#"{"demo_seed": 7, "log_level": "warn"}"#);
		assert_eq!(cfg.demo_seed, 7);
		assert_eq!(cfg.demo_timesteps, 30);
		assert_eq!(cfg.level(), Level::Warn);
	}

	#[test]
	fn meta_content_overrides_defaults() {
		let cfg = ExplorerConfig::from_meta_content(Some(r#" {"api_base_url": "https://sim.example", "sample_agents": 40} "#));
		assert_eq!(cfg.api_base_url, "https://sim.example");
		assert_eq!(cfg.sample_agents, 40);
		assert_eq!(cfg.frame_interval_ms, 400.0);
		assert_eq!(ExplorerConfig::from_meta_content(None), ExplorerConfig::default());
		assert_eq!(ExplorerConfig::from_meta_content(Some("  ")), ExplorerConfig::default());
	}

	#[test]
	fn malformed_json_is_default() {
		assert_eq!(ExplorerConfig::from_json("nope"), ExplorerConfig::default());
		let cfg = ExplorerConfig {
			log_level: "loud".into(),
			..Default::default()
		};
		assert_eq!(cfg.level(), Level::Debug);
	}
}
