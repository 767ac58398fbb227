//! User-authored experiments and their persistence.

use std::collections::HashMap;

use log::{info, warn};
use thiserror::Error;

use super::model::{AgentId, Edge, Node};
use super::targeting::{Experiment, InterventionType, TargetMode, TargetParams, compute_targets};

/// Key under which the experiment list is stored.
pub const STORAGE_KEY: &str = "society-explorer.experiments";

#[derive(Error, Debug)]
pub enum StoreError {
	#[error("storage unavailable: {0}")]
	Unavailable(String),
	#[error("could not serialize experiments: {0}")]
	Serialize(#[from] serde_json::Error),
	#[error("storage write failed: {0}")]
	Write(String),
}

/// Minimal string key-value persistence.
pub trait KeyValueStore {
	fn get(&self, key: &str) -> Option<String>;
	fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
}

/// In-memory store, used off-browser and in tests.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
	entries: HashMap<String, String>,
}

impl KeyValueStore for MemoryStore {
	fn get(&self, key: &str) -> Option<String> {
		self.entries.get(key).cloned()
	}

	fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
		self.entries.insert(key.to_string(), value.to_string());
		Ok(())
	}
}

/// Browser `localStorage`.
pub struct LocalStorage {
	storage: web_sys::Storage,
}

impl LocalStorage {
	pub fn open() -> Result<Self, StoreError> {
		let window = web_sys::window().ok_or_else(|| StoreError::Unavailable("no window".into()))?;
		let storage = window
			.local_storage()
			.map_err(|e| StoreError::Unavailable(format!("{e:?}")))?
			.ok_or_else(|| StoreError::Unavailable("localStorage disabled".into()))?;
		Ok(Self { storage })
	}
}

impl KeyValueStore for LocalStorage {
	fn get(&self, key: &str) -> Option<String> {
		self.storage.get_item(key).ok().flatten()
	}

	fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
		self.storage
			.set_item(key, value)
			.map_err(|e| StoreError::Write(format!("{e:?}")))
	}
}

/// Fields supplied when creating an experiment.
#[derive(Clone, Debug, Default)]
pub struct ExperimentDraft {
	pub name: String,
	pub intervention_type: InterventionType,
	pub content: String,
	pub target_mode: TargetMode,
	pub target_params: TargetParams,
	pub intensity: f64,
}

impl ExperimentDraft {
	/// Editable fields of an existing experiment.
	pub fn from_experiment(exp: &Experiment) -> Self {
		Self {
			name: exp.name.clone(),
			intervention_type: exp.intervention_type,
			content: exp.content.clone(),
			target_mode: exp.target_mode,
			target_params: exp.target_params.clone(),
			intensity: exp.intensity,
		}
	}
}

/// Partial update; `None` leaves a field untouched.
#[derive(Clone, Debug, Default)]
pub struct ExperimentPatch {
	pub name: Option<String>,
	pub intervention_type: Option<InterventionType>,
	pub content: Option<String>,
	pub target_mode: Option<TargetMode>,
	pub target_params: Option<TargetParams>,
	pub intensity: Option<f64>,
}

impl From<ExperimentDraft> for ExperimentPatch {
	/// A patch that overwrites every editable field.
	fn from(draft: ExperimentDraft) -> Self {
		Self {
			name: Some(draft.name),
			intervention_type: Some(draft.intervention_type),
			content: Some(draft.content),
			target_mode: Some(draft.target_mode),
			target_params: Some(draft.target_params),
			intensity: Some(draft.intensity),
		}
	}
}

fn clamp_intensity(x: f64) -> f64 {
	if x.is_finite() { x.clamp(0.0, 1.0) } else { 0.0 }
}

/// The user's experiment list, owning target caches.
#[derive(Clone, Debug, Default)]
pub struct ExperimentBook {
	experiments: Vec<Experiment>,
	next_id: u64,
}

impl ExperimentBook {
	/// Load from `store`; missing or corrupted data yields an empty book.
	pub fn load(store: &impl KeyValueStore) -> Self {
		let experiments = match store.get(STORAGE_KEY) {
			None => Vec::new(),
			Some(raw) => serde_json::from_str::<Vec<Experiment>>(&raw).unwrap_or_else(|e| {
				warn!("discarding stored experiments: {e}");
				Vec::new()
			}),
		};
		let next_id = experiments
			.iter()
			.filter_map(|e| e.id.strip_prefix("exp-")?.parse::<u64>().ok())
			.max()
			.unwrap_or(0);
		info!("loaded {} experiments", experiments.len());
		Self {
			experiments,
			next_id,
		}
	}

	pub fn save(&self, store: &mut impl KeyValueStore) -> Result<(), StoreError> {
		let json = serde_json::to_string(&self.experiments)?;
		store.set(STORAGE_KEY, &json)
	}

	pub fn experiments(&self) -> &[Experiment] {
		&self.experiments
	}

	pub fn get(&self, id: &str) -> Option<&Experiment> {
		self.experiments.iter().find(|e| e.id == id)
	}

	pub fn create(&mut self, draft: ExperimentDraft) -> &Experiment {
		self.next_id += 1;
		let experiment = Experiment {
			id: format!("exp-{}", self.next_id),
			name: draft.name,
			intervention_type: draft.intervention_type,
			content: draft.content,
			target_mode: draft.target_mode,
			target_params: draft.target_params,
			intensity: clamp_intensity(draft.intensity),
			computed_targets: None,
		};
		self.experiments.push(experiment);
		&self.experiments[self.experiments.len() - 1]
	}

	/// Apply `patch`; returns false when `id` is unknown.
	pub fn patch(&mut self, id: &str, patch: ExperimentPatch) -> bool {
		let Some(exp) = self.experiments.iter_mut().find(|e| e.id == id) else {
			return false;
		};
		if let Some(name) = patch.name {
			exp.name = name;
		}
		if let Some(kind) = patch.intervention_type {
			exp.intervention_type = kind;
		}
		if let Some(content) = patch.content {
			exp.content = content;
		}
		if let Some(intensity) = patch.intensity {
			exp.intensity = clamp_intensity(intensity);
		}
		let mut stale = false;
		if let Some(mode) = patch.target_mode {
			stale |= mode != exp.target_mode;
			exp.target_mode = mode;
		}
		if let Some(params) = patch.target_params {
			stale |= params != exp.target_params;
			exp.target_params = params;
		}
		if stale {
			exp.computed_targets = None;
		}
		true
	}

	pub fn delete(&mut self, id: &str) -> bool {
		let before = self.experiments.len();
		self.experiments.retain(|e| e.id != id);
		self.experiments.len() != before
	}

	/// Drop every cached target list, e.g. after the node set is swapped.
	pub fn invalidate_targets(&mut self) {
		for exp in &mut self.experiments {
			exp.computed_targets = None;
		}
	}

	/// Fill stale target caches against the current graph.
	pub fn refresh_targets(&mut self, nodes: &[Node], edges: &[Edge]) {
		for exp in &mut self.experiments {
			if exp.computed_targets.is_none() {
				exp.computed_targets = Some(compute_targets(exp, nodes, edges));
			}
		}
	}

	/// Cached targets of `id`, computing them if stale.
	pub fn targets(&mut self, id: &str, nodes: &[Node], edges: &[Edge]) -> Option<Vec<AgentId>> {
		let exp = self.experiments.iter_mut().find(|e| e.id == id)?;
		if exp.computed_targets.is_none() {
			exp.computed_targets = Some(compute_targets(exp, nodes, edges));
		}
		exp.computed_targets.clone()
	}
}
