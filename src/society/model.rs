//! Value records shared by every part of the explorer: nodes, edges, graphs
//! and the per-timestep agent frames that make up a playback run.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

/// Stable, string-comparable agent identifier.
pub type AgentId = String;

/// Trait key read as the primary influence score.
pub const SOCIAL_INFLUENCE: &str = "social_influence";

/// One agent of the society graph.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Node {
	#[serde(deserialize_with = "flexible_id")]
	pub agent_id: AgentId,
	#[serde(default)]
	pub degree: u32,
	/// Trait scores in `[0, 1]`; a key may be absent on any given node.
	#[serde(default, deserialize_with = "present_traits")]
	pub traits: BTreeMap<String, f64>,
	#[serde(default)]
	pub degree_centrality: f64,
	#[serde(default)]
	pub betweenness_centrality: f64,
	#[serde(default)]
	pub age: Option<f64>,
	#[serde(default)]
	pub gender: Option<String>,
	#[serde(default)]
	pub cluster: Option<u32>,
	#[serde(default)]
	pub level_of_care: Option<f64>,
	#[serde(default)]
	pub effect_on_usage: Option<f64>,
	#[serde(default)]
	pub opinion: Option<String>,
}

impl Node {
	/// A bare node with every optional attribute unknown.
	pub fn new(agent_id: impl Into<AgentId>) -> Self {
		Self {
			agent_id: agent_id.into(),
			..Self::default()
		}
	}

	pub fn trait_value(&self, key: &str) -> Option<f64> {
		self.traits.get(key).copied().filter(|v| v.is_finite())
	}

	/// Influence score: the `social_influence` trait, else degree centrality.
	pub fn influence(&self) -> f64 {
		self.trait_value(SOCIAL_INFLUENCE)
			.unwrap_or(self.degree_centrality)
	}
}

/// Undirected weighted tie between two agents.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Edge {
	#[serde(deserialize_with = "flexible_id")]
	pub source: AgentId,
	#[serde(deserialize_with = "flexible_id")]
	pub target: AgentId,
	#[serde(default = "unit_weight", deserialize_with = "weight_or_unit")]
	pub weight: f64,
	/// Precomputed by the server when it knows cluster membership.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub within_cluster: Option<bool>,
}

fn unit_weight() -> f64 {
	1.0
}

fn weight_or_unit<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
	D: Deserializer<'de>,
{
	Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(1.0))
}

/// Trait maps where `null` marks an unknown score; those keys are dropped.
fn present_traits<'de, D>(deserializer: D) -> Result<BTreeMap<String, f64>, D::Error>
where
	D: Deserializer<'de>,
{
	let raw = Option::<BTreeMap<String, Option<f64>>>::deserialize(deserializer)?;
	Ok(raw
		.unwrap_or_default()
		.into_iter()
		.filter_map(|(k, v)| v.map(|v| (k, v)))
		.collect())
}

impl Edge {
	pub fn new(source: impl Into<AgentId>, target: impl Into<AgentId>) -> Self {
		Self::weighted(source, target, 1.0)
	}

	pub fn weighted(source: impl Into<AgentId>, target: impl Into<AgentId>, weight: f64) -> Self {
		Self {
			source: source.into(),
			target: target.into(),
			weight,
			within_cluster: None,
		}
	}

	/// Weight used by the algorithms: non-positive or non-finite reads as 1.
	pub fn effective_weight(&self) -> f64 {
		if self.weight.is_finite() && self.weight > 0.0 {
			self.weight
		} else {
			1.0
		}
	}

	pub fn key(&self) -> String {
		edge_key(&self.source, &self.target)
	}
}

/// Canonical, order-independent key for the edge between `a` and `b`.
pub fn edge_key(a: &str, b: &str) -> String {
	if a <= b {
		format!("{a}|{b}")
	} else {
		format!("{b}|{a}")
	}
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphMetadata {
	#[serde(default)]
	pub node_count: usize,
	#[serde(default)]
	pub edge_count: usize,
	#[serde(default)]
	pub trait_keys: Vec<String>,
}

/// A whole node/edge collection. Swapped as a unit, never edited in place.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphData {
	pub nodes: Vec<Node>,
	pub edges: Vec<Edge>,
	#[serde(default)]
	pub metadata: Option<GraphMetadata>,
}

impl GraphData {
	pub fn new(nodes: Vec<Node>, edges: Vec<Edge>) -> Self {
		Self {
			nodes,
			edges,
			metadata: None,
		}
	}

	pub fn node(&self, id: &str) -> Option<&Node> {
		self.nodes.iter().find(|n| n.agent_id == id)
	}

	/// Union of trait keys across all nodes, sorted.
	pub fn trait_keys(&self) -> Vec<String> {
		if let Some(meta) = &self.metadata {
			if !meta.trait_keys.is_empty() {
				return meta.trait_keys.clone();
			}
		}
		let mut keys: Vec<String> = self
			.nodes
			.iter()
			.flat_map(|n| n.traits.keys().cloned())
			.collect();
		keys.sort();
		keys.dedup();
		keys
	}
}

/// State of one agent at one timestep.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AgentState {
	/// `[-1, 1]`
	pub opinion: f64,
	/// `[0, 1]`
	pub sentiment: f64,
	/// `[0, 1]`
	pub adoption: f64,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Frame {
	pub t: usize,
	pub agents: BTreeMap<AgentId, AgentState>,
}

impl Frame {
	/// The same timestep with only the agents of `nodes`.
	pub fn restricted_to(&self, nodes: &[Node]) -> Frame {
		Frame {
			t: self.t,
			agents: nodes
				.iter()
				.filter_map(|n| self.agents.get_key_value(&n.agent_id))
				.map(|(id, state)| (id.clone(), *state))
				.collect(),
		}
	}
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunSource {
	#[default]
	Demo,
	Simulation,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunMeta {
	pub source: RunSource,
	pub seed: u32,
	pub timesteps: usize,
	#[serde(default)]
	pub target_ids: Vec<AgentId>,
	#[serde(default)]
	pub trigger: Option<String>,
}

/// An immutable, indexable sequence of frames with `frames[i].t == i`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaybackRun {
	pub id: String,
	pub name: String,
	/// Milliseconds since the Unix epoch.
	pub created_at: u64,
	pub frames: Vec<Frame>,
	pub meta: RunMeta,
}

impl PlaybackRun {
	pub fn frame(&self, index: usize) -> Option<&Frame> {
		self.frames.get(index)
	}

	pub fn len(&self) -> usize {
		self.frames.len()
	}

	pub fn is_empty(&self) -> bool {
		self.frames.is_empty()
	}
}

/// Accepts ids sent as JSON numbers (simulation output) or strings.
pub(crate) fn flexible_id<'de, D>(deserializer: D) -> Result<AgentId, D::Error>
where
	D: Deserializer<'de>,
{
	#[derive(Deserialize)]
	#[serde(untagged)]
	enum RawId {
		Text(String),
		Int(i64),
		Float(f64),
	}

	Ok(match RawId::deserialize(deserializer)? {
		RawId::Text(s) => s,
		RawId::Int(i) => i.to_string(),
		RawId::Float(f) => f.to_string(),
	})
}
