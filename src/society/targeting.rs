//! Declarative experiment records and resolution of their target rules.

use log::debug;
use serde::{Deserialize, Serialize};

use super::model::{AgentId, Edge, Node};

pub const DEFAULT_TOP_N: usize = 10;
/// Upper bound on top-N target modes.
pub const MAX_TOP_N: usize = 50;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterventionType {
	#[default]
	Message,
	Incentive,
	Policy,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetMode {
	#[default]
	All,
	TopInfluencers,
	BridgeNodes,
	Manual,
}

impl InterventionType {
	pub const ALL: [InterventionType; 3] = [InterventionType::Message, InterventionType::Incentive, InterventionType::Policy];

	pub fn key(self) -> &'static str {
		match self {
			InterventionType::Message => "message",
			InterventionType::Incentive => "incentive",
			InterventionType::Policy => "policy",
		}
	}

	pub fn from_key(key: &str) -> Option<Self> {
		Self::ALL.into_iter().find(|t| t.key() == key)
	}
}

impl TargetMode {
	pub const ALL: [TargetMode; 4] = [
		TargetMode::TopInfluencers,
		TargetMode::BridgeNodes,
		TargetMode::All,
		TargetMode::Manual,
	];

	/// Same spelling as the persisted form.
	pub fn key(self) -> &'static str {
		match self {
			TargetMode::All => "all",
			TargetMode::TopInfluencers => "top_influencers",
			TargetMode::BridgeNodes => "bridge_nodes",
			TargetMode::Manual => "manual",
		}
	}

	pub fn from_key(key: &str) -> Option<Self> {
		Self::ALL.into_iter().find(|m| m.key() == key)
	}

	pub fn label(self) -> &'static str {
		match self {
			TargetMode::All => "Everyone",
			TargetMode::TopInfluencers => "Top influencers",
			TargetMode::BridgeNodes => "Bridge nodes",
			TargetMode::Manual => "Manual list",
		}
	}
}

/// Split a typed id list on commas and whitespace. Order and duplicates are kept.
pub fn parse_manual_ids(raw: &str) -> Vec<AgentId> {
	raw.split(|c: char| c == ',' || c.is_whitespace())
		.filter(|id| !id.is_empty())
		.map(str::to_string)
		.collect()
}

/// Node score used to rank candidates in `TopInfluencers` mode.
///
/// `SocialInfluence` falls back to degree centrality like [`Node::influence`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InfluenceMetric {
	#[default]
	SocialInfluence,
	BetweennessCentrality,
	DegreeCentrality,
}

impl InfluenceMetric {
	fn score(self, node: &Node) -> f64 {
		let raw = match self {
			InfluenceMetric::SocialInfluence => node.influence(),
			InfluenceMetric::BetweennessCentrality => node.betweenness_centrality,
			InfluenceMetric::DegreeCentrality => node.degree_centrality,
		};
		if raw.is_finite() { raw } else { 0.0 }
	}
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TargetParams {
	pub top_n: Option<usize>,
	pub metric: InfluenceMetric,
	pub manual_ids: Vec<AgentId>,
}

impl TargetParams {
	/// `top_n` clamped to `1..=MAX_TOP_N`, [`DEFAULT_TOP_N`] when unset.
	pub fn top_n(&self) -> usize {
		self.top_n.unwrap_or(DEFAULT_TOP_N).clamp(1, MAX_TOP_N)
	}
}

/// A user-authored hypothetical intervention.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Experiment {
	pub id: String,
	pub name: String,
	#[serde(default)]
	pub intervention_type: InterventionType,
	#[serde(default)]
	pub content: String,
	#[serde(default)]
	pub target_mode: TargetMode,
	#[serde(default)]
	pub target_params: TargetParams,
	#[serde(default)]
	pub intensity: f64,
	/// Cached result of [`compute_targets`]; `None` when stale.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub computed_targets: Option<Vec<AgentId>>,
}

/// Resolve the experiment's target rule against `nodes`.
///
/// `_edges` is accepted so graph-aware modes can be added without changing
/// callers.
pub fn compute_targets(experiment: &Experiment, nodes: &[Node], _edges: &[Edge]) -> Vec<AgentId> {
	let params = &experiment.target_params;
	let targets = match experiment.target_mode {
		TargetMode::All => nodes.iter().map(|n| n.agent_id.clone()).collect(),
		TargetMode::TopInfluencers => top_by(nodes, params.top_n(), |n| params.metric.score(n)),
		TargetMode::BridgeNodes => top_by(nodes, params.top_n(), |n| {
			InfluenceMetric::BetweennessCentrality.score(n)
		}),
		TargetMode::Manual => params.manual_ids.clone(),
	};
	debug!(
		"experiment {} resolved {} targets ({:?})",
		experiment.id,
		targets.len(),
		experiment.target_mode
	);
	targets
}

// Stable sort keeps input order among equal scores.
fn top_by(nodes: &[Node], n: usize, score: impl Fn(&Node) -> f64) -> Vec<AgentId> {
	let mut ranked: Vec<(f64, &Node)> = nodes.iter().map(|node| (score(node), node)).collect();
	ranked.sort_by(|a, b| b.0.total_cmp(&a.0));
	ranked
		.into_iter()
		.take(n)
		.map(|(_, node)| node.agent_id.clone())
		.collect()
}
