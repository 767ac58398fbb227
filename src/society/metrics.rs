//! Structural metrics of a graph and live metrics of one playback frame.
//!
//! Everything here is a pure function of its inputs.

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

use super::model::{Edge, Frame, Node};

/// Share of nodes counted as the betweenness elite.
const TOP_BETWEENNESS_FRACTION: f64 = 0.05;
const ADOPTION_THRESHOLD: f64 = 0.7;
const EXTREME_CLUSTERS: usize = 3;

/// Gini coefficient of `values`; 0 for empty or all-zero input.
pub fn gini(values: &[f64]) -> f64 {
	let mut sorted: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
	let n = sorted.len();
	let total: f64 = sorted.iter().sum();
	if n == 0 || total == 0.0 {
		return 0.0;
	}
	sorted.sort_by(f64::total_cmp);
	let weighted: f64 = sorted
		.iter()
		.enumerate()
		.map(|(i, x)| (2.0 * (i + 1) as f64 - n as f64 - 1.0) * x)
		.sum();
	weighted / (n as f64 * total)
}

fn mean(values: &[f64]) -> f64 {
	if values.is_empty() {
		0.0
	} else {
		values.iter().sum::<f64>() / values.len() as f64
	}
}

fn population_std(values: &[f64]) -> f64 {
	if values.is_empty() {
		return 0.0;
	}
	let m = mean(values);
	(values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64).sqrt()
}

/// Nearest-rank percentile over ascending `sorted`, index `floor(n * p)`.
fn percentile(sorted: &[f64], p: f64) -> f64 {
	if sorted.is_empty() {
		return 0.0;
	}
	let idx = ((sorted.len() as f64 * p).floor() as usize).min(sorted.len() - 1);
	sorted[idx]
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StructuralMetrics {
	pub agent_count: usize,
	pub edge_count: usize,
	pub cluster_count: usize,
	pub density: f64,
	/// Fraction of edges joining two members of the same cluster.
	pub cohesion: f64,
	pub external_connectivity: f64,
	pub gini_influence: f64,
	pub avg_betweenness: f64,
	pub top5_betweenness_share: f64,
}

pub fn compute_structural_metrics(nodes: &[Node], edges: &[Edge]) -> StructuralMetrics {
	let n = nodes.len();
	let e = edges.len();

	let density = if n < 2 {
		0.0
	} else {
		2.0 * e as f64 / (n as f64 * (n - 1) as f64)
	};

	let clusters: HashMap<&str, Option<u32>> = nodes
		.iter()
		.map(|node| (node.agent_id.as_str(), node.cluster))
		.collect();
	let within = edges
		.iter()
		.filter(|edge| {
			edge.within_cluster.unwrap_or_else(|| {
				let a = clusters.get(edge.source.as_str()).copied().flatten();
				let b = clusters.get(edge.target.as_str()).copied().flatten();
				a.is_some() && a == b
			})
		})
		.count();
	let (cohesion, external_connectivity) = if e == 0 {
		(0.0, 0.0)
	} else {
		let c = within as f64 / e as f64;
		(c, 1.0 - c)
	};

	let influence: Vec<f64> = nodes.iter().map(Node::influence).collect();

	let mut betweenness: Vec<f64> = nodes.iter().map(|n| n.betweenness_centrality).collect();
	let avg_betweenness = mean(&betweenness);
	betweenness.sort_by(|a, b| b.total_cmp(a));
	let total_betweenness: f64 = betweenness.iter().sum();
	let top5_betweenness_share = if total_betweenness > 0.0 {
		let top = ((n as f64 * TOP_BETWEENNESS_FRACTION).floor() as usize).max(1);
		betweenness.iter().take(top).sum::<f64>() / total_betweenness
	} else {
		0.0
	};

	let mut cluster_ids: Vec<u32> = nodes.iter().filter_map(|n| n.cluster).collect();
	cluster_ids.sort_unstable();
	cluster_ids.dedup();

	StructuralMetrics {
		agent_count: n,
		edge_count: e,
		cluster_count: cluster_ids.len(),
		density,
		cohesion,
		external_connectivity,
		gini_influence: gini(&influence),
		avg_betweenness,
		top5_betweenness_share,
	}
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterOpinion {
	pub cluster: u32,
	pub mean_opinion: f64,
	pub agent_count: usize,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LiveMetrics {
	pub agent_count: usize,
	/// Population standard deviation of opinion.
	pub polarization: f64,
	pub polarization_p90_p10: f64,
	pub mean_adoption: f64,
	pub adoption_above70_share: f64,
	pub mean_opinion: f64,
	pub gini_opinion: f64,
	/// Ordered by cluster id.
	pub clusters: Vec<ClusterOpinion>,
	pub most_positive: Vec<ClusterOpinion>,
	pub most_negative: Vec<ClusterOpinion>,
}

/// Metrics of the agent states in `frame`; `nodes` supplies cluster membership.
pub fn compute_live_metrics(frame: &Frame, nodes: &[Node]) -> LiveMetrics {
	let states: Vec<_> = frame.agents.values().collect();
	let n = states.len();
	if n == 0 {
		return LiveMetrics::default();
	}

	let opinions: Vec<f64> = states.iter().map(|s| s.opinion).collect();
	let adoptions: Vec<f64> = states.iter().map(|s| s.adoption).collect();

	let mut sorted = opinions.clone();
	sorted.sort_by(f64::total_cmp);
	let shifted: Vec<f64> = opinions.iter().map(|o| (o + 1.0) / 2.0).collect();
	let above = adoptions.iter().filter(|&&a| a > ADOPTION_THRESHOLD).count();

	let cluster_of: HashMap<&str, u32> = nodes
		.iter()
		.filter_map(|node| node.cluster.map(|c| (node.agent_id.as_str(), c)))
		.collect();
	let mut sums: BTreeMap<u32, (f64, usize)> = BTreeMap::new();
	for (id, state) in &frame.agents {
		if let Some(&cluster) = cluster_of.get(id.as_str()) {
			let slot = sums.entry(cluster).or_default();
			slot.0 += state.opinion;
			slot.1 += 1;
		}
	}
	let clusters: Vec<ClusterOpinion> = sums
		.into_iter()
		.map(|(cluster, (sum, count))| ClusterOpinion {
			cluster,
			mean_opinion: sum / count as f64,
			agent_count: count,
		})
		.collect();

	let mut most_positive = clusters.clone();
	most_positive.sort_by(|a, b| b.mean_opinion.total_cmp(&a.mean_opinion));
	most_positive.truncate(EXTREME_CLUSTERS);
	let mut most_negative = clusters.clone();
	most_negative.sort_by(|a, b| a.mean_opinion.total_cmp(&b.mean_opinion));
	most_negative.truncate(EXTREME_CLUSTERS);

	LiveMetrics {
		agent_count: n,
		polarization: population_std(&opinions),
		polarization_p90_p10: percentile(&sorted, 0.9) - percentile(&sorted, 0.1),
		mean_adoption: mean(&adoptions),
		adoption_above70_share: above as f64 / n as f64,
		mean_opinion: mean(&opinions),
		gini_opinion: gini(&shifted),
		clusters,
		most_positive,
		most_negative,
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::society::model::{AgentState, SOCIAL_INFLUENCE};
	use proptest::prelude::*;

	fn close(a: f64, b: f64) -> bool {
		(a - b).abs() < 1e-9
	}

	fn node(id: &str, cluster: Option<u32>, influence: f64, betweenness: f64) -> Node {
		let mut n = Node::new(id);
		n.cluster = cluster;
		n.traits.insert(SOCIAL_INFLUENCE.into(), influence);
		n.betweenness_centrality = betweenness;
		n
	}

	fn state(opinion: f64, adoption: f64) -> AgentState {
		AgentState {
			opinion,
			sentiment: 0.5,
			adoption,
		}
	}

	#[test]
	fn gini_edge_cases() {
		assert_eq!(gini(&[]), 0.0);
		assert_eq!(gini(&[0.0, 0.0, 0.0]), 0.0);
		assert_eq!(gini(&[1.0, 1.0, 1.0, 1.0]), 0.0);
		assert!(close(gini(&[1.0, 0.0]), 0.5));
		assert!(gini(&[1.0, 0.0, 0.0, 0.0]) > gini(&[1.0, 1.0, 1.0, 1.0]));
	}

	#[test]
	fn empty_graph_has_zero_metrics() {
		let m = compute_structural_metrics(&[], &[]);
		assert_eq!(m.agent_count, 0);
		assert_eq!(m.density, 0.0);
		assert_eq!(m.cohesion, 0.0);
		assert_eq!(m.top5_betweenness_share, 0.0);
	}

	#[test]
	fn two_node_influence_gini() {
		let nodes = vec![node("a", None, 1.0, 0.0), node("b", None, 0.0, 0.0)];
		let m = compute_structural_metrics(&nodes, &[Edge::new("a", "b")]);
		assert!(close(m.gini_influence, 0.5));
		assert!(close(m.density, 1.0));
	}

	#[test]
	fn cohesion_uses_flag_then_clusters() {
		let nodes = vec![
			node("a", Some(1), 0.1, 0.0),
			node("b", Some(1), 0.1, 0.0),
			node("c", Some(2), 0.1, 0.0),
			node("d", None, 0.1, 0.0),
		];
		let mut flagged = Edge::new("a", "c");
		flagged.within_cluster = Some(true);
		let edges = vec![
			Edge::new("a", "b"),
			Edge::new("b", "c"),
			Edge::new("c", "d"),
			flagged,
		];
		let m = compute_structural_metrics(&nodes, &edges);
		assert!(close(m.cohesion, 0.5));
		assert!(close(m.external_connectivity, 0.5));
		assert_eq!(m.cluster_count, 2);
	}

	#[test]
	fn top_betweenness_share_counts_at_least_one_node() {
		let nodes = vec![
			node("a", None, 0.0, 6.0),
			node("b", None, 0.0, 2.0),
			node("c", None, 0.0, 2.0),
		];
		let m = compute_structural_metrics(&nodes, &[]);
		assert!(close(m.top5_betweenness_share, 0.6));
		assert!(close(m.avg_betweenness, 10.0 / 3.0));
	}

	#[test]
	fn live_metrics_of_two_opposed_agents() {
		let frame = Frame {
			t: 0,
			agents: BTreeMap::from([
				("a".to_string(), state(-1.0, 0.0)),
				("b".to_string(), state(1.0, 0.8)),
			]),
		};
		let m = compute_live_metrics(&frame, &[]);
		assert!(close(m.mean_opinion, 0.0));
		assert!(close(m.polarization, 1.0));
		assert!(close(m.polarization_p90_p10, 2.0));
		assert!(close(m.mean_adoption, 0.4));
		assert!(close(m.adoption_above70_share, 0.5));
		assert!(close(m.gini_opinion, 0.5));
		assert!(m.clusters.is_empty());
	}

	#[test]
	fn live_metrics_rank_clusters() {
		let nodes: Vec<Node> = (0..5)
			.map(|i| node(&format!("n{i}"), Some(i), 0.0, 0.0))
			.collect();
		let agents = (0..5)
			.map(|i| (format!("n{i}"), state(i as f64 * 0.5 - 1.0, 0.0)))
			.collect();
		let m = compute_live_metrics(&Frame { t: 3, agents }, &nodes);
		assert_eq!(m.clusters.len(), 5);
		let top: Vec<u32> = m.most_positive.iter().map(|c| c.cluster).collect();
		let bottom: Vec<u32> = m.most_negative.iter().map(|c| c.cluster).collect();
		assert_eq!(top, vec![4, 3, 2]);
		assert_eq!(bottom, vec![0, 1, 2]);
	}

	#[test]
	fn empty_frame_is_all_zero() {
		assert_eq!(compute_live_metrics(&Frame::default(), &[]), LiveMetrics::default());
	}

	proptest! {
		#[test]
		fn prop_gini_scale_invariant(
			values in prop::collection::vec(0.0f64..100.0, 1..30),
			scale in 0.1f64..50.0
		) {
			let scaled: Vec<f64> = values.iter().map(|v| v * scale).collect();
			prop_assert!((gini(&values) - gini(&scaled)).abs() < 1e-9);
		}

		#[test]
		fn prop_gini_bounded(values in prop::collection::vec(0.0f64..100.0, 0..30)) {
			let g = gini(&values);
			prop_assert!(g > -1e-12 && g < 1.0);
		}
	}
}
