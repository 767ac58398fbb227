//! Seeded synthetic society used when no server graph is available.

use std::collections::BTreeMap;

use super::centrality::enrich_centrality;
use super::demo_run::Lcg;
use super::model::{Edge, GraphData, GraphMetadata, Node, SOCIAL_INFLUENCE};

const CLUSTERS: u32 = 6;
const GENDERS: &[&str] = &["female", "male", "nonbinary"];
pub const TRAIT_KEYS: &[&str] = &[SOCIAL_INFLUENCE, "openness", "trust"];

/// Random-tree backbone plus extra ties inside each cluster.
pub fn sample_society(n: usize, seed: u32) -> GraphData {
	let mut rng = Lcg::new(seed);

	let nodes: Vec<Node> = (0..n)
		.map(|i| {
			let traits: BTreeMap<String, f64> = TRAIT_KEYS
				.iter()
				.map(|k| (k.to_string(), rng.next_f64()))
				.collect();
			Node {
				agent_id: format!("agent-{i}"),
				traits,
				age: Some((18.0 + rng.next_f64() * 62.0).floor()),
				gender: Some(GENDERS[(rng.next_f64() * GENDERS.len() as f64) as usize % GENDERS.len()].into()),
				cluster: Some(i as u32 % CLUSTERS),
				..Node::default()
			}
		})
		.collect();

	let mut edges = Vec::new();
	for i in 1..n {
		let parent = (rng.next_f64() * i as f64) as usize;
		edges.push(Edge::weighted(
			format!("agent-{i}"),
			format!("agent-{parent}"),
			0.5 + rng.next_f64(),
		));
	}
	// Same-cluster nodes sit CLUSTERS apart in index order.
	let step = CLUSTERS as usize;
	for i in step..n {
		if rng.next_f64() < 0.35 {
			edges.push(Edge::weighted(
				format!("agent-{i}"),
				format!("agent-{}", i - step),
				0.5 + rng.next_f64(),
			));
		}
	}

	let mut graph = GraphData::new(nodes, edges);
	enrich_centrality(&mut graph);
	graph.metadata = Some(GraphMetadata {
		node_count: graph.nodes.len(),
		edge_count: graph.edges.len(),
		trait_keys: TRAIT_KEYS.iter().map(|k| k.to_string()).collect(),
	});
	graph
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::society::adjacency::Adjacency;
	use crate::society::neighborhood::k_hop_neighborhood;

	#[test]
	fn sample_is_connected_and_seeded() {
		let g = sample_society(60, 9);
		assert_eq!(g.nodes.len(), 60);
		assert!(g.edges.len() >= 59);
		let adj = Adjacency::build(&g.edges);
		assert_eq!(k_hop_neighborhood(&adj, "agent-0", 60).len(), 60);
		assert_eq!(g, sample_society(60, 9));
		assert_ne!(g, sample_society(60, 10));
	}

	#[test]
	fn sample_nodes_carry_attributes() {
		let g = sample_society(20, 1);
		for node in &g.nodes {
			assert!(node.degree >= 1);
			assert!(node.cluster.is_some_and(|c| c < CLUSTERS));
			assert!(node.age.is_some_and(|a| (18.0..80.0).contains(&a)));
			assert!(node.trait_value(SOCIAL_INFLUENCE).is_some());
		}
		assert_eq!(g.trait_keys().len(), TRAIT_KEYS.len());
	}

	#[test]
	fn tiny_samples() {
		assert!(sample_society(0, 1).nodes.is_empty());
		let one = sample_society(1, 1);
		assert_eq!(one.nodes.len(), 1);
		assert!(one.edges.is_empty());
	}
}
