use std::collections::HashMap;

use log::debug;

use super::model::{AgentId, Edge};

#[derive(Clone, Debug, PartialEq)]
pub struct Neighbor {
	pub id: AgentId,
	pub weight: f64,
}

/// Undirected weighted adjacency built from a flat edge list.
///
/// Neighbor lists keep edge order, so traversals that stop at first
/// discovery are deterministic for a given edge list. Duplicate edges and
/// self-loops are kept as-is: a duplicate adds a second entry on both ends
/// and a self-loop adds two entries to its node.
#[derive(Clone, Debug, Default)]
pub struct Adjacency {
	map: HashMap<AgentId, Vec<Neighbor>>,
}

impl Adjacency {
	pub fn build(edges: &[Edge]) -> Self {
		let mut map: HashMap<AgentId, Vec<Neighbor>> = HashMap::new();
		for edge in edges {
			let weight = edge.effective_weight();
			map.entry(edge.source.clone()).or_default().push(Neighbor {
				id: edge.target.clone(),
				weight,
			});
			map.entry(edge.target.clone()).or_default().push(Neighbor {
				id: edge.source.clone(),
				weight,
			});
		}
		debug!(
			"adjacency built: {} nodes from {} edges",
			map.len(),
			edges.len()
		);
		Self { map }
	}

	/// Neighbors of `id`, empty when the id has no edges.
	pub fn neighbors(&self, id: &str) -> &[Neighbor] {
		self.map.get(id).map(Vec::as_slice).unwrap_or(&[])
	}

	pub fn contains(&self, id: &str) -> bool {
		self.map.contains_key(id)
	}

	pub fn node_count(&self) -> usize {
		self.map.len()
	}

	pub fn is_empty(&self) -> bool {
		self.map.is_empty()
	}

	pub fn ids(&self) -> impl Iterator<Item = &AgentId> {
		self.map.keys()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use proptest::prelude::*;

	#[test]
	fn edges_are_reciprocal() {
		let adj = Adjacency::build(&[Edge::weighted("a", "b", 2.0), Edge::new("b", "c")]);
		assert_eq!(adj.node_count(), 3);
		assert_eq!(
			adj.neighbors("b"),
			&[
				Neighbor {
					id: "a".into(),
					weight: 2.0
				},
				Neighbor {
					id: "c".into(),
					weight: 1.0
				},
			]
		);
		assert!(adj.neighbors("zzz").is_empty());
		assert!(!adj.contains("zzz"));
	}

	#[test]
	fn duplicates_and_self_loops_are_preserved() {
		let adj = Adjacency::build(&[Edge::new("a", "b"), Edge::new("a", "b"), Edge::new("c", "c")]);
		assert_eq!(adj.neighbors("a").len(), 2);
		assert_eq!(adj.neighbors("b").len(), 2);
		assert_eq!(adj.neighbors("c").len(), 2);
		assert!(adj.neighbors("c").iter().all(|n| n.id == "c"));
	}

	#[test]
	fn non_positive_weight_defaults_to_one() {
		let adj = Adjacency::build(&[Edge::weighted("a", "b", 0.0)]);
		assert_eq!(adj.neighbors("a")[0].weight, 1.0);
	}

	proptest! {
		#[test]
		fn prop_every_edge_is_mirrored(
			raw in prop::collection::vec((0u8..12, 0u8..12, 0.01f64..5.0), 0..40)
		) {
			let edges: Vec<Edge> = raw
				.iter()
				.map(|(s, t, w)| Edge::weighted(s.to_string(), t.to_string(), *w))
				.collect();
			let adj = Adjacency::build(&edges);
			for e in &edges {
				prop_assert!(adj.neighbors(&e.source).iter().any(|n| n.id == e.target && n.weight == e.weight));
				prop_assert!(adj.neighbors(&e.target).iter().any(|n| n.id == e.source && n.weight == e.weight));
			}
		}
	}
}
