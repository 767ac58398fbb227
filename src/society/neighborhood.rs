use std::collections::BTreeSet;

use super::adjacency::Adjacency;
use super::model::{AgentId, edge_key};

/// Ids reachable from `center` within `k` hops, `center` included.
///
/// Each round expands only the nodes discovered in the previous round.
pub fn k_hop_neighborhood(adj: &Adjacency, center: &str, k: usize) -> BTreeSet<AgentId> {
	let mut reached = BTreeSet::from([center.to_string()]);
	let mut frontier = vec![center.to_string()];

	for _ in 0..k {
		let mut next = Vec::new();
		for id in &frontier {
			for neighbor in adj.neighbors(id) {
				if reached.insert(neighbor.id.clone()) {
					next.push(neighbor.id.clone());
				}
			}
		}
		if next.is_empty() {
			break;
		}
		frontier = next;
	}
	reached
}

/// Canonical keys of every edge with both endpoints inside `members`.
pub fn neighborhood_edge_keys(adj: &Adjacency, members: &BTreeSet<AgentId>) -> BTreeSet<String> {
	let mut keys = BTreeSet::new();
	for id in members {
		for neighbor in adj.neighbors(id) {
			if members.contains(&neighbor.id) {
				keys.insert(edge_key(id, &neighbor.id));
			}
		}
	}
	keys
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::society::model::Edge;
	use proptest::prelude::*;

	fn set(ids: &[&str]) -> BTreeSet<AgentId> {
		ids.iter().map(|s| s.to_string()).collect()
	}

	fn line() -> Adjacency {
		Adjacency::build(&[
			Edge::new("A", "B"),
			Edge::new("B", "C"),
			Edge::new("C", "D"),
			Edge::new("D", "E"),
		])
	}

	#[test]
	fn zero_hops_is_just_the_center() {
		assert_eq!(k_hop_neighborhood(&line(), "C", 0), set(&["C"]));
		assert_eq!(k_hop_neighborhood(&line(), "ghost", 3), set(&["ghost"]));
	}

	#[test]
	fn hops_expand_outward() {
		let adj = line();
		assert_eq!(k_hop_neighborhood(&adj, "C", 1), set(&["B", "C", "D"]));
		assert_eq!(k_hop_neighborhood(&adj, "C", 2), set(&["A", "B", "C", "D", "E"]));
		assert_eq!(k_hop_neighborhood(&adj, "A", 10).len(), 5);
	}

	#[test]
	fn induced_edges_only() {
		let adj = line();
		let members = set(&["B", "C", "D"]);
		assert_eq!(
			neighborhood_edge_keys(&adj, &members),
			["B|C", "C|D"].iter().map(|s| s.to_string()).collect()
		);
	}

	proptest! {
		#[test]
		fn prop_neighborhood_grows_with_k(
			raw in prop::collection::vec((0u8..15, 0u8..15), 1..40),
			k in 0usize..6
		) {
			let edges: Vec<Edge> = raw.iter().map(|(s, t)| Edge::new(s.to_string(), t.to_string())).collect();
			let adj = Adjacency::build(&edges);
			let center = edges[0].source.clone();
			let small = k_hop_neighborhood(&adj, &center, k);
			let large = k_hop_neighborhood(&adj, &center, k + 1);
			prop_assert!(small.is_subset(&large));
		}
	}
}
