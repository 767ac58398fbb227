//! Shortest-path queries over an [`Adjacency`].
//!
//! Both searches return `None` when either endpoint is missing from the
//! adjacency or no path exists, and `Some(vec![source])` when source and
//! destination coincide.

use std::cmp::Ordering;
use std::collections::{BTreeSet, BinaryHeap, HashMap, HashSet, VecDeque};

use super::adjacency::Adjacency;
use super::model::{AgentId, Node, edge_key};

/// Influence is clamped to this ceiling so traversal cost never reaches zero.
pub const MAX_INFLUENCE: f64 = 0.9;
pub const MIN_WEIGHT: f64 = 0.01;
pub const MIN_STEP_COST: f64 = 1e-6;

/// Fewest-hop path from `source` to `destination`.
pub fn bfs_shortest_path(adj: &Adjacency, source: &str, destination: &str) -> Option<Vec<AgentId>> {
	if !adj.contains(source) || !adj.contains(destination) {
		return None;
	}
	if source == destination {
		return Some(vec![source.to_string()]);
	}

	let mut parent: HashMap<&str, &str> = HashMap::new();
	let mut seen: HashSet<&str> = HashSet::from([source]);
	let mut queue: VecDeque<&str> = VecDeque::from([source]);

	while let Some(current) = queue.pop_front() {
		for next in adj.neighbors(current) {
			if !seen.insert(next.id.as_str()) {
				continue;
			}
			parent.insert(next.id.as_str(), current);
			if next.id == destination {
				return Some(unwind(&parent, source, destination));
			}
			queue.push_back(next.id.as_str());
		}
	}
	None
}

/// Per-node influence scores used to discount traversal cost.
#[derive(Clone, Debug, Default)]
pub struct InfluenceIndex {
	scores: HashMap<AgentId, f64>,
}

impl InfluenceIndex {
	pub fn from_nodes(nodes: &[Node]) -> Self {
		Self {
			scores: nodes
				.iter()
				.map(|n| (n.agent_id.clone(), n.influence()))
				.collect(),
		}
	}

	/// Clamped influence of `id`; unknown ids have none.
	pub fn get(&self, id: &str) -> f64 {
		let raw = self.scores.get(id).copied().unwrap_or(0.0);
		if raw.is_finite() {
			raw.clamp(0.0, MAX_INFLUENCE)
		} else {
			0.0
		}
	}
}

/// Cost of leaving a node with influence `influence` over an edge of `weight`.
pub fn step_cost(weight: f64, influence: f64) -> f64 {
	let base = 1.0 / weight.max(MIN_WEIGHT);
	(base * (1.0 - influence.clamp(0.0, MAX_INFLUENCE))).max(MIN_STEP_COST)
}

struct Frontier<'a> {
	cost: f64,
	seq: u64,
	id: &'a str,
}

impl PartialEq for Frontier<'_> {
	fn eq(&self, other: &Self) -> bool {
		self.cmp(other) == Ordering::Equal
	}
}

impl Eq for Frontier<'_> {}

impl PartialOrd for Frontier<'_> {
	fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
		Some(self.cmp(other))
	}
}

impl Ord for Frontier<'_> {
	// Max-heap inverted: cheapest first, then earliest pushed.
	fn cmp(&self, other: &Self) -> Ordering {
		other
			.cost
			.total_cmp(&self.cost)
			.then_with(|| other.seq.cmp(&self.seq))
	}
}

/// Cheapest path where leaving an influential node costs less.
pub fn influence_path(
	adj: &Adjacency,
	influence: &InfluenceIndex,
	source: &str,
	destination: &str,
) -> Option<Vec<AgentId>> {
	if !adj.contains(source) || !adj.contains(destination) {
		return None;
	}
	if source == destination {
		return Some(vec![source.to_string()]);
	}

	let mut dist: HashMap<&str, f64> = HashMap::from([(source, 0.0)]);
	let mut parent: HashMap<&str, &str> = HashMap::new();
	let mut heap = BinaryHeap::new();
	let mut seq = 0u64;
	heap.push(Frontier {
		cost: 0.0,
		seq,
		id: source,
	});

	while let Some(Frontier { cost, id, .. }) = heap.pop() {
		if id == destination {
			return Some(unwind(&parent, source, destination));
		}
		if dist.get(id).is_some_and(|&best| cost > best) {
			continue;
		}
		let leave = influence.get(id);
		for next in adj.neighbors(id) {
			let candidate = cost + step_cost(next.weight, leave);
			let known = dist.get(next.id.as_str()).copied().unwrap_or(f64::INFINITY);
			if candidate < known {
				dist.insert(next.id.as_str(), candidate);
				parent.insert(next.id.as_str(), id);
				seq += 1;
				heap.push(Frontier {
					cost: candidate,
					seq,
					id: next.id.as_str(),
				});
			}
		}
	}
	None
}

/// Canonical keys of the consecutive pairs along `path`.
pub fn path_edge_keys(path: &[AgentId]) -> BTreeSet<String> {
	path.windows(2).map(|w| edge_key(&w[0], &w[1])).collect()
}

fn unwind(parent: &HashMap<&str, &str>, source: &str, destination: &str) -> Vec<AgentId> {
	let mut path = vec![destination.to_string()];
	let mut cursor = destination;
	while cursor != source {
		match parent.get(cursor) {
			Some(&prev) => {
				path.push(prev.to_string());
				cursor = prev;
			}
			None => break,
		}
	}
	path.reverse();
	path
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::society::model::{Edge, SOCIAL_INFLUENCE};

	fn line() -> Adjacency {
		Adjacency::build(&[
			Edge::new("A", "B"),
			Edge::new("B", "C"),
			Edge::new("C", "D"),
			Edge::new("D", "E"),
		])
	}

	fn ids(path: &[&str]) -> Vec<AgentId> {
		path.iter().map(|s| s.to_string()).collect()
	}

	#[test]
	fn bfs_walks_the_line() {
		assert_eq!(
			bfs_shortest_path(&line(), "A", "E"),
			Some(ids(&["A", "B", "C", "D", "E"]))
		);
	}

	#[test]
	fn bfs_identity_and_missing() {
		let adj = line();
		assert_eq!(bfs_shortest_path(&adj, "C", "C"), Some(ids(&["C"])));
		assert_eq!(bfs_shortest_path(&adj, "A", "Z"), None);
		assert_eq!(bfs_shortest_path(&adj, "Z", "Z"), None);
	}

	#[test]
	fn bfs_disconnected_is_none() {
		let adj = Adjacency::build(&[Edge::new("a", "b"), Edge::new("c", "d")]);
		assert_eq!(bfs_shortest_path(&adj, "a", "d"), None);
	}

	#[test]
	fn bfs_ties_follow_edge_order() {
		let adj = Adjacency::build(&[
			Edge::new("s", "x"),
			Edge::new("s", "y"),
			Edge::new("x", "t"),
			Edge::new("y", "t"),
		]);
		assert_eq!(bfs_shortest_path(&adj, "s", "t"), Some(ids(&["s", "x", "t"])));
	}

	#[test]
	fn step_cost_stays_positive() {
		assert!(step_cost(1.0, 5.0) > 0.0);
		assert!((step_cost(1.0, 0.9) - 0.1).abs() < 1e-12);
		assert_eq!(step_cost(0.0, 0.0), 100.0);
		assert_eq!(step_cost(1e9, 0.9), MIN_STEP_COST);
	}

	#[test]
	fn influence_path_prefers_influential_relays() {
		// s-a-t and s-b-t are both two hops; b is highly influential.
		let adj = Adjacency::build(&[
			Edge::new("s", "a"),
			Edge::new("s", "b"),
			Edge::new("a", "t"),
			Edge::new("b", "t"),
		]);
		let mut b = Node::new("b");
		b.traits.insert(SOCIAL_INFLUENCE.into(), 0.8);
		let nodes = vec![Node::new("s"), Node::new("a"), b, Node::new("t")];
		let index = InfluenceIndex::from_nodes(&nodes);

		assert_eq!(
			influence_path(&adj, &index, "s", "t"),
			Some(ids(&["s", "b", "t"]))
		);
		assert_eq!(bfs_shortest_path(&adj, "s", "t"), Some(ids(&["s", "a", "t"])));
	}

	#[test]
	fn influence_path_takes_heavier_detour() {
		// direct light tie (cost 10) vs two strong ties (cost 0.5 each)
		let adj = Adjacency::build(&[
			Edge::weighted("s", "t", 0.1),
			Edge::weighted("s", "m", 2.0),
			Edge::weighted("m", "t", 2.0),
		]);
		let index = InfluenceIndex::default();
		assert_eq!(
			influence_path(&adj, &index, "s", "t"),
			Some(ids(&["s", "m", "t"]))
		);
	}

	#[test]
	fn influence_path_identity_and_missing() {
		let adj = line();
		let index = InfluenceIndex::default();
		assert_eq!(influence_path(&adj, &index, "B", "B"), Some(ids(&["B"])));
		assert_eq!(influence_path(&adj, &index, "B", "nope"), None);
	}

	#[test]
	fn influence_is_clamped() {
		let mut n = Node::new("x");
		n.degree_centrality = 3.0;
		let index = InfluenceIndex::from_nodes(&[n]);
		assert_eq!(index.get("x"), MAX_INFLUENCE);
		assert_eq!(index.get("unknown"), 0.0);
	}

	#[test]
	fn path_keys_cover_each_hop() {
		let keys = path_edge_keys(&ids(&["C", "B", "A"]));
		assert_eq!(keys.len(), 2);
		assert!(keys.contains("A|B"));
		assert!(keys.contains("B|C"));
		assert!(path_edge_keys(&ids(&["A"])).is_empty());
	}
}
