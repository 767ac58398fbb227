//! Degree and betweenness centrality for graphs that arrive without them.

use std::collections::{HashMap, VecDeque};

use log::debug;

use super::adjacency::Adjacency;
use super::model::GraphData;

/// Distinct-neighbor degree per node index, ignoring self-loops.
fn degrees(graph: &GraphData, adj: &Adjacency) -> Vec<u32> {
	graph
		.nodes
		.iter()
		.map(|n| {
			let mut seen: Vec<&str> = adj
				.neighbors(&n.agent_id)
				.iter()
				.map(|nb| nb.id.as_str())
				.filter(|id| *id != n.agent_id)
				.collect();
			seen.sort_unstable();
			seen.dedup();
			seen.len() as u32
		})
		.collect()
}

/// Brandes betweenness on the unweighted, undirected graph, normalised to
/// `[0, 1]` by `2 / ((n - 1)(n - 2))`. Indexed like `graph.nodes`.
pub fn betweenness_centrality(graph: &GraphData) -> Vec<f64> {
	let n = graph.nodes.len();
	if n <= 2 {
		return vec![0.0; n];
	}
	let index: HashMap<&str, usize> = graph
		.nodes
		.iter()
		.enumerate()
		.map(|(i, node)| (node.agent_id.as_str(), i))
		.collect();

	// Deduplicated neighbor indices, edges to unknown ids dropped.
	let mut neighbors: Vec<Vec<usize>> = vec![Vec::new(); n];
	for edge in &graph.edges {
		if let (Some(&a), Some(&b)) = (index.get(edge.source.as_str()), index.get(edge.target.as_str())) {
			if a != b {
				neighbors[a].push(b);
				neighbors[b].push(a);
			}
		}
	}
	for list in &mut neighbors {
		list.sort_unstable();
		list.dedup();
	}

	let mut betweenness = vec![0.0f64; n];
	for s in 0..n {
		let mut stack = Vec::with_capacity(n);
		let mut pred: Vec<Vec<usize>> = vec![Vec::new(); n];
		let mut sigma = vec![0.0f64; n];
		let mut dist = vec![-1i64; n];
		sigma[s] = 1.0;
		dist[s] = 0;

		let mut queue = VecDeque::from([s]);
		while let Some(v) = queue.pop_front() {
			stack.push(v);
			for &w in &neighbors[v] {
				if dist[w] < 0 {
					dist[w] = dist[v] + 1;
					queue.push_back(w);
				}
				if dist[w] == dist[v] + 1 {
					sigma[w] += sigma[v];
					pred[w].push(v);
				}
			}
		}

		let mut delta = vec![0.0f64; n];
		while let Some(w) = stack.pop() {
			for &v in &pred[w] {
				delta[v] += sigma[v] / sigma[w] * (1.0 + delta[w]);
			}
			if w != s {
				betweenness[w] += delta[w];
			}
		}
	}

	// Each unordered pair was counted from both ends.
	let norm = 1.0 / ((n - 1) * (n - 2)) as f64;
	for b in &mut betweenness {
		*b *= norm;
	}
	betweenness
}

/// Fill `degree`, `degree_centrality` and `betweenness_centrality` on every node.
pub fn enrich_centrality(graph: &mut GraphData) {
	let adj = Adjacency::build(&graph.edges);
	let degrees = degrees(graph, &adj);
	let betweenness = betweenness_centrality(graph);
	let denom = graph.nodes.len().saturating_sub(1).max(1) as f64;
	for ((node, degree), b) in graph.nodes.iter_mut().zip(degrees).zip(betweenness) {
		node.degree = degree;
		node.degree_centrality = degree as f64 / denom;
		node.betweenness_centrality = b;
	}
	debug!("centrality computed for {} nodes", graph.nodes.len());
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::society::model::{Edge, Node};

	fn star() -> GraphData {
		GraphData::new(
			["hub", "a", "b", "c"].into_iter().map(Node::new).collect(),
			vec![Edge::new("hub", "a"), Edge::new("hub", "b"), Edge::new("hub", "c")],
		)
	}

	#[test]
	fn star_hub_carries_all_brokerage() {
		let b = betweenness_centrality(&star());
		assert!((b[0] - 1.0).abs() < 1e-12);
		assert_eq!(&b[1..], &[0.0, 0.0, 0.0]);
	}

	#[test]
	fn line_middle_is_highest() {
		let g = GraphData::new(
			["a", "b", "c", "d"].into_iter().map(Node::new).collect(),
			vec![Edge::new("a", "b"), Edge::new("b", "c"), Edge::new("c", "d")],
		);
		let b = betweenness_centrality(&g);
		assert_eq!(b[0], 0.0);
		assert_eq!(b[3], 0.0);
		assert!((b[1] - 2.0 / 3.0).abs() < 1e-12);
		assert!((b[2] - 2.0 / 3.0).abs() < 1e-12);
	}

	#[test]
	fn enrich_fills_degrees() {
		let mut g = star();
		g.edges.push(Edge::new("hub", "a"));
		g.edges.push(Edge::new("b", "b"));
		enrich_centrality(&mut g);
		assert_eq!(g.nodes[0].degree, 3);
		assert_eq!(g.nodes[0].degree_centrality, 1.0);
		assert_eq!(g.nodes[2].degree, 1);
		assert!(g.nodes[0].betweenness_centrality > 0.99);
	}
}
