//! Node filters applied before rendering and querying.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use super::model::{GraphData, Node};

/// Closed numeric range `[lo, hi]`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Range {
	pub lo: f64,
	pub hi: f64,
}

impl Range {
	pub fn new(lo: f64, hi: f64) -> Self {
		if lo <= hi { Self { lo, hi } } else { Self { lo: hi, hi: lo } }
	}

	pub fn contains(&self, v: f64) -> bool {
		self.lo <= v && v <= self.hi
	}
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct GraphFilter {
	pub min_degree: u32,
	/// Empty means every cluster.
	pub clusters: BTreeSet<u32>,
	pub trait_ranges: BTreeMap<String, Range>,
	pub age: Option<Range>,
	/// Case-insensitive substring of the agent id.
	pub search: String,
}

impl GraphFilter {
	pub fn is_empty(&self) -> bool {
		*self == Self::default()
	}

	pub fn matches(&self, node: &Node) -> bool {
		if node.degree < self.min_degree {
			return false;
		}
		if !self.clusters.is_empty() && !node.cluster.is_some_and(|c| self.clusters.contains(&c)) {
			return false;
		}
		if let Some(range) = self.age {
			if !node.age.is_some_and(|a| range.contains(a)) {
				return false;
			}
		}
		let needle = self.search.trim().to_lowercase();
		if !needle.is_empty() && !node.agent_id.to_lowercase().contains(&needle) {
			return false;
		}
		self.trait_ranges
			.iter()
			.all(|(key, range)| node.trait_value(key).is_some_and(|v| range.contains(v)))
	}

	/// Update one bound of a trait range from raw text; unparsable input is
	/// ignored and the previous filter kept.
	pub fn set_trait_bound(&mut self, key: &str, raw: &str, upper: bool) {
		let Some(value) = parse_bound(raw) else {
			return;
		};
		let range = self
			.trait_ranges
			.entry(key.to_string())
			.or_insert(Range { lo: 0.0, hi: 1.0 });
		*range = if upper {
			Range::new(range.lo, value)
		} else {
			Range::new(value, range.hi)
		};
	}
}

/// Parse a numeric filter bound, rejecting blanks and non-finite values.
pub fn parse_bound(raw: &str) -> Option<f64> {
	raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Keep matching nodes and the edges between them.
pub fn apply_filter(graph: &GraphData, filter: &GraphFilter) -> GraphData {
	if filter.is_empty() {
		return graph.clone();
	}
	let nodes: Vec<Node> = graph.nodes.iter().filter(|n| filter.matches(n)).cloned().collect();
	let kept: HashSet<&str> = nodes.iter().map(|n| n.agent_id.as_str()).collect();
	let edges = graph
		.edges
		.iter()
		.filter(|e| kept.contains(e.source.as_str()) && kept.contains(e.target.as_str()))
		.cloned()
		.collect();
	GraphData {
		nodes,
		edges,
		metadata: graph.metadata.clone(),
	}
}
