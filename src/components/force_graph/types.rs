use std::collections::{BTreeSet, HashSet};

use crate::society::encoding::{ColorMode, node_color, node_radius};
use crate::society::model::{Frame, GraphData};

#[derive(Clone, Debug, PartialEq)]
pub struct GraphNode {
	pub id: String,
	pub label: Option<String>,
	pub color: String,
	pub radius: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct GraphLink {
	pub source: String,
	pub target: String,
	pub weight: f64,
}

/// Nodes and edges singled out by a path or neighborhood query.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Focus {
	pub nodes: BTreeSet<String>,
	pub edges: BTreeSet<String>,
}

/// Everything the canvas needs to draw one state of the explorer.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GraphView {
	pub nodes: Vec<GraphNode>,
	pub links: Vec<GraphLink>,
	pub focus_nodes: HashSet<String>,
	pub focus_links: HashSet<String>,
}

impl GraphView {
	pub fn build(graph: &GraphData, mode: ColorMode, frame: Option<&Frame>, focus: &Focus) -> Self {
		let nodes = graph
			.nodes
			.iter()
			.map(|node| {
				let state = frame.and_then(|f| f.agents.get(&node.agent_id));
				GraphNode {
					id: node.agent_id.clone(),
					label: Some(node.agent_id.clone()),
					color: node_color(node, mode, state),
					radius: node_radius(node),
				}
			})
			.collect();
		let links = graph
			.edges
			.iter()
			.map(|e| GraphLink {
				source: e.source.clone(),
				target: e.target.clone(),
				weight: e.effective_weight(),
			})
			.collect();
		Self {
			nodes,
			links,
			focus_nodes: focus.nodes.iter().cloned().collect(),
			focus_links: focus.edges.iter().cloned().collect(),
		}
	}

	/// Whether `other` has the same nodes and links, ignoring styling.
	pub fn same_topology(&self, other: &GraphView) -> bool {
		self.nodes.len() == other.nodes.len()
			&& self.links.len() == other.links.len()
			&& self.nodes.iter().zip(&other.nodes).all(|(a, b)| a.id == b.id)
			&& self
				.links
				.iter()
				.zip(&other.links)
				.all(|(a, b)| a.source == b.source && a.target == b.target)
	}
}

#[cfg(test)]
mod tests {
	use std::collections::BTreeMap;

	use super::*;
	use crate::society::encoding::{NEUTRAL, opinion_color};
	use crate::society::model::{AgentState, Edge, Node};

	fn graph() -> GraphData {
		GraphData::new(
			vec![Node::new("a"), Node::new("b")],
			vec![Edge::new("a", "b")],
		)
	}

	#[test]
	fn opinion_mode_reads_the_frame() {
		let frame = Frame {
			t: 0,
			agents: BTreeMap::from([(
				"a".to_string(),
				AgentState {
					opinion: 1.0,
					..Default::default()
				},
			)]),
		};
		let view = GraphView::build(&graph(), ColorMode::Opinion, Some(&frame), &Focus::default());
		assert_eq!(view.nodes[0].color, opinion_color(1.0));
		assert_eq!(view.nodes[1].color, NEUTRAL);
	}

	#[test]
	fn restyle_keeps_topology() {
		let g = graph();
		let focus = Focus {
			nodes: BTreeSet::from(["a".to_string()]),
			edges: BTreeSet::new(),
		};
		let plain = GraphView::build(&g, ColorMode::Cluster, None, &Focus::default());
		let focused = GraphView::build(&g, ColorMode::Age, None, &focus);
		assert!(plain.same_topology(&focused));
		assert!(focused.focus_nodes.contains("a"));

		let mut bigger = g.clone();
		bigger.nodes.push(Node::new("c"));
		let grown = GraphView::build(&bigger, ColorMode::Cluster, None, &Focus::default());
		assert!(!plain.same_topology(&grown));
	}
}
