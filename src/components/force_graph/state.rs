use std::collections::{HashMap, HashSet};
use std::f64::consts::PI;

use force_graph::{DefaultNodeIdx, EdgeData, ForceGraph, NodeData, SimulationParameters};

use super::types::GraphView;
use crate::society::model::edge_key;

pub const HIT_RADIUS: f64 = 12.0;

#[derive(Clone, Debug, Default)]
pub struct NodeInfo {
	pub id: String,
	pub label: Option<String>,
	pub color: String,
	pub radius: f64,
}

#[derive(Clone, Debug, Default)]
pub struct ViewTransform {
	pub x: f64,
	pub y: f64,
	pub k: f64,
}

#[derive(Clone, Debug, Default)]
pub struct DragState {
	pub active: bool,
	pub node_idx: Option<DefaultNodeIdx>,
	pub start_x: f64,
	pub start_y: f64,
	pub node_start_x: f32,
	pub node_start_y: f32,
}

#[derive(Clone, Debug, Default)]
pub struct PanState {
	pub active: bool,
	pub start_x: f64,
	pub start_y: f64,
	pub transform_start_x: f64,
	pub transform_start_y: f64,
}

#[derive(Clone, Debug, Default)]
pub struct HoverState {
	pub node: Option<DefaultNodeIdx>,
	pub neighbors: HashSet<DefaultNodeIdx>,
	pub highlight_t: f64,
	pub prev_node: Option<DefaultNodeIdx>,
	pub prev_neighbors: HashSet<DefaultNodeIdx>,
	delay_t: f64,
}

pub struct ForceGraphState {
	pub graph: ForceGraph<NodeInfo, f64>,
	pub transform: ViewTransform,
	pub drag: DragState,
	pub pan: PanState,
	pub hover: HoverState,
	pub width: f64,
	pub height: f64,
	pub animation_running: bool,
	/// Query result nodes and edge keys, drawn on top.
	pub focus_nodes: HashSet<DefaultNodeIdx>,
	pub focus_links: HashSet<String>,
	view: GraphView,
	id_to_idx: HashMap<String, DefaultNodeIdx>,
	edges: Vec<(DefaultNodeIdx, DefaultNodeIdx)>,
}

fn new_layout() -> ForceGraph<NodeInfo, f64> {
	ForceGraph::new(SimulationParameters {
		force_charge: 150.0,
		force_spring: 0.05,
		force_max: 100.0,
		node_speed: 3000.0,
		damping_factor: 0.9,
	})
}

impl ForceGraphState {
	pub fn new(view: &GraphView, width: f64, height: f64) -> Self {
		let mut state = Self {
			graph: new_layout(),
			transform: ViewTransform {
				x: width / 2.0,
				y: height / 2.0,
				k: 1.0,
			},
			drag: DragState::default(),
			pan: PanState::default(),
			hover: HoverState::default(),
			width,
			height,
			animation_running: true,
			focus_nodes: HashSet::new(),
			focus_links: HashSet::new(),
			view: GraphView::default(),
			id_to_idx: HashMap::new(),
			edges: Vec::new(),
		};
		state.rebuild(view);
		state
	}

	fn rebuild(&mut self, view: &GraphView) {
		let mut graph = new_layout();
		let mut id_to_idx = HashMap::new();
		let mut edges = Vec::new();

		for (i, node) in view.nodes.iter().enumerate() {
			let angle = (i as f64) * 2.0 * PI / view.nodes.len() as f64;
			let (x, y) = ((100.0 * angle.cos()) as f32, (100.0 * angle.sin()) as f32);
			let idx = graph.add_node(NodeData {
				x,
				y,
				mass: 10.0,
				is_anchor: false,
				user_data: NodeInfo {
					id: node.id.clone(),
					label: node.label.clone(),
					color: node.color.clone(),
					radius: node.radius,
				},
			});
			id_to_idx.insert(node.id.clone(), idx);
		}

		for link in &view.links {
			if let (Some(&src), Some(&tgt)) = (id_to_idx.get(&link.source), id_to_idx.get(&link.target)) {
				graph.add_edge(
					src,
					tgt,
					EdgeData {
						user_data: link.weight,
					},
				);
				edges.push((src, tgt));
			}
		}

		self.graph = graph;
		self.id_to_idx = id_to_idx;
		self.edges = edges;
		self.hover = HoverState::default();
		self.drag = DragState::default();
		self.set_focus(view);
		self.view = view.clone();
	}

	/// Show `view`, keeping the layout when only styling changed.
	pub fn apply(&mut self, view: &GraphView) {
		if !self.view.same_topology(view) {
			self.rebuild(view);
			return;
		}
		let styles: HashMap<&str, (&str, f64)> = view
			.nodes
			.iter()
			.map(|n| (n.id.as_str(), (n.color.as_str(), n.radius)))
			.collect();
		self.graph.visit_nodes_mut(|node| {
			let info = &mut node.data.user_data;
			if let Some(&(color, radius)) = styles.get(info.id.as_str()) {
				info.color.clear();
				info.color.push_str(color);
				info.radius = radius;
			}
		});
		self.set_focus(view);
		self.view = view.clone();
	}

	fn set_focus(&mut self, view: &GraphView) {
		self.focus_nodes = view
			.focus_nodes
			.iter()
			.filter_map(|id| self.id_to_idx.get(id).copied())
			.collect();
		self.focus_links = view.focus_links.clone();
	}

	pub fn screen_to_graph(&self, sx: f64, sy: f64) -> (f64, f64) {
		(
			(sx - self.transform.x) / self.transform.k,
			(sy - self.transform.y) / self.transform.k,
		)
	}

	pub fn node_at_position(&self, sx: f64, sy: f64) -> Option<DefaultNodeIdx> {
		let (gx, gy) = self.screen_to_graph(sx, sy);
		let mut found = None;
		self.graph.visit_nodes(|node| {
			let (dx, dy) = (node.x() as f64 - gx, node.y() as f64 - gy);
			// world-space, scales with zoom like nodes
			let hit = HIT_RADIUS.max(node.data.user_data.radius);
			if (dx * dx + dy * dy).sqrt() < hit {
				found = Some(node.index());
			}
		});
		found
	}

	pub fn node_id(&self, idx: DefaultNodeIdx) -> Option<String> {
		let mut id = None;
		self.graph.visit_nodes(|node| {
			if node.index() == idx {
				id = Some(node.data.user_data.id.clone());
			}
		});
		id
	}

	pub fn set_hover(&mut self, node: Option<DefaultNodeIdx>) {
		if self.hover.node == node {
			return;
		}
		let was_hovering = self.hover.node.is_some();

		// keep the old set around while it fades out
		if was_hovering && node.is_none() {
			self.hover.prev_node = self.hover.node.take();
			self.hover.prev_neighbors = std::mem::take(&mut self.hover.neighbors);
		} else {
			self.hover.prev_node = None;
			self.hover.prev_neighbors.clear();
		}

		self.hover.node = node;
		self.hover.neighbors.clear();

		if let Some(idx) = node {
			if !was_hovering {
				self.hover.delay_t = 0.0;
			}
			for &(src, tgt) in &self.edges {
				if src == idx {
					self.hover.neighbors.insert(tgt);
				} else if tgt == idx {
					self.hover.neighbors.insert(src);
				}
			}
		}
	}

	pub fn is_highlighted(&self, idx: DefaultNodeIdx) -> bool {
		self.focus_nodes.contains(&idx)
			|| self.hover.node == Some(idx)
			|| self.hover.neighbors.contains(&idx)
			|| self.hover.prev_node == Some(idx)
			|| self.hover.prev_neighbors.contains(&idx)
	}

	pub fn is_focus_link(&self, a: &NodeInfo, b: &NodeInfo) -> bool {
		!self.focus_links.is_empty() && self.focus_links.contains(&edge_key(&a.id, &b.id))
	}

	pub fn is_hovered(&self, idx: DefaultNodeIdx) -> bool {
		self.hover.node == Some(idx) || self.hover.prev_node == Some(idx)
	}

	pub fn has_active_highlight(&self) -> bool {
		!self.focus_nodes.is_empty() || self.hover.node.is_some() || self.hover.prev_node.is_some()
	}

	pub fn tick(&mut self, dt: f32) {
		self.graph.update(dt);

		let active = self.hover.node.is_some() || !self.focus_nodes.is_empty();
		let (target, delay, speed) = if active { (1.0, 0.08, 1.8) } else { (0.0, 0.0, 1.26) };

		if self.hover.node.is_some() {
			self.hover.delay_t = (self.hover.delay_t + dt as f64).min(delay);
			if self.hover.delay_t >= delay {
				self.hover.highlight_t += (target - self.hover.highlight_t) * speed * dt as f64;
			}
		} else {
			self.hover.highlight_t += (target - self.hover.highlight_t) * speed * dt as f64;
			if !active && self.hover.highlight_t < 0.01 {
				self.hover.highlight_t = 0.0;
				self.hover.prev_node = None;
				self.hover.prev_neighbors.clear();
			}
		}
	}
}
