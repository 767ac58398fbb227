//! Synthetic opinion-diffusion traces for exercising playback offline.

use std::collections::{BTreeMap, HashMap, HashSet};

use log::info;

use super::adjacency::Adjacency;
use super::model::{AgentId, AgentState, Edge, Frame, Node, PlaybackRun, RunMeta, RunSource};

/// Weight of the neighborhood average in each update.
pub const ALPHA: f64 = 0.15;
pub const SHOCK: f64 = 0.05;
/// Number of steps after frame 0 during which targets are pushed.
pub const SHOCK_STEPS: usize = 5;
const ADOPTION_RATE: f64 = 0.05;
const CLUSTER_BIAS_SPAN: f64 = 0.2;

/// 32-bit linear congruential generator.
#[derive(Clone, Debug)]
pub struct Lcg {
	state: u32,
}

impl Lcg {
	pub fn new(seed: u32) -> Self {
		Self { state: seed }
	}

	/// Next value in `[0, 1)`.
	pub fn next_f64(&mut self) -> f64 {
		self.state = self.state.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
		self.state as f64 / 4_294_967_296.0
	}
}

#[derive(Clone, Debug)]
pub struct DemoRunOptions {
	pub seed: u32,
	pub timesteps: usize,
	/// Agents receiving the initial push.
	pub targets: Vec<AgentId>,
	/// Scales the push; 1.0 gives the nominal shock.
	pub intensity: f64,
	pub name: String,
	pub created_at: u64,
}

impl Default for DemoRunOptions {
	fn default() -> Self {
		Self {
			seed: 42,
			timesteps: 30,
			targets: Vec::new(),
			intensity: 1.0,
			name: "Demo run".into(),
			created_at: 0,
		}
	}
}

pub(crate) fn sentiment(opinion: f64, adoption: f64) -> f64 {
	(0.5 * (opinion + 1.0) * 0.7 + adoption * 0.3).clamp(0.0, 1.0)
}

/// Generate `options.timesteps` frames; identical inputs give identical runs.
pub fn generate_demo_run(nodes: &[Node], edges: &[Edge], options: &DemoRunOptions) -> PlaybackRun {
	let mut rng = Lcg::new(options.seed);
	let adj = Adjacency::build(edges);

	let mut bias: HashMap<u32, f64> = HashMap::new();
	let mut current: BTreeMap<AgentId, AgentState> = BTreeMap::new();
	for node in nodes {
		let cluster = node.cluster.unwrap_or(0);
		let offset = *bias
			.entry(cluster)
			.or_insert_with(|| (rng.next_f64() - 0.5) * CLUSTER_BIAS_SPAN);
		let opinion = ((rng.next_f64() - 0.5) * 0.4 + offset).clamp(-0.2, 0.2);
		let adoption = rng.next_f64() * 0.1;
		current.insert(
			node.agent_id.clone(),
			AgentState {
				opinion,
				sentiment: sentiment(opinion, adoption),
				adoption,
			},
		);
	}

	let targeted: HashSet<&str> = options.targets.iter().map(String::as_str).collect();
	let near_target: HashSet<&str> = targeted
		.iter()
		.flat_map(|id| adj.neighbors(id).iter().map(|n| n.id.as_str()))
		.filter(|id| !targeted.contains(id))
		.collect();
	let intensity = if options.intensity.is_finite() {
		options.intensity.max(0.0)
	} else {
		1.0
	};

	let mut frames = Vec::with_capacity(options.timesteps);
	for t in 0..options.timesteps {
		if t > 0 {
			current = step(&current, &adj, t, &targeted, &near_target, intensity);
		}
		frames.push(Frame {
			t,
			agents: current.clone(),
		});
	}

	info!(
		"demo run generated: {} agents, {} frames, seed {}",
		nodes.len(),
		frames.len(),
		options.seed
	);
	PlaybackRun {
		id: format!("demo-{}-{}", options.seed, options.created_at),
		name: options.name.clone(),
		created_at: options.created_at,
		frames,
		meta: RunMeta {
			source: RunSource::Demo,
			seed: options.seed,
			timesteps: options.timesteps,
			target_ids: options.targets.clone(),
			trigger: None,
		},
	}
}

fn step(
	prev: &BTreeMap<AgentId, AgentState>,
	adj: &Adjacency,
	t: usize,
	targeted: &HashSet<&str>,
	near_target: &HashSet<&str>,
	intensity: f64,
) -> BTreeMap<AgentId, AgentState> {
	prev.iter()
		.map(|(id, state)| {
			let (mut total, mut weight) = (0.0, 0.0);
			for n in adj.neighbors(id) {
				if let Some(other) = prev.get(&n.id) {
					total += other.opinion * n.weight;
					weight += n.weight;
				}
			}
			let neighbor_avg = if weight > 0.0 { total / weight } else { state.opinion };

			let shock = if t > SHOCK_STEPS {
				0.0
			} else if targeted.contains(id.as_str()) {
				SHOCK * intensity
			} else if near_target.contains(id.as_str()) {
				SHOCK * intensity * 0.5
			} else {
				0.0
			};

			let opinion = ((1.0 - ALPHA) * state.opinion + ALPHA * neighbor_avg + shock).clamp(-1.0, 1.0);
			let adoption = (state.adoption + opinion.max(0.0) * ADOPTION_RATE).clamp(0.0, 1.0);
			(
				id.clone(),
				AgentState {
					opinion,
					sentiment: sentiment(opinion, adoption),
					adoption,
				},
			)
		})
		.collect()
}
