use std::collections::{BTreeMap, BTreeSet};

use society_explorer::society::experiments::STORAGE_KEY;
use society_explorer::society::playback::Playback;
use society_explorer::society::sample::sample_society;
use society_explorer::society::{
	Adjacency, AgentState, DemoRunOptions, Edge, Experiment, ExperimentBook, ExperimentDraft, Frame, GraphFilter,
	KeyValueStore, MemoryStore, Node, Severity, TargetMode, TargetParams, apply_filter, bfs_shortest_path,
	compute_live_metrics, compute_structural_metrics, compute_targets, derive_insights, generate_demo_run, gini,
	k_hop_neighborhood,
};

fn line() -> (Vec<Node>, Vec<Edge>) {
	let ids = ["A", "B", "C", "D", "E"];
	let nodes = ids.iter().map(|id| Node::new(*id)).collect();
	let edges = ids.windows(2).map(|w| Edge::new(w[0], w[1])).collect();
	(nodes, edges)
}

fn ids(items: &[&str]) -> BTreeSet<String> {
	items.iter().map(|s| s.to_string()).collect()
}

#[test]
fn line_graph_path_and_neighborhood() {
	let (_, edges) = line();
	let adj = Adjacency::build(&edges);

	let path = bfs_shortest_path(&adj, "A", "E").unwrap();
	assert_eq!(path, vec!["A", "B", "C", "D", "E"]);
	assert_eq!(path.len(), 5);

	assert_eq!(k_hop_neighborhood(&adj, "C", 1), ids(&["B", "C", "D"]));
	assert_eq!(k_hop_neighborhood(&adj, "C", 0), ids(&["C"]));
	assert_eq!(k_hop_neighborhood(&adj, "C", 9).len(), 5);
}

#[test]
fn disconnected_components_have_no_path() {
	let edges = vec![Edge::new("a", "b"), Edge::new("x", "y")];
	let adj = Adjacency::build(&edges);
	assert_eq!(bfs_shortest_path(&adj, "a", "y"), None);
	assert_eq!(bfs_shortest_path(&adj, "x", "x"), Some(vec!["x".to_string()]));
}

#[test]
fn two_node_influence_gini_is_half() {
	let mut hub = Node::new("hub");
	hub.traits.insert("social_influence".into(), 1.0);
	let mut leaf = Node::new("leaf");
	leaf.traits.insert("social_influence".into(), 0.0);

	let m = compute_structural_metrics(&[hub, leaf], &[Edge::new("hub", "leaf")]);
	assert_eq!(m.gini_influence, 0.5);
	assert_eq!(gini(&[1.0, 0.0]), 0.5);
	assert_eq!(m.agent_count, 2);
	assert_eq!(m.density, 1.0);
}

#[test]
fn opposed_agents_are_fully_polarized() {
	let agents = BTreeMap::from([
		(
			"a".to_string(),
			AgentState {
				opinion: -1.0,
				..Default::default()
			},
		),
		(
			"b".to_string(),
			AgentState {
				opinion: 1.0,
				..Default::default()
			},
		),
	]);
	let live = compute_live_metrics(&Frame { t: 0, agents }, &[Node::new("a"), Node::new("b")]);
	assert_eq!(live.mean_opinion, 0.0);
	assert_eq!(live.polarization, 1.0);
	assert!(
		derive_insights(&Default::default(), Some(&live))
			.iter()
			.any(|i| i.title == "Polarized population" && i.severity == Severity::Risk)
	);
}

#[test]
fn empty_population_metrics_are_zero() {
	let m = compute_structural_metrics(&[], &[]);
	assert_eq!(m.agent_count, 0);
	assert_eq!(m.density, 0.0);
	assert_eq!(m.cohesion, 0.0);
}

#[test]
fn targeting_everyone_returns_every_node() {
	let graph = sample_society(40, 3);
	let experiment = Experiment {
		target_mode: TargetMode::All,
		..Default::default()
	};
	let targets = compute_targets(&experiment, &graph.nodes, &[]);
	assert_eq!(targets.len(), graph.nodes.len());
	assert!(targets.iter().all(|t| graph.node(t).is_some()));
}

#[test]
fn experiment_targets_bias_the_demo_run() {
	let graph = sample_society(60, 11);
	let mut book = ExperimentBook::default();
	let id = book
		.create(ExperimentDraft {
			name: "brokers".into(),
			target_mode: TargetMode::BridgeNodes,
			target_params: TargetParams {
				top_n: Some(5),
				..Default::default()
			},
			intensity: 1.0,
			..Default::default()
		})
		.id
		.clone();
	let targets = book.targets(&id, &graph.nodes, &graph.edges).unwrap();
	assert_eq!(targets.len(), 5);

	let options = |targets: Vec<String>| DemoRunOptions {
		seed: 7,
		timesteps: 11,
		targets,
		..Default::default()
	};
	let baseline = generate_demo_run(&graph.nodes, &graph.edges, &options(Vec::new()));
	let shocked = generate_demo_run(&graph.nodes, &graph.edges, &options(targets.clone()));
	let last = |run: &society_explorer::society::PlaybackRun, id: &str| run.frames[10].agents[id].opinion;
	for t in &targets {
		assert!(last(&shocked, t) > last(&baseline, t));
	}

	let mut store = MemoryStore::default();
	book.save(&mut store).unwrap();
	assert!(store.get(STORAGE_KEY).is_some());
	let restored = ExperimentBook::load(&store);
	assert_eq!(restored.experiments().len(), 1);
	assert_eq!(restored.get(&id).unwrap().name, "brokers");
}

#[test]
fn demo_runs_are_reproducible_and_play_back() {
	let graph = sample_society(50, 5);
	let options = DemoRunOptions {
		seed: 99,
		timesteps: 12,
		..Default::default()
	};
	let a = generate_demo_run(&graph.nodes, &graph.edges, &options);
	let b = generate_demo_run(&graph.nodes, &graph.edges, &options);
	assert_eq!(a.frames, b.frames);
	assert_eq!(a.frames.len(), 12);

	let mut playback = Playback::new(a, 100.0);
	playback.play();
	assert!(playback.tick(100.0));
	assert_eq!(playback.index(), 1);
	playback.seek(100);
	assert_eq!(playback.index(), 11);
	assert!(playback.at_end());
}

#[test]
fn filtering_keeps_only_edges_between_survivors() {
	let graph = sample_society(80, 2);
	let filter = GraphFilter {
		min_degree: 3,
		..Default::default()
	};
	let shown = apply_filter(&graph, &filter);
	assert!(shown.nodes.iter().all(|n| n.degree >= 3));
	assert!(
		shown
			.edges
			.iter()
			.all(|e| shown.node(&e.source).is_some() && shown.node(&e.target).is_some())
	);
}

#[test]
fn live_metrics_follow_the_filtered_population() {
	let graph = sample_society(80, 2);
	let run = generate_demo_run(
		&graph.nodes,
		&graph.edges,
		&DemoRunOptions {
			seed: 4,
			timesteps: 3,
			..Default::default()
		},
	);
	let shown = apply_filter(
		&graph,
		&GraphFilter {
			min_degree: 3,
			..Default::default()
		},
	);
	assert!(shown.nodes.len() < graph.nodes.len());

	let frame = &run.frames[2];
	let live = compute_live_metrics(&frame.restricted_to(&shown.nodes), &shown.nodes);
	let structural = compute_structural_metrics(&shown.nodes, &shown.edges);
	assert_eq!(live.agent_count, shown.nodes.len());
	assert_eq!(live.agent_count, structural.agent_count);
}
