use std::collections::BTreeSet;
use std::time::Duration;

use leptos::ev;
use leptos::prelude::*;
use leptos::task::spawn_local;
use log::{debug, info, warn};
use wasm_bindgen_futures::JsFuture;

use crate::api::{ApiClient, NodeDetail};
use crate::components::force_graph::{Focus, ForceGraphCanvas, GraphView};
use crate::config::ExplorerConfig;
use crate::society::centrality::enrich_centrality;
use crate::society::encoding::ColorMode;
use crate::society::experiments::{ExperimentBook, ExperimentDraft, ExperimentPatch, LocalStorage};
use crate::society::filters::{GraphFilter, apply_filter, parse_bound};
use crate::society::insights::{Insight, derive_insights};
use crate::society::metrics::{LiveMetrics, StructuralMetrics, compute_live_metrics, compute_structural_metrics};
use crate::society::model::{GraphData, SOCIAL_INFLUENCE};
use crate::society::neighborhood::{k_hop_neighborhood, neighborhood_edge_keys};
use crate::society::paths::{InfluenceIndex, bfs_shortest_path, influence_path, path_edge_keys};
use crate::society::playback::Playback;
use crate::society::sample::sample_society;
use crate::society::targeting::{InterventionType, TargetMode, TargetParams, parse_manual_ids};
use crate::society::{Adjacency, DemoRunOptions, generate_demo_run};

/// Playback timer period.
const TICK: Duration = Duration::from_millis(100);

fn now_ms() -> u64 {
	js_sys::Date::now() as u64
}

fn persist(book: &ExperimentBook) {
	match LocalStorage::open() {
		Ok(mut store) => {
			if let Err(e) = book.save(&mut store) {
				warn!("experiments not saved: {e}");
			}
		}
		Err(e) => warn!("experiments not saved: {e}"),
	}
}

fn load_book() -> ExperimentBook {
	match LocalStorage::open() {
		Ok(store) => ExperimentBook::load(&store),
		Err(e) => {
			warn!("starting with no experiments: {e}");
			ExperimentBook::default()
		}
	}
}

/// Server graphs may arrive without centrality; fill it in locally.
fn prepare(mut graph: GraphData) -> GraphData {
	let missing = graph
		.nodes
		.iter()
		.all(|n| n.degree == 0 && n.betweenness_centrality == 0.0);
	if missing && !graph.edges.is_empty() {
		enrich_centrality(&mut graph);
	}
	graph
}

/// Explorer page: graph canvas plus playback, queries, metrics and experiments.
#[component]
pub fn Home() -> impl IntoView {
	let config = use_context::<ExplorerConfig>().unwrap_or_else(ExplorerConfig::load);
	let seed_graph = sample_society(config.sample_agents, config.demo_seed);
	let seed_run = generate_demo_run(
		&seed_graph.nodes,
		&seed_graph.edges,
		&DemoRunOptions {
			seed: config.demo_seed,
			timesteps: config.demo_timesteps,
			created_at: now_ms(),
			..Default::default()
		},
	);

	let graph = RwSignal::new(seed_graph);
	let playback = RwSignal::new(Playback::new(seed_run, config.frame_interval_ms));
	let filter = RwSignal::new(GraphFilter::default());
	let color_mode = RwSignal::new(ColorMode::Cluster);
	let focus = RwSignal::new(Focus::default());
	let book = RwSignal::new(load_book());
	let status = RwSignal::new(None::<String>);
	let config = StoredValue::new(config);

	let visible = Memo::new(move |_| filter.with(|f| graph.with(|g| apply_filter(g, f))));
	let structural = Memo::new(move |_| visible.with(|g| compute_structural_metrics(&g.nodes, &g.edges)));
	// both metric groups describe the agents left after filtering
	let live = Memo::new(move |_| {
		visible.with(|g| {
			playback.with(|p| {
				p.current_frame()
					.map(|f| compute_live_metrics(&f.restricted_to(&g.nodes), &g.nodes))
			})
		})
	});
	let insights = Memo::new(move |_| live.with(|l| structural.with(|s| derive_insights(s, l.as_ref()))));
	let graph_view = Signal::derive(move || {
		visible.with(|g| {
			playback.with(|p| focus.with(|f| GraphView::build(g, color_mode.get(), p.current_frame(), f)))
		})
	});

	match set_interval_with_handle(
		move || {
			if !playback.with_untracked(Playback::is_playing) {
				return;
			}
			let changed = playback.update_untracked(|p| p.tick(TICK.as_secs_f64() * 1000.0));
			if changed {
				playback.notify();
			}
		},
		TICK,
	) {
		Ok(handle) => on_cleanup(move || handle.clear()),
		Err(e) => warn!("playback timer unavailable: {e:?}"),
	}

	let swap_graph = move |next: GraphData| {
		info!("graph swapped: {} nodes, {} edges", next.nodes.len(), next.edges.len());
		graph.set(next);
		focus.set(Focus::default());
		book.update(|b| b.invalidate_targets());
	};

	let selected = RwSignal::new(None::<NodeDetail>);
	let detail_from_server = RwSignal::new(false);
	let select_node = move |id: String| {
		focus.set(Focus {
			nodes: BTreeSet::from([id.clone()]),
			edges: BTreeSet::new(),
		});
		selected.set(graph.with_untracked(|g| NodeDetail::local(g, &id)));
		detail_from_server.set(false);

		let client = ApiClient::new(config.with_value(|c| c.api_base_url.clone()));
		spawn_local(async move {
			match client.fetch_node(&id).await {
				// a later click may have replaced the selection meanwhile
				Ok(detail) if selected.with_untracked(|d| d.as_ref().is_some_and(|d| d.node.agent_id == id)) => {
					selected.set(Some(detail));
					detail_from_server.set(true);
				}
				Ok(_) => {}
				Err(e) => debug!("node {id} detail from local graph: {e}"),
			}
		});
	};

	view! {
		<div class="explorer">
			<div class="graph-pane">
				<ForceGraphCanvas view=graph_view on_select=select_node />
				<div class="graph-overlay">
					<h1>"Society Explorer"</h1>
					<p class="subtitle">
						{move || {
							visible.with(|g| format!("{} agents, {} ties shown", g.nodes.len(), g.edges.len()))
						}}
					</p>
					<Show when=move || status.with(Option::is_some)>
						<p class="status" on:click=move |_| status.set(None)>
							{move || status.get().unwrap_or_default()}
						</p>
					</Show>
				</div>
			</div>
			<aside class="side-panel">
				<NodePanel selected=selected from_server=detail_from_server />
				<PlaybackControls playback=playback color_mode=color_mode />
				<QueryPanel visible=visible focus=focus status=status />
				<FilterPanel filter=filter />
				<MetricsPanel structural=structural live=live insights=insights />
				<ExperimentsPanel book=book graph=graph playback=playback focus=focus config=config />
				<SimulationPanel
					config=config
					playback=playback
					status=status
					swap_graph=Callback::new(swap_graph)
				/>
			</aside>
		</div>
	}
}

#[component]
fn NodePanel(selected: RwSignal<Option<NodeDetail>>, from_server: RwSignal<bool>) -> impl IntoView {
	view! {
		<Show when=move || selected.with(Option::is_some)>
			<section class="panel">
				{move || {
					selected
						.get()
						.map(|d| {
							let source = if from_server.get() { "server" } else { "local graph" };
							view! {
								<h2>{format!("Agent {}", d.node.agent_id)}</h2>
								<p class="note">
									{format!(
										"degree {}, cluster {}, influence {:.2} ({source})",
										d.node.degree,
										d.node.cluster.map_or_else(|| "-".to_string(), |c| c.to_string()),
										d.node.influence(),
									)}
								</p>
								<ul class="neighbors">
									{d
										.neighbors
										.into_iter()
										.map(|n| {
											view! {
												<li>{format!("{} (weight {:.2}, degree {})", n.agent_id, n.weight, n.degree)}</li>
											}
										})
										.collect_view()}
								</ul>
							}
						})
				}}
				<button on:click=move |_| selected.set(None)>"Close"</button>
			</section>
		</Show>
	}
}

#[component]
fn PlaybackControls(playback: RwSignal<Playback>, color_mode: RwSignal<ColorMode>) -> impl IntoView {
	let index = Memo::new(move |_| playback.with(Playback::index));
	let count = Memo::new(move |_| playback.with(Playback::frame_count));
	let playing = Memo::new(move |_| playback.with(Playback::is_playing));

	view! {
		<section class="panel">
			<h2>"Playback"</h2>
			<div class="row">
				<button on:click=move |_| playback.update(Playback::step_back)>"‹"</button>
				<button on:click=move |_| playback.update(Playback::toggle)>
					{move || if playing.get() { "Pause" } else { "Play" }}
				</button>
				<button on:click=move |_| playback.update(Playback::step_forward)>"›"</button>
				<span>{move || format!("t = {} / {}", index.get(), count.get().saturating_sub(1))}</span>
			</div>
			<input
				type="range"
				min="0"
				max=move || count.get().saturating_sub(1).to_string()
				prop:value=move || index.get().to_string()
				on:input=move |ev| {
					if let Ok(i) = event_target_value(&ev).parse::<usize>() {
						playback.update(|p| p.seek(i));
					}
				}
			/>
			<div class="row">
				<label>"Speed "</label>
				<select on:change=move |ev| {
					if let Some(speed) = parse_bound(&event_target_value(&ev)) {
						playback.update(|p| p.set_speed(speed));
					}
				}>
					<option value="0.5">"0.5×"</option>
					<option value="1" selected=true>"1×"</option>
					<option value="2">"2×"</option>
					<option value="4">"4×"</option>
				</select>
				<label>" Colour "</label>
				<select on:change=move |ev| {
					if let Some(mode) = ColorMode::from_key(&event_target_value(&ev)) {
						color_mode.set(mode);
					}
				}>
					{ColorMode::ALL
						.into_iter()
						.map(|mode| view! { <option value=mode.key()>{mode.key()}</option> })
						.collect_view()}
				</select>
			</div>
		</section>
	}
}

#[component]
fn QueryPanel(
	visible: Memo<GraphData>,
	focus: RwSignal<Focus>,
	status: RwSignal<Option<String>>,
) -> impl IntoView {
	let from = RwSignal::new(String::new());
	let to = RwSignal::new(String::new());
	let hops = RwSignal::new(1usize);

	let show_path = move |weighted: bool| {
		let (a, b) = (from.get_untracked(), to.get_untracked());
		let path = visible.with_untracked(|g| {
			let adj = Adjacency::build(&g.edges);
			if weighted {
				influence_path(&adj, &InfluenceIndex::from_nodes(&g.nodes), a.trim(), b.trim())
			} else {
				bfs_shortest_path(&adj, a.trim(), b.trim())
			}
		});
		match path {
			Some(path) => {
				status.set(Some(format!("path of {} hops", path.len().saturating_sub(1))));
				focus.set(Focus {
					edges: path_edge_keys(&path),
					nodes: path.into_iter().collect(),
				});
			}
			None => {
				status.set(Some(format!("no path between {a} and {b}")));
				focus.set(Focus::default());
			}
		}
	};

	let show_neighborhood = move |_| {
		let center = from.get_untracked();
		let k = hops.get_untracked();
		let (nodes, edges) = visible.with_untracked(|g| {
			let adj = Adjacency::build(&g.edges);
			let nodes = k_hop_neighborhood(&adj, center.trim(), k);
			let edges = neighborhood_edge_keys(&adj, &nodes);
			(nodes, edges)
		});
		status.set(Some(format!("{} agents within {k} hops of {center}", nodes.len())));
		focus.set(Focus { nodes, edges });
	};

	view! {
		<section class="panel">
			<h2>"Explore"</h2>
			<input
				type="text"
				placeholder="from / center"
				prop:value=move || from.get()
				on:input=move |ev| from.set(event_target_value(&ev))
			/>
			<input
				type="text"
				placeholder="to"
				prop:value=move || to.get()
				on:input=move |ev| to.set(event_target_value(&ev))
			/>
			<div class="row">
				<button on:click=move |_| show_path(false)>"Shortest path"</button>
				<button on:click=move |_| show_path(true)>"Influence path"</button>
			</div>
			<div class="row">
				<input
					type="number"
					min="0"
					max="6"
					prop:value=move || hops.get().to_string()
					on:input=move |ev| {
						if let Ok(k) = event_target_value(&ev).parse::<usize>() {
							hops.set(k.min(6));
						}
					}
				/>
				<button on:click=show_neighborhood>"Neighborhood"</button>
				<button on:click=move |_| focus.set(Focus::default())>"Clear"</button>
			</div>
		</section>
	}
}

#[component]
fn FilterPanel(filter: RwSignal<GraphFilter>) -> impl IntoView {
	let set_min_degree = move |ev: ev::Event| {
		if let Some(v) = parse_bound(&event_target_value(&ev)) {
			filter.update(|f| f.min_degree = v.max(0.0) as u32);
		}
	};
	let set_influence = move |upper: bool| {
		move |ev: ev::Event| {
			let raw = event_target_value(&ev);
			filter.update(|f| f.set_trait_bound(SOCIAL_INFLUENCE, &raw, upper));
		}
	};

	view! {
		<section class="panel">
			<h2>"Filter"</h2>
			<input
				type="text"
				placeholder="search id"
				on:input=move |ev| filter.update(|f| f.search = event_target_value(&ev))
			/>
			<div class="row">
				<label>"Min degree "</label>
				<input type="number" min="0" on:change=set_min_degree />
			</div>
			<div class="row">
				<label>"Influence "</label>
				<input type="number" step="0.05" placeholder="0" on:change=set_influence(false) />
				<input type="number" step="0.05" placeholder="1" on:change=set_influence(true) />
			</div>
			<button on:click=move |_| filter.set(GraphFilter::default())>"Reset filters"</button>
		</section>
	}
}

#[component]
fn MetricsPanel(
	structural: Memo<StructuralMetrics>,
	live: Memo<Option<LiveMetrics>>,
	insights: Memo<Vec<Insight>>,
) -> impl IntoView {
	view! {
		<section class="panel">
			<h2>"Metrics"</h2>
			<p class="note">
				{move || format!("over the {} agents shown", structural.with(|s| s.agent_count))}
			</p>
			<dl>
				{move || {
					let s = structural.get();
					view! {
						<dt>"Density"</dt><dd>{format!("{:.4}", s.density)}</dd>
						<dt>"Cohesion"</dt><dd>{format!("{:.2}", s.cohesion)}</dd>
						<dt>"Influence Gini"</dt><dd>{format!("{:.2}", s.gini_influence)}</dd>
						<dt>"Top 5% brokerage"</dt><dd>{format!("{:.2}", s.top5_betweenness_share)}</dd>
					}
				}}
				{move || {
					live.get()
						.map(|l| {
							view! {
								<dt>"Mean opinion"</dt><dd>{format!("{:+.2}", l.mean_opinion)}</dd>
								<dt>"Polarization"</dt><dd>{format!("{:.2}", l.polarization)}</dd>
								<dt>"Mean adoption"</dt><dd>{format!("{:.2}", l.mean_adoption)}</dd>
								<dt>"Opinion Gini"</dt><dd>{format!("{:.2}", l.gini_opinion)}</dd>
							}
						})
				}}
			</dl>
			<ul class="insights">
				{move || {
					insights
						.get()
						.into_iter()
						.map(|i| {
							view! {
								<li class=i.severity.label()>
									<strong>{i.title}</strong>
									" "
									{i.detail}
								</li>
							}
						})
						.collect_view()
				}}
			</ul>
		</section>
	}
}

#[component]
fn ExperimentsPanel(
	book: RwSignal<ExperimentBook>,
	graph: RwSignal<GraphData>,
	playback: RwSignal<Playback>,
	focus: RwSignal<Focus>,
	config: StoredValue<ExplorerConfig>,
) -> impl IntoView {
	let default_top_n = config.with_value(|c| c.default_top_n).to_string();
	let editing = RwSignal::new(None::<String>);
	let name = RwSignal::new(String::new());
	let kind = RwSignal::new(InterventionType::Message);
	let content = RwSignal::new(String::new());
	let mode = RwSignal::new(TargetMode::TopInfluencers);
	let top_n = RwSignal::new(default_top_n.clone());
	let manual_ids = RwSignal::new(String::new());
	let intensity = RwSignal::new(String::from("1"));

	let reset = move || {
		editing.set(None);
		name.set(String::new());
		kind.set(InterventionType::Message);
		content.set(String::new());
		mode.set(TargetMode::TopInfluencers);
		top_n.set(default_top_n.clone());
		manual_ids.set(String::new());
		intensity.set(String::from("1"));
	};
	let reset = StoredValue::new(reset);

	let draft = move || ExperimentDraft {
		name: name.get_untracked(),
		intervention_type: kind.get_untracked(),
		content: content.get_untracked(),
		target_mode: mode.get_untracked(),
		target_params: TargetParams {
			top_n: top_n.get_untracked().trim().parse().ok(),
			manual_ids: parse_manual_ids(&manual_ids.get_untracked()),
			..Default::default()
		},
		intensity: parse_bound(&intensity.get_untracked()).unwrap_or(1.0),
	};

	let save = move |_| {
		let draft = draft();
		book.update(|b| {
			match editing.get_untracked() {
				Some(id) => {
					if !b.patch(&id, ExperimentPatch::from(draft)) {
						warn!("experiment {id} vanished before saving");
					}
				}
				None => {
					b.create(draft);
				}
			}
			persist(b);
		});
		reset.with_value(|r| r());
	};

	let edit = move |id: String| {
		let Some(d) = book.with_untracked(|b| b.get(&id).map(ExperimentDraft::from_experiment)) else {
			return;
		};
		name.set(d.name);
		kind.set(d.intervention_type);
		content.set(d.content);
		mode.set(d.target_mode);
		top_n.set(d.target_params.top_n().to_string());
		manual_ids.set(d.target_params.manual_ids.join(", "));
		intensity.set(d.intensity.to_string());
		editing.set(Some(id));
	};

	let apply = move |id: String| {
		let (nodes, edges) = graph.with_untracked(|g| (g.nodes.clone(), g.edges.clone()));
		let Some(targets) = book.try_update(|b| b.targets(&id, &nodes, &edges)).flatten() else {
			return;
		};
		let intensity = book.with_untracked(|b| b.get(&id).map(|e| e.intensity)).unwrap_or(1.0);
		let (seed, timesteps, interval) =
			config.with_value(|c| (c.demo_seed, c.demo_timesteps, c.frame_interval_ms));
		let run = generate_demo_run(
			&nodes,
			&edges,
			&DemoRunOptions {
				seed,
				timesteps,
				targets: targets.clone(),
				intensity,
				name: format!("experiment {id}"),
				created_at: now_ms(),
			},
		);
		playback.set(Playback::new(run, interval));
		focus.set(Focus {
			nodes: targets.into_iter().collect(),
			edges: BTreeSet::new(),
		});
		book.with_untracked(persist);
	};

	let remove = move |id: String| {
		if editing.with_untracked(|e| e.as_deref() == Some(id.as_str())) {
			reset.with_value(|r| r());
		}
		book.update(|b| {
			b.delete(&id);
			persist(b);
		});
	};

	view! {
		<section class="panel">
			<h2>
				{move || if editing.with(Option::is_some) { "Edit experiment" } else { "Experiments" }}
			</h2>
			<input
				type="text"
				placeholder="name"
				prop:value=move || name.get()
				on:input=move |ev| name.set(event_target_value(&ev))
			/>
			<div class="row">
				<select
					prop:value=move || kind.get().key()
					on:change=move |ev| {
						if let Some(k) = InterventionType::from_key(&event_target_value(&ev)) {
							kind.set(k);
						}
					}
				>
					{InterventionType::ALL
						.into_iter()
						.map(|k| view! { <option value=k.key()>{k.key()}</option> })
						.collect_view()}
				</select>
				<label>" Intensity "</label>
				<input
					type="number"
					min="0"
					max="1"
					step="0.1"
					prop:value=move || intensity.get()
					on:input=move |ev| intensity.set(event_target_value(&ev))
				/>
			</div>
			<textarea
				placeholder="message or policy text"
				prop:value=move || content.get()
				on:input=move |ev| content.set(event_target_value(&ev))
			></textarea>
			<div class="row">
				<select
					prop:value=move || mode.get().key()
					on:change=move |ev| {
						if let Some(m) = TargetMode::from_key(&event_target_value(&ev)) {
							mode.set(m);
						}
					}
				>
					{TargetMode::ALL
						.into_iter()
						.map(|m| view! { <option value=m.key()>{m.label()}</option> })
						.collect_view()}
				</select>
				<Show
					when=move || mode.get() == TargetMode::Manual
					fallback=move || {
						view! {
							<input
								type="number"
								min="1"
								max="50"
								prop:value=move || top_n.get()
								on:input=move |ev| top_n.set(event_target_value(&ev))
							/>
						}
					}
				>
					<input
						type="text"
						placeholder="agent ids, comma separated"
						prop:value=move || manual_ids.get()
						on:input=move |ev| manual_ids.set(event_target_value(&ev))
					/>
				</Show>
			</div>
			<div class="row">
				<button on:click=save>
					{move || if editing.with(Option::is_some) { "Save" } else { "Add" }}
				</button>
				<Show when=move || editing.with(Option::is_some)>
					<button on:click=move |_| reset.with_value(|r| r())>"Cancel"</button>
				</Show>
			</div>
			<ul class="experiments">
				{move || {
					book.with(|b| {
						b.experiments()
							.iter()
							.map(|e| {
								let (apply_id, edit_id, remove_id) = (e.id.clone(), e.id.clone(), e.id.clone());
								view! {
									<li>
										<span>
											{format!(
												"{} ({}, {}, {:.1})",
												e.name,
												e.intervention_type.key(),
												e.target_mode.label(),
												e.intensity,
											)}
										</span>
										<button on:click=move |_| apply(apply_id.clone())>"Run"</button>
										<button on:click=move |_| edit(edit_id.clone())>"Edit"</button>
										<button on:click=move |_| remove(remove_id.clone())>"×"</button>
									</li>
								}
							})
							.collect_view()
					})
				}}
			</ul>
		</section>
	}
}

#[component]
fn SimulationPanel(
	config: StoredValue<ExplorerConfig>,
	playback: RwSignal<Playback>,
	status: RwSignal<Option<String>>,
	swap_graph: Callback<GraphData>,
) -> impl IntoView {
	let trigger = RwSignal::new(String::new());
	let agents = RwSignal::new(String::from("100"));
	let last_simulation = RwSignal::new(None::<String>);
	let report = RwSignal::new(None::<String>);

	let load_graph = move |_| {
		let client = ApiClient::new(config.with_value(|c| c.api_base_url.clone()));
		spawn_local(async move {
			match client.fetch_graph().await {
				Ok(graph) => swap_graph.run(prepare(graph)),
				Err(e) => status.set(Some(e.to_string())),
			}
		});
	};

	let run_simulation = move |_| {
		let client = ApiClient::new(config.with_value(|c| c.api_base_url.clone()));
		let interval = config.with_value(|c| c.frame_interval_ms);
		let text = trigger.get_untracked();
		let Some(n) = parse_bound(&agents.get_untracked()) else {
			status.set(Some("number of agents must be a number".into()));
			return;
		};
		status.set(Some("running simulation…".into()));
		spawn_local(async move {
			match client.run_simulation(&text, n.max(1.0) as u32).await {
				Ok(sim) => {
					let run = sim.to_playback(&text, now_ms());
					last_simulation.set(Some(sim.simulation_id.clone()));
					swap_graph.run(prepare(sim.final_graph));
					playback.set(Playback::new(run, interval));
					status.set(Some(format!("simulation {} finished", sim.simulation_id)));
				}
				Err(e) => status.set(Some(e.to_string())),
			}
		});
	};

	let upload = move |ev: ev::Event| {
		let input = event_target::<web_sys::HtmlInputElement>(&ev);
		let Some(file) = input.files().and_then(|files| files.get(0)) else {
			return;
		};
		let client = ApiClient::new(config.with_value(|c| c.api_base_url.clone()));
		let file_name = file.name();
		status.set(Some(format!("uploading {file_name}…")));
		spawn_local(async move {
			let bytes = match JsFuture::from(file.array_buffer()).await {
				Ok(buffer) => js_sys::Uint8Array::new(&buffer).to_vec(),
				Err(e) => {
					status.set(Some(format!("could not read {file_name}: {e:?}")));
					return;
				}
			};
			let uploaded = match client.upload_graph(&file_name, bytes).await {
				Ok(result) => result,
				Err(e) => {
					status.set(Some(e.to_string()));
					return;
				}
			};
			info!("uploaded {file_name}: {} agents", uploaded.metadata.node_count);
			match client.fetch_graph().await {
				Ok(graph) => {
					swap_graph.run(prepare(graph));
					status.set(Some(format!("loaded {file_name}")));
				}
				Err(e) => status.set(Some(e.to_string())),
			}
		});
	};

	let fetch_report = move |_| {
		let Some(id) = last_simulation.get_untracked() else {
			return;
		};
		let client = ApiClient::new(config.with_value(|c| c.api_base_url.clone()));
		let text = trigger.get_untracked();
		spawn_local(async move {
			match client.simulation_report(&id, &text, true).await {
				Ok(r) => report.set(Some(format!(
					"care {:.0}/100, support change {:+.1}/50\n{}",
					r.care_score_100, r.change_in_support_50, r.report_text
				))),
				Err(e) => {
					report.set(None);
					status.set(Some(e.to_string()));
				}
			}
		});
	};

	view! {
		<section class="panel">
			<h2>"Simulation"</h2>
			<input
				type="text"
				placeholder="trigger event"
				prop:value=move || trigger.get()
				on:input=move |ev| trigger.set(event_target_value(&ev))
			/>
			<div class="row">
				<input
					type="number"
					min="1"
					prop:value=move || agents.get()
					on:input=move |ev| agents.set(event_target_value(&ev))
				/>
				<button on:click=run_simulation>"Run"</button>
				<button on:click=load_graph>"Load graph"</button>
				<button
					on:click=fetch_report
					disabled=move || last_simulation.with(Option::is_none)
				>
					"Report"
				</button>
			</div>
			<div class="row">
				<label>"Upload graph "</label>
				<input type="file" accept=".json,.csv,.graphml" on:change=upload />
			</div>
			<pre class="report">{move || report.get().unwrap_or_else(|| "no report generated".into())}</pre>
		</section>
	}
}
