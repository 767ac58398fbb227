//! Graph exploration, metrics and playback for a simulated society.
//!
//! Pure, synchronous code over in-memory snapshots; the UI layer owns the
//! only mutable session state (see [`playback::Playback`]).

pub mod adjacency;
pub mod centrality;
pub mod demo_run;
pub mod encoding;
pub mod experiments;
pub mod filters;
pub mod insights;
pub mod metrics;
pub mod model;
pub mod neighborhood;
pub mod paths;
pub mod playback;
pub mod sample;
pub mod targeting;

pub use adjacency::{Adjacency, Neighbor};
pub use demo_run::{DemoRunOptions, generate_demo_run};
pub use experiments::{ExperimentBook, ExperimentDraft, ExperimentPatch, KeyValueStore, MemoryStore};
pub use filters::{GraphFilter, apply_filter};
pub use insights::{Insight, Severity, derive_insights};
pub use metrics::{LiveMetrics, StructuralMetrics, compute_live_metrics, compute_structural_metrics, gini};
pub use model::{AgentId, AgentState, Edge, Frame, GraphData, Node, PlaybackRun, edge_key};
pub use neighborhood::{k_hop_neighborhood, neighborhood_edge_keys};
pub use paths::{InfluenceIndex, bfs_shortest_path, influence_path, path_edge_keys};
pub use playback::Playback;
pub use targeting::{Experiment, TargetMode, TargetParams, compute_targets};
