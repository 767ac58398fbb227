//! Client for the simulation backend.
//!
//! Every call is a single request: a non-2xx status or a transport failure
//! becomes an [`ApiError`] carrying a message fit for a banner. Nothing is
//! retried.

use std::collections::BTreeMap;

use log::{debug, warn};
use reqwest::{Client, Response, multipart};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::society::adjacency::Adjacency;
use crate::society::demo_run::sentiment;
use crate::society::model::{
	AgentId, AgentState, Frame, GraphData, GraphMetadata, Node, PlaybackRun, RunMeta, RunSource,
	flexible_id,
};

/// Shown when neither the body nor the status says anything useful.
pub const FALLBACK_MESSAGE: &str = "Request failed";

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ApiError {
	#[error("{0}")]
	Network(String),
	#[error("{message}")]
	Http { status: u16, message: String },
	#[error("unexpected response: {0}")]
	Decode(String),
}

/// Message for a failed response: the body's `detail`, else the status
/// text, else [`FALLBACK_MESSAGE`].
pub fn error_message(status_text: Option<&str>, body: &str) -> String {
	#[derive(Deserialize)]
	struct Detail {
		detail: Option<serde_json::Value>,
	}

	let detail = serde_json::from_str::<Detail>(body)
		.ok()
		.and_then(|d| d.detail)
		.and_then(|v| match v {
			serde_json::Value::String(s) => Some(s),
			serde_json::Value::Null => None,
			other => Some(other.to_string()),
		})
		.filter(|s| !s.trim().is_empty());

	detail
		.or_else(|| {
			status_text
				.map(str::trim)
				.filter(|s| !s.is_empty())
				.map(str::to_string)
		})
		.unwrap_or_else(|| FALLBACK_MESSAGE.to_string())
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct NeighborSummary {
	#[serde(deserialize_with = "flexible_id")]
	pub agent_id: AgentId,
	#[serde(default = "unit")]
	pub weight: f64,
	#[serde(default)]
	pub degree: u32,
}

fn unit() -> f64 {
	1.0
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct NodeDetail {
	pub node: Node,
	#[serde(default)]
	pub neighbors: Vec<NeighborSummary>,
}

impl NodeDetail {
	/// Detail assembled from a graph already in memory, for offline use.
	pub fn local(graph: &GraphData, agent_id: &str) -> Option<Self> {
		let node = graph.node(agent_id)?.clone();
		let adj = Adjacency::build(&graph.edges);
		let neighbors = adj
			.neighbors(agent_id)
			.iter()
			.map(|n| NeighborSummary {
				agent_id: n.id.clone(),
				weight: n.weight,
				degree: graph.node(&n.id).map_or(0, |m| m.degree),
			})
			.collect();
		Some(Self { node, neighbors })
	}
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct UploadResult {
	pub metadata: GraphMetadata,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct SimulationRun {
	#[serde(deserialize_with = "flexible_id")]
	pub simulation_id: String,
	pub initial_graph: GraphData,
	pub final_graph: GraphData,
}

impl SimulationRun {
	/// Two-frame run: the initial graph at `t = 0`, the final one at `t = 1`.
	///
	/// Opinion is read from `effect_on_usage` and adoption from
	/// `level_of_care`; agents missing a field sit at the neutral value.
	pub fn to_playback(&self, trigger: &str, created_at: u64) -> PlaybackRun {
		let frame = |t: usize, graph: &GraphData| Frame {
			t,
			agents: graph
				.nodes
				.iter()
				.map(|n| (n.agent_id.clone(), agent_state(n)))
				.collect::<BTreeMap<_, _>>(),
		};
		PlaybackRun {
			id: format!("sim-{}", self.simulation_id),
			name: trigger.to_string(),
			created_at,
			frames: vec![frame(0, &self.initial_graph), frame(1, &self.final_graph)],
			meta: RunMeta {
				source: RunSource::Simulation,
				seed: 0,
				timesteps: 2,
				target_ids: Vec::new(),
				trigger: Some(trigger.to_string()),
			},
		}
	}
}

fn agent_state(node: &Node) -> AgentState {
	let opinion = node
		.effect_on_usage
		.filter(|v| v.is_finite())
		.unwrap_or(0.0)
		.clamp(-1.0, 1.0);
	let adoption = node
		.level_of_care
		.filter(|v| v.is_finite())
		.unwrap_or(0.0)
		.clamp(0.0, 1.0);
	AgentState {
		opinion,
		sentiment: sentiment(opinion, adoption),
		adoption,
	}
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct SimulationReport {
	#[serde(deserialize_with = "flexible_id")]
	pub simulation_id: String,
	#[serde(default)]
	pub care_score_100: f64,
	#[serde(default)]
	pub change_in_support_50: f64,
	#[serde(default)]
	pub report_text: String,
}

#[derive(Debug, Serialize)]
struct RunSimulationRequest<'a> {
	trigger: &'a str,
	num_agents: u32,
}

#[derive(Debug, Serialize)]
struct ReportRequest<'a> {
	simulation_id: &'a str,
	trigger: &'a str,
	include_initial: bool,
}

/// HTTP client for the explorer backend.
#[derive(Debug, Clone)]
pub struct ApiClient {
	base_url: String,
	client: Client,
}

impl ApiClient {
	pub fn new(base_url: impl Into<String>) -> Self {
		Self {
			base_url: base_url.into().trim_end_matches('/').to_string(),
			client: Client::new(),
		}
	}

	fn url(&self, path: &str) -> String {
		format!("{}{}", self.base_url, path)
	}

	async fn decode<T: DeserializeOwned>(path: &str, response: Response) -> Result<T, ApiError> {
		let status = response.status();
		let body = response.text().await.map_err(|e| ApiError::Network(e.to_string()))?;
		if !status.is_success() {
			let message = error_message(status.canonical_reason(), &body);
			warn!("{path} failed with {status}: {message}");
			return Err(ApiError::Http {
				status: status.as_u16(),
				message,
			});
		}
		serde_json::from_str(&body).map_err(|e| ApiError::Decode(e.to_string()))
	}

	async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
		debug!("GET {path}");
		let response = self
			.client
			.get(self.url(path))
			.send()
			.await
			.map_err(|e| ApiError::Network(e.to_string()))?;
		Self::decode(path, response).await
	}

	async fn post_json<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T, ApiError> {
		debug!("POST {path}");
		let response = self
			.client
			.post(self.url(path))
			.json(body)
			.send()
			.await
			.map_err(|e| ApiError::Network(e.to_string()))?;
		Self::decode(path, response).await
	}

	/// `GET /api/graph/`
	pub async fn fetch_graph(&self) -> Result<GraphData, ApiError> {
		self.get("/api/graph/").await
	}

	/// `GET /api/nodes/{agent_id}/`
	pub async fn fetch_node(&self, agent_id: &str) -> Result<NodeDetail, ApiError> {
		self.get(&format!("/api/nodes/{agent_id}/")).await
	}

	/// `POST /api/graph/upload/` as a multipart file.
	pub async fn upload_graph(&self, file_name: &str, bytes: Vec<u8>) -> Result<UploadResult, ApiError> {
		let path = "/api/graph/upload/";
		debug!("POST {path} ({} bytes)", bytes.len());
		let part = multipart::Part::bytes(bytes).file_name(file_name.to_string());
		let form = multipart::Form::new().part("file", part);
		let response = self
			.client
			.post(self.url(path))
			.multipart(form)
			.send()
			.await
			.map_err(|e| ApiError::Network(e.to_string()))?;
		Self::decode(path, response).await
	}

	/// `POST /api/simulations/run/`
	pub async fn run_simulation(&self, trigger: &str, num_agents: u32) -> Result<SimulationRun, ApiError> {
		self.post_json(
			"/api/simulations/run/",
			&RunSimulationRequest {
				trigger,
				num_agents,
			},
		)
		.await
	}

	/// `POST /api/simulations/report/`
	pub async fn simulation_report(
		&self,
		simulation_id: &str,
		trigger: &str,
		include_initial: bool,
	) -> Result<SimulationReport, ApiError> {
		self.post_json(
			"/api/simulations/report/",
			&ReportRequest {
				simulation_id,
				trigger,
				include_initial,
			},
		)
		.await
	}
}
