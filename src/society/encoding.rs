//! Node colour and size rules.

use super::model::{AgentState, Node};

pub const CLUSTER_COLORS: &[&str] = &[
	"#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b", "#e377c2", "#7f7f7f",
	"#bcbd22", "#17becf",
];

/// Used whenever the attribute a mode needs is unknown.
pub const NEUTRAL: &str = "#9ca3af";

pub const BASE_RADIUS: f64 = 4.0;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ColorMode {
	#[default]
	Cluster,
	Opinion,
	Adoption,
	Age,
	Gender,
}

impl ColorMode {
	pub const ALL: [ColorMode; 5] = [
		ColorMode::Cluster,
		ColorMode::Opinion,
		ColorMode::Adoption,
		ColorMode::Age,
		ColorMode::Gender,
	];

	pub fn key(self) -> &'static str {
		match self {
			ColorMode::Cluster => "cluster",
			ColorMode::Opinion => "opinion",
			ColorMode::Adoption => "adoption",
			ColorMode::Age => "age",
			ColorMode::Gender => "gender",
		}
	}

	pub fn from_key(key: &str) -> Option<Self> {
		Self::ALL.into_iter().find(|m| m.key() == key)
	}
}

pub fn cluster_color(cluster: Option<u32>) -> &'static str {
	CLUSTER_COLORS[cluster.unwrap_or(0) as usize % CLUSTER_COLORS.len()]
}

fn rgb(r: f64, g: f64, b: f64) -> String {
	format!(
		"#{:02x}{:02x}{:02x}",
		r.round().clamp(0.0, 255.0) as u8,
		g.round().clamp(0.0, 255.0) as u8,
		b.round().clamp(0.0, 255.0) as u8
	)
}

fn lerp(a: (f64, f64, f64), b: (f64, f64, f64), t: f64) -> String {
	let t = t.clamp(0.0, 1.0);
	rgb(a.0 + (b.0 - a.0) * t, a.1 + (b.1 - a.1) * t, a.2 + (b.2 - a.2) * t)
}

const RED: (f64, f64, f64) = (220.0, 38.0, 38.0);
const GREY: (f64, f64, f64) = (156.0, 163.0, 175.0);
const BLUE: (f64, f64, f64) = (37.0, 99.0, 235.0);
const GREEN: (f64, f64, f64) = (22.0, 163.0, 74.0);
const YOUNG: (f64, f64, f64) = (250.0, 204.0, 21.0);
const OLD: (f64, f64, f64) = (124.0, 58.0, 237.0);

/// Diverging ramp: -1 red, 0 grey, +1 blue.
pub fn opinion_color(opinion: f64) -> String {
	if opinion < 0.0 {
		lerp(GREY, RED, -opinion)
	} else {
		lerp(GREY, BLUE, opinion)
	}
}

pub fn node_color(node: &Node, mode: ColorMode, state: Option<&AgentState>) -> String {
	match mode {
		ColorMode::Cluster => cluster_color(node.cluster).to_string(),
		ColorMode::Opinion => state.map_or_else(|| NEUTRAL.to_string(), |s| opinion_color(s.opinion)),
		ColorMode::Adoption => {
			state.map_or_else(|| NEUTRAL.to_string(), |s| lerp(GREY, GREEN, s.adoption))
		}
		ColorMode::Age => match node.age {
			Some(age) if age.is_finite() => lerp(YOUNG, OLD, (age - 18.0) / 62.0),
			_ => NEUTRAL.to_string(),
		},
		ColorMode::Gender => match node.gender.as_deref().map(str::to_lowercase).as_deref() {
			Some("female" | "f") => CLUSTER_COLORS[6].to_string(),
			Some("male" | "m") => CLUSTER_COLORS[0].to_string(),
			Some("nonbinary" | "non-binary" | "other") => CLUSTER_COLORS[8].to_string(),
			_ => NEUTRAL.to_string(),
		},
	}
}

pub fn node_radius(node: &Node) -> f64 {
	BASE_RADIUS + (node.degree as f64).sqrt()
}
