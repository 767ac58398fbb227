//! Threshold checks that turn metrics into short, readable findings.

use serde::Serialize;

use super::metrics::{LiveMetrics, StructuralMetrics};

pub const MAX_INSIGHTS: usize = 12;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
	Info,
	Watch,
	Risk,
}

impl Severity {
	pub fn label(self) -> &'static str {
		match self {
			Severity::Info => "info",
			Severity::Watch => "watch",
			Severity::Risk => "risk",
		}
	}
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Insight {
	pub severity: Severity,
	pub title: &'static str,
	pub detail: String,
}

fn insight(severity: Severity, title: &'static str, detail: String) -> Insight {
	Insight {
		severity,
		title,
		detail,
	}
}

fn pct(x: f64) -> String {
	format!("{:.0}%", x * 100.0)
}

/// Findings in a fixed order, structural checks first, capped at [`MAX_INSIGHTS`].
pub fn derive_insights(structural: &StructuralMetrics, live: Option<&LiveMetrics>) -> Vec<Insight> {
	let mut out = Vec::new();
	let s = structural;

	if s.agent_count >= 2 {
		if s.density < 0.02 {
			out.push(insight(
				Severity::Info,
				"Loose network",
				format!("Density {:.3}: most agents only reach a few others directly.", s.density),
			));
		} else if s.density > 0.25 {
			out.push(insight(
				Severity::Info,
				"Dense network",
				format!("Density {:.3}: messages spread quickly between agents.", s.density),
			));
		}
	}

	if s.edge_count > 0 {
		if s.cohesion > 0.75 {
			out.push(insight(
				Severity::Watch,
				"Echo-chamber structure",
				format!("{} of ties stay inside a cluster.", pct(s.cohesion)),
			));
		} else if s.cohesion < 0.3 {
			out.push(insight(
				Severity::Info,
				"Cross-cutting ties",
				format!("{} of ties cross cluster lines.", pct(s.external_connectivity)),
			));
		}
	}

	if s.gini_influence > 0.6 {
		out.push(insight(
			Severity::Risk,
			"Influence is concentrated",
			format!("Influence Gini {:.2}: a handful of agents dominate.", s.gini_influence),
		));
	} else if s.gini_influence > 0.4 {
		out.push(insight(
			Severity::Watch,
			"Uneven influence",
			format!("Influence Gini {:.2}.", s.gini_influence),
		));
	}

	if s.top5_betweenness_share > 0.5 {
		out.push(insight(
			Severity::Risk,
			"Bridge bottleneck",
			format!("Top 5% of agents carry {} of brokerage.", pct(s.top5_betweenness_share)),
		));
	} else if s.top5_betweenness_share > 0.3 {
		out.push(insight(
			Severity::Watch,
			"Few brokers",
			format!("Top 5% of agents carry {} of brokerage.", pct(s.top5_betweenness_share)),
		));
	}

	if let Some(l) = live.filter(|l| l.agent_count > 0) {
		if l.polarization > 0.5 {
			out.push(insight(
				Severity::Risk,
				"Polarized population",
				format!("Opinion spread (std) {:.2}.", l.polarization),
			));
		} else if l.polarization > 0.3 {
			out.push(insight(
				Severity::Watch,
				"Opinions diverging",
				format!("Opinion spread (std) {:.2}.", l.polarization),
			));
		}

		if l.polarization_p90_p10 > 1.2 {
			out.push(insight(
				Severity::Watch,
				"Wide opinion spread",
				format!("P90 - P10 opinion gap is {:.2}.", l.polarization_p90_p10),
			));
		}

		if l.mean_adoption > 0.6 {
			out.push(insight(
				Severity::Info,
				"Broad adoption",
				format!("Mean adoption {}.", pct(l.mean_adoption)),
			));
		} else if l.adoption_above70_share < 0.05 && l.mean_adoption < 0.2 {
			out.push(insight(
				Severity::Watch,
				"Adoption stalled",
				format!("Only {} of agents are strong adopters.", pct(l.adoption_above70_share)),
			));
		}

		if l.mean_opinion < -0.3 {
			out.push(insight(
				Severity::Risk,
				"Negative climate",
				format!("Mean opinion {:.2}.", l.mean_opinion),
			));
		} else if l.mean_opinion > 0.3 {
			out.push(insight(
				Severity::Info,
				"Positive climate",
				format!("Mean opinion {:.2}.", l.mean_opinion),
			));
		}

		if l.gini_opinion > 0.4 {
			out.push(insight(
				Severity::Watch,
				"Opinion inequality",
				format!("Opinion Gini {:.2}.", l.gini_opinion),
			));
		}

		if let (Some(top), Some(bottom)) = (l.most_positive.first(), l.most_negative.first()) {
			let spread = top.mean_opinion - bottom.mean_opinion;
			if spread > 0.8 {
				out.push(insight(
					Severity::Watch,
					"Cluster divergence",
					format!(
						"Cluster {} sits at {:.2} while cluster {} sits at {:.2}.",
						top.cluster, top.mean_opinion, bottom.cluster, bottom.mean_opinion
					),
				));
			}
		}
	}

	capped(out)
}

/// First [`MAX_INSIGHTS`] findings, rule order preserved.
fn capped(mut out: Vec<Insight>) -> Vec<Insight> {
	out.truncate(MAX_INSIGHTS);
	out
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::society::metrics::ClusterOpinion;

	fn titles(items: &[Insight]) -> Vec<&'static str> {
		items.iter().map(|i| i.title).collect()
	}

	#[test]
	fn quiet_graph_has_no_findings() {
		let s = StructuralMetrics {
			agent_count: 10,
			edge_count: 10,
			density: 0.1,
			cohesion: 0.5,
			external_connectivity: 0.5,
			gini_influence: 0.2,
			top5_betweenness_share: 0.1,
			..Default::default()
		};
		assert!(derive_insights(&s, None).is_empty());
	}

	#[test]
	fn structural_checks_in_order() {
		let s = StructuralMetrics {
			agent_count: 500,
			edge_count: 600,
			density: 0.005,
			cohesion: 0.9,
			external_connectivity: 0.1,
			gini_influence: 0.7,
			top5_betweenness_share: 0.6,
			..Default::default()
		};
		let found = derive_insights(&s, None);
		assert_eq!(
			titles(&found),
			vec![
				"Loose network",
				"Echo-chamber structure",
				"Influence is concentrated",
				"Bridge bottleneck"
			]
		);
		assert_eq!(found[2].severity, Severity::Risk);
	}

	#[test]
	fn live_checks_follow_structural_ones() {
		let s = StructuralMetrics {
			agent_count: 10,
			edge_count: 10,
			density: 0.1,
			cohesion: 0.5,
			..Default::default()
		};
		let live = LiveMetrics {
			agent_count: 10,
			polarization: 0.6,
			polarization_p90_p10: 1.5,
			mean_adoption: 0.1,
			adoption_above70_share: 0.0,
			mean_opinion: -0.4,
			gini_opinion: 0.1,
			most_positive: vec![ClusterOpinion {
				cluster: 2,
				mean_opinion: 0.5,
				agent_count: 3,
			}],
			most_negative: vec![ClusterOpinion {
				cluster: 1,
				mean_opinion: -0.9,
				agent_count: 4,
			}],
			..Default::default()
		};
		let found = derive_insights(&s, Some(&live));
		assert_eq!(
			titles(&found),
			vec![
				"Polarized population",
				"Wide opinion spread",
				"Adoption stalled",
				"Negative climate",
				"Cluster divergence"
			]
		);
	}

	#[test]
	fn empty_live_frame_is_ignored() {
		let s = StructuralMetrics::default();
		assert!(derive_insights(&s, Some(&LiveMetrics::default())).is_empty());
	}

	#[test]
	fn every_rule_firing_stays_within_cap() {
		let s = StructuralMetrics {
			agent_count: 20,
			edge_count: 60,
			density: 0.4,
			cohesion: 0.9,
			gini_influence: 0.7,
			top5_betweenness_share: 0.6,
			..Default::default()
		};
		let live = LiveMetrics {
			agent_count: 20,
			polarization: 0.6,
			polarization_p90_p10: 1.5,
			mean_adoption: 0.7,
			mean_opinion: -0.4,
			gini_opinion: 0.5,
			most_positive: vec![ClusterOpinion {
				cluster: 0,
				mean_opinion: 0.5,
				agent_count: 5,
			}],
			most_negative: vec![ClusterOpinion {
				cluster: 3,
				mean_opinion: -0.6,
				agent_count: 5,
			}],
			..Default::default()
		};
		let found = derive_insights(&s, Some(&live));
		assert_eq!(found.len(), 10);
		assert!(found.len() <= MAX_INSIGHTS);
		assert_eq!(found[0].title, "Dense network");
		assert_eq!(found[9].title, "Cluster divergence");
	}

	#[test]
	fn cap_keeps_the_first_findings() {
		let many: Vec<Insight> = (0..15)
			.map(|i| insight(Severity::Info, "Loose network", i.to_string()))
			.collect();
		let kept = capped(many);
		assert_eq!(kept.len(), MAX_INSIGHTS);
		assert_eq!(kept[0].detail, "0");
		assert_eq!(kept[MAX_INSIGHTS - 1].detail, "11");
	}
}
