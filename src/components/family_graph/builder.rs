//! Maps profiles, members and relationships onto drawable nodes and links.

use std::collections::{HashMap, HashSet};

use log::warn;

use super::types::{EdgeStyle, GraphData, GraphLink, GraphNode, NodeImage};
use crate::model::{Profile, ProfileId, RelationKind, Relationship};

const PALETTE: &[&str] = &[
	"#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b", "#e377c2", "#7f7f7f",
	"#bcbd22", "#17becf",
];

const PARENT_COLOR: &str = "#6ec5be";
const SPOUSE_COLOR: &str = "#c58f6e";
const OTHER_COLOR: &str = "#9aa3a7";

/// FNV-1a, stable across builds so placeholders never change colour.
fn seed_of(name: &str) -> u64 {
	name.bytes().fold(0xcbf2_9ce4_8422_2325, |hash, b| {
		(hash ^ b as u64).wrapping_mul(0x0100_0000_01b3)
	})
}

fn initials(name: &str) -> String {
	let letters: String = name
		.split_whitespace()
		.filter_map(|word| word.chars().next())
		.take(2)
		.flat_map(char::to_uppercase)
		.collect();
	if letters.is_empty() {
		"?".to_string()
	} else {
		letters
	}
}

pub fn placeholder(name: &str) -> NodeImage {
	NodeImage::Placeholder {
		initials: initials(name),
		color: PALETTE[(seed_of(name) % PALETTE.len() as u64) as usize],
	}
}

pub fn node_for(profile: &Profile) -> GraphNode {
	let label = profile.label().to_string();
	let image = match profile.avatar() {
		Some(url) => NodeImage::Avatar(url.to_string()),
		None => placeholder(&label),
	};
	GraphNode {
		id: profile.id.clone(),
		label,
		image,
	}
}

pub fn edge_style(kind: &RelationKind) -> EdgeStyle {
	if kind.is_parental() {
		EdgeStyle {
			arrow: true,
			dashed: false,
			color: PARENT_COLOR,
			label: "parent".to_string(),
		}
	} else if kind.is_spousal() {
		EdgeStyle {
			arrow: false,
			dashed: true,
			color: SPOUSE_COLOR,
			label: "spouse".to_string(),
		}
	} else {
		EdgeStyle {
			arrow: false,
			dashed: false,
			color: OTHER_COLOR,
			label: kind.as_str().to_string(),
		}
	}
}

pub fn link_for(rel: &Relationship) -> GraphLink {
	GraphLink {
		source: rel.from_id.clone(),
		target: rel.to_id.clone(),
		kind: rel.kind.clone(),
		style: edge_style(&rel.kind),
	}
}

/// Builds the renderable graph. Members without a profile and relationships
/// touching a non-rendered member are dropped with a diagnostic; duplicate
/// `(from, to, kind)` triples collapse to one link.
pub fn build_graph(
	profiles: &HashMap<ProfileId, Profile>,
	member_ids: &[ProfileId],
	relationships: &[Relationship],
) -> GraphData {
	let mut rendered = HashSet::new();
	let mut nodes = Vec::new();
	for id in member_ids {
		if rendered.contains(id) {
			continue;
		}
		match profiles.get(id) {
			Some(profile) => {
				rendered.insert(id.clone());
				nodes.push(node_for(profile));
			}
			None => warn!("Member {id} has no profile; not drawn"),
		}
	}

	let mut seen = HashSet::new();
	let mut links = Vec::new();
	for rel in relationships {
		if !rendered.contains(&rel.from_id) || !rendered.contains(&rel.to_id) {
			warn!(
				"Dropping {} relationship {} -> {}: endpoint not in tree",
				rel.kind, rel.from_id, rel.to_id
			);
			continue;
		}
		if seen.insert(rel) {
			links.push(link_for(rel));
		}
	}

	GraphData { nodes, links }
}
