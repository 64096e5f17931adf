use std::collections::{HashMap, HashSet, VecDeque};

use crate::model::{ProfileId, RelationKind};

/// What to draw inside a node.
#[derive(Clone, Debug, PartialEq)]
pub enum NodeImage {
	Avatar(String),
	/// Generated from the display name; the same name always gives the same tile.
	Placeholder { initials: String, color: &'static str },
}

#[derive(Clone, Debug, PartialEq)]
pub struct GraphNode {
	pub id: ProfileId,
	pub label: String,
	pub image: NodeImage,
}

#[derive(Clone, Debug, PartialEq)]
pub struct EdgeStyle {
	pub arrow: bool,
	pub dashed: bool,
	pub color: &'static str,
	pub label: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct GraphLink {
	pub source: ProfileId,
	pub target: ProfileId,
	pub kind: RelationKind,
	pub style: EdgeStyle,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct GraphData {
	pub nodes: Vec<GraphNode>,
	pub links: Vec<GraphLink>,
}

impl GraphData {
	pub fn contains(&self, id: &ProfileId) -> bool {
		self.nodes.iter().any(|n| &n.id == id)
	}

	/// Node ids reachable from `root` in at most `depth` hops, ignoring edge direction.
	pub fn neighbors_within(&self, root: &ProfileId, depth: usize) -> HashSet<ProfileId> {
		let mut adjacency: HashMap<&ProfileId, Vec<&ProfileId>> = HashMap::new();
		for link in &self.links {
			adjacency.entry(&link.source).or_default().push(&link.target);
			adjacency.entry(&link.target).or_default().push(&link.source);
		}

		let mut seen = HashSet::from([root.clone()]);
		let mut queue = VecDeque::from([(root, 0)]);
		while let Some((id, d)) = queue.pop_front() {
			if d >= depth {
				continue;
			}
			for &next in adjacency.get(id).into_iter().flatten() {
				if seen.insert(next.clone()) {
					queue.push_back((next, d + 1));
				}
			}
		}
		seen
	}

	/// The part of the graph within `depth` hops of `root`.
	pub fn filtered(&self, root: &ProfileId, depth: usize) -> GraphData {
		let keep = self.neighbors_within(root, depth);
		GraphData {
			nodes: self
				.nodes
				.iter()
				.filter(|n| keep.contains(&n.id))
				.cloned()
				.collect(),
			links: self
				.links
				.iter()
				.filter(|l| keep.contains(&l.source) && keep.contains(&l.target))
				.cloned()
				.collect(),
		}
	}
}

#[cfg(test)]
mod tests {
	use pretty_assertions::assert_eq;

	use super::*;
	use crate::components::family_graph::builder::link_for;
	use crate::model::Relationship;

	fn node(id: &str) -> GraphNode {
		GraphNode {
			id: ProfileId::new(id),
			label: id.to_string(),
			image: NodeImage::Avatar(format!("{id}.png")),
		}
	}

	fn chain() -> GraphData {
		// a -> b -> c -> d, plus e on its own
		GraphData {
			nodes: ["a", "b", "c", "d", "e"].into_iter().map(node).collect(),
			links: [("a", "b"), ("b", "c"), ("c", "d")]
				.into_iter()
				.map(|(s, t)| link_for(&Relationship::new(s, t, RelationKind::Parent)))
				.collect(),
		}
	}

	#[test]
	fn neighbors_ignore_direction() {
		let graph = chain();
		let mut near: Vec<_> = graph
			.neighbors_within(&ProfileId::new("c"), 1)
			.into_iter()
			.map(|id| id.0)
			.collect();
		near.sort();
		assert_eq!(near, vec!["b", "c", "d"]);
	}

	#[test]
	fn filtered_keeps_only_links_inside_the_neighbourhood() {
		let graph = chain().filtered(&ProfileId::new("a"), 2);
		let ids: Vec<_> = graph.nodes.iter().map(|n| n.id.as_str()).collect();
		assert_eq!(ids, vec!["a", "b", "c"]);
		assert_eq!(graph.links.len(), 2);
	}

	#[test]
	fn depth_zero_is_just_the_root() {
		let graph = chain().filtered(&ProfileId::new("e"), 0);
		assert_eq!(graph.nodes.len(), 1);
		assert!(graph.links.is_empty());
	}
}
