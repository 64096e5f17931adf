use std::collections::{HashMap, HashSet};
use std::f64::consts::PI;

use force_graph::{DefaultNodeIdx, EdgeData, ForceGraph, NodeData, SimulationParameters};

use super::types::{EdgeStyle, GraphData, GraphLink, GraphNode, NodeImage};
use crate::model::{Position, ProfileId, RelationKind};

pub const NODE_RADIUS: f64 = 18.0;
pub const HIT_RADIUS: f64 = 22.0;

/// Mean per-tick change (px) in each node's distance from the centroid
/// below which the layout counts as settled. Rigid drift and rotation of the
/// whole tree do not count.
const STABLE_EPSILON: f64 = 0.05;
/// Consecutive settled ticks before the layout freezes.
const STABLE_TICKS: u32 = 30;
/// Hard cap on simulation ticks.
const MAX_TICKS: u32 = 1500;
/// Fraction of its offset from the graph origin a free node gives up each
/// tick. Keeps unlinked members and separate branches from drifting apart.
const GRAVITY: f32 = 0.01;
const MIN_ZOOM: f64 = 0.1;
const MAX_ZOOM: f64 = 10.0;
/// Fitting never zooms in past this, so small trees keep their size.
const MAX_FIT_ZOOM: f64 = 2.0;
/// Screen px kept clear around a fitted tree.
const FIT_MARGIN: f64 = 40.0;
/// Pointer travel (screen px) that turns a click into a drag.
const CLICK_SLOP: f64 = 3.0;

/// Where the layout is in its lifecycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LayoutPhase {
	Loading,
	AutoLayout { ticks: u32, calm_ticks: u32 },
	Frozen,
}

#[derive(Clone, Debug)]
pub struct NodeInfo {
	pub id: ProfileId,
	pub label: String,
	pub image: NodeImage,
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
	pub moved: bool,
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

pub struct FamilyGraphState {
	pub graph: ForceGraph<NodeInfo, ()>,
	pub transform: ViewTransform,
	pub drag: DragState,
	pub pan: PanState,
	pub hover: HoverState,
	pub width: f64,
	pub height: f64,
	pub phase: LayoutPhase,
	/// Editors may drag nodes once the layout is frozen.
	pub editable: bool,
	/// Set when an editor moved something since the last save.
	pub layout_dirty: bool,
	/// When set, only these members are drawn and hit-tested.
	pub visible: Option<HashSet<ProfileId>>,
	pub edges: Vec<(DefaultNodeIdx, DefaultNodeIdx, EdgeStyle)>,
	index: HashMap<ProfileId, DefaultNodeIdx>,
	linked: HashSet<(DefaultNodeIdx, DefaultNodeIdx, RelationKind)>,
}

/// Deterministic pseudo-random value in `[0, 1)`.
fn rand_simple(seed: usize) -> f64 {
	let x = ((seed % 233_280 + 1) * 9301 + 49297) % 233_280;
	(x as f64) / 233_280.0
}

impl FamilyGraphState {
	/// Places saved nodes where they were left. If every node has a saved
	/// position the layout starts frozen and the simulation never runs.
	pub fn new(
		data: &GraphData,
		saved: &HashMap<ProfileId, Position>,
		width: f64,
		height: f64,
		editable: bool,
	) -> Self {
		let mut state = Self {
			graph: ForceGraph::new(SimulationParameters {
				force_charge: 2500.0,
				force_spring: 0.3,
				force_max: 100.0,
				node_speed: 30000.0,
				damping_factor: 0.9,
			}),
			edges: Vec::new(),
			index: HashMap::new(),
			linked: HashSet::new(),
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
			phase: LayoutPhase::Loading,
			editable,
			layout_dirty: false,
			visible: None,
		};

		let all_saved = data.nodes.iter().all(|n| saved.contains_key(&n.id));
		let ring = 60.0 + 15.0 * data.nodes.len() as f64;
		for (i, node) in data.nodes.iter().enumerate() {
			let (x, y) = match saved.get(&node.id) {
				Some(p) => (p.x, p.y),
				None => {
					let angle = (i as f64) * 2.0 * PI / data.nodes.len() as f64;
					(ring * angle.cos(), ring * angle.sin())
				}
			};
			state.insert_node(node, x, y, all_saved);
		}
		for link in &data.links {
			state.add_link(link);
		}

		state.phase = if all_saved {
			LayoutPhase::Frozen
		} else {
			LayoutPhase::AutoLayout {
				ticks: 0,
				calm_ticks: 0,
			}
		};
		state
	}

	fn insert_node(&mut self, node: &GraphNode, x: f64, y: f64, anchored: bool) {
		let idx = self.graph.add_node(NodeData {
			x: x as f32,
			y: y as f32,
			mass: 10.0,
			is_anchor: anchored,
			user_data: NodeInfo {
				id: node.id.clone(),
				label: node.label.clone(),
				image: node.image.clone(),
			},
		});
		self.index.insert(node.id.clone(), idx);
	}

	pub fn node_count(&self) -> usize {
		self.index.len()
	}

	pub fn contains(&self, id: &ProfileId) -> bool {
		self.index.contains_key(id)
	}

	pub fn is_frozen(&self) -> bool {
		self.phase == LayoutPhase::Frozen
	}

	pub fn physics_running(&self) -> bool {
		matches!(self.phase, LayoutPhase::AutoLayout { .. })
	}

	pub fn can_drag(&self) -> bool {
		self.editable && self.is_frozen()
	}

	/// Adds a member to the live graph without re-running the layout.
	pub fn add_node(&mut self, node: &GraphNode, at: (f64, f64)) -> bool {
		if self.contains(&node.id) {
			return false;
		}
		self.insert_node(node, at.0, at.1, self.is_frozen());
		self.layout_dirty = true;
		true
	}

	/// Adds a link if both endpoints are drawn and the same triple is not
	/// already shown.
	pub fn add_link(&mut self, link: &GraphLink) -> bool {
		let (Some(&src), Some(&tgt)) = (self.index.get(&link.source), self.index.get(&link.target))
		else {
			return false;
		};
		if !self.linked.insert((src, tgt, link.kind.clone())) {
			return false;
		}
		self.graph.add_edge(src, tgt, EdgeData::default());
		self.edges.push((src, tgt, link.style.clone()));
		true
	}

	/// Graph-space point a little way off the middle of the viewport.
	pub fn spawn_point(&self, seed: usize) -> (f64, f64) {
		let (cx, cy) = self.screen_to_graph(self.width / 2.0, self.height / 2.0);
		let angle = rand_simple(seed) * 2.0 * PI;
		let radius = 40.0 + rand_simple(seed.wrapping_add(7)) * 80.0;
		(cx + radius * angle.cos(), cy + radius * angle.sin())
	}

	/// On-screen coordinates of every node, ready to save.
	pub fn positions(&self) -> Vec<Position> {
		let mut out = Vec::new();
		self.graph.visit_nodes(|node| {
			out.push(Position::now(
				node.data.user_data.id.clone(),
				node.x() as f64,
				node.y() as f64,
			));
		});
		out
	}

	#[cfg(test)]
	pub fn all_anchored(&self) -> bool {
		let mut anchored = true;
		self.graph.visit_nodes(|node| anchored &= node.data.is_anchor);
		anchored
	}

	pub fn is_visible(&self, id: &ProfileId) -> bool {
		self.visible.as_ref().is_none_or(|ids| ids.contains(id))
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
			if !self.is_visible(&node.data.user_data.id) {
				return;
			}
			let (dx, dy) = (node.x() as f64 - gx, node.y() as f64 - gy);
			// HIT_RADIUS is in world-space, scales with zoom like nodes
			if (dx * dx + dy * dy).sqrt() < HIT_RADIUS {
				found = Some(node.index());
			}
		});
		found
	}

	fn profile_of(&self, idx: DefaultNodeIdx) -> Option<ProfileId> {
		let mut found = None;
		self.graph.visit_nodes(|node| {
			if node.index() == idx {
				found = Some(node.data.user_data.id.clone());
			}
		});
		found
	}

	/// Pointer down: grabs a node (editors, frozen layout) or starts a pan.
	pub fn pointer_down(&mut self, x: f64, y: f64) {
		let hit = self.node_at_position(x, y);
		self.drag.moved = false;
		self.drag.start_x = x;
		self.drag.start_y = y;
		self.drag.node_idx = hit;

		match hit {
			Some(idx) if self.can_drag() => {
				self.drag.active = true;
				let (mut nx, mut ny) = (0.0, 0.0);
				self.graph.visit_nodes(|node| {
					if node.index() == idx {
						(nx, ny) = (node.x(), node.y());
					}
				});
				self.drag.node_start_x = nx;
				self.drag.node_start_y = ny;
			}
			_ => {
				self.pan.active = true;
				self.pan.start_x = x;
				self.pan.start_y = y;
				self.pan.transform_start_x = self.transform.x;
				self.pan.transform_start_y = self.transform.y;
			}
		}
	}

	pub fn pointer_move(&mut self, x: f64, y: f64) {
		if !self.drag.active {
			let hovered = self.node_at_position(x, y);
			self.set_hover(hovered);
		}
		if (x - self.drag.start_x).hypot(y - self.drag.start_y) > CLICK_SLOP {
			self.drag.moved = true;
		}

		if self.drag.active {
			if let Some(idx) = self.drag.node_idx {
				let (dx, dy) = (
					(x - self.drag.start_x) / self.transform.k,
					(y - self.drag.start_y) / self.transform.k,
				);
				let (nx, ny) = (
					self.drag.node_start_x + dx as f32,
					self.drag.node_start_y + dy as f32,
				);
				self.graph.visit_nodes_mut(|node| {
					if node.index() == idx {
						node.data.x = nx;
						node.data.y = ny;
					}
				});
				self.layout_dirty = true;
			}
		} else if self.pan.active {
			self.transform.x = self.pan.transform_start_x + (x - self.pan.start_x);
			self.transform.y = self.pan.transform_start_y + (y - self.pan.start_y);
		}
	}

	/// Pointer up. Returns the node that was clicked (pressed and released
	/// without moving), if any.
	pub fn pointer_up(&mut self) -> Option<ProfileId> {
		let clicked = match (self.drag.node_idx, self.drag.moved) {
			(Some(idx), false) => self.profile_of(idx),
			_ => None,
		};
		self.pointer_cancel();
		clicked
	}

	pub fn pointer_cancel(&mut self) {
		self.drag.active = false;
		self.drag.node_idx = None;
		self.drag.moved = false;
		self.pan.active = false;
	}

	pub fn zoom_at(&mut self, x: f64, y: f64, zoom_in: bool) {
		let factor = if zoom_in { 1.1 } else { 0.9 };
		let new_k = (self.transform.k * factor).clamp(MIN_ZOOM, MAX_ZOOM);
		let ratio = new_k / self.transform.k;
		self.transform.x = x - (x - self.transform.x) * ratio;
		self.transform.y = y - (y - self.transform.y) * ratio;
		self.transform.k = new_k;
	}

	/// Centres the view on a member.
	pub fn focus(&mut self, id: &ProfileId) {
		let Some(&idx) = self.index.get(id) else {
			return;
		};
		let mut at = None;
		self.graph.visit_nodes(|node| {
			if node.index() == idx {
				at = Some((node.x() as f64, node.y() as f64));
			}
		});
		if let Some((gx, gy)) = at {
			self.transform.x = self.width / 2.0 - gx * self.transform.k;
			self.transform.y = self.height / 2.0 - gy * self.transform.k;
		}
	}

	/// Zooms and pans so every visible member fits the viewport.
	pub fn fit(&mut self) {
		let mut bounds: Option<(f64, f64, f64, f64)> = None;
		self.graph.visit_nodes(|node| {
			if !self.is_visible(&node.data.user_data.id) {
				return;
			}
			let (x, y) = (node.x() as f64, node.y() as f64);
			bounds = Some(match bounds {
				None => (x, y, x, y),
				Some((x0, y0, x1, y1)) => (x0.min(x), y0.min(y), x1.max(x), y1.max(y)),
			});
		});
		let Some((x0, y0, x1, y1)) = bounds else {
			return;
		};

		let (bw, bh) = (x1 - x0 + 2.0 * NODE_RADIUS, y1 - y0 + 2.0 * NODE_RADIUS);
		let (aw, ah) = (
			(self.width - 2.0 * FIT_MARGIN).max(1.0),
			(self.height - 2.0 * FIT_MARGIN).max(1.0),
		);
		let k = (aw / bw).min(ah / bh).clamp(MIN_ZOOM, MAX_FIT_ZOOM);
		let (cx, cy) = ((x0 + x1) / 2.0, (y0 + y1) / 2.0);
		self.transform.k = k;
		self.transform.x = self.width / 2.0 - cx * k;
		self.transform.y = self.height / 2.0 - cy * k;
	}

	pub fn set_hover(&mut self, node: Option<DefaultNodeIdx>) {
		if self.hover.node == node {
			return;
		}
		let was_hovering = self.hover.node.is_some();

		// Keep the previous highlight around so it can fade out
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
			for &(src, tgt, _) in &self.edges {
				if src == idx {
					self.hover.neighbors.insert(tgt);
				} else if tgt == idx {
					self.hover.neighbors.insert(src);
				}
			}
		}
	}

	pub fn is_highlighted(&self, idx: DefaultNodeIdx) -> bool {
		self.hover.node == Some(idx)
			|| self.hover.neighbors.contains(&idx)
			|| self.hover.prev_node == Some(idx)
			|| self.hover.prev_neighbors.contains(&idx)
	}

	pub fn is_hovered(&self, idx: DefaultNodeIdx) -> bool {
		self.hover.node == Some(idx) || self.hover.prev_node == Some(idx)
	}

	pub fn has_active_highlight(&self) -> bool {
		self.hover.node.is_some() || self.hover.prev_node.is_some()
	}

	/// Steps the simulation while auto-layout runs, then freezes every node
	/// once it has settled. Hover easing runs in every phase.
	pub fn tick(&mut self, dt: f32) {
		if let LayoutPhase::AutoLayout { ticks, calm_ticks } = self.phase {
			let before = self.radii();
			self.graph.update(dt);
			self.graph.visit_nodes_mut(|node| {
				if !node.data.is_anchor {
					node.data.x -= GRAVITY * node.data.x;
					node.data.y -= GRAVITY * node.data.y;
				}
			});
			let after = self.radii();
			let change = before
				.iter()
				.zip(&after)
				.map(|(a, b)| (b - a).abs())
				.sum::<f64>()
				/ after.len().max(1) as f64;

			let calm_ticks = if change < STABLE_EPSILON {
				calm_ticks + 1
			} else {
				0
			};
			let ticks = ticks + 1;
			if calm_ticks >= STABLE_TICKS || ticks >= MAX_TICKS {
				self.freeze();
			} else {
				self.phase = LayoutPhase::AutoLayout { ticks, calm_ticks };
			}
		}

		let (target, delay, speed) = if self.hover.node.is_some() {
			(1.0, 0.08, 1.8)
		} else {
			(0.0, 0.0, 1.26)
		};

		if self.hover.node.is_some() {
			self.hover.delay_t = (self.hover.delay_t + dt as f64).min(delay);
			if self.hover.delay_t >= delay {
				self.hover.highlight_t += (target - self.hover.highlight_t) * speed * dt as f64;
			}
		} else {
			self.hover.highlight_t += (target - self.hover.highlight_t) * speed * dt as f64;
			if self.hover.highlight_t < 0.01 {
				self.hover.highlight_t = 0.0;
				self.hover.prev_node = None;
				self.hover.prev_neighbors.clear();
			}
		}
	}

	/// Pins every node where it is and stops the simulation for good.
	pub fn freeze(&mut self) {
		self.graph.visit_nodes_mut(|node| node.data.is_anchor = true);
		self.phase = LayoutPhase::Frozen;
	}

	/// Distance of every node from the centroid, in node order.
	fn radii(&self) -> Vec<f64> {
		let mut points = Vec::new();
		self.graph
			.visit_nodes(|node| points.push((node.x() as f64, node.y() as f64)));
		let n = points.len().max(1) as f64;
		let (cx, cy) = points
			.iter()
			.fold((0.0, 0.0), |(sx, sy), (x, y)| (sx + x, sy + y));
		let (cx, cy) = (cx / n, cy / n);
		points
			.iter()
			.map(|(x, y)| (x - cx).hypot(y - cy))
			.collect()
	}
}

#[cfg(test)]
mod tests {
	use chrono::Utc;
	use pretty_assertions::assert_eq;

	use super::*;
	use crate::components::family_graph::builder::{build_graph, link_for, node_for};
	use crate::model::{Profile, RelationKind, Relationship};

	fn two_people() -> GraphData {
		let profiles = [Profile::new("A", Some("Aroha")), Profile::new("B", Some("Bella"))];
		let dir = profiles.iter().map(|p| (p.id.clone(), p.clone())).collect();
		build_graph(
			&dir,
			&[ProfileId::new("A"), ProfileId::new("B")],
			&[Relationship::new("A", "B", RelationKind::Parent)],
		)
	}

	fn saved(entries: &[(&str, f64, f64)]) -> HashMap<ProfileId, Position> {
		entries
			.iter()
			.map(|&(id, x, y)| {
				(
					ProfileId::new(id),
					Position {
						profile_id: ProfileId::new(id),
						x,
						y,
						updated_at: Utc::now(),
					},
				)
			})
			.collect()
	}

	fn run_until_frozen(state: &mut FamilyGraphState) -> u32 {
		let mut ticks = 0;
		while state.physics_running() {
			state.tick(0.016);
			ticks += 1;
			assert!(ticks <= MAX_TICKS, "layout never froze");
		}
		ticks
	}

	#[test]
	fn fully_saved_layout_starts_frozen() {
		let positions = saved(&[("A", -50.0, 0.0), ("B", 50.0, 20.0)]);
		let mut state = FamilyGraphState::new(&two_people(), &positions, 800.0, 600.0, false);
		assert_eq!(state.phase, LayoutPhase::Frozen);
		assert!(state.all_anchored());

		for _ in 0..10 {
			state.tick(0.016);
		}
		let mut after: Vec<_> = state
			.positions()
			.into_iter()
			.map(|p| (p.profile_id.0, p.x, p.y))
			.collect();
		after.sort_by(|a, b| a.0.cmp(&b.0));
		assert_eq!(
			after,
			vec![("A".to_string(), -50.0, 0.0), ("B".to_string(), 50.0, 20.0)]
		);
	}

	#[test]
	fn partial_layout_runs_physics_then_freezes_everything() {
		let positions = saved(&[("A", 10.0, 10.0)]);
		let mut state = FamilyGraphState::new(&two_people(), &positions, 800.0, 600.0, true);
		assert!(state.physics_running());
		assert!(!state.all_anchored());

		let ticks = run_until_frozen(&mut state);
		assert!(ticks > 0);
		assert_eq!(state.phase, LayoutPhase::Frozen);
		assert!(state.all_anchored());
	}

	#[test]
	fn parent_and_child_without_positions_settle_then_freeze() {
		let mut state =
			FamilyGraphState::new(&two_people(), &HashMap::new(), 800.0, 600.0, false);
		assert_eq!(state.positions().len(), 2);
		assert_eq!(state.edges.len(), 1);
		assert!(state.edges[0].2.arrow);
		run_until_frozen(&mut state);
		assert!(state.is_frozen());
	}

	#[test]
	fn editors_drag_frozen_nodes_without_restarting_physics() {
		let positions = saved(&[("A", 0.0, 0.0), ("B", 100.0, 0.0)]);
		let mut state = FamilyGraphState::new(&two_people(), &positions, 800.0, 600.0, true);
		// graph origin sits at the viewport centre
		state.pointer_down(400.0, 300.0);
		assert!(state.drag.active);
		state.pointer_move(430.0, 340.0);
		assert_eq!(state.pointer_up(), None);

		assert!(state.is_frozen());
		assert!(state.layout_dirty);
		let a = state
			.positions()
			.into_iter()
			.find(|p| p.profile_id.as_str() == "A")
			.unwrap();
		assert_eq!((a.x, a.y), (30.0, 40.0));
	}

	#[test]
	fn visitors_cannot_drag_but_can_click() {
		let positions = saved(&[("A", 0.0, 0.0), ("B", 100.0, 0.0)]);
		let mut state = FamilyGraphState::new(&two_people(), &positions, 800.0, 600.0, false);
		state.pointer_down(400.0, 300.0);
		assert!(!state.drag.active);
		assert_eq!(state.pointer_up(), Some(ProfileId::new("A")));

		state.pointer_down(400.0, 300.0);
		state.pointer_move(450.0, 300.0);
		assert_eq!(state.pointer_up(), None);
		assert!(!state.layout_dirty);
	}

	#[test]
	fn no_drag_while_auto_layout_runs() {
		let state = FamilyGraphState::new(&two_people(), &HashMap::new(), 800.0, 600.0, true);
		assert!(!state.can_drag());
	}

	#[test]
	fn added_nodes_land_near_the_viewport_centre() {
		let positions = saved(&[("A", 0.0, 0.0), ("B", 100.0, 0.0)]);
		let mut state = FamilyGraphState::new(&two_people(), &positions, 800.0, 600.0, true);
		let at = state.spawn_point(3);
		let dist = at.0.hypot(at.1);
		assert!((40.0..=120.0).contains(&dist), "spawned {dist} away");

		let node = node_for(&Profile::new("C", Some("Chris")));
		assert!(state.add_node(&node, at));
		assert!(!state.add_node(&node, at));
		assert!(state.all_anchored());

		let link = link_for(&Relationship::new("C", "A", RelationKind::Spouse));
		assert!(state.add_link(&link));
		assert!(!state.add_link(&link));
		let dangling = link_for(&Relationship::new("C", "Z", RelationKind::Spouse));
		assert!(!state.add_link(&dangling));
		assert_eq!(state.edges.len(), 2);
	}

	#[test]
	fn hidden_members_are_not_hit() {
		let positions = saved(&[("A", 0.0, 0.0), ("B", 100.0, 0.0)]);
		let mut state = FamilyGraphState::new(&two_people(), &positions, 800.0, 600.0, false);
		state.visible = Some(HashSet::from([ProfileId::new("B")]));
		assert_eq!(state.node_at_position(400.0, 300.0), None);
		assert!(state.node_at_position(500.0, 300.0).is_some());
	}

	#[test]
	fn focus_centres_member() {
		let positions = saved(&[("A", 0.0, 0.0), ("B", 100.0, 50.0)]);
		let mut state = FamilyGraphState::new(&two_people(), &positions, 800.0, 600.0, false);
		state.focus(&ProfileId::new("B"));
		assert_eq!(state.screen_to_graph(400.0, 300.0), (100.0, 50.0));
	}

	fn binary_tree(n: usize) -> GraphData {
		let profiles: HashMap<ProfileId, Profile> = (0..n)
			.map(|i| {
				let p = Profile::new(format!("p{i}"), Some(format!("Person {i}").as_str()));
				(p.id.clone(), p)
			})
			.collect();
		let members: Vec<ProfileId> = (0..n).map(|i| ProfileId::new(format!("p{i}"))).collect();
		let rels: Vec<Relationship> = (1..n)
			.map(|i| {
				Relationship::new(&format!("p{}", (i - 1) / 2), &format!("p{i}"), RelationKind::Parent)
			})
			.collect();
		build_graph(&profiles, &members, &rels)
	}

	#[test]
	fn larger_trees_settle_well_before_the_tick_cap() {
		for n in [10, 31] {
			let mut state =
				FamilyGraphState::new(&binary_tree(n), &HashMap::new(), 800.0, 600.0, true);
			let ticks = run_until_frozen(&mut state);
			assert!(ticks < MAX_TICKS / 3, "{n} members took {ticks} ticks");
			assert!(state.all_anchored());
		}
	}

	#[test]
	fn unlinked_members_settle_too() {
		let mut data = binary_tree(8);
		data.links.clear();
		let mut state = FamilyGraphState::new(&data, &HashMap::new(), 800.0, 600.0, false);
		let ticks = run_until_frozen(&mut state);
		assert!(ticks < MAX_TICKS / 3, "took {ticks} ticks");
	}

	#[test]
	fn fit_frames_every_visible_member() {
		let positions = saved(&[("A", -1000.0, 0.0), ("B", 1000.0, 0.0)]);
		let mut state = FamilyGraphState::new(&two_people(), &positions, 800.0, 600.0, false);
		state.fit();
		assert!(state.transform.k < 1.0);
		assert_eq!(state.screen_to_graph(400.0, 300.0), (0.0, 0.0));
		let (left, _) = state.screen_to_graph(0.0, 0.0);
		let (right, _) = state.screen_to_graph(800.0, 0.0);
		assert!(left < -1000.0 && right > 1000.0);
	}

	#[test]
	fn fit_keeps_small_trees_readable_and_skips_hidden_members() {
		let positions = saved(&[("A", 0.0, 0.0), ("B", 100.0, 50.0)]);
		let mut state = FamilyGraphState::new(&two_people(), &positions, 800.0, 600.0, false);
		state.fit();
		assert_eq!(state.transform.k, MAX_FIT_ZOOM);
		assert_eq!(state.screen_to_graph(400.0, 300.0), (50.0, 25.0));

		state.visible = Some(HashSet::from([ProfileId::new("B")]));
		state.fit();
		assert_eq!(state.screen_to_graph(400.0, 300.0), (100.0, 50.0));
	}
}
