use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use leptos::prelude::*;
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, MouseEvent, WheelEvent, Window};

use super::render::{self, ImageCache};
use super::state::{FamilyGraphState, LayoutPhase};
use super::types::{GraphData, GraphLink, GraphNode};
use crate::model::{Position, ProfileId};

/// Shared handle the page uses to change the live graph without rebuilding it.
#[derive(Clone, Default)]
pub struct GraphHandle(Rc<RefCell<Option<FamilyGraphState>>>);

impl GraphHandle {
	fn with<R>(&self, f: impl FnOnce(&mut FamilyGraphState) -> R) -> Option<R> {
		self.0.borrow_mut().as_mut().map(f)
	}

	/// Drops a new member near the middle of the view.
	pub fn add_node(&self, node: &GraphNode) -> bool {
		self.with(|s| {
			let seed = s.node_count() * 31 + node.id.as_str().len();
			let at = s.spawn_point(seed);
			s.add_node(node, at)
		})
		.unwrap_or(false)
	}

	pub fn add_link(&self, link: &GraphLink) -> bool {
		self.with(|s| s.add_link(link)).unwrap_or(false)
	}

	pub fn positions(&self) -> Vec<Position> {
		self.with(|s| s.positions()).unwrap_or_default()
	}

	pub fn mark_saved(&self) {
		self.with(|s| s.layout_dirty = false);
	}

	/// Restricts drawing to `ids`; `None` shows everyone.
	pub fn set_visible(&self, ids: Option<HashSet<ProfileId>>) {
		self.with(|s| s.visible = ids);
	}

	pub fn focus(&self, id: &ProfileId) {
		self.with(|s| s.focus(id));
	}

	/// Zooms to show every visible member.
	pub fn fit(&self) {
		self.with(|s| s.fit());
	}
}

#[component]
pub fn FamilyGraphCanvas(
	data: GraphData,
	positions: HashMap<ProfileId, Position>,
	editable: bool,
	handle: GraphHandle,
	#[prop(into)] phase: RwSignal<LayoutPhase>,
	#[prop(into)] dirty: RwSignal<bool>,
	#[prop(into)] on_node_click: Callback<ProfileId>,
	#[prop(default = None)] width: Option<f64>,
	#[prop(default = None)] height: Option<f64>,
) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let state = handle.0.clone();
	let animate: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let (state_init, animate_init) = (state.clone(), animate.clone());

	Effect::new(move |_| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();
		let Some(window): Option<Window> = web_sys::window() else {
			return;
		};

		let (w, h) = (
			width.unwrap_or_else(|| {
				canvas
					.parent_element()
					.map(|p| p.client_width() as f64)
					.filter(|w| *w > 0.0)
					.unwrap_or(800.0)
			}),
			height.unwrap_or_else(|| {
				canvas
					.parent_element()
					.map(|p| p.client_height() as f64)
					.filter(|h| *h > 0.0)
					.unwrap_or(600.0)
			}),
		);
		canvas.set_width(w as u32);
		canvas.set_height(h as u32);

		let Some(ctx) = canvas
			.get_context("2d")
			.ok()
			.flatten()
			.and_then(|c| c.dyn_into::<CanvasRenderingContext2d>().ok())
		else {
			log::error!("Canvas 2d context unavailable");
			return;
		};
		let initial = FamilyGraphState::new(&data, &positions, w, h, editable);
		phase.set(initial.phase);
		*state_init.borrow_mut() = Some(initial);

		let (state_anim, animate_inner) = (state_init.clone(), animate_init.clone());
		let mut images = ImageCache::default();
		*animate_init.borrow_mut() = Some(Closure::new(move || {
			if let Some(ref mut s) = *state_anim.borrow_mut() {
				let was_running = s.physics_running();
				s.tick(0.016);
				if was_running && !s.physics_running() {
					log::info!("Layout settled; {} nodes frozen", s.node_count());
					phase.set(s.phase);
				}
				if s.layout_dirty != dirty.get_untracked() {
					dirty.set(s.layout_dirty);
				}
				render::render(s, &ctx, &mut images);
			}
			if let (Some(cb), Some(win)) = (&*animate_inner.borrow(), web_sys::window()) {
				let _ = win.request_animation_frame(cb.as_ref().unchecked_ref());
			}
		}));
		if let Some(ref cb) = *animate_init.borrow() {
			let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
		}
	});

	let local_point = move |ev: &MouseEvent| -> Option<(f64, f64)> {
		let canvas: HtmlCanvasElement = canvas_ref.get()?.into();
		let rect = canvas.get_bounding_client_rect();
		Some((
			ev.client_x() as f64 - rect.left(),
			ev.client_y() as f64 - rect.top(),
		))
	};

	let state_md = state.clone();
	let on_mousedown = move |ev: MouseEvent| {
		let Some((x, y)) = local_point(&ev) else {
			return;
		};
		if let Some(ref mut s) = *state_md.borrow_mut() {
			s.pointer_down(x, y);
		}
	};

	let state_mm = state.clone();
	let on_mousemove = move |ev: MouseEvent| {
		let Some((x, y)) = local_point(&ev) else {
			return;
		};
		if let Some(ref mut s) = *state_mm.borrow_mut() {
			s.pointer_move(x, y);
		}
	};

	let state_mu = state.clone();
	let on_mouseup = move |_: MouseEvent| {
		// editors drag; only visitors follow a click through to the profile
		let clicked = state_mu
			.borrow_mut()
			.as_mut()
			.and_then(|s| s.pointer_up().filter(|_| !s.editable));
		if let Some(id) = clicked {
			on_node_click.run(id);
		}
	};

	let state_ml = state.clone();
	let on_mouseleave = move |_: MouseEvent| {
		if let Some(ref mut s) = *state_ml.borrow_mut() {
			s.pointer_cancel();
			s.set_hover(None);
		}
	};

	let state_wh = state.clone();
	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		let mouse: &MouseEvent = &ev;
		let Some((x, y)) = local_point(mouse) else {
			return;
		};
		if let Some(ref mut s) = *state_wh.borrow_mut() {
			s.zoom_at(x, y, ev.delta_y() < 0.0);
		}
	};

	let cursor = if editable { "move" } else { "pointer" };

	view! {
		<canvas
			node_ref=canvas_ref
			class="family-graph-canvas"
			on:mousedown=on_mousedown
			on:mousemove=on_mousemove
			on:mouseup=on_mouseup
			on:mouseleave=on_mouseleave
			on:wheel=on_wheel
			style=format!("display: block; cursor: {cursor};")
		/>
	}
}
