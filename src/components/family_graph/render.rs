use std::collections::HashMap;
use std::f64::consts::PI;

use force_graph::DefaultNodeIdx;
use wasm_bindgen::JsValue;
use web_sys::{CanvasRenderingContext2d, HtmlImageElement};

use super::state::{FamilyGraphState, NODE_RADIUS};
use super::types::NodeImage;

const BACKGROUND: &str = "#1a1a2e";

fn ease_out_cubic(t: f64) -> f64 {
	1.0 - (1.0 - t).powi(3)
}

/// Avatar images keyed by URL; an image is drawn once the browser has it.
#[derive(Default)]
pub struct ImageCache {
	images: HashMap<String, HtmlImageElement>,
}

impl ImageCache {
	fn ready(&mut self, url: &str) -> Option<&HtmlImageElement> {
		if !self.images.contains_key(url) {
			let img = HtmlImageElement::new().ok()?;
			img.set_src(url);
			self.images.insert(url.to_string(), img);
		}
		self.images
			.get(url)
			.filter(|img| img.complete() && img.natural_width() > 0)
	}
}

pub fn render(state: &FamilyGraphState, ctx: &CanvasRenderingContext2d, images: &mut ImageCache) {
	ctx.set_fill_style_str(BACKGROUND);
	ctx.fill_rect(0.0, 0.0, state.width, state.height);
	ctx.save();
	let _ = ctx.translate(state.transform.x, state.transform.y);
	let _ = ctx.scale(state.transform.k, state.transform.k);

	let mut at = HashMap::new();
	// hidden members drop out here, taking their edges with them
	state.graph.visit_nodes(|node| {
		if state.is_visible(&node.data.user_data.id) {
			at.insert(node.index(), (node.x() as f64, node.y() as f64));
		}
	});
	draw_edges(state, ctx, &at);
	draw_nodes(state, ctx, images, &at);
	ctx.restore();
}

fn draw_edges(
	state: &FamilyGraphState,
	ctx: &CanvasRenderingContext2d,
	at: &HashMap<DefaultNodeIdx, (f64, f64)>,
) {
	let k = state.transform.k;
	let (line_width, dash, gap, arrow_size) = (1.5 / k, 8.0 / k, 4.0 / k, 9.0 / k);
	let t = ease_out_cubic(state.hover.highlight_t);

	for (src, tgt, style) in &state.edges {
		let (Some(&(x1, y1)), Some(&(x2, y2))) = (at.get(src), at.get(tgt)) else {
			continue;
		};
		let (dx, dy) = (x2 - x1, y2 - y1);
		let dist = (dx * dx + dy * dy).sqrt();
		if dist < 0.001 {
			continue;
		}

		let is_highlighted = state.is_highlighted(*src) && state.is_highlighted(*tgt);
		// t=0: every edge at base alpha; t=1: highlighted edges up, the rest dimmed
		let (alpha, width) = if is_highlighted {
			(0.7 + 0.3 * t, line_width * (1.0 + 0.3 * t))
		} else {
			(0.7 - 0.5 * t, line_width * (1.0 - 0.3 * t))
		};

		ctx.set_global_alpha(alpha);
		ctx.set_stroke_style_str(style.color);
		ctx.set_line_width(width);
		if style.dashed {
			let _ = ctx.set_line_dash(&js_sys::Array::of2(
				&JsValue::from_f64(dash),
				&JsValue::from_f64(gap),
			));
		}

		let (ux, uy) = (dx / dist, dy / dist);
		let head = if style.arrow { arrow_size } else { 0.0 };
		ctx.begin_path();
		ctx.move_to(x1 + ux * NODE_RADIUS, y1 + uy * NODE_RADIUS);
		ctx.line_to(
			x2 - ux * (NODE_RADIUS + head),
			y2 - uy * (NODE_RADIUS + head),
		);
		ctx.stroke();
		let _ = ctx.set_line_dash(&js_sys::Array::new());

		if style.arrow {
			ctx.set_fill_style_str(style.color);
			let (tip_x, tip_y) = (x2 - ux * NODE_RADIUS, y2 - uy * NODE_RADIUS);
			let (back_x, back_y) = (tip_x - ux * arrow_size, tip_y - uy * arrow_size);
			let (px, py) = (-uy * arrow_size * 0.5, ux * arrow_size * 0.5);
			ctx.begin_path();
			ctx.move_to(tip_x, tip_y);
			ctx.line_to(back_x + px, back_y + py);
			ctx.line_to(back_x - px, back_y - py);
			ctx.close_path();
			ctx.fill();
		}

		if !style.label.is_empty() {
			ctx.set_fill_style_str("rgba(220, 225, 230, 0.85)");
			ctx.set_font(&format!("{}px sans-serif", 9.0 / k.max(0.5)));
			ctx.set_text_align("center");
			let _ = ctx.fill_text(&style.label, (x1 + x2) / 2.0, (y1 + y2) / 2.0 - 3.0 / k);
		}
		ctx.set_global_alpha(1.0);
	}
}

fn draw_node_body(
	ctx: &CanvasRenderingContext2d,
	image: &NodeImage,
	images: &mut ImageCache,
	x: f64,
	y: f64,
	radius: f64,
) {
	ctx.begin_path();
	let _ = ctx.arc(x, y, radius, 0.0, 2.0 * PI);
	match image {
		NodeImage::Avatar(url) => match images.ready(url) {
			Some(img) => {
				ctx.save();
				ctx.clip();
				let _ = ctx.draw_image_with_html_image_element_and_dw_and_dh(
					img,
					x - radius,
					y - radius,
					radius * 2.0,
					radius * 2.0,
				);
				ctx.restore();
			}
			None => {
				ctx.set_fill_style_str("#2b2b44");
				ctx.fill();
			}
		},
		NodeImage::Placeholder { initials, color } => {
			ctx.set_fill_style_str(color);
			ctx.fill();
			ctx.set_fill_style_str("white");
			ctx.set_font(&format!("bold {}px sans-serif", radius * 0.8));
			ctx.set_text_align("center");
			ctx.set_text_baseline("middle");
			let _ = ctx.fill_text(initials, x, y);
			ctx.set_text_baseline("alphabetic");
		}
	}
	ctx.begin_path();
	let _ = ctx.arc(x, y, radius, 0.0, 2.0 * PI);
	ctx.set_stroke_style_str("rgba(255, 255, 255, 0.6)");
	ctx.set_line_width(1.0);
	ctx.stroke();
}

fn draw_label(ctx: &CanvasRenderingContext2d, label: &str, x: f64, y: f64, radius: f64, k: f64) {
	ctx.set_font(&format!("{}px sans-serif", 11.0 / k.max(0.5)));
	ctx.set_text_align("center");
	let _ = ctx.fill_text(label, x, y + radius + 12.0 / k.max(0.5));
}

fn draw_nodes(
	state: &FamilyGraphState,
	ctx: &CanvasRenderingContext2d,
	images: &mut ImageCache,
	at: &HashMap<DefaultNodeIdx, (f64, f64)>,
) {
	let (has_highlight, t, k) = (
		state.has_active_highlight(),
		ease_out_cubic(state.hover.highlight_t),
		state.transform.k,
	);

	// dimmed pass first, highlighted nodes on top
	state.graph.visit_nodes(|node| {
		let idx = node.index();
		if !at.contains_key(&idx) || (has_highlight && state.is_highlighted(idx)) {
			return;
		}
		let (x, y) = (node.x() as f64, node.y() as f64);
		let alpha = if has_highlight { 1.0 - 0.7 * t } else { 1.0 };
		let info = &node.data.user_data;

		ctx.set_global_alpha(alpha);
		draw_node_body(ctx, &info.image, images, x, y, NODE_RADIUS);
		ctx.set_fill_style_str("rgba(255, 255, 255, 0.85)");
		draw_label(ctx, &info.label, x, y, NODE_RADIUS, k);
		ctx.set_global_alpha(1.0);
	});

	if !has_highlight {
		return;
	}

	state.graph.visit_nodes(|node| {
		let idx = node.index();
		if !at.contains_key(&idx) || !state.is_highlighted(idx) {
			return;
		}
		let (x, y) = (node.x() as f64, node.y() as f64);
		let is_hovered = state.is_hovered(idx);
		let (radius, glow_radius) = if is_hovered {
			(NODE_RADIUS * (1.0 + 0.2 * t), NODE_RADIUS * (1.5 + 0.8 * t))
		} else {
			(NODE_RADIUS * (1.0 + 0.1 * t), NODE_RADIUS * (1.2 + 0.4 * t))
		};

		if t > 0.01 {
			if let Ok(gradient) = ctx.create_radial_gradient(x, y, radius * 0.5, x, y, glow_radius) {
				let alpha = if is_hovered { 0.35 * t } else { 0.2 * t };
				let _ = gradient.add_color_stop(0.0, &format!("rgba(255, 255, 255, {})", alpha));
				let _ = gradient.add_color_stop(1.0, "rgba(255, 255, 255, 0)");
				ctx.begin_path();
				let _ = ctx.arc(x, y, glow_radius, 0.0, 2.0 * PI);
				#[allow(deprecated)]
				ctx.set_fill_style(&gradient);
				ctx.fill();
			}
		}

		let info = &node.data.user_data;
		draw_node_body(ctx, &info.image, images, x, y, radius);
		ctx.set_fill_style_str("white");
		draw_label(ctx, &info.label, x, y, radius, k);
	});
}
