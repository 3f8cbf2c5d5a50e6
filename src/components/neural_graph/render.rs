use std::f64::consts::PI;

use web_sys::CanvasRenderingContext2d;

use super::state::GraphAdapter;

const LABEL_FONT: &str = "12px sans-serif";

pub fn render(graph: &GraphAdapter, ctx: &CanvasRenderingContext2d) {
	// Transparent background: the page shows through.
	ctx.clear_rect(0.0, 0.0, graph.width, graph.height);
	ctx.save();
	let _ = ctx.translate(graph.width / 2.0, graph.height / 2.0);
	draw_links(graph, ctx);
	draw_nodes(graph, ctx);
	draw_hover_label(graph, ctx);
	ctx.restore();
}

fn draw_links(graph: &GraphAdapter, ctx: &CanvasRenderingContext2d) {
	ctx.set_stroke_style_str(&graph.config.link_color);
	ctx.set_line_width(1.0);
	ctx.begin_path();
	for (s, t) in graph.placed_links() {
		ctx.move_to(s.x, s.y);
		ctx.line_to(t.x, t.y);
	}
	ctx.stroke();
}

fn draw_nodes(graph: &GraphAdapter, ctx: &CanvasRenderingContext2d) {
	for (node, sim) in graph.placed_nodes() {
		ctx.begin_path();
		let _ = ctx.arc(sim.x, sim.y, graph.config.node_radius(node), 0.0, 2.0 * PI);
		ctx.set_fill_style_str(graph.config.color(node.group));
		ctx.fill();
	}
}

fn draw_hover_label(graph: &GraphAdapter, ctx: &CanvasRenderingContext2d) {
	let Some(idx) = graph.hover else {
		return;
	};
	let (Some(node), Some(sim)) = (
		graph.data().nodes.get(idx),
		graph.simulation().nodes().get(idx),
	) else {
		return;
	};
	if node.label.is_empty() {
		return;
	}
	let radius = graph.config.node_radius(node);
	ctx.set_font(LABEL_FONT);
	ctx.set_fill_style_str(&graph.config.label_color);
	let _ = ctx.fill_text(&node.label, sim.x + radius + 4.0, sim.y + 4.0);
}
