use std::f64::consts::PI;

use web_sys::CanvasRenderingContext2d;

use super::state::ParticleField;

pub fn render(field: &ParticleField, ctx: &CanvasRenderingContext2d) {
	let (width, height) = field.size();
	ctx.clear_rect(0.0, 0.0, width, height);
	draw_particles(field, ctx);
	draw_connections(field, ctx);
}

fn draw_particles(field: &ParticleField, ctx: &CanvasRenderingContext2d) {
	let palette = &field.config.palette;
	for p in field.particles() {
		let Some(color) = palette.get(p.color) else {
			continue;
		};
		ctx.begin_path();
		let _ = ctx.arc(p.x, p.y, p.radius, 0.0, 2.0 * PI);
		ctx.set_fill_style_str(color);
		ctx.fill();
	}
}

fn draw_connections(field: &ParticleField, ctx: &CanvasRenderingContext2d) {
	let (r, g, b) = field.config.link_rgb;
	let particles = field.particles();
	ctx.set_line_width(1.0);
	for line in field.connections() {
		let (p, q) = (&particles[line.a], &particles[line.b]);
		ctx.set_stroke_style_str(&format!("rgba({r}, {g}, {b}, {})", line.opacity));
		ctx.begin_path();
		ctx.move_to(p.x, p.y);
		ctx.line_to(q.x, q.y);
		ctx.stroke();
	}
}
