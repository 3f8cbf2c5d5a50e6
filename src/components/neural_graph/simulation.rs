//! Velocity-Verlet force layout in the d3-force manner: link springs, a
//! many-body charge, and a centering pull, integrated with velocity decay
//! under an `alpha` temperature.
//!
//! Zero `alpha_decay` keeps `alpha` at its start value forever, so the
//! layout never cools and never stops.

use rand::Rng;

#[derive(Clone, Debug, PartialEq)]
pub struct SimulationParameters {
	/// Fraction of the gap to `alpha_target` closed each tick. Zero never cools.
	pub alpha_decay: f64,
	pub alpha_target: f64,
	/// Below this alpha the simulation is considered settled.
	pub alpha_min: f64,
	/// Fraction of velocity lost per tick (friction).
	pub velocity_decay: f64,
	/// Many-body strength; negative repels.
	pub charge_strength: f64,
	/// Rest length of link springs.
	pub link_distance: f64,
	/// Pull of the centroid towards the origin, in `[0, 1]`.
	pub center_strength: f64,
}

impl Default for SimulationParameters {
	fn default() -> Self {
		Self {
			alpha_decay: 0.0,
			alpha_target: 0.0,
			alpha_min: 0.001,
			velocity_decay: 0.08,
			charge_strength: -20.0,
			link_distance: 50.0,
			center_strength: 1.0,
		}
	}
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct SimNode {
	pub x: f64,
	pub y: f64,
	pub vx: f64,
	pub vy: f64,
	/// Pinned position, e.g. while dragged.
	pub fixed: Option<(f64, f64)>,
}

#[derive(Clone, Copy, Debug)]
struct SimLink {
	source: usize,
	target: usize,
	bias: f64,
	strength: f64,
}

const DISTANCE_MIN2: f64 = 1.0;

pub struct Simulation {
	pub params: SimulationParameters,
	alpha: f64,
	nodes: Vec<SimNode>,
	links: Vec<SimLink>,
}

impl Simulation {
	/// Scatter `node_count` nodes at random around the origin.
	///
	/// Links referring to nodes outside `0..node_count` are dropped.
	pub fn new(
		node_count: usize,
		links: &[(usize, usize)],
		params: SimulationParameters,
		rng: &mut impl Rng,
	) -> Self {
		let spread = 10.0 * ((node_count + 1) as f64).sqrt();
		let nodes = (0..node_count)
			.map(|_| SimNode {
				x: rng.gen_range(-spread..=spread),
				y: rng.gen_range(-spread..=spread),
				..Default::default()
			})
			.collect();

		let links: Vec<(usize, usize)> = links
			.iter()
			.copied()
			.filter(|&(s, t)| s < node_count && t < node_count)
			.collect();
		let mut degree = vec![0usize; node_count];
		for &(s, t) in &links {
			degree[s] += 1;
			degree[t] += 1;
		}
		let links = links
			.into_iter()
			.map(|(source, target)| {
				let (ds, dt) = (degree[source] as f64, degree[target] as f64);
				SimLink {
					source,
					target,
					bias: ds / (ds + dt),
					strength: 1.0 / ds.min(dt),
				}
			})
			.collect();

		Self {
			params,
			alpha: 1.0,
			nodes,
			links,
		}
	}

	pub fn is_running(&self) -> bool {
		self.alpha >= self.params.alpha_min
	}

	pub fn nodes(&self) -> &[SimNode] {
		&self.nodes
	}

	pub fn nodes_mut(&mut self) -> &mut [SimNode] {
		&mut self.nodes
	}

	pub fn fix(&mut self, idx: usize, x: f64, y: f64) {
		if let Some(node) = self.nodes.get_mut(idx) {
			node.fixed = Some((x, y));
		}
	}

	pub fn release(&mut self, idx: usize) {
		if let Some(node) = self.nodes.get_mut(idx) {
			node.fixed = None;
		}
	}

	/// Advance one step. Returns `false` once the simulation has settled.
	pub fn tick(&mut self, rng: &mut impl Rng) -> bool {
		if !self.is_running() {
			return false;
		}
		self.alpha += (self.params.alpha_target - self.alpha) * self.params.alpha_decay;

		self.apply_links(rng);
		self.apply_charge(rng);
		self.apply_center();

		let keep = 1.0 - self.params.velocity_decay;
		for node in &mut self.nodes {
			match node.fixed {
				Some((fx, fy)) => {
					node.x = fx;
					node.y = fy;
					node.vx = 0.0;
					node.vy = 0.0;
				}
				None => {
					node.vx *= keep;
					node.vy *= keep;
					node.x += node.vx;
					node.y += node.vy;
				}
			}
		}
		true
	}

	fn apply_links(&mut self, rng: &mut impl Rng) {
		let (alpha, distance) = (self.alpha, self.params.link_distance);
		for link in &self.links {
			let (s, t) = (&self.nodes[link.source], &self.nodes[link.target]);
			let mut x = t.x + t.vx - s.x - s.vx;
			let mut y = t.y + t.vy - s.y - s.vy;
			if x == 0.0 {
				x = jiggle(rng);
			}
			if y == 0.0 {
				y = jiggle(rng);
			}
			let l = x.hypot(y);
			let k = (l - distance) / l * alpha * link.strength;
			let (x, y) = (x * k, y * k);

			let t = &mut self.nodes[link.target];
			t.vx -= x * link.bias;
			t.vy -= y * link.bias;
			let s = &mut self.nodes[link.source];
			s.vx += x * (1.0 - link.bias);
			s.vy += y * (1.0 - link.bias);
		}
	}

	/// Direct pairwise sum. Node counts here are small enough that no
	/// Barnes-Hut approximation is used.
	fn apply_charge(&mut self, rng: &mut impl Rng) {
		let weight = self.params.charge_strength * self.alpha;
		if weight == 0.0 {
			return;
		}
		let n = self.nodes.len();
		let mut dv = vec![(0.0, 0.0); n];
		for i in 0..n {
			for j in 0..n {
				if i == j {
					continue;
				}
				let (a, b) = (&self.nodes[i], &self.nodes[j]);
				let mut x = b.x - a.x;
				let mut y = b.y - a.y;
				let mut l = x * x + y * y;
				if x == 0.0 {
					x = jiggle(rng);
					l += x * x;
				}
				if y == 0.0 {
					y = jiggle(rng);
					l += y * y;
				}
				if l < DISTANCE_MIN2 {
					l = (DISTANCE_MIN2 * l).sqrt();
				}
				let w = weight / l;
				dv[i].0 += x * w;
				dv[i].1 += y * w;
			}
		}
		for (node, (dx, dy)) in self.nodes.iter_mut().zip(dv) {
			node.vx += dx;
			node.vy += dy;
		}
	}

	fn apply_center(&mut self) {
		let n = self.nodes.len();
		if n == 0 || self.params.center_strength == 0.0 {
			return;
		}
		let (sx, sy) = self
			.nodes
			.iter()
			.fold((0.0, 0.0), |(sx, sy), node| (sx + node.x, sy + node.y));
		let k = self.params.center_strength / n as f64;
		let (sx, sy) = (sx * k, sy * k);
		for node in &mut self.nodes {
			node.x -= sx;
			node.y -= sy;
		}
	}
}

fn jiggle(rng: &mut impl Rng) -> f64 {
	(rng.gen_range(0.0..1.0) - 0.5) * 1e-6
}
