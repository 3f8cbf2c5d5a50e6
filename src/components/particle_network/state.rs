use rand::Rng;

/// Tunables for the ambient particle layer.
#[derive(Clone, Debug, PartialEq)]
pub struct ParticleConfig {
	pub count: usize,
	/// Pairs closer than this are joined by a line.
	pub connection_distance: f64,
	/// Per-axis velocity bound, in pixels per frame.
	pub max_speed: f64,
	pub radius_min: f64,
	pub radius_max: f64,
	pub palette: Vec<String>,
	/// `r, g, b` of connection lines; alpha comes from distance.
	pub link_rgb: (u8, u8, u8),
}

impl Default for ParticleConfig {
	fn default() -> Self {
		Self {
			count: 60,
			connection_distance: 150.0,
			max_speed: 0.75,
			radius_min: 1.0,
			radius_max: 3.0,
			palette: vec!["#00f6ff".into(), "#7042f8".into()],
			link_rgb: (100, 100, 255),
		}
	}
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum FieldError {
	#[error("field bounds must be positive and finite, got {width}x{height}")]
	InvalidBounds { width: f64, height: f64 },
}

#[derive(Clone, Debug, PartialEq)]
pub struct Particle {
	pub x: f64,
	pub y: f64,
	pub vx: f64,
	pub vy: f64,
	pub radius: f64,
	/// Index into [`ParticleConfig::palette`].
	pub color: usize,
}

impl Particle {
	fn random(rng: &mut impl Rng, config: &ParticleConfig, width: f64, height: f64) -> Self {
		let speed = config.max_speed.abs();
		let (rmin, rmax) = (config.radius_min, config.radius_max.max(config.radius_min));
		Self {
			x: rng.gen_range(0.0..=width),
			y: rng.gen_range(0.0..=height),
			vx: rng.gen_range(-speed..=speed),
			vy: rng.gen_range(-speed..=speed),
			radius: if rmax > rmin { rng.gen_range(rmin..rmax) } else { rmin },
			color: rng.gen_range(0..config.palette.len().max(1)),
		}
	}

	/// Advance one frame, bouncing off the `[0, width] x [0, height]` walls.
	///
	/// A step that crosses a wall inverts that velocity component and mirrors
	/// the overshoot back inside, so the position never leaves the bounds.
	/// Surfaces narrower than one step are clamped.
	pub fn step(&mut self, width: f64, height: f64) {
		self.x += self.vx;
		self.y += self.vy;
		reflect(&mut self.x, &mut self.vx, width);
		reflect(&mut self.y, &mut self.vy, height);
	}
}

/// Mirror an overshoot back inside `[0, bound]` and invert the velocity.
/// Speed is preserved.
fn reflect(pos: &mut f64, vel: &mut f64, bound: f64) {
	if *pos < 0.0 {
		*pos = -*pos;
		*vel = vel.abs();
	} else if *pos > bound {
		*pos = 2.0 * bound - *pos;
		*vel = -vel.abs();
	}
	// Degenerate surfaces narrower than one step.
	if !(0.0..=bound).contains(pos) {
		*pos = pos.clamp(0.0, bound);
	}
}

/// A proximity line between particles `a < b`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Connection {
	pub a: usize,
	pub b: usize,
	/// `1 - distance / threshold`: 1 at coincidence, 0 at the threshold.
	pub opacity: f64,
}

/// All pairs closer than `threshold`.
///
/// This is a direct O(n²) scan, fine for the tens of particles the layer
/// draws. Past a few hundred particles it needs grid bucketing.
pub fn connections(
	particles: &[Particle],
	threshold: f64,
) -> impl Iterator<Item = Connection> + '_ {
	particles.iter().enumerate().flat_map(move |(a, p)| {
		particles[a + 1..]
			.iter()
			.enumerate()
			.filter_map(move |(offset, q)| {
				let distance = (p.x - q.x).hypot(p.y - q.y);
				(distance < threshold).then(|| Connection {
					a,
					b: a + 1 + offset,
					opacity: 1.0 - distance / threshold,
				})
			})
	})
}

/// The particle set and the bounds it lives in.
pub struct ParticleField {
	pub config: ParticleConfig,
	particles: Vec<Particle>,
	width: f64,
	height: f64,
}

impl ParticleField {
	pub fn new(config: ParticleConfig) -> Self {
		Self {
			config,
			particles: Vec::new(),
			width: 0.0,
			height: 0.0,
		}
	}

	/// Replace the whole particle set with a fresh random one.
	///
	/// Invalid bounds leave the field empty so nothing is drawn.
	pub fn initialize(
		&mut self,
		width: f64,
		height: f64,
		rng: &mut impl Rng,
	) -> Result<(), FieldError> {
		self.particles.clear();
		if !(width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0) {
			self.width = 0.0;
			self.height = 0.0;
			return Err(FieldError::InvalidBounds { width, height });
		}
		self.width = width;
		self.height = height;
		self.particles = (0..self.config.count)
			.map(|_| Particle::random(rng, &self.config, width, height))
			.collect();
		log::debug!(
			"particle field initialized: {} particles in {width}x{height}",
			self.particles.len()
		);
		Ok(())
	}

	pub fn tick(&mut self) {
		let (w, h) = (self.width, self.height);
		for p in &mut self.particles {
			p.step(w, h);
		}
	}

	pub fn connections(&self) -> impl Iterator<Item = Connection> + '_ {
		connections(&self.particles, self.config.connection_distance)
	}

	pub fn particles(&self) -> &[Particle] {
		&self.particles
	}

	pub fn size(&self) -> (f64, f64) {
		(self.width, self.height)
	}
}
