use std::collections::{HashMap, HashSet};

use rand::Rng;
use rand::rngs::SmallRng;

use super::simulation::{SimNode, Simulation, SimulationParameters};
use super::types::{DocumentSummary, GraphData, GraphLink, GraphNode, NavigationIntent, NodeId};

/// Pointer travel (px) beyond which a press becomes a drag instead of a click.
pub const CLICK_TOLERANCE: f64 = 3.0;
/// Smallest hit radius, so tiny nodes stay clickable.
pub const MIN_HIT_RADIUS: f64 = 6.0;

#[derive(Clone, Debug, PartialEq)]
pub struct GraphConfig {
	/// Placeholder nodes shown when there are no documents. At least one is always made.
	pub seed_count: usize,
	/// Seed colour groups are drawn from `0..seed_groups`.
	pub seed_groups: i64,
	pub seed_label: String,
	pub seed_size_min: f64,
	pub seed_size_jitter: f64,
	pub document_size: f64,
	/// Random link attempts per node; self-links are skipped.
	pub links_per_node: usize,
	/// Per-tick velocity noise, uniform in `[-drift, drift]` per axis.
	pub drift: f64,
	/// Node radius is `sqrt(size) * node_rel_size`.
	pub node_rel_size: f64,
	pub palette: Vec<String>,
	pub link_color: String,
	pub label_color: String,
	pub simulation: SimulationParameters,
}

impl Default for GraphConfig {
	fn default() -> Self {
		Self {
			seed_count: 30,
			seed_groups: 5,
			seed_label: "Neural Node".into(),
			seed_size_min: 2.0,
			seed_size_jitter: 3.0,
			document_size: 3.0,
			links_per_node: 2,
			drift: 0.01,
			node_rel_size: 4.0,
			palette: ["#7042f8", "#00f6ff", "#ff00ff", "#2196f3", "#ffffff"]
				.into_iter()
				.map(String::from)
				.collect(),
			link_color: "rgba(255, 255, 255, 0.15)".into(),
			label_color: "rgba(255, 255, 255, 0.85)".into(),
			simulation: SimulationParameters::default(),
		}
	}
}

impl GraphConfig {
	pub fn color(&self, group: i64) -> &str {
		match self.palette.len() {
			0 => "#ffffff",
			len => self.palette[group.rem_euclid(len as i64) as usize].as_str(),
		}
	}

	pub fn node_radius(&self, node: &GraphNode) -> f64 {
		node.size.max(0.0).sqrt() * self.node_rel_size
	}
}

/// Map documents to nodes and synthesize decorative random links.
///
/// An empty document list yields seed nodes instead. Links are random
/// filler for the animation and carry no meaning about the documents.
pub fn build_graph(
	documents: &[DocumentSummary],
	config: &GraphConfig,
	rng: &mut impl Rng,
) -> GraphData {
	let nodes: Vec<GraphNode> = if documents.is_empty() {
		(0..config.seed_count.max(1))
			.map(|i| GraphNode {
				id: NodeId::Seed(i as u32),
				label: config.seed_label.clone(),
				group: rng.gen_range(0..config.seed_groups.max(1)),
				size: config.seed_size_min
					+ if config.seed_size_jitter > 0.0 {
						rng.gen_range(0.0..config.seed_size_jitter)
					} else {
						0.0
					},
			})
			.collect()
	} else {
		let mut seen = HashSet::new();
		documents
			.iter()
			.filter(|doc| seen.insert(doc.id))
			.map(|doc| GraphNode {
				id: NodeId::Document(doc.id),
				label: doc.title.clone().unwrap_or_default(),
				group: doc.owner_id.unwrap_or(0),
				size: config.document_size,
			})
			.collect()
	};

	let mut links = Vec::with_capacity(nodes.len() * config.links_per_node);
	for node in &nodes {
		for _ in 0..config.links_per_node {
			let target = nodes[rng.gen_range(0..nodes.len())].id;
			if target != node.id {
				links.push(GraphLink {
					source: node.id,
					target,
				});
			}
		}
	}

	GraphData { nodes, links }
}

#[derive(Clone, Debug, Default)]
pub struct DragState {
	pub node_idx: usize,
	pub start_x: f64,
	pub start_y: f64,
	pub moved: bool,
}

/// The document graph, its running layout, and pointer interaction state.
pub struct GraphAdapter {
	pub config: GraphConfig,
	pub width: f64,
	pub height: f64,
	pub hover: Option<usize>,
	pub drag: Option<DragState>,
	data: GraphData,
	source: Vec<DocumentSummary>,
	index: HashMap<NodeId, usize>,
	simulation: Simulation,
	rng: SmallRng,
}

impl GraphAdapter {
	pub fn new(
		config: GraphConfig,
		documents: &[DocumentSummary],
		width: f64,
		height: f64,
		mut rng: SmallRng,
	) -> Self {
		let simulation = Simulation::new(0, &[], config.simulation.clone(), &mut rng);
		let mut adapter = Self {
			config,
			width,
			height,
			hover: None,
			drag: None,
			data: GraphData::default(),
			source: Vec::new(),
			index: HashMap::new(),
			simulation,
			rng,
		};
		adapter.rebuild(documents);
		adapter
	}

	/// Throw away nodes, links and layout and start over from `documents`.
	pub fn rebuild(&mut self, documents: &[DocumentSummary]) {
		let data = build_graph(documents, &self.config, &mut self.rng);
		let index: HashMap<NodeId, usize> = data
			.nodes
			.iter()
			.enumerate()
			.map(|(i, node)| (node.id, i))
			.collect();
		let pairs: Vec<(usize, usize)> = data
			.links
			.iter()
			.filter_map(|link| Some((*index.get(&link.source)?, *index.get(&link.target)?)))
			.collect();

		self.simulation = Simulation::new(
			data.nodes.len(),
			&pairs,
			self.config.simulation.clone(),
			&mut self.rng,
		);
		log::debug!(
			"graph rebuilt: {} nodes, {} links from {} documents",
			data.nodes.len(),
			data.links.len(),
			documents.len()
		);
		self.data = data;
		self.index = index;
		self.source = documents.to_vec();
		self.hover = None;
		self.drag = None;
	}

	/// Rebuild only when the document list differs from the last one built.
	pub fn rebuild_if_changed(&mut self, documents: &[DocumentSummary]) -> bool {
		if self.source == documents {
			return false;
		}
		self.rebuild(documents);
		true
	}

	/// One simulation step followed by random velocity injection.
	pub fn tick(&mut self) {
		if !self.simulation.tick(&mut self.rng) {
			return;
		}
		let drift = self.config.drift;
		if drift <= 0.0 {
			return;
		}
		for node in self.simulation.nodes_mut() {
			node.vx += self.rng.gen_range(-drift..=drift);
			node.vy += self.rng.gen_range(-drift..=drift);
		}
	}

	/// Track the viewport. Node positions are left alone.
	pub fn resize(&mut self, width: f64, height: f64) {
		self.width = width;
		self.height = height;
	}

	pub fn data(&self) -> &GraphData {
		&self.data
	}

	pub fn simulation(&self) -> &Simulation {
		&self.simulation
	}

	/// Nodes paired with their current layout state.
	pub fn placed_nodes(&self) -> impl Iterator<Item = (&GraphNode, &SimNode)> {
		self.data.nodes.iter().zip(self.simulation.nodes())
	}

	/// Link endpoints in layout space.
	pub fn placed_links(&self) -> impl Iterator<Item = (&SimNode, &SimNode)> {
		let nodes = self.simulation.nodes();
		self.data.links.iter().filter_map(move |link| {
			let s = nodes.get(*self.index.get(&link.source)?)?;
			let t = nodes.get(*self.index.get(&link.target)?)?;
			Some((s, t))
		})
	}

	/// The layout is centred on the origin and drawn at the canvas centre.
	pub fn screen_to_graph(&self, sx: f64, sy: f64) -> (f64, f64) {
		(sx - self.width / 2.0, sy - self.height / 2.0)
	}

	/// Topmost node under a canvas point.
	pub fn node_at_position(&self, sx: f64, sy: f64) -> Option<usize> {
		let (gx, gy) = self.screen_to_graph(sx, sy);
		self.placed_nodes()
			.enumerate()
			.filter(|(_, (node, sim))| {
				let r = self.config.node_radius(node).max(MIN_HIT_RADIUS);
				(sim.x - gx).hypot(sim.y - gy) < r
			})
			.map(|(i, _)| i)
			.last()
	}

	/// Navigation for a click on node `idx`; `None` for seeds.
	pub fn click(&self, idx: usize) -> Option<NavigationIntent> {
		let id = self.data.nodes.get(idx)?.id;
		log::debug!("node {id} clicked");
		id.navigation_intent()
	}

	/// Returns `true` when the press landed on a node.
	pub fn pointer_down(&mut self, sx: f64, sy: f64) -> bool {
		let Some(idx) = self.node_at_position(sx, sy) else {
			return false;
		};
		self.drag = Some(DragState {
			node_idx: idx,
			start_x: sx,
			start_y: sy,
			moved: false,
		});
		true
	}

	pub fn pointer_move(&mut self, sx: f64, sy: f64) {
		let Some(drag) = self.drag.as_mut() else {
			self.hover = self.node_at_position(sx, sy);
			return;
		};
		if !drag.moved && (sx - drag.start_x).hypot(sy - drag.start_y) > CLICK_TOLERANCE {
			drag.moved = true;
		}
		if drag.moved {
			let idx = drag.node_idx;
			let (gx, gy) = self.screen_to_graph(sx, sy);
			self.simulation.fix(idx, gx, gy);
		}
	}

	/// Ends a press. A press that never moved is a click on its node.
	pub fn pointer_up(&mut self) -> Option<NavigationIntent> {
		let drag = self.drag.take()?;
		self.simulation.release(drag.node_idx);
		if drag.moved {
			None
		} else {
			self.click(drag.node_idx)
		}
	}

	pub fn pointer_leave(&mut self) {
		if let Some(drag) = self.drag.take() {
			self.simulation.release(drag.node_idx);
		}
		self.hover = None;
	}
}

#[cfg(test)]
mod tests {
	use std::collections::HashSet;

	use rand::SeedableRng;
	use rand::rngs::mock::StepRng;

	use super::*;

	fn docs(ids: &[i64]) -> Vec<DocumentSummary> {
		ids.iter()
			.map(|&id| DocumentSummary {
				id,
				title: Some(format!("Doc {id}")),
				owner_id: Some(id % 3),
				..Default::default()
			})
			.collect()
	}

	fn rng(seed: u64) -> SmallRng {
		SmallRng::seed_from_u64(seed)
	}

	fn node_ids(data: &GraphData) -> HashSet<NodeId> {
		data.nodes.iter().map(|n| n.id).collect()
	}

	fn assert_links_resolve(data: &GraphData) {
		let ids = node_ids(data);
		for link in &data.links {
			assert!(ids.contains(&link.source) && ids.contains(&link.target));
			assert_ne!(link.source, link.target);
		}
	}

	fn adapter(documents: &[DocumentSummary]) -> GraphAdapter {
		GraphAdapter::new(GraphConfig::default(), documents, 800.0, 600.0, rng(11))
	}

	#[test]
	fn empty_input_yields_seed_constellation() {
		for seed in 0..20 {
			let data = build_graph(&[], &GraphConfig::default(), &mut rng(seed));
			assert_eq!(data.nodes.len(), 30);
			assert!(data.nodes.iter().all(|n| matches!(n.id, NodeId::Seed(_))));
			assert!(data.nodes.iter().all(|n| (0..5).contains(&n.group)));
			assert!(data.nodes.iter().all(|n| (2.0..5.0).contains(&n.size)));
			assert!(data.links.len() <= 60);
			assert_links_resolve(&data);
		}
	}

	#[test]
	fn zero_seed_count_still_draws_something() {
		let config = GraphConfig {
			seed_count: 0,
			..Default::default()
		};
		let data = build_graph(&[], &config, &mut rng(1));
		assert_eq!(data.nodes.len(), 1);
		assert!(data.links.is_empty());
	}

	#[test]
	fn one_node_per_document() {
		let input = docs(&[5, 8, 13, 21, 34, 55]);
		for seed in 0..20 {
			let data = build_graph(&input, &GraphConfig::default(), &mut rng(seed));
			let ids: Vec<_> = data.nodes.iter().map(|n| n.id).collect();
			let expected: Vec<_> = input.iter().map(|d| NodeId::Document(d.id)).collect();
			assert_eq!(ids, expected);
			assert!(data.links.len() <= 2 * input.len());
			assert_links_resolve(&data);
		}
		let data = build_graph(&input, &GraphConfig::default(), &mut rng(0));
		assert_eq!(data.nodes[0].label, "Doc 5");
		assert_eq!(data.nodes[0].group, 2);
		assert_eq!(data.nodes[0].size, 3.0);
	}

	#[test]
	fn each_node_draws_its_links() {
		let input = docs(&[5, 8, 13, 21, 34, 55, 89, 144]);
		let config = GraphConfig::default();
		for seed in 0..20 {
			let data = build_graph(&input, &config, &mut rng(seed));
			assert!(!data.links.is_empty());
			for node in &data.nodes {
				let outgoing = data.links.iter().filter(|l| l.source == node.id).count();
				assert!(outgoing <= config.links_per_node);
			}
			assert_links_resolve(&data);
		}

		// With eight nodes a self-draw is skipped one time in eight.
		let drawn: usize = (0..50)
			.map(|seed| build_graph(&input, &config, &mut rng(seed)).links.len())
			.sum();
		let attempts = 50 * input.len() * config.links_per_node;
		assert!(drawn < attempts);
		assert!(drawn > attempts * 3 / 4, "{drawn} of {attempts}");
	}

	#[test]
	fn self_draws_are_skipped_not_redrawn() {
		// A constant generator always picks the first node as target.
		let mut always_first = StepRng::new(0, 0);
		let input = docs(&[5, 8, 13, 21]);
		let config = GraphConfig {
			links_per_node: 3,
			..Default::default()
		};
		let data = build_graph(&input, &config, &mut always_first);
		assert_eq!(data.links.len(), (input.len() - 1) * config.links_per_node);
		assert!(data.links.iter().all(|l| l.target == NodeId::Document(5)));
		assert!(data.links.iter().all(|l| l.source != NodeId::Document(5)));
	}

	#[test]
	fn single_document_has_no_links() {
		let data = build_graph(&docs(&[1]), &GraphConfig::default(), &mut rng(3));
		assert_eq!(data.nodes.len(), 1);
		assert!(data.links.is_empty());
	}

	#[test]
	fn malformed_documents_fall_back() {
		let input = vec![DocumentSummary {
			id: 9,
			..Default::default()
		}];
		let data = build_graph(&input, &GraphConfig::default(), &mut rng(3));
		assert_eq!(data.nodes[0].label, "");
		assert_eq!(data.nodes[0].group, 0);
	}

	#[test]
	fn duplicate_document_ids_collapse() {
		let data = build_graph(&docs(&[4, 4, 6]), &GraphConfig::default(), &mut rng(3));
		assert_eq!(data.nodes.len(), 2);
		assert_links_resolve(&data);
	}

	#[test]
	fn palette_buckets_wrap_including_negative_groups() {
		let config = GraphConfig::default();
		assert_eq!(config.color(0), "#7042f8");
		assert_eq!(config.color(6), "#00f6ff");
		assert_eq!(config.color(-1), "#ffffff");
	}

	#[test]
	fn rebuild_replaces_nodes_and_links() {
		let mut graph = adapter(&docs(&[1, 2, 3]));
		assert!(graph.rebuild_if_changed(&docs(&[10, 11, 12, 13])));
		let ids = node_ids(graph.data());
		assert_eq!(ids.len(), 4);
		assert!([1, 2, 3].iter().all(|&id| !ids.contains(&NodeId::Document(id))));
		assert_links_resolve(graph.data());
		assert_eq!(graph.simulation().nodes().len(), 4);
		assert!(graph.placed_links().count() == graph.data().links.len());

		assert!(graph.rebuild_if_changed(&[]));
		assert_eq!(graph.data().nodes.len(), 30);
		assert_links_resolve(graph.data());
	}

	#[test]
	fn unchanged_documents_do_not_rebuild() {
		let input = docs(&[1, 2, 3]);
		let mut graph = adapter(&input);
		for _ in 0..5 {
			graph.tick();
		}
		let before: Vec<SimNode> = graph.simulation().nodes().to_vec();
		assert!(!graph.rebuild_if_changed(&input));
		assert_eq!(graph.simulation().nodes(), &before[..]);
	}

	#[test]
	fn keeps_drifting_forever() {
		let mut graph = adapter(&docs(&[1, 2, 3, 4, 5]));
		for _ in 0..3_000 {
			graph.tick();
		}
		assert!(graph.simulation().is_running());
		let before = positions(&graph);
		graph.tick();
		assert_ne!(before, positions(&graph));
	}

	fn positions(graph: &GraphAdapter) -> Vec<(f64, f64)> {
		graph.simulation().nodes().iter().map(|n| (n.x, n.y)).collect()
	}

	/// No forces and no friction: only the per-tick noise touches velocity.
	fn drift_only(drift: f64) -> GraphAdapter {
		let config = GraphConfig {
			links_per_node: 0,
			drift,
			simulation: SimulationParameters {
				velocity_decay: 0.0,
				charge_strength: 0.0,
				center_strength: 0.0,
				..Default::default()
			},
			..Default::default()
		};
		let mut graph = GraphAdapter::new(config, &docs(&[1, 2, 3, 4, 5, 6]), 800.0, 600.0, rng(5));
		for node in graph.simulation.nodes_mut() {
			node.vx = 0.0;
			node.vy = 0.0;
		}
		graph
	}

	#[test]
	fn tick_injects_bounded_velocity_noise() {
		let mut graph = drift_only(0.01);
		assert!(graph.data().links.is_empty());
		let before = positions(&graph);
		graph.tick();
		// Velocity was zero going in, so positions only move on the next tick.
		assert_eq!(positions(&graph), before);

		let velocities: Vec<(f64, f64)> =
			graph.simulation().nodes().iter().map(|n| (n.vx, n.vy)).collect();
		assert!(velocities.iter().all(|&(vx, vy)| vx.abs() <= 0.01 && vy.abs() <= 0.01));
		assert!(velocities.iter().any(|&(vx, vy)| vx != 0.0 || vy != 0.0));

		graph.tick();
		assert_ne!(positions(&graph), before);
		assert!(
			graph
				.simulation()
				.nodes()
				.iter()
				.all(|n| n.vx.abs() <= 0.02 && n.vy.abs() <= 0.02)
		);
	}

	#[test]
	fn zero_drift_leaves_a_force_free_graph_still() {
		let mut graph = drift_only(0.0);
		let before = positions(&graph);
		for _ in 0..10 {
			graph.tick();
		}
		assert_eq!(positions(&graph), before);
		assert!(graph.simulation().nodes().iter().all(|n| n.vx == 0.0 && n.vy == 0.0));
	}

	#[test]
	fn resize_keeps_positions() {
		let mut graph = adapter(&docs(&[1, 2]));
		let before = graph.simulation().nodes().to_vec();
		graph.resize(1024.0, 300.0);
		assert_eq!((graph.width, graph.height), (1024.0, 300.0));
		assert_eq!(graph.simulation().nodes(), &before[..]);
	}

	fn node_screen_pos(graph: &GraphAdapter, idx: usize) -> (f64, f64) {
		let n = &graph.simulation().nodes()[idx];
		(n.x + graph.width / 2.0, n.y + graph.height / 2.0)
	}

	fn isolated(documents: &[DocumentSummary]) -> GraphAdapter {
		// Spread nodes out so hit tests are unambiguous.
		let mut graph = adapter(documents);
		for (i, node) in graph.simulation.nodes_mut().iter_mut().enumerate() {
			node.x = i as f64 * 100.0 - 100.0;
			node.y = 0.0;
		}
		graph
	}

	#[test]
	fn clicking_document_node_navigates() {
		let mut graph = isolated(&docs(&[7, 8, 9]));
		let (x, y) = node_screen_pos(&graph, 1);
		assert_eq!(graph.node_at_position(x, y), Some(1));
		assert!(graph.pointer_down(x, y));
		let intent = graph.pointer_up().unwrap();
		assert_eq!(intent.document_id, 8);
		assert_eq!(intent.path(), "/note/8");
	}

	#[test]
	fn clicking_seed_node_goes_nowhere() {
		let mut graph = isolated(&[]);
		for idx in 0..graph.data().nodes.len() {
			assert_eq!(graph.click(idx), None);
		}
		let (x, y) = node_screen_pos(&graph, 0);
		assert!(graph.pointer_down(x, y));
		assert_eq!(graph.pointer_up(), None);
	}

	#[test]
	fn dragging_pins_then_releases_without_navigating() {
		let mut graph = isolated(&docs(&[7, 8, 9]));
		let (x, y) = node_screen_pos(&graph, 2);
		assert!(graph.pointer_down(x, y));
		graph.pointer_move(x + 40.0, y + 10.0);
		let expected = graph.screen_to_graph(x + 40.0, y + 10.0);
		assert_eq!(graph.simulation().nodes()[2].fixed, Some(expected));
		graph.tick();
		let n = &graph.simulation().nodes()[2];
		assert_eq!((n.x, n.y), expected);

		assert_eq!(graph.pointer_up(), None);
		assert_eq!(graph.simulation().nodes()[2].fixed, None);
	}

	#[test]
	fn press_on_background_is_ignored() {
		let mut graph = isolated(&docs(&[7, 8, 9]));
		assert!(!graph.pointer_down(5.0, 5.0));
		assert_eq!(graph.pointer_up(), None);
	}

	#[test]
	fn hover_tracks_pointer_and_clears_on_leave() {
		let mut graph = isolated(&docs(&[7, 8, 9]));
		let (x, y) = node_screen_pos(&graph, 0);
		graph.pointer_move(x, y);
		assert_eq!(graph.hover, Some(0));
		graph.pointer_leave();
		assert_eq!(graph.hover, None);
	}

	#[test]
	fn halted_loop_leaves_graph_untouched() {
		use std::cell::RefCell;
		use std::rc::Rc;

		use crate::components::frame_loop::FrameLoop;
		use crate::components::frame_loop::testing::ManualFrames;

		let graph = Rc::new(RefCell::new(adapter(&docs(&[1, 2, 3]))));
		let frames = ManualFrames::default();
		let stepped = graph.clone();
		let frame_loop = FrameLoop::start(frames.clone(), move || stepped.borrow_mut().tick());
		for _ in 0..10 {
			frames.advance();
		}
		drop(frame_loop);
		let snapshot = graph.borrow().simulation().nodes().to_vec();
		for _ in 0..10 {
			frames.advance();
		}
		assert_eq!(graph.borrow().simulation().nodes(), &snapshot[..]);
	}
}
