use std::cell::RefCell;
use std::rc::Rc;

use leptos::prelude::*;
use leptos_router::hooks::use_navigate;
use rand::SeedableRng;
use rand::rngs::SmallRng;
use send_wrapper::SendWrapper;
use web_sys::{HtmlCanvasElement, MouseEvent};

use super::render;
use super::state::{GraphAdapter, GraphConfig};
use super::types::DocumentSummary;
use crate::components::frame_loop::{BrowserFrames, FrameLoop};
use crate::components::surface::{self, ResizeListener, SurfaceError};

type SharedGraph = Rc<RefCell<Option<GraphAdapter>>>;

struct Running {
	_frames: FrameLoop,
	_resize: ResizeListener,
}

/// Drifting graph of `documents`; clicking a document node opens it.
#[component]
pub fn NeuralGraph(
	#[prop(into)] documents: Signal<Vec<DocumentSummary>>,
	#[prop(optional)] config: GraphConfig,
	#[prop(default = 600.0)] height: f64,
) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let graph: SharedGraph = Rc::new(RefCell::new(None));
	let running: Rc<RefCell<Option<Running>>> = Rc::new(RefCell::new(None));
	let pointer_over_node = RwSignal::new(false);
	let navigate = use_navigate();

	let (graph_init, running_init) = (graph.clone(), running.clone());
	Effect::new(move |_| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();
		running_init.borrow_mut().take();
		let docs = documents.get_untracked();
		match start(&canvas, &graph_init, config.clone(), &docs, height) {
			Ok(r) => *running_init.borrow_mut() = Some(r),
			Err(err) => log::warn!("neural graph disabled: {err}"),
		}
	});

	let graph_docs = graph.clone();
	Effect::new(move |_| {
		let docs = documents.get();
		if let Some(g) = graph_docs.borrow_mut().as_mut() {
			g.rebuild_if_changed(&docs);
		}
	});

	let teardown = SendWrapper::new((graph.clone(), running));
	on_cleanup(move || {
		let (graph, running) = &*teardown;
		running.borrow_mut().take();
		graph.borrow_mut().take();
		log::debug!("neural graph torn down");
	});

	let local = move |ev: &MouseEvent| -> Option<(f64, f64)> {
		let canvas: HtmlCanvasElement = canvas_ref.get()?.into();
		let rect = canvas.get_bounding_client_rect();
		Some((
			ev.client_x() as f64 - rect.left(),
			ev.client_y() as f64 - rect.top(),
		))
	};

	let graph_md = graph.clone();
	let on_mousedown = move |ev: MouseEvent| {
		let Some((x, y)) = local(&ev) else {
			return;
		};
		if let Some(g) = graph_md.borrow_mut().as_mut() {
			g.pointer_down(x, y);
		}
	};

	let graph_mm = graph.clone();
	let on_mousemove = move |ev: MouseEvent| {
		let Some((x, y)) = local(&ev) else {
			return;
		};
		if let Some(g) = graph_mm.borrow_mut().as_mut() {
			g.pointer_move(x, y);
			pointer_over_node.set(g.hover.is_some() || g.drag.is_some());
		}
	};

	let graph_mu = graph.clone();
	let on_mouseup = move |_: MouseEvent| {
		let intent = graph_mu.borrow_mut().as_mut().and_then(|g| g.pointer_up());
		if let Some(intent) = intent {
			log::info!("opening document {}", intent.document_id);
			navigate(&intent.path(), Default::default());
		}
	};

	let graph_ml = graph;
	let on_mouseleave = move |_: MouseEvent| {
		if let Some(g) = graph_ml.borrow_mut().as_mut() {
			g.pointer_leave();
		}
		pointer_over_node.set(false);
	};

	view! {
		<div class="neural-graph">
			<canvas
				node_ref=canvas_ref
				on:mousedown=on_mousedown
				on:mousemove=on_mousemove
				on:mouseup=on_mouseup
				on:mouseleave=on_mouseleave
				style:cursor=move || if pointer_over_node.get() { "pointer" } else { "default" }
			/>
			<div class="neural-graph-fade" />
		</div>
	}
}

fn start(
	canvas: &HtmlCanvasElement,
	graph: &SharedGraph,
	config: GraphConfig,
	documents: &[DocumentSummary],
	height: f64,
) -> Result<Running, SurfaceError> {
	let window = surface::window()?;
	let ctx = surface::context_2d(canvas)?;
	let (width, _) = surface::window_size(&window)?;
	surface::set_canvas_size(canvas, width, height);
	*graph.borrow_mut() = Some(GraphAdapter::new(
		config,
		documents,
		width,
		height,
		SmallRng::from_entropy(),
	));

	let (graph_resize, canvas_resize, window_resize) =
		(graph.clone(), canvas.clone(), window.clone());
	let resize = ResizeListener::attach(&window, move || {
		let width = match surface::window_size(&window_resize) {
			Ok((w, _)) => w,
			Err(err) => {
				log::warn!("resize ignored: {err}");
				return;
			}
		};
		surface::set_canvas_size(&canvas_resize, width, height);
		if let Ok(mut g) = graph_resize.try_borrow_mut() {
			if let Some(g) = g.as_mut() {
				g.resize(width, height);
			}
		}
	})?;

	let graph_anim = graph.clone();
	let frames = FrameLoop::start(BrowserFrames::new(window), move || {
		let Ok(mut g) = graph_anim.try_borrow_mut() else {
			return;
		};
		if let Some(g) = g.as_mut() {
			g.tick();
			render::render(g, &ctx);
		}
	});

	Ok(Running {
		_frames: frames,
		_resize: resize,
	})
}
