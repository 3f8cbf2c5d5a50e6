use std::cell::RefCell;
use std::rc::Rc;

use leptos::prelude::*;
use send_wrapper::SendWrapper;
use web_sys::HtmlCanvasElement;

use super::render;
use super::state::{ParticleConfig, ParticleField};
use crate::components::frame_loop::{BrowserFrames, FrameLoop};
use crate::components::surface::{self, ResizeListener, SurfaceError};

/// Everything that keeps the layer alive. Dropping it stops the animation
/// and detaches the resize listener.
struct Running {
	_frames: FrameLoop,
	_resize: ResizeListener,
}

/// Full-window, non-interactive particle animation.
#[component]
pub fn ParticleNetwork(#[prop(optional)] config: ParticleConfig) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let running: Rc<RefCell<Option<Running>>> = Rc::new(RefCell::new(None));
	let running_init = running.clone();

	Effect::new(move |_| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();
		// Replacing a previous run drops (and cancels) it first.
		running_init.borrow_mut().take();
		match start(&canvas, config.clone()) {
			Ok(r) => *running_init.borrow_mut() = Some(r),
			Err(err) => log::warn!("particle network disabled: {err}"),
		}
	});

	let running = SendWrapper::new(running);
	on_cleanup(move || {
		if running.borrow_mut().take().is_some() {
			log::debug!("particle network torn down");
		}
	});

	view! {
		<canvas
			node_ref=canvas_ref
			class="particle-network"
		/>
	}
}

fn start(canvas: &HtmlCanvasElement, config: ParticleConfig) -> Result<Running, SurfaceError> {
	let window = surface::window()?;
	let ctx = surface::context_2d(canvas)?;
	let (w, h) = surface::window_size(&window)?;

	let field = Rc::new(RefCell::new(ParticleField::new(config)));
	reinitialize(canvas, &field, w, h);

	let (field_resize, canvas_resize, window_resize) =
		(field.clone(), canvas.clone(), window.clone());
	let resize = ResizeListener::attach(&window, move || {
		match surface::window_size(&window_resize) {
			Ok((nw, nh)) => reinitialize(&canvas_resize, &field_resize, nw, nh),
			Err(err) => log::warn!("resize ignored: {err}"),
		}
	})?;

	let field_anim = field.clone();
	let frames = FrameLoop::start(BrowserFrames::new(window), move || {
		let Ok(mut field) = field_anim.try_borrow_mut() else {
			return;
		};
		field.tick();
		render::render(&field, &ctx);
	});

	Ok(Running {
		_frames: frames,
		_resize: resize,
	})
}

/// Resize the surface and regenerate the particles for it. Positions are
/// not carried over.
fn reinitialize(canvas: &HtmlCanvasElement, field: &RefCell<ParticleField>, w: f64, h: f64) {
	let Ok(mut field) = field.try_borrow_mut() else {
		return;
	};
	surface::set_canvas_size(canvas, w, h);
	if let Err(err) = field.initialize(w, h, &mut rand::thread_rng()) {
		log::warn!("particle field left empty: {err}");
	}
}
