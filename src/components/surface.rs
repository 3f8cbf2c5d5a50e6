//! Canvas and window plumbing shared by the background layers.

use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, Window};

/// Failures while acquiring a drawing surface or browser primitive.
///
/// None of these are fatal: callers log them and skip drawing.
#[derive(Debug, thiserror::Error)]
pub enum SurfaceError {
	#[error("no global window")]
	NoWindow,
	#[error("canvas has no 2d context")]
	NoContext,
	#[error("window dimensions unavailable")]
	NoDimensions,
	#[error("javascript error: {0}")]
	Js(String),
}

impl From<JsValue> for SurfaceError {
	fn from(value: JsValue) -> Self {
		Self::Js(value.as_string().unwrap_or_else(|| format!("{value:?}")))
	}
}

pub fn window() -> Result<Window, SurfaceError> {
	web_sys::window().ok_or(SurfaceError::NoWindow)
}

/// Inner size of the browser window in CSS pixels.
pub fn window_size(window: &Window) -> Result<(f64, f64), SurfaceError> {
	let w = window.inner_width()?.as_f64();
	let h = window.inner_height()?.as_f64();
	match (w, h) {
		(Some(w), Some(h)) => Ok((w, h)),
		_ => Err(SurfaceError::NoDimensions),
	}
}

pub fn context_2d(canvas: &HtmlCanvasElement) -> Result<CanvasRenderingContext2d, SurfaceError> {
	canvas
		.get_context("2d")?
		.ok_or(SurfaceError::NoContext)?
		.dyn_into()
		.map_err(|_| SurfaceError::NoContext)
}

pub fn set_canvas_size(canvas: &HtmlCanvasElement, width: f64, height: f64) {
	canvas.set_width(width.max(0.0) as u32);
	canvas.set_height(height.max(0.0) as u32);
}

/// A window `resize` listener that detaches itself when dropped.
pub struct ResizeListener {
	window: Window,
	callback: Closure<dyn FnMut()>,
}

impl ResizeListener {
	pub fn attach(
		window: &Window,
		on_resize: impl FnMut() + 'static,
	) -> Result<Self, SurfaceError> {
		let callback = Closure::<dyn FnMut()>::new(on_resize);
		window.add_event_listener_with_callback("resize", callback.as_ref().unchecked_ref())?;
		Ok(Self {
			window: window.clone(),
			callback,
		})
	}
}

impl Drop for ResizeListener {
	fn drop(&mut self) {
		let function: &js_sys::Function = self.callback.as_ref().unchecked_ref();
		if let Err(err) = self
			.window
			.remove_event_listener_with_callback("resize", function)
		{
			log::warn!("failed to detach resize listener: {err:?}");
		}
	}
}
