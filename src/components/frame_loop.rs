//! Cooperative per-frame scheduling with an owned, cancellable request token.
//!
//! A [`FrameLoop`] runs its step once per host frame and re-requests the next
//! frame at the end of every iteration. The id of the pending request is held
//! by the loop itself; [`FrameLoop::cancel`] (or dropping the loop) revokes it
//! synchronously, after which the step never runs again.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use wasm_bindgen::prelude::*;
use web_sys::Window;

use super::surface::SurfaceError;

pub type FrameRequestId = i32;

/// Callback the host invokes when a requested frame fires.
pub type FrameCallback = Rc<dyn Fn()>;

/// The host's frame scheduling primitive.
pub trait FrameHost {
	fn request_frame(&self, callback: &FrameCallback) -> Result<FrameRequestId, SurfaceError>;
	fn cancel_frame(&self, id: FrameRequestId);
}

/// `requestAnimationFrame` on the browser window.
pub struct BrowserFrames {
	window: Window,
	closure: RefCell<Option<Closure<dyn FnMut()>>>,
}

impl BrowserFrames {
	pub fn new(window: Window) -> Self {
		Self {
			window,
			closure: RefCell::new(None),
		}
	}
}

impl FrameHost for BrowserFrames {
	fn request_frame(&self, callback: &FrameCallback) -> Result<FrameRequestId, SurfaceError> {
		let mut closure = self.closure.borrow_mut();
		let closure = closure.get_or_insert_with(|| {
			let callback = callback.clone();
			Closure::new(move || callback())
		});
		Ok(self
			.window
			.request_animation_frame(closure.as_ref().unchecked_ref())?)
	}

	fn cancel_frame(&self, id: FrameRequestId) {
		if let Err(err) = self.window.cancel_animation_frame(id) {
			log::warn!("cancel_animation_frame({id}) failed: {err:?}");
		}
	}
}

struct LoopInner {
	host: Box<dyn FrameHost>,
	step: RefCell<Box<dyn FnMut()>>,
	callback: FrameCallback,
	pending: Cell<Option<FrameRequestId>>,
	cancelled: Cell<bool>,
}

impl LoopInner {
	fn schedule(&self) {
		match self.host.request_frame(&self.callback) {
			Ok(id) => self.pending.set(Some(id)),
			Err(err) => {
				log::warn!("frame request failed, animation stopped: {err}");
				self.cancelled.set(true);
			}
		}
	}

	fn fire(&self) {
		self.pending.set(None);
		if self.cancelled.get() {
			return;
		}
		// Re-entrant fire from inside the step is dropped.
		let Ok(mut step) = self.step.try_borrow_mut() else {
			return;
		};
		(*step)();
		drop(step);
		if !self.cancelled.get() {
			self.schedule();
		}
	}

	fn cancel(&self) {
		self.cancelled.set(true);
		if let Some(id) = self.pending.take() {
			self.host.cancel_frame(id);
		}
	}
}

/// Owning handle of a running animation loop.
pub struct FrameLoop {
	inner: Rc<LoopInner>,
}

impl FrameLoop {
	/// Request the first frame and run `step` on every frame until cancelled.
	pub fn start(host: impl FrameHost + 'static, step: impl FnMut() + 'static) -> Self {
		let inner = Rc::new_cyclic(|weak: &Weak<LoopInner>| {
			let weak = weak.clone();
			LoopInner {
				host: Box::new(host),
				step: RefCell::new(Box::new(step)),
				callback: Rc::new(move || {
					if let Some(inner) = weak.upgrade() {
						inner.fire();
					}
				}),
				pending: Cell::new(None),
				cancelled: Cell::new(false),
			}
		});
		inner.schedule();
		Self { inner }
	}

	/// Revoke the pending frame. Idempotent.
	pub fn cancel(&self) {
		self.inner.cancel();
	}
}

impl Drop for FrameLoop {
	fn drop(&mut self) {
		self.cancel();
	}
}
