//! Binds an [`Engine`] to a page canvas: sizing, input subscriptions and the
//! `requestAnimationFrame` loop, plus their teardown.

use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Event, EventTarget, HtmlCanvasElement, MouseEvent, TouchEvent, Window};

use crate::canvas::CanvasSurface;
use crate::engine::config::EngineConfig;
use crate::engine::Engine;
use crate::error::EngineError;

type FrameCallback = Closure<dyn FnMut(f64)>;

struct Runtime {
    engine: Engine,
    surface: CanvasSurface,
    canvas: HtmlCanvasElement,
    window: Window,
    running: bool,
    frame_handle: Option<i32>,
}

impl Runtime {
    fn fit_canvas(&mut self) {
        let (width, height) = fit_canvas(&self.canvas);
        if let Err(err) = self.engine.resize(width, height) {
            log::debug!("skipping starfield resize: {}", err);
        }
    }

    fn pointer_at(&mut self, client_x: f64, client_y: f64) {
        let rect = self.canvas.get_bounding_client_rect();
        self.engine.pointer_move(client_x - rect.left(), client_y - rect.top());
    }
}

/// An input subscription that is removed again on [`Listener::detach`].
struct Listener {
    target: EventTarget,
    kind: &'static str,
    callback: Closure<dyn FnMut(Event)>,
}

impl Listener {
    fn attach(
        target: &EventTarget,
        kind: &'static str,
        callback: Closure<dyn FnMut(Event)>,
    ) -> Result<Self, EngineError> {
        target.add_event_listener_with_callback(kind, callback.as_ref().unchecked_ref())?;
        Ok(Self {
            target: target.clone(),
            kind,
            callback,
        })
    }

    fn detach(self) {
        let _ = self
            .target
            .remove_event_listener_with_callback(self.kind, self.callback.as_ref().unchecked_ref());
    }
}

pub struct Driver {
    state: Rc<RefCell<Runtime>>,
    frame: Rc<RefCell<Option<FrameCallback>>>,
    listeners: Vec<Listener>,
}

impl Driver {
    /// Sizes the canvas, seeds the field, subscribes to input and starts the
    /// frame loop. Nothing is left attached when this returns an error.
    pub fn start(
        canvas: HtmlCanvasElement,
        config: EngineConfig,
        seed: Option<u64>,
    ) -> Result<Self, EngineError> {
        let window = web_sys::window().ok_or(EngineError::NoWindow)?;
        let document = window.document().ok_or(EngineError::NoDocument)?;
        let surface = CanvasSurface::from_canvas(&canvas)?;

        let (width, height) = fit_canvas(&canvas);
        let now = now_ms(&window);
        let engine = match seed {
            Some(seed) => Engine::new(config, seed, width, height, now),
            None => Engine::from_entropy(config, width, height, now),
        };
        log::info!(
            "starfield `{}` attached at {}x{}",
            engine.config().name,
            width,
            height
        );

        let state = Rc::new(RefCell::new(Runtime {
            engine,
            surface,
            canvas,
            window: window.clone(),
            running: true,
            frame_handle: None,
        }));

        let mut driver = Self {
            state,
            frame: Rc::new(RefCell::new(None)),
            listeners: Vec::new(),
        };
        if let Err(err) = driver.subscribe(&window, &document) {
            driver.shutdown();
            return Err(err);
        }
        driver.start_frames();
        Ok(driver)
    }

    fn subscribe(&mut self, window: &Window, document: &web_sys::Document) -> Result<(), EngineError> {
        let state = self.state.clone();
        self.listen(window, "resize", move |_| state.borrow_mut().fit_canvas())?;

        let state = self.state.clone();
        self.listen(window, "mousemove", move |event| {
            if let Some(mouse) = event.dyn_ref::<MouseEvent>() {
                state
                    .borrow_mut()
                    .pointer_at(mouse.client_x() as f64, mouse.client_y() as f64);
            }
        })?;

        let state = self.state.clone();
        self.listen(window, "touchmove", move |event| {
            let touch = event
                .dyn_ref::<TouchEvent>()
                .and_then(|touch| touch.touches().get(0));
            if let Some(touch) = touch {
                state
                    .borrow_mut()
                    .pointer_at(touch.client_x() as f64, touch.client_y() as f64);
            }
        })?;

        let state = self.state.clone();
        self.listen(window, "touchend", move |_| state.borrow_mut().engine.pointer_leave())?;

        let state = self.state.clone();
        self.listen(document, "mouseleave", move |_| {
            state.borrow_mut().engine.pointer_leave()
        })?;

        Ok(())
    }

    fn listen(
        &mut self,
        target: &EventTarget,
        kind: &'static str,
        handler: impl FnMut(Event) + 'static,
    ) -> Result<(), EngineError> {
        let callback = Closure::wrap(Box::new(handler) as Box<dyn FnMut(Event)>);
        self.listeners.push(Listener::attach(target, kind, callback)?);
        Ok(())
    }

    fn start_frames(&mut self) {
        let state = self.state.clone();
        let frame = self.frame.clone();
        let callback = Closure::wrap(Box::new(move |timestamp: f64| {
            let mut runtime = state.borrow_mut();
            runtime.frame_handle = None;
            if !runtime.running {
                return;
            }

            let Runtime { engine, surface, .. } = &mut *runtime;
            engine.tick(timestamp, surface);

            if let Some(callback) = frame.borrow().as_ref() {
                runtime.frame_handle = request_frame(&runtime.window, callback);
            }
        }) as Box<dyn FnMut(f64)>);

        let mut runtime = self.state.borrow_mut();
        runtime.frame_handle = request_frame(&runtime.window, &callback);
        *self.frame.borrow_mut() = Some(callback);
    }

    pub fn is_running(&self) -> bool {
        self.state.borrow().running
    }

    pub fn resize(&self, width: f64, height: f64) {
        let mut runtime = self.state.borrow_mut();
        let (width, height) = (width.floor(), height.floor());
        if width.is_finite() && height.is_finite() && width >= 0.0 && height >= 0.0 {
            runtime.canvas.set_width(width as u32);
            runtime.canvas.set_height(height as u32);
        }
        if let Err(err) = runtime.engine.resize(width, height) {
            log::debug!("skipping starfield resize: {}", err);
        }
    }

    pub fn pointer_move(&self, x: f64, y: f64) {
        self.state.borrow_mut().engine.pointer_move(x, y);
    }

    pub fn pointer_leave(&self) {
        self.state.borrow_mut().engine.pointer_leave();
    }

    pub fn snapshot_json(&self) -> String {
        self.state.borrow().engine.view().to_json()
    }

    /// Stops the loop, cancels the pending frame and removes every listener.
    /// Safe to call any number of times.
    pub fn shutdown(&mut self) {
        let was_running = {
            let mut runtime = self.state.borrow_mut();
            let was_running = runtime.running;
            runtime.running = false;
            if let Some(handle) = runtime.frame_handle.take() {
                let _ = runtime.window.cancel_animation_frame(handle);
            }
            was_running
        };

        for listener in self.listeners.drain(..) {
            listener.detach();
        }
        // Breaks the callback's reference to itself.
        self.frame.borrow_mut().take();

        if was_running {
            log::info!("starfield shut down");
        }
    }
}

impl Drop for Driver {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn request_frame(window: &Window, callback: &FrameCallback) -> Option<i32> {
    match window.request_animation_frame(callback.as_ref().unchecked_ref()) {
        Ok(handle) => Some(handle),
        Err(err) => {
            log::warn!("requestAnimationFrame failed: {:?}", err);
            None
        }
    }
}

/// Matches the canvas backing store to its laid-out size.
fn fit_canvas(canvas: &HtmlCanvasElement) -> (f64, f64) {
    let rect = canvas.get_bounding_client_rect();
    let width = rect.width().floor().max(0.0);
    let height = rect.height().floor().max(0.0);
    canvas.set_width(width as u32);
    canvas.set_height(height as u32);
    (width, height)
}

fn now_ms(window: &Window) -> f64 {
    window
        .performance()
        .map(|performance| performance.now())
        .unwrap_or_else(js_sys::Date::now)
}
