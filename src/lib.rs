// Re-export all public modules so they can be used from main.rs
pub mod config;
pub mod error;
pub mod logging;

// MVC Architecture
pub mod model;
pub mod view;
pub mod controller;

pub use config::{CubeConfig, MotionConfig};
pub use error::CubeError;

#[cfg(target_arch = "wasm32")]
use std::cell::RefCell;
#[cfg(target_arch = "wasm32")]
use std::rc::Rc;
#[cfg(target_arch = "wasm32")]
use wasm_bindgen::closure::Closure;
#[cfg(target_arch = "wasm32")]
use wasm_bindgen::{prelude::wasm_bindgen, JsCast, JsValue};
#[cfg(target_arch = "wasm32")]
use web_sys::{Document, HtmlCanvasElement, KeyboardEvent, MouseEvent, Window};

#[cfg(target_arch = "wasm32")]
use controller::{bind_scene, FrameScheduler, InputController, InputEvent, InputState};
#[cfg(target_arch = "wasm32")]
use model::Camera;
#[cfg(target_arch = "wasm32")]
use view::{GpuContext, WgpuBackend};

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn start() -> Result<(), JsValue> {
    logging::init();
    let config = CubeConfig::default();
    let (window, document, canvas) = init_canvas(config.width, config.height)?;
    setup_app(&window, &document, &canvas, config).await
}

/// Main application setup for WASM
#[cfg(target_arch = "wasm32")]
async fn setup_app(
    window: &Window,
    document: &Document,
    canvas: &HtmlCanvasElement,
    config: CubeConfig,
) -> Result<(), JsValue> {
    // Camera first: a malformed frustum should fail before touching the GPU
    let camera = Camera::new(&config.camera).map_err(js_error)?;

    let gpu = GpuContext::new(canvas, config.width, config.height)
        .await
        .map_err(js_error)?;
    let mut backend = WgpuBackend::new(gpu).await.map_err(js_error)?;
    bind_scene(&mut backend, &camera).map_err(js_error)?;

    let input_state = Rc::new(RefCell::new(InputState::new()));
    setup_input_listeners(
        document,
        InputController::new(config.key_bindings.clone()),
        input_state.clone(),
    )?;

    let mut scheduler = FrameScheduler::new(config.motion, config.clear_color);
    tracing::info!("starting frame loop");

    // Continuous redraw using requestAnimationFrame
    AnimationFrameLoop::new(window.clone(), move || {
        let snapshot = *input_state.borrow();
        match scheduler.step(&snapshot, &mut backend) {
            Ok(()) => true,
            Err(e) => {
                tracing::error!(frame = scheduler.frames(), error = %e, "frame loop stopped");
                false
            }
        }
    })
    .start()
}

/// Wire DOM click/keydown/keyup into the input controller
#[cfg(target_arch = "wasm32")]
fn setup_input_listeners(
    document: &Document,
    controller: InputController,
    input_state: Rc<RefCell<InputState>>,
) -> Result<(), JsValue> {
    // Keyboard down
    {
        let input_state = input_state.clone();
        let controller = controller.clone();
        let keydown = Closure::wrap(Box::new(move |e: KeyboardEvent| {
            // Arrow keys and space would otherwise scroll the page
            if controller.is_bound(&e.key()) {
                e.prevent_default();
            }
            let event = controller::input::wasm::keyboard_event_to_input(&e, true);
            controller.handle(&mut input_state.borrow_mut(), &event);
        }) as Box<dyn FnMut(KeyboardEvent)>);
        document.add_event_listener_with_callback("keydown", keydown.as_ref().unchecked_ref())?;
        keydown.forget();
    }

    // Keyboard up
    {
        let input_state = input_state.clone();
        let controller = controller.clone();
        let keyup = Closure::wrap(Box::new(move |e: KeyboardEvent| {
            let event = controller::input::wasm::keyboard_event_to_input(&e, false);
            controller.handle(&mut input_state.borrow_mut(), &event);
        }) as Box<dyn FnMut(KeyboardEvent)>);
        document.add_event_listener_with_callback("keyup", keyup.as_ref().unchecked_ref())?;
        keyup.forget();
    }

    // Click anywhere toggles animation
    {
        let click = Closure::wrap(Box::new(move |_e: MouseEvent| {
            controller.handle(&mut input_state.borrow_mut(), &InputEvent::Click);
        }) as Box<dyn FnMut(MouseEvent)>);
        document.add_event_listener_with_callback("click", click.as_ref().unchecked_ref())?;
        click.forget();
    }

    Ok(())
}

#[cfg(target_arch = "wasm32")]
fn init_canvas(width: u32, height: u32) -> Result<(Window, Document, HtmlCanvasElement), JsValue> {
    let window = web_sys::window().ok_or_else(|| js_error("no global `window`"))?;
    let document = window.document().ok_or_else(|| js_error("no document on window"))?;
    let body = document.body().ok_or_else(|| js_error("no body on document"))?;
    let canvas_el = document
        .create_element("canvas")?
        .dyn_into::<HtmlCanvasElement>()
        .map_err(|_| js_error("failed to create canvas"))?;
    canvas_el.set_id("spincube");
    canvas_el.set_width(width);
    canvas_el.set_height(height);
    body.append_child(&canvas_el)?;
    Ok((window, document, canvas_el))
}

#[cfg(target_arch = "wasm32")]
fn js_error(msg: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&msg.to_string())
}

/// Self-rescheduling requestAnimationFrame callback. The frame closure
/// returns `false` to stop; nothing is requested after that.
#[cfg(target_arch = "wasm32")]
struct AnimationFrameLoop {
    inner: Rc<RefCell<Box<dyn FnMut() -> bool>>>,
    window: Window,
}

#[cfg(target_arch = "wasm32")]
impl AnimationFrameLoop {
    fn new(window: Window, f: impl FnMut() -> bool + 'static) -> Self {
        Self {
            inner: Rc::new(RefCell::new(Box::new(f))),
            window,
        }
    }

    fn start(self) -> Result<(), JsValue> {
        let inner = self.inner.clone();
        let window = self.window.clone();

        let callback = Rc::new(RefCell::new(None::<Closure<dyn FnMut()>>));
        let callback_clone = callback.clone();

        *callback.borrow_mut() = Some(Closure::wrap(Box::new(move || {
            let keep_going = inner.borrow_mut().as_mut()();
            if !keep_going {
                return;
            }

            // Recursively schedule next frame
            let cb_ref = callback_clone.borrow();
            if let Some(cb) = cb_ref.as_ref() {
                if let Err(e) = window.request_animation_frame(cb.as_ref().unchecked_ref()) {
                    tracing::error!(error = ?e, "requestAnimationFrame failed, frame loop stopped");
                }
            }
        }) as Box<dyn FnMut()>));

        {
            let cb_ref = callback.borrow();
            let cb = cb_ref.as_ref().ok_or_else(|| js_error("frame callback missing"))?;
            self.window.request_animation_frame(cb.as_ref().unchecked_ref())?;
        }

        // Leak the closure to keep it alive for the page lifetime
        std::mem::forget(callback);
        Ok(())
    }
}
