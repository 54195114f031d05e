use anyhow::Context;
use std::sync::Arc;
use winit::{
    event::*,
    event_loop::EventLoop,
    window::Window,
};

// Import from the library crate
use spincube::{
    logging, controller, model, view,
    CubeConfig, CubeError,
};

use controller::input::native;
use controller::{bind_scene, FrameScheduler, InputController, InputState};
use model::Camera;
use view::{GpuContext, WgpuBackend};

struct App {
    window: Arc<Window>,
    backend: WgpuBackend,
    scheduler: FrameScheduler,
    controller: InputController,
    input_state: InputState,
}

impl App {
    async fn new(window: Arc<Window>, config: &CubeConfig) -> Result<Self, CubeError> {
        let camera = Camera::new(&config.camera)?;

        let size = window.inner_size();
        let gpu = GpuContext::new_native(window.clone(), size.width, size.height).await?;
        let mut backend = WgpuBackend::new(gpu).await?;
        bind_scene(&mut backend, &camera)?;

        Ok(Self {
            window,
            backend,
            scheduler: FrameScheduler::new(config.motion, config.clear_color),
            controller: InputController::new(config.key_bindings.clone()),
            input_state: InputState::new(),
        })
    }

    /// Feed click/key events to the controller. Returns true if consumed.
    fn input(&mut self, event: &WindowEvent) -> bool {
        let input_event = match event {
            WindowEvent::KeyboardInput { event, .. } => Some(native::keyboard_event_to_input(event)),
            WindowEvent::MouseInput { state, button, .. } => native::mouse_input_to_input(*state, *button),
            _ => return false,
        };
        if let Some(input_event) = input_event {
            self.controller.handle(&mut self.input_state, &input_event);
        }
        true
    }

    fn redraw(&mut self) -> Result<(), CubeError> {
        self.scheduler.step(&self.input_state, &mut self.backend)?;
        // Ask for the next frame right away; winit paces it to the display
        self.window.request_redraw();
        Ok(())
    }
}

fn main() -> anyhow::Result<()> {
    logging::init();
    let config = CubeConfig::default();

    let event_loop = EventLoop::new().context("failed to create event loop")?;
    let window_attributes = Window::default_attributes()
        .with_title("spincube")
        .with_inner_size(winit::dpi::PhysicalSize::new(config.width, config.height))
        .with_resizable(false);
    #[allow(deprecated)]
    let window = Arc::new(
        event_loop
            .create_window(window_attributes)
            .context("failed to create window")?,
    );

    let mut app = pollster::block_on(App::new(window, &config))?;
    let mut failure: Option<CubeError> = None;
    tracing::info!("starting frame loop");
    app.window.request_redraw();

    #[allow(deprecated)]
    event_loop.run(|event, elwt| {
        if let Event::WindowEvent { ref event, window_id } = event {
            if window_id != app.window.id() || app.input(event) {
                return;
            }
            match event {
                WindowEvent::CloseRequested => elwt.exit(),
                WindowEvent::Resized(size) => app.backend.resize(size.width, size.height),
                WindowEvent::RedrawRequested => {
                    if let Err(e) = app.redraw() {
                        tracing::error!(frame = app.scheduler.frames(), error = %e, "frame loop stopped");
                        failure = Some(e);
                        elwt.exit();
                    }
                }
                _ => {}
            }
        }
    })?;

    tracing::info!(frames = app.scheduler.frames(), "window closed");
    match failure {
        Some(e) => Err(e.into()),
        None => Ok(()),
    }
}
