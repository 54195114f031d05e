use crate::config::MotionConfig;
use crate::controller::input::{Direction, InputController, InputEvent, InputState};
use crate::error::Result;
use crate::model::{Camera, TransformState, INDEX_COUNT, INDICES, VERTICES};
use crate::view::{ClearColor, RenderBackend, Uniform};

/// The "wait for next repaint" primitive, made explicit so the loop can be
/// stepped by hand.
pub trait FrameHost {
    /// Block until the next frame is due and hand over the input events that
    /// arrived since the previous one. `None` once the host is torn down.
    fn next_frame(&mut self) -> Option<Vec<InputEvent>>;
}

/// Upload the static cube and the fixed camera before the first frame.
pub fn bind_scene<B: RenderBackend>(backend: &mut B, camera: &Camera) -> Result<()> {
    backend.upload_geometry(&VERTICES, &INDICES)?;
    backend.set_uniform(Uniform::View(camera.view))?;
    backend.set_uniform(Uniform::Projection(camera.projection))?;
    backend.set_uniform(Uniform::Theta(0.0))?;
    backend.set_uniform(Uniform::Dx(0.0))?;
    backend.set_uniform(Uniform::Dy(0.0))?;
    tracing::info!(vertices = VERTICES.len(), indices = INDICES.len(), "cube geometry uploaded");
    Ok(())
}

/// Per-frame state advance and draw
pub struct FrameScheduler {
    pub transform: TransformState,
    pub motion: MotionConfig,
    pub clear_color: ClearColor,
    frames: u64,
}

impl FrameScheduler {
    pub fn new(motion: MotionConfig, clear_color: ClearColor) -> Self {
        Self {
            transform: TransformState::new(),
            motion,
            clear_color,
            frames: 0,
        }
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Advance the transform from one input snapshot and draw the cube.
    pub fn step<B: RenderBackend>(&mut self, input: &InputState, backend: &mut B) -> Result<()> {
        backend.clear(self.clear_color)?;

        if input.is_animated {
            self.transform.theta += self.motion.theta_step;
            backend.set_uniform(Uniform::Theta(self.transform.theta))?;
        }

        let step = self.motion.move_step;
        match input.direction {
            Direction::Up => {
                self.transform.dy += step;
                backend.set_uniform(Uniform::Dy(self.transform.dy))?;
            }
            Direction::Down => {
                self.transform.dy -= step;
                backend.set_uniform(Uniform::Dy(self.transform.dy))?;
            }
            Direction::Left => {
                self.transform.dx -= step;
                backend.set_uniform(Uniform::Dx(self.transform.dx))?;
            }
            Direction::Right => {
                self.transform.dx += step;
                backend.set_uniform(Uniform::Dx(self.transform.dx))?;
            }
            Direction::None => {}
        }

        backend.draw_indexed(INDEX_COUNT)?;

        self.frames += 1;
        tracing::trace!(frame = self.frames, theta = self.transform.theta, dx = self.transform.dx, dy = self.transform.dy, "frame drawn");
        Ok(())
    }

    /// Drive frames until the host stops handing them out. The first backend
    /// error ends the loop. Returns the number of frames drawn by this call.
    pub fn run<B: RenderBackend, H: FrameHost>(
        &mut self,
        controller: &InputController,
        input: &mut InputState,
        backend: &mut B,
        host: &mut H,
    ) -> Result<u64> {
        let start = self.frames;
        while let Some(events) = host.next_frame() {
            for event in &events {
                controller.handle(input, event);
            }
            if let Err(e) = self.step(input, backend) {
                tracing::error!(frame = self.frames, error = %e, "frame loop stopped");
                return Err(e);
            }
        }
        tracing::info!(frames = self.frames - start, "frame host ended");
        Ok(self.frames - start)
    }
}
