// CONTROLLER: input handling and the frame loop
pub mod input;
pub mod frame_loop;

pub use input::{Direction, InputController, InputEvent, InputState, KeyBindings};
pub use frame_loop::{bind_scene, FrameHost, FrameScheduler};
