mod audio;
mod events;
mod game_loop;
mod input;
mod loop_runner;
mod metrics;
mod movement;
mod pacer;
#[cfg(test)]
mod test_support;
mod world;

pub use audio::{AudioError, AudioSubsystem, MusicSettings, SAMPLE_RATE};
pub use events::{DispatchOutcome, EventDispatcher, LoopEvent, LoopFlags};
pub use game_loop::{GameLoop, LoopConfig};
pub use input::{
    translate, Binding, BindingError, BindingTable, DirectionalIntent, InputAction,
    PressedInputs, TranslatedInput, MOUSE_BUTTON_COUNT,
};
pub use loop_runner::{run_app, run_app_with_metrics, AppError};
pub use metrics::{LoopMetricsSnapshot, MetricsHandle};
pub use movement::{acceleration, velocity_bound, MovementController, VelocityState, HERO_SPEED};
pub use pacer::{FramePacer, RateState, FRAME_WINDOW_LEN, MIN_FPS};
pub use world::{World, WorldError};
