//! Real-time control loop for Brutal Maze: input translation, hero steering,
//! frame pacing and lifecycle event dispatch around an external world.

pub mod app;

pub use app::{
    acceleration, run_app, run_app_with_metrics, translate, velocity_bound, AppError, AudioError,
    AudioSubsystem, Binding, BindingError, BindingTable, DirectionalIntent, DispatchOutcome,
    EventDispatcher, FramePacer, GameLoop, InputAction, LoopConfig, LoopEvent, LoopFlags,
    LoopMetricsSnapshot, MetricsHandle, MovementController, MusicSettings, PressedInputs,
    RateState, TranslatedInput, VelocityState, World, WorldError, FRAME_WINDOW_LEN, HERO_SPEED,
    MIN_FPS, MOUSE_BUTTON_COUNT, SAMPLE_RATE,
};
pub use winit::keyboard::KeyCode;
pub use winit::window::Window;
