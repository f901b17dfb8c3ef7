use std::sync::Arc;

use thiserror::Error;
use tracing::{info, warn};
use winit::dpi::LogicalSize;
use winit::error::{EventLoopError, OsError};
use winit::event::{ElementState, Event, KeyEvent, MouseButton, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowBuilder};

use super::audio::AudioSubsystem;
use super::events::LoopEvent;
use super::game_loop::{GameLoop, LoopConfig};
use super::input::PressedInputs;
use super::metrics::MetricsHandle;
use super::world::{World, WorldError};

#[derive(Debug, Error)]
pub enum AppError {
    #[error("failed to create event loop: {0}")]
    CreateEventLoop(#[source] EventLoopError),
    #[error("failed to create application window: {0}")]
    CreateWindow(#[source] OsError),
    #[error("failed to build world: {0}")]
    BuildWorld(#[from] WorldError),
    #[error("event loop failed: {0}")]
    EventLoopRun(#[source] EventLoopError),
}

pub fn run_app<W, A, F>(config: LoopConfig, audio: A, build_world: F) -> Result<(), AppError>
where
    W: World + 'static,
    A: AudioSubsystem + 'static,
    F: FnOnce(Arc<Window>, &LoopConfig) -> Result<W, WorldError>,
{
    run_app_with_metrics(config, audio, build_world, MetricsHandle::default())
}

pub fn run_app_with_metrics<W, A, F>(
    config: LoopConfig,
    audio: A,
    build_world: F,
    metrics_handle: MetricsHandle,
) -> Result<(), AppError>
where
    W: World + 'static,
    A: AudioSubsystem + 'static,
    F: FnOnce(Arc<Window>, &LoopConfig) -> Result<W, WorldError>,
{
    let event_loop = EventLoop::new().map_err(AppError::CreateEventLoop)?;
    let window = Arc::new(
        WindowBuilder::new()
            .with_title(config.window_title.clone())
            .with_inner_size(LogicalSize::new(
                config.window_width as f64,
                config.window_height as f64,
            ))
            .build(&event_loop)
            .map_err(AppError::CreateWindow)?,
    );
    let world = build_world(Arc::clone(&window), &config)?;

    event_loop.set_control_flow(ControlFlow::Poll);
    info!(
        window_width = config.window_width,
        window_height = config.window_height,
        max_fps = config.max_fps,
        muted = config.muted,
        track = ?config.music.track,
        metrics_log_interval_ms = config.metrics_log_interval.as_millis() as u64,
        "loop_config"
    );

    let mut game = GameLoop::with_metrics(&config, world, audio, metrics_handle);
    game.start();

    let mut collector = EventCollector::default();
    let window_for_loop = Arc::clone(&window);

    event_loop
        .run(move |event, window_target| match event {
            Event::WindowEvent { window_id, event } if window_id == window_for_loop.id() => {
                collector.handle_window_event(&event);
            }
            Event::AboutToWait => {
                let events = collector.take_pending();
                if !game.tick(events, collector.pressed()) {
                    info!(reason = "quit_event", "shutdown_requested");
                    window_target.exit();
                }
            }
            Event::LoopExiting => {
                game.shutdown();
                info!("shutdown");
            }
            _ => {}
        })
        .map_err(AppError::EventLoopRun)
}

/// Buffers discrete events between ticks and tracks which keys and mouse
/// buttons are held.
#[derive(Debug, Default)]
struct EventCollector {
    pending: Vec<LoopEvent>,
    pressed: PressedInputs,
}

impl EventCollector {
    fn handle_window_event(&mut self, event: &WindowEvent) {
        match event {
            WindowEvent::CloseRequested => self.pending.push(LoopEvent::Quit),
            WindowEvent::Resized(size) => self.pending.push(LoopEvent::Resized {
                width: size.width,
                height: size.height,
            }),
            WindowEvent::KeyboardInput { event, .. } => self.handle_keyboard_input(event),
            WindowEvent::MouseInput { state, button, .. } => {
                self.handle_mouse_input(*button, *state);
            }
            WindowEvent::Focused(false) => self.pressed.clear(),
            _ => {}
        }
    }

    fn handle_keyboard_input(&mut self, key_event: &KeyEvent) {
        let PhysicalKey::Code(code) = key_event.physical_key else {
            return;
        };
        self.handle_key_state(code, key_event.state, key_event.repeat);
    }

    fn handle_key_state(&mut self, code: KeyCode, state: ElementState, repeat: bool) {
        match state {
            ElementState::Pressed => {
                self.pressed.set_key(code, true);
                if !repeat {
                    self.pending.push(LoopEvent::KeyDown(code));
                }
            }
            ElementState::Released => {
                self.pressed.set_key(code, false);
                self.pending.push(LoopEvent::KeyUp(code));
            }
        }
    }

    fn handle_mouse_input(&mut self, button: MouseButton, state: ElementState) {
        let Some(index) = mouse_button_index(button) else {
            warn!(?button, "unsupported_mouse_button");
            return;
        };

        match state {
            ElementState::Pressed => {
                self.pressed.set_mouse_button(index, true);
                self.pending.push(LoopEvent::MouseDown(index));
            }
            ElementState::Released => {
                self.pressed.set_mouse_button(index, false);
                self.pending.push(LoopEvent::MouseUp(index));
            }
        }
    }

    fn take_pending(&mut self) -> Vec<LoopEvent> {
        std::mem::take(&mut self.pending)
    }

    fn pressed(&self) -> &PressedInputs {
        &self.pressed
    }
}

fn mouse_button_index(button: MouseButton) -> Option<u8> {
    match button {
        MouseButton::Left => Some(0),
        MouseButton::Middle => Some(1),
        MouseButton::Right => Some(2),
        _ => None,
    }
}
