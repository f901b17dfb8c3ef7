use std::time::{Duration, Instant};

use tracing::info;

use super::audio::{disengage_music, engage_music, AudioSubsystem, MusicSettings};
use super::events::{EventDispatcher, LoopEvent, LoopFlags};
use super::input::{translate, BindingTable, PressedInputs};
use super::metrics::{MetricsAccumulator, MetricsHandle};
use super::movement::{MovementController, VelocityState};
use super::pacer::{FramePacer, RateState};
use super::world::World;

#[derive(Debug, Clone)]
pub struct LoopConfig {
    pub window_title: String,
    pub window_width: u32,
    pub window_height: u32,
    pub max_fps: u32,
    pub muted: bool,
    pub music: MusicSettings,
    pub bindings: BindingTable,
    pub metrics_log_interval: Duration,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            window_title: "Brutal Maze".to_string(),
            window_width: 640,
            window_height: 480,
            max_fps: 60,
            muted: false,
            music: MusicSettings::default(),
            bindings: BindingTable::default(),
            metrics_log_interval: Duration::from_secs(1),
        }
    }
}

/// One iteration of the control loop per `tick`, in a fixed order: events,
/// hero steering, rate adjustment, world update, pacing.
pub struct GameLoop<W, A> {
    world: W,
    audio: A,
    bindings: BindingTable,
    dispatcher: EventDispatcher,
    movement: MovementController,
    pacer: FramePacer,
    flags: LoopFlags,
    metrics: MetricsAccumulator,
    metrics_handle: MetricsHandle,
}

impl<W: World, A: AudioSubsystem> GameLoop<W, A> {
    pub fn new(config: &LoopConfig, world: W, audio: A) -> Self {
        Self::with_metrics(config, world, audio, MetricsHandle::default())
    }

    pub fn with_metrics(
        config: &LoopConfig,
        world: W,
        audio: A,
        metrics_handle: MetricsHandle,
    ) -> Self {
        Self {
            world,
            audio,
            bindings: config.bindings,
            dispatcher: EventDispatcher::new(config.bindings, config.music.clone()),
            movement: MovementController::new(),
            pacer: FramePacer::new(config.max_fps),
            flags: LoopFlags {
                paused: false,
                muted: config.muted,
            },
            metrics: MetricsAccumulator::new(config.metrics_log_interval),
            metrics_handle,
        }
    }

    /// Applies the configured sound state before the first tick.
    pub fn start(&mut self) {
        if self.flags.muted {
            self.audio.shutdown();
        } else {
            engage_music(&mut self.audio, self.dispatcher.music());
        }
        info!(
            max_fps = self.pacer.rate().max_fps(),
            muted = self.flags.muted,
            "loop_started"
        );
    }

    /// Runs one iteration. Returns `false` once a quit has been requested.
    pub fn tick<I>(&mut self, events: I, pressed: &PressedInputs) -> bool
    where
        I: IntoIterator<Item = LoopEvent>,
    {
        let outcome = self.dispatcher.dispatch(
            events,
            &mut self.world,
            &mut self.audio,
            &mut self.flags,
            self.pacer.current_fps(),
        );
        if outcome.world_reset {
            self.movement.reset();
        }
        if outcome.quit {
            return false;
        }

        if !self.world.hero_dead() {
            let input = translate(pressed, &self.bindings);
            let stunned = self.world.is_stunned(Instant::now());
            self.movement.move_hero(
                input.intent,
                stunned,
                self.world.distance(),
                self.pacer.current_fps(),
            );
            self.world.set_velocity(self.movement.velocity());
            self.world.set_hero_actions(input.firing, input.slashing);
        }

        let fps = self.pacer.adjust_rate(self.flags.paused);
        if !self.flags.paused {
            self.world.update(fps);
        }
        let frame = self.pacer.pace();

        self.metrics.record_tick(frame, fps, self.flags.paused);
        if let Some(snapshot) = self.metrics.maybe_snapshot(Instant::now()) {
            self.metrics_handle.publish(snapshot);
            info!(
                fps = snapshot.fps,
                target_fps = snapshot.target_fps,
                frame_time_ms = snapshot.frame_time_ms,
                worst_frame_ms = snapshot.worst_frame_ms,
                paused_ticks = snapshot.paused_ticks,
                "loop_metrics"
            );
        }

        true
    }

    pub fn shutdown(&mut self) {
        disengage_music(&mut self.audio);
    }

    pub fn flags(&self) -> LoopFlags {
        self.flags
    }

    pub fn rate(&self) -> RateState {
        self.pacer.rate()
    }

    pub fn velocity(&self) -> VelocityState {
        self.movement.velocity()
    }

    pub fn metrics(&self) -> &MetricsHandle {
        &self.metrics_handle
    }

    pub fn world(&self) -> &W {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut W {
        &mut self.world
    }

    pub fn audio(&self) -> &A {
        &self.audio
    }
}

#[cfg(test)]
mod tests {
    use winit::keyboard::KeyCode;

    use super::*;
    use crate::app::movement::velocity_bound;
    use crate::app::test_support::{theme_music, FakeAudio, FakeWorld};

    // High enough that pacing sleeps stay around a millisecond per tick.
    const TEST_MAX_FPS: u32 = 1000;

    fn config() -> LoopConfig {
        LoopConfig {
            max_fps: TEST_MAX_FPS,
            music: theme_music(),
            ..LoopConfig::default()
        }
    }

    fn game_loop() -> GameLoop<FakeWorld, FakeAudio> {
        GameLoop::new(&config(), FakeWorld::default(), FakeAudio::default())
    }

    fn no_events() -> Vec<LoopEvent> {
        Vec::new()
    }

    #[test]
    fn quit_ends_loop_before_world_update() {
        let mut game = game_loop();
        let keep_going = game.tick([LoopEvent::Quit], &PressedInputs::new());

        assert!(!keep_going);
        assert!(game.world().updates.is_empty());
    }

    #[test]
    fn tick_steers_hero_then_updates_world_at_adjusted_rate() {
        let mut game = game_loop();
        let pressed = PressedInputs::new().with_key_down(KeyCode::KeyA);

        assert!(game.tick(no_events(), &pressed));

        let velocity = game.velocity();
        assert!(velocity.vx > 0.0);
        assert_eq!(game.world().velocity, velocity);
        // Cold pacer window measures zero, so the first adjustment slows down.
        assert_eq!(game.world().updates, vec![TEST_MAX_FPS as f32 - 1.0]);
        assert_eq!(game.rate().current_fps(), TEST_MAX_FPS as f32 - 1.0);
    }

    #[test]
    fn movement_uses_rate_from_before_adjustment() {
        let mut game = game_loop();
        let pressed = PressedInputs::new().with_key_down(KeyCode::KeyW);

        game.tick(no_events(), &pressed);

        let expected_accel = velocity_bound(100.0, TEST_MAX_FPS as f32) * 5.0
            / TEST_MAX_FPS as f32;
        assert!((game.velocity().vy - expected_accel).abs() < 1e-6);
    }

    #[test]
    fn attack_flags_follow_mouse_bindings() {
        let mut game = game_loop();
        let pressed = PressedInputs::new().with_mouse_down(0);

        game.tick(no_events(), &pressed);

        assert!(game.world().firing);
        assert!(!game.world().slashing);
    }

    #[test]
    fn dead_hero_is_not_steered() {
        let mut game = game_loop();
        game.world_mut().dead = true;
        let pressed = PressedInputs::new()
            .with_key_down(KeyCode::KeyD)
            .with_mouse_down(2);

        game.tick(no_events(), &pressed);

        assert_eq!(game.velocity(), VelocityState::default());
        assert!(!game.world().slashing);
        assert_eq!(game.world().updates.len(), 1);
    }

    #[test]
    fn stunned_hero_ignores_input() {
        let mut game = game_loop();
        game.world_mut().next_move = Some(Instant::now() + Duration::from_secs(60));
        let pressed = PressedInputs::new().with_key_down(KeyCode::KeyD);

        game.tick(no_events(), &pressed);

        assert_eq!(game.velocity(), VelocityState::default());
    }

    #[test]
    fn paused_loop_skips_world_update_and_holds_rate() {
        let mut game = game_loop();
        game.tick([LoopEvent::KeyDown(KeyCode::KeyP)], &PressedInputs::new());
        assert!(game.flags().paused);
        assert!(game.world().updates.is_empty());

        game.tick(no_events(), &PressedInputs::new());
        assert!(game.world().updates.is_empty());

        game.tick([LoopEvent::KeyDown(KeyCode::KeyP)], &PressedInputs::new());
        assert!(!game.flags().paused);
        assert_eq!(game.world().updates.len(), 1);
    }

    #[test]
    fn new_game_zeroes_velocity_and_keeps_rate() {
        let mut game = game_loop();
        let pressed = PressedInputs::new().with_key_down(KeyCode::KeyD);
        for _ in 0..3 {
            game.tick(no_events(), &pressed);
        }
        let rate_before = game.rate().current_fps();

        game.tick([LoopEvent::KeyDown(KeyCode::F2)], &PressedInputs::new());

        assert_eq!(game.world().resets, vec![rate_before]);
        assert_eq!(game.velocity(), VelocityState::default());
    }

    #[test]
    fn resize_leaves_loop_state_alone() {
        let mut game = game_loop();
        let pressed = PressedInputs::new().with_key_down(KeyCode::KeyS);
        game.tick(no_events(), &pressed);
        let velocity = game.velocity();
        let rate = game.rate();
        let flags = game.flags();

        // Dispatch only, then quit so no further steering or rate change runs.
        let keep_going = game.tick(
            [
                LoopEvent::Resized {
                    width: 1024,
                    height: 768,
                },
                LoopEvent::Quit,
            ],
            &pressed,
        );

        assert!(!keep_going);
        assert_eq!(game.world().resizes, vec![(1024, 768)]);
        assert_eq!(game.velocity(), velocity);
        assert_eq!(game.rate(), rate);
        assert_eq!(game.flags(), flags);
    }

    #[test]
    fn start_engages_music_unless_muted() {
        let mut game = game_loop();
        game.start();
        assert!(game.audio().is_initialized());
        assert_eq!(game.audio().playing_looped, Some(true));

        let muted = LoopConfig {
            muted: true,
            ..config()
        };
        let mut game = GameLoop::new(&muted, FakeWorld::default(), FakeAudio::default());
        game.start();
        assert!(!game.audio().is_initialized());
        assert_eq!(game.audio().init_calls, 0);
    }

    #[test]
    fn shutdown_releases_audio() {
        let mut game = game_loop();
        game.start();
        game.shutdown();
        assert!(!game.audio().is_initialized());
    }
}
