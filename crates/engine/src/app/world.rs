use std::time::Instant;

use thiserror::Error;

use super::movement::VelocityState;

#[derive(Debug, Error)]
pub enum WorldError {
    #[error("failed to initialize world renderer: {0}")]
    Renderer(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// The simulated world the control loop drives. Maze layout, enemies,
/// combat and drawing all live behind this boundary.
pub trait World {
    /// Advances the simulation by one step at the given rate.
    fn update(&mut self, fps: f32);

    fn resize(&mut self, width: u32, height: u32);

    /// Returns the world to a fresh starting state in place. Nothing from the
    /// previous run survives, scores included.
    fn reset(&mut self, fps: f32);

    /// Length of one maze cell in world units.
    fn distance(&self) -> f32;

    fn set_velocity(&mut self, velocity: VelocityState);

    /// Instant before which the hero cannot steer, if a stun is pending.
    fn next_move(&self) -> Option<Instant>;

    fn hero_dead(&self) -> bool;

    fn set_hero_actions(&mut self, firing: bool, slashing: bool);

    fn is_stunned(&self, now: Instant) -> bool {
        self.next_move().is_some_and(|next_move| now < next_move)
    }
}
