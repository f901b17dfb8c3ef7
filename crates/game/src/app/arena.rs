use std::sync::Arc;
use std::time::{Duration, Instant};

use brutal_engine::{LoopConfig, VelocityState, Window, World, WorldError};
use pixels::{Pixels, SurfaceTexture};
use tracing::{debug, info, warn};

const CELLS_ACROSS: f32 = 8.0;
const STUN_DURATION: Duration = Duration::from_millis(300);

const BACKGROUND: [u8; 4] = [0xee, 0xee, 0xec, 0xff];
const WALL: [u8; 4] = [0x2e, 0x34, 0x36, 0xff];
const HERO: [u8; 4] = [0x34, 0x65, 0xa4, 0xff];
const HERO_FIRING: [u8; 4] = [0xcc, 0x00, 0x00, 0xff];
const HERO_SLASHING: [u8; 4] = [0xf5, 0x79, 0x00, 0xff];
const HERO_STUNNED: [u8; 4] = [0x88, 0x8a, 0x85, 0xff];

/// Open square arena with walls on every edge. The hero bounces off a wall
/// and is stunned briefly.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ArenaState {
    width: u32,
    height: u32,
    hero_x: f32,
    hero_y: f32,
    velocity: VelocityState,
    next_move: Option<Instant>,
    firing: bool,
    slashing: bool,
    ticks: u64,
    bumps: u32,
}

impl ArenaState {
    pub(crate) fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            hero_x: width as f32 / 2.0,
            hero_y: height as f32 / 2.0,
            velocity: VelocityState::default(),
            next_move: None,
            firing: false,
            slashing: false,
            ticks: 0,
            bumps: 0,
        }
    }

    pub(crate) fn distance(&self) -> f32 {
        self.width.min(self.height) as f32 / CELLS_ACROSS
    }

    fn wall_thickness(&self) -> f32 {
        self.distance() / 4.0
    }

    fn hero_half_size(&self) -> f32 {
        self.distance() / 4.0
    }

    pub(crate) fn hero_position(&self) -> (f32, f32) {
        (self.hero_x, self.hero_y)
    }

    /// Moves the hero one tick. Positive velocity scrolls the arena right and
    /// down, which carries the hero left and up.
    pub(crate) fn advance(&mut self, now: Instant) {
        self.ticks = self.ticks.saturating_add(1);
        let margin = self.wall_thickness() + self.hero_half_size();
        let (min_x, max_x) = (margin, self.width as f32 - margin);
        let (min_y, max_y) = (margin, self.height as f32 - margin);

        let target_x = self.hero_x - self.velocity.vx;
        let target_y = self.hero_y - self.velocity.vy;
        self.hero_x = clamp_axis(target_x, min_x, max_x);
        self.hero_y = clamp_axis(target_y, min_y, max_y);

        if self.hero_x != target_x || self.hero_y != target_y {
            self.bumps = self.bumps.saturating_add(1);
            self.next_move = Some(now + STUN_DURATION);
            debug!(bumps = self.bumps, "hero_hit_wall");
        }
    }

    pub(crate) fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        let scale_x = width as f32 / self.width.max(1) as f32;
        let scale_y = height as f32 / self.height.max(1) as f32;
        self.hero_x *= scale_x;
        self.hero_y *= scale_y;
        self.width = width;
        self.height = height;
    }

    pub(crate) fn reset(&mut self) {
        debug!(ticks = self.ticks, bumps = self.bumps, "arena_reset");
        *self = Self::new(self.width, self.height);
    }

    pub(crate) fn is_stunned(&self, now: Instant) -> bool {
        self.next_move.is_some_and(|next_move| now < next_move)
    }

    fn draw(&self, frame: &mut [u8], width: u32, height: u32, now: Instant) {
        for chunk in frame.chunks_exact_mut(4) {
            chunk.copy_from_slice(&BACKGROUND);
        }

        let wall = self.wall_thickness().round().max(1.0) as u32;
        fill_rect(frame, width, height, 0, 0, width, wall, WALL);
        fill_rect(frame, width, height, 0, height.saturating_sub(wall), width, wall, WALL);
        fill_rect(frame, width, height, 0, 0, wall, height, WALL);
        fill_rect(frame, width, height, width.saturating_sub(wall), 0, wall, height, WALL);

        let color = if self.is_stunned(now) {
            HERO_STUNNED
        } else if self.slashing {
            HERO_SLASHING
        } else if self.firing {
            HERO_FIRING
        } else {
            HERO
        };
        let half = self.hero_half_size();
        let (hero_x, hero_y) = self.hero_position();
        let left = (hero_x - half).max(0.0) as u32;
        let top = (hero_y - half).max(0.0) as u32;
        let side = (half * 2.0).round().max(1.0) as u32;
        fill_rect(frame, width, height, left, top, side, side, color);
    }
}

fn clamp_axis(value: f32, min: f32, max: f32) -> f32 {
    if min > max {
        return (min + max) / 2.0;
    }
    value.clamp(min, max)
}

#[allow(clippy::too_many_arguments)]
fn fill_rect(
    frame: &mut [u8],
    frame_width: u32,
    frame_height: u32,
    x: u32,
    y: u32,
    w: u32,
    h: u32,
    color: [u8; 4],
) {
    let x_end = x.saturating_add(w).min(frame_width);
    let y_end = y.saturating_add(h).min(frame_height);
    for row in y..y_end {
        for col in x..x_end {
            let offset = ((row * frame_width + col) * 4) as usize;
            if let Some(pixel) = frame.get_mut(offset..offset + 4) {
                pixel.copy_from_slice(&color);
            }
        }
    }
}

/// Window-backed world used by the binary.
pub(crate) struct ArenaWorld {
    state: ArenaState,
    window: Arc<Window>,
    pixels: Option<Pixels<'static>>,
}

impl ArenaWorld {
    pub(crate) fn new(window: Arc<Window>, config: &LoopConfig) -> Result<Self, WorldError> {
        let size = window.inner_size();
        let (width, height) = if size.width == 0 || size.height == 0 {
            (config.window_width, config.window_height)
        } else {
            (size.width, size.height)
        };
        let pixels = build_pixels(Arc::clone(&window), width, height)
            .map_err(|error| WorldError::Renderer(Box::new(error)))?;
        info!(width, height, "arena_ready");

        Ok(Self {
            state: ArenaState::new(width, height),
            window,
            pixels: Some(pixels),
        })
    }

    fn render(&mut self, now: Instant) {
        let Some(pixels) = self.pixels.as_mut() else {
            return;
        };
        let (width, height) = (self.state.width, self.state.height);
        self.state.draw(pixels.frame_mut(), width, height, now);
        if let Err(error) = pixels.render() {
            warn!(error = %error, "render_failed");
            self.pixels = None;
        }
    }
}

fn build_pixels(
    window: Arc<Window>,
    width: u32,
    height: u32,
) -> Result<Pixels<'static>, pixels::Error> {
    let surface = SurfaceTexture::new(width, height, window);
    Pixels::new(width, height, surface)
}

impl World for ArenaWorld {
    fn update(&mut self, _fps: f32) {
        let now = Instant::now();
        self.state.advance(now);
        self.render(now);
    }

    fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.state.resize(width, height);
        match build_pixels(Arc::clone(&self.window), width, height) {
            Ok(pixels) => self.pixels = Some(pixels),
            Err(error) => {
                warn!(error = %error, width, height, "renderer_resize_failed");
                self.pixels = None;
            }
        }
    }

    fn reset(&mut self, _fps: f32) {
        self.state.reset();
    }

    fn distance(&self) -> f32 {
        self.state.distance()
    }

    fn set_velocity(&mut self, velocity: VelocityState) {
        self.state.velocity = velocity;
    }

    fn next_move(&self) -> Option<Instant> {
        self.state.next_move
    }

    fn hero_dead(&self) -> bool {
        false
    }

    fn set_hero_actions(&mut self, firing: bool, slashing: bool) {
        self.state.firing = firing;
        self.state.slashing = slashing;
    }
}
