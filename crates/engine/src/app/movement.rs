use super::input::DirectionalIntent;

pub const HERO_SPEED: f32 = 5.0;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct VelocityState {
    pub vx: f32,
    pub vy: f32,
}

/// Bounded-acceleration velocity control for the hero.
///
/// Both the speed bound and the per-tick acceleration shrink as the
/// simulation rate grows, so the hero covers the same ground per second
/// regardless of the rate the pacer settles on.
#[derive(Debug, Clone, Default)]
pub struct MovementController {
    velocity: VelocityState,
}

impl MovementController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn velocity(&self) -> VelocityState {
        self.velocity
    }

    pub fn reset(&mut self) {
        self.velocity = VelocityState::default();
    }

    pub fn move_hero(&mut self, intent: DirectionalIntent, stunned: bool, distance: f32, fps: f32) {
        let bound = velocity_bound(distance, fps);
        let accel = acceleration(distance, fps);

        self.velocity.vx = step_axis(self.velocity.vx, intent.x, stunned, bound, accel);
        self.velocity.vy = step_axis(self.velocity.vy, intent.y, stunned, bound, accel);
    }
}

pub fn velocity_bound(distance: f32, fps: f32) -> f32 {
    distance * HERO_SPEED / fps
}

pub fn acceleration(distance: f32, fps: f32) -> f32 {
    velocity_bound(distance, fps) * HERO_SPEED / fps
}

fn step_axis(velocity: f32, direction: i8, stunned: bool, bound: f32, accel: f32) -> f32 {
    let direction = f32::from(direction);

    if stunned || direction == 0.0 {
        let next = velocity - sign(velocity) * accel;
        if next.abs() < accel * 2.0 {
            0.0
        } else {
            next
        }
    } else if direction * velocity < 0.0 {
        velocity + direction * 2.0 * accel
    } else {
        let next = velocity + direction * accel;
        if next.abs() > bound {
            direction * bound
        } else {
            next
        }
    }
}

// f32::signum maps 0.0 to 1.0, which would push a resting hero.
fn sign(value: f32) -> f32 {
    if value > 0.0 {
        1.0
    } else if value < 0.0 {
        -1.0
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DISTANCE: f32 = 100.0;
    const FPS: f32 = 60.0;

    fn intent(x: i8, y: i8) -> DirectionalIntent {
        DirectionalIntent { x, y }
    }

    #[test]
    fn constant_input_ramps_to_bound_and_holds() {
        let mut controller = MovementController::new();
        let bound = velocity_bound(DISTANCE, FPS);
        let mut previous = 0.0;
        let mut reached_at = None;

        for tick in 0..40 {
            controller.move_hero(intent(1, 0), false, DISTANCE, FPS);
            let vx = controller.velocity().vx;
            assert!(vx >= previous, "tick {tick}: {vx} < {previous}");
            assert!(vx <= bound);
            if vx == bound && reached_at.is_none() {
                reached_at = Some(tick);
            }
            previous = vx;
        }

        // bound / accel == fps / HERO_SPEED == 12 ticks, plus one for rounding.
        let reached_at = reached_at.expect("bound reached");
        assert!(reached_at <= 12, "reached at tick {reached_at}");
        assert_eq!(controller.velocity().vx, bound);
        assert_eq!(controller.velocity().vy, 0.0);
    }

    #[test]
    fn first_step_from_rest_is_one_acceleration() {
        let mut controller = MovementController::new();
        controller.move_hero(intent(-1, 1), false, DISTANCE, FPS);

        let accel = acceleration(DISTANCE, FPS);
        assert_eq!(controller.velocity(), VelocityState { vx: -accel, vy: accel });
    }

    #[test]
    fn reversal_uses_double_acceleration_then_settles_within_bound() {
        let mut controller = MovementController::new();
        for _ in 0..40 {
            controller.move_hero(intent(1, 0), false, DISTANCE, FPS);
        }
        let bound = velocity_bound(DISTANCE, FPS);
        let accel = acceleration(DISTANCE, FPS);

        let before = controller.velocity().vx;
        controller.move_hero(intent(-1, 0), false, DISTANCE, FPS);
        let after = controller.velocity().vx;
        assert!((before - after - 2.0 * accel).abs() < 1e-4);

        let mut crossed_at = None;
        for tick in 1..20 {
            controller.move_hero(intent(-1, 0), false, DISTANCE, FPS);
            let vx = controller.velocity().vx;
            if vx < 0.0 && crossed_at.is_none() {
                crossed_at = Some(tick);
            }
            if crossed_at.is_some() {
                assert!(vx.abs() <= bound);
            }
        }

        assert!(crossed_at.is_some());
        assert_eq!(controller.velocity().vx, -bound);
    }

    #[test]
    fn stun_overrides_input_and_stops_without_overshoot() {
        let mut controller = MovementController::new();
        for _ in 0..40 {
            controller.move_hero(intent(1, -1), false, DISTANCE, FPS);
        }
        let v0 = controller.velocity().vx;
        let accel = acceleration(DISTANCE, FPS);
        let max_ticks = (v0 / accel).ceil() as usize;

        let mut previous = v0;
        let mut stopped_after = None;
        for tick in 1..=max_ticks {
            controller.move_hero(intent(1, -1), true, DISTANCE, FPS);
            let velocity = controller.velocity();
            assert!(velocity.vx >= 0.0);
            assert!(velocity.vx <= previous);
            assert!(velocity.vy <= 0.0);
            previous = velocity.vx;
            if velocity.vx == 0.0 {
                stopped_after = Some(tick);
                break;
            }
        }

        assert!(stopped_after.is_some());
        assert_eq!(controller.velocity(), VelocityState::default());
    }

    #[test]
    fn released_input_decelerates_to_exact_zero() {
        let mut controller = MovementController::new();
        for _ in 0..3 {
            controller.move_hero(intent(0, 1), false, DISTANCE, FPS);
        }
        for _ in 0..10 {
            controller.move_hero(intent(0, 0), false, DISTANCE, FPS);
        }

        assert_eq!(controller.velocity().vy, 0.0);
    }

    #[test]
    fn resting_hero_stays_at_rest_without_input() {
        let mut controller = MovementController::new();
        controller.move_hero(intent(0, 0), false, DISTANCE, FPS);
        assert_eq!(controller.velocity(), VelocityState::default());
    }

    #[test]
    fn higher_rate_halves_bound_and_quarters_acceleration() {
        let bound_ratio = velocity_bound(DISTANCE, 60.0) / velocity_bound(DISTANCE, 120.0);
        let accel_ratio = acceleration(DISTANCE, 60.0) / acceleration(DISTANCE, 120.0);

        assert!((bound_ratio - 2.0).abs() < 1e-4);
        assert!((accel_ratio - 4.0).abs() < 1e-4);
    }

    #[test]
    fn lower_rate_raises_the_bound() {
        let mut controller = MovementController::new();
        for _ in 0..40 {
            controller.move_hero(intent(1, 0), false, DISTANCE, 60.0);
        }
        controller.move_hero(intent(1, 0), false, DISTANCE, 59.0);

        assert_eq!(controller.velocity().vx, velocity_bound(DISTANCE, 59.0));
    }

    #[test]
    fn reset_zeroes_velocity() {
        let mut controller = MovementController::new();
        controller.move_hero(intent(1, 1), false, DISTANCE, FPS);
        controller.reset();
        assert_eq!(controller.velocity(), VelocityState::default());
    }
}
