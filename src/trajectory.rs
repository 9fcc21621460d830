use std::f32::consts::PI;

use tracing::debug;

use crate::config::Config;
use crate::vec2::Vec2;

/// One turn of movement discretized into equal time steps. Recomputed from
/// scratch every turn; never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct Trajectory {
    pub waypoints: Vec<Vec2>,
}

impl Trajectory {
    /// Straight-line path toward `target`, capped at `speed`. Pure and
    /// deterministic; `start == target` yields a stationary path.
    pub fn compute(start: Vec2, target: Vec2, speed: f32, steps: usize) -> Self {
        let delta = target - start;
        let mov = if delta.len() > speed {
            delta.norm() * speed
        } else {
            delta
        };

        let waypoints = (1..=steps)
            .map(|i| start + mov * (i as f32 / steps as f32))
            .collect();

        Trajectory { waypoints }
    }

    /// Drift path of a hostile over one turn, clamped to its legal domain.
    pub fn project(start: Vec2, vel: Vec2, steps: usize, lt: Vec2, rb: Vec2) -> Self {
        let waypoints = (1..=steps)
            .map(|i| (start + vel * (i as f32 / steps as f32)).clamp(lt, rb))
            .collect();

        Trajectory { waypoints }
    }

    pub fn end(&self) -> Option<Vec2> {
        self.waypoints.last().copied()
    }

    /// Minimum distance across same-index waypoint pairs.
    pub fn min_separation(&self, other: &Trajectory) -> f32 {
        self.waypoints
            .iter()
            .zip(&other.waypoints)
            .map(|(a, b)| a.dist(*b))
            .fold(f32::INFINITY, f32::min)
    }

    pub fn within(&self, lt: Vec2, rb: Vec2) -> bool {
        self.waypoints
            .iter()
            .all(|p| p.x >= lt.x && p.x <= rb.x && p.y >= lt.y && p.y <= rb.y)
    }
}

/// A path is safe when no hostile's projected path comes within the danger
/// distance at the same time step.
pub fn is_safe(trajectory: &Trajectory, hostiles: &[Trajectory], danger_dist: f32) -> bool {
    hostiles
        .iter()
        .all(|h| trajectory.min_separation(h) >= danger_dist)
}

/// Outcome of routing a unit toward a destination.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Route {
    Move {
        target: Vec2,
        safe: bool,
        attempts: usize,
    },
    /// No in-bounds candidate at all: stay put.
    Hold,
}

/// Turns a desired destination into a collision-checked move. The direct
/// path is tried first, then the target is rotated about the unit position
/// by +30°, -30°, +60°, -60°, ... for at most `max_avoid_attempts` retries.
/// On total failure the in-bounds candidate closest to the original target
/// is taken (flagged unsafe), or the unit holds position.
pub fn safe_move(pos: Vec2, desired: Vec2, hostiles: &[Trajectory], config: &Config) -> Route {
    let lt = config.map_top_left();
    let rb = config.map_bot_right();

    let mut fallback: Option<(f32, Vec2)> = None;

    for attempt in 0..=config.max_avoid_attempts {
        let angle = rotation_for_attempt(attempt);
        let target = pos + (desired - pos).rotate(angle);
        let trajectory = Trajectory::compute(pos, target, config.drone_speed, config.trajectory_steps);

        if !trajectory.within(lt, rb) {
            continue;
        }

        if is_safe(&trajectory, hostiles, config.danger_dist) {
            return Route::Move {
                target: target.clamp(lt, rb),
                safe: true,
                attempts: attempt,
            };
        }

        let off_course = target.dist(desired);
        if fallback.map_or(true, |(best, _)| off_course < best) {
            fallback = Some((off_course, target));
        }
    }

    match fallback {
        Some((_, target)) => {
            debug!(?desired, "no safe route, taking least-unsafe candidate");
            Route::Move {
                target: target.clamp(lt, rb),
                safe: false,
                attempts: config.max_avoid_attempts,
            }
        }
        None => Route::Hold,
    }
}

/// 0, +30°, -30°, +60°, -60°, ... in radians.
fn rotation_for_attempt(attempt: usize) -> f32 {
    if attempt == 0 {
        return 0.;
    }

    let magnitude = PI / 6. * ((attempt + 1) / 2) as f32;
    if attempt % 2 == 1 {
        magnitude
    } else {
        -magnitude
    }
}
