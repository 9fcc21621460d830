use std::collections::HashSet;
use std::fmt;

use crate::config::Config;
use crate::scoring::rank_targets;
use crate::trajectory::{safe_move, Route, Trajectory};
use crate::vec2::Vec2;
use crate::world::{Drone, Tracked, World};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    Move { x: i32, y: i32, light: bool },
    Wait { light: bool },
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Move { x, y, light } => {
                write!(f, "MOVE {} {} {}", x, y, *light as i32)
            }
            Command::Wait { light } => write!(f, "WAIT {}", *light as i32),
        }
    }
}

/// The ordered rule set. Per drone, per turn, the first rule whose guard
/// holds fires and the rest are skipped. The order is the policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    /// Carrying enough unsaved value to justify banking it.
    ReturnWithHaul,
    /// Committed to surfacing and still holding scans.
    ContinueExtraction,
    /// Emergency flag set: sit it out.
    EmergencyIdle,
    /// No live, unclaimed target anywhere: go bank what we have.
    NothingLeft,
    /// Chase the best-scored candidate.
    PursueBestTarget,
    /// Routing found no in-bounds move at all.
    HoldPosition,
}

/// Outcome of one drone's rule evaluation. `decide` is read-only; the
/// caller applies `returning` and the claim in a separate write phase.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Decision {
    pub rule: Rule,
    pub command: Command,
    /// Creature claimed this turn, to be excluded for sibling drones.
    pub target: Option<i32>,
    pub returning: bool,
}

pub fn decide(
    world: &World,
    drone: &Drone,
    hostiles: &[Trajectory],
    claimed: &HashSet<i32>,
    config: &Config,
) -> Decision {
    // rule 1: enough in the hold to go bank it
    if world.unsaved_value(drone) >= config.return_value_threshold {
        return surface(world, drone, hostiles, claimed, config, Rule::ReturnWithHaul);
    }

    // rule 2: committed to surfacing and still carrying
    if drone.returning && !drone.scans.is_empty() {
        return surface(world, drone, hostiles, claimed, config, Rule::ContinueExtraction);
    }

    // rule 3: disabled
    if drone.emergency == 1 {
        return Decision {
            rule: Rule::EmergencyIdle,
            command: Command::Wait { light: false },
            target: None,
            returning: false,
        };
    }

    let candidates = rank_targets(world, drone, claimed, config);

    // rule 4: nothing left to chase
    let best = match candidates.first() {
        Some(best) => *best,
        None => {
            let mut decision =
                surface(world, drone, hostiles, claimed, config, Rule::NothingLeft);
            decision.returning = !drone.scans.is_empty();
            return decision;
        }
    };

    // rule 5: go get the best candidate
    let target_pos = world
        .creatures
        .get(&best.id)
        .map(|c| c.position())
        .unwrap_or(drone.pos);

    match safe_move(drone.pos, target_pos, hostiles, config) {
        Route::Move { target, .. } => Decision {
            rule: Rule::PursueBestTarget,
            command: move_command(target, should_light(world, drone, claimed, config)),
            target: Some(best.id),
            returning: false,
        },
        Route::Hold => Decision {
            rule: Rule::HoldPosition,
            command: Command::Wait { light: false },
            target: None,
            returning: false,
        },
    }
}

/// Head straight up to the save line, still dodging monsters and lighting
/// promising water on the way.
fn surface(
    world: &World,
    drone: &Drone,
    hostiles: &[Trajectory],
    claimed: &HashSet<i32>,
    config: &Config,
    rule: Rule,
) -> Decision {
    let home = Vec2::new(drone.pos.x, config.surface_y * 0.5);

    match safe_move(drone.pos, home, hostiles, config) {
        Route::Move { target, .. } => Decision {
            rule,
            command: move_command(target, should_light(world, drone, claimed, config)),
            target: None,
            returning: true,
        },
        Route::Hold => Decision {
            rule: Rule::HoldPosition,
            command: Command::Wait { light: false },
            target: None,
            returning: true,
        },
    }
}

/// The light is worth its battery when an unclaimed creature should be
/// within flash range and we are deep enough for anything to be there.
fn should_light(world: &World, drone: &Drone, claimed: &HashSet<i32>, config: &Config) -> bool {
    if drone.bat < config.light_cost || drone.pos.y < config.min_light_depth {
        return false;
    }

    world
        .creatures
        .values()
        .filter(|c| c.typ >= 0 && !c.is_terminal() && !claimed.contains(&c.id))
        .any(|c| drone.pos.dist(c.position()) < config.light_radius)
}

fn move_command(target: Vec2, light: bool) -> Command {
    let clamped = target.clamp(Vec2::new(0., 0.), Vec2::new(9999., 9999.));
    Command::Move {
        x: clamped.x as i32,
        y: clamped.y as i32,
        light,
    }
}
