use std::collections::HashMap;

use tracing::debug;

use crate::config::Config;
use crate::trajectory::Trajectory;
use crate::vec2::Vec2;
use crate::world::{Tracked, World};

/// A hostile with a persistent position/velocity estimate. Visible monsters
/// snap to reported data; unobserved ones are dead-reckoned one turn at a
/// time from their last sighting.
#[derive(Clone, Debug)]
pub struct Monster {
    pub id: i32,
    pub pos: Vec2,
    pub vel: Vec2,
    target: Option<Vec2>,
}

impl Tracked for Monster {
    fn ident(&self) -> i32 {
        self.id
    }

    fn position(&self) -> Vec2 {
        self.pos
    }

    fn is_terminal(&self) -> bool {
        false
    }
}

pub struct Tracker {
    pub monsters: Vec<Monster>,
    drone_bat: HashMap<i32, i32>,
}

impl Tracker {
    pub fn new() -> Self {
        Tracker {
            monsters: Vec::new(),
            drone_bat: HashMap::new(),
        }
    }

    /// A drone that just spent battery had its light on and aggroes
    /// monsters from further away.
    fn get_aggression_radius(&self, drone_id: i32, bat: i32, config: &Config) -> f32 {
        let used_light = if let Some(&old_bat) = self.drone_bat.get(&drone_id) {
            old_bat > bat
        } else {
            false
        };

        if used_light {
            config.aggression_radius
        } else {
            config.scan_radius
        }
    }

    fn update_monsters_targets(&mut self, world: &World, config: &Config) {
        for i in 0..self.monsters.len() {
            let m = &self.monsters[i];
            let target_drone = world
                .me
                .drones
                .values()
                .chain(world.opponent.drones.values())
                .filter(|d| {
                    d.emergency != 1
                        && (d.pos - m.pos).len()
                            < self.get_aggression_radius(d.id, d.bat, config)
                })
                .min_by_key(|d| (d.pos - m.pos).len() as i32);

            let target = target_drone.map(|d| d.pos);
            self.monsters[i].target = target;
        }
    }

    fn update_monster_velocities(&mut self, config: &Config) {
        let monster_copy = self.monsters.clone();

        for m in &mut self.monsters {
            if let Some(target) = m.target {
                m.vel = (target - m.pos).norm() * config.monster_chase_speed;
            } else if let Some(closest) = monster_copy
                .iter()
                .filter(|m2| m2.id != m.id && (m2.pos - m.pos).len() < 600.)
                .min_by_key(|m2| (m2.pos - m.pos).len() as i32)
            {
                m.vel = (m.pos - closest.pos).norm() * config.creature_speed;
            } else if m.vel.len() > config.monster_idle_speed {
                m.vel = m.vel.norm() * config.monster_idle_speed;
            }
        }
    }

    fn update_monster_positions(&mut self) {
        for m in &mut self.monsters {
            m.pos = m.pos + m.vel;

            if m.pos.x < 0.0 || m.pos.x > 10000. {
                m.vel.x = -m.vel.x;
            }

            if m.pos.y < 2500. || m.pos.y > 10000. {
                m.vel.y = -m.vel.y;
            }

            m.pos = m.pos.clamp(Vec2::new(0., 2500.), Vec2::new(10000., 10000.));
        }
    }

    fn update_visible(&mut self, world: &World) {
        for creature in world.creatures.values() {
            if creature.typ != -1 || creature.pos.is_none() {
                continue;
            }

            let pos = creature.pos.unwrap_or_default();
            let vel = creature.speed.unwrap_or_default();

            if let Some(m) = self.monsters.iter_mut().find(|m| m.id == creature.id) {
                m.pos = pos;
                m.vel = vel;
            } else {
                self.monsters.push(Monster {
                    id: creature.id,
                    pos,
                    vel,
                    target: None,
                });
            }
        }
    }

    fn update_bat(&mut self, world: &World) {
        for d in world.me.drones.values().chain(world.opponent.drones.values()) {
            self.drone_bat.insert(d.id, d.bat);
        }
    }

    pub fn update(&mut self, world: &World, config: &Config) {
        self.update_monster_velocities(config);
        self.update_monster_positions();
        self.update_visible(world);
        self.update_monsters_targets(world, config);
        self.update_bat(world);

        for m in &self.monsters {
            debug!(
                id = m.id,
                x = m.pos.x as i32,
                y = m.pos.y as i32,
                vx = m.vel.x as i32,
                vy = m.vel.y as i32,
                chasing = m.target.is_some(),
                "monster estimate"
            );
        }
    }

    /// One turn's worth of projected path per monster, discretized to the
    /// same step count as drone trajectories so steps can be compared
    /// pairwise by index.
    pub fn projected_paths(&self, config: &Config) -> Vec<Trajectory> {
        self.monsters
            .iter()
            .map(|m| {
                Trajectory::project(
                    m.pos,
                    m.vel,
                    config.trajectory_steps,
                    Vec2::new(0., 2500.),
                    Vec2::new(10000., 10000.),
                )
            })
            .collect()
    }
}

impl Default for Tracker {
    fn default() -> Self {
        Self::new()
    }
}
