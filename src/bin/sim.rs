//! Headless self-play harness: a synthetic judge feeding the bot ground
//! truth it cannot see, checking the belief-region invariant every turn.

extern crate seabot;

use std::collections::HashSet;
use std::io;

use clap::Parser;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use seabot::bounds_detector::get_bounds_for_type;
use seabot::config::Config;
use seabot::policy::Command;
use seabot::strategy::Strategy;
use seabot::vec2::Vec2;
use seabot::world::{BlipDirection, BlipObs, CreatureObs, DroneObs, TurnSnapshot, World};

#[derive(Parser)]
#[command(about = "Run the bot against a randomly generated ground-truth world")]
struct Args {
    #[arg(long, default_value_t = 42)]
    seed: u64,
    #[arg(long, default_value_t = 100)]
    turns: usize,
}

struct GroundCreature {
    id: i32,
    color: i8,
    typ: i8,
    pos: Vec2,
    vel: Vec2,
}

struct SimDrone {
    id: i32,
    pos: Vec2,
    bat: i32,
    light: bool,
    scans: HashSet<i32>,
}

struct SimWorld {
    creatures: Vec<GroundCreature>,
    drones: Vec<SimDrone>,
    saved: HashSet<i32>,
}

impl SimWorld {
    fn generate(rng: &mut StdRng, config: &Config) -> Self {
        let mut creatures = Vec::new();

        for typ in 0..3i8 {
            for color in 0..4i8 {
                let band = get_bounds_for_type(typ);
                creatures.push(GroundCreature {
                    id: (typ * 4 + color) as i32,
                    color,
                    typ,
                    pos: Vec2::new(
                        rng.gen_range(0. ..10000.),
                        rng.gen_range(band.top_left.y..band.bot_right.y),
                    ),
                    vel: Vec2::new(rng.gen_range(-200. ..200.), rng.gen_range(-200. ..200.)),
                });
            }
        }

        for i in 0..2 {
            creatures.push(GroundCreature {
                id: 12 + i,
                color: -1,
                typ: -1,
                pos: Vec2::new(rng.gen_range(0. ..10000.), rng.gen_range(2500. ..10000.)),
                vel: Vec2::new(rng.gen_range(-270. ..270.), rng.gen_range(-270. ..270.)),
            });
        }

        let drones = (0..2)
            .map(|i| SimDrone {
                id: 14 + i,
                pos: Vec2::new(2000. + 6000. * i as f32, 500.),
                bat: config.battery_max,
                light: false,
                scans: HashSet::new(),
            })
            .collect();

        SimWorld {
            creatures,
            drones,
            saved: HashSet::new(),
        }
    }

    fn census(&self) -> Vec<(i32, i8, i8)> {
        self.creatures.iter().map(|c| (c.id, c.color, c.typ)).collect()
    }

    fn snapshot(&self, config: &Config) -> TurnSnapshot {
        let mut snap = TurnSnapshot {
            my_scans: self.saved.iter().copied().collect(),
            ..Default::default()
        };

        for d in &self.drones {
            snap.my_drones.push(DroneObs {
                id: d.id,
                pos: d.pos,
                emergency: 0,
                bat: d.bat,
            });
            for &id in &d.scans {
                snap.drone_scans.push((d.id, id));
            }
        }

        for c in &self.creatures {
            let visible = self.drones.iter().any(|d| {
                let radius = if d.light {
                    config.light_radius
                } else {
                    config.scan_radius
                };
                d.pos.dist(c.pos) < radius
            });

            if visible {
                snap.visible.push(CreatureObs {
                    id: c.id,
                    pos: c.pos,
                    speed: c.vel,
                });
            }

            if c.typ >= 0 {
                for d in &self.drones {
                    let dir = match (c.pos.x < d.pos.x, c.pos.y < d.pos.y) {
                        (true, true) => BlipDirection::TL,
                        (false, true) => BlipDirection::TR,
                        (true, false) => BlipDirection::BL,
                        (false, false) => BlipDirection::BR,
                    };
                    snap.blips.push(BlipObs {
                        drone_id: d.id,
                        creature_id: c.id,
                        dir,
                    });
                }
            }
        }

        snap
    }

    fn step(&mut self, commands: &[(i32, Command)], config: &Config, rng: &mut StdRng) {
        for &(id, command) in commands {
            let drone = match self.drones.iter_mut().find(|d| d.id == id) {
                Some(d) => d,
                None => continue,
            };

            let light = match command {
                Command::Move { x, y, light } => {
                    let target = Vec2::new(x as f32, y as f32);
                    let delta = target - drone.pos;
                    let mov = if delta.len() > config.drone_speed {
                        delta.norm() * config.drone_speed
                    } else {
                        delta
                    };
                    drone.pos = (drone.pos + mov)
                        .clamp(Vec2::new(0., 0.), Vec2::new(9999., 9999.));
                    light
                }
                Command::Wait { light } => light,
            };

            drone.light = light && drone.bat >= config.light_cost;
            if drone.light {
                drone.bat -= config.light_cost;
            } else {
                drone.bat = (drone.bat + config.battery_recharge).min(config.battery_max);
            }
        }

        for c in &mut self.creatures {
            let band = get_bounds_for_type(c.typ);
            c.pos = (c.pos + c.vel).clamp(band.top_left, band.bot_right);
            if rng.gen_bool(0.2) {
                let speed = if c.typ >= 0 { 200. } else { 270. };
                c.vel = Vec2::new(rng.gen_range(-speed..speed), rng.gen_range(-speed..speed));
            }
        }

        for d in &mut self.drones {
            let radius = if d.light {
                config.light_radius
            } else {
                config.scan_radius
            };
            for c in &self.creatures {
                if c.typ >= 0 && d.pos.dist(c.pos) < radius {
                    d.scans.insert(c.id);
                }
            }

            if d.pos.y < config.surface_y {
                self.saved.extend(d.scans.drain());
            }
        }
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    let config = Config::default();
    let mut rng = StdRng::seed_from_u64(args.seed);

    let mut sim = SimWorld::generate(&mut rng, &config);
    let mut world = World::new(sim.census());
    let mut strategy = Strategy::new(config.clone());

    let mut region_violations = 0usize;

    for turn in 0..args.turns {
        world.apply_turn(sim.snapshot(&config));
        let commands = strategy.play(&mut world);

        for truth in &sim.creatures {
            let creature = &world.creatures[&truth.id];
            if truth.typ < 0 || creature.observed() || creature.terminal {
                continue;
            }
            if let Some(bounds) = strategy.bounds_detector.get_bounds(truth.id) {
                if !bounds.contains(truth.pos) {
                    region_violations += 1;
                    warn!(turn, creature = truth.id, "ground truth escaped belief region");
                }
            }
        }

        sim.step(&commands, &config, &mut rng);
    }

    info!(
        turns = args.turns,
        saved = sim.saved.len(),
        region_violations,
        "simulation finished"
    );
    println!(
        "turns: {} saved: {} region violations: {}",
        args.turns,
        sim.saved.len(),
        region_violations
    );

    assert_eq!(region_violations, 0, "belief region invariant violated");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn battery_recharges_up_to_the_configured_cap() {
        let config = Config::default();
        let mut rng = StdRng::seed_from_u64(1);
        let mut sim = SimWorld::generate(&mut rng, &config);

        let commands: Vec<(i32, Command)> = sim
            .drones
            .iter()
            .map(|d| (d.id, Command::Wait { light: false }))
            .collect();

        for _ in 0..5 {
            sim.step(&commands, &config, &mut rng);
        }

        for d in &sim.drones {
            assert_eq!(d.bat, config.battery_max);
        }
    }
}
