use std::collections::HashSet;

use crate::config::Config;
use crate::world::{Drone, Tracked, World};

/// Ephemeral per-turn ranking entry; recomputed from scratch every turn.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    pub id: i32,
    pub score: f32,
    pub dist: f32,
}

/// Everything the side already holds: banked scans plus every drone's
/// unsaved scans. Turn-local sibling claims are added on top by the caller.
pub fn side_claims(world: &World) -> HashSet<i32> {
    let mut claims: HashSet<i32> = world.me.scans.iter().copied().collect();
    for drone in world.me.drones.values() {
        claims.extend(drone.scans.iter().copied());
    }
    claims
}

/// Scores every live, unclaimed creature for `drone` and returns them
/// best-first. Pure: identical state yields an identical ranking, with
/// ties kept in id order.
pub fn rank_targets(
    world: &World,
    drone: &Drone,
    claimed: &HashSet<i32>,
    config: &Config,
) -> Vec<Candidate> {
    let mut shared_type = [0usize; 3];
    let mut shared_color = [0usize; 4];
    for id in claimed {
        if let Some(c) = world.creatures.get(id) {
            if c.typ >= 0 {
                shared_type[c.typ as usize] += 1;
                shared_color[c.color as usize] += 1;
            }
        }
    }

    let mut creatures: Vec<_> = world
        .creatures
        .values()
        .filter(|c| c.typ >= 0 && !c.is_terminal() && !claimed.contains(&c.id))
        .collect();
    creatures.sort_by_key(|c| c.id);

    let mut candidates: Vec<Candidate> = creatures
        .into_iter()
        .map(|c| {
            let dist = drone.pos.dist(c.position());
            let proximity = 1. / (1. + dist / config.proximity_scale);
            let value = config.value_bonus.powi(c.tier());
            let type_penalty = config.type_decay.powi(shared_type[c.typ as usize] as i32);
            let color_penalty = config.color_decay.powi(shared_color[c.color as usize] as i32);

            Candidate {
                id: c.id,
                score: proximity * value * type_penalty * color_penalty,
                dist,
            }
        })
        .collect();

    // stable: equal keys keep id order
    candidates.sort_by_key(|c| -(c.score * 10000.) as i64);
    candidates
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vec2::Vec2;
    use crate::world::{BlipObs, BlipDirection, CreatureObs, DroneObs, TurnSnapshot};

    fn world_with_creatures(creatures: Vec<(i32, i8, i8, Vec2)>) -> World {
        let census: Vec<_> = creatures.iter().map(|&(id, col, typ, _)| (id, col, typ)).collect();
        let mut world = World::new(census);

        let snap = TurnSnapshot {
            my_drones: vec![DroneObs {
                id: 0,
                pos: Vec2::new(5000., 5000.),
                emergency: 0,
                bat: 30,
            }],
            visible: creatures
                .iter()
                .map(|&(id, _, _, pos)| CreatureObs {
                    id,
                    pos,
                    speed: Vec2::default(),
                })
                .collect(),
            blips: creatures
                .iter()
                .map(|&(id, _, _, _)| BlipObs {
                    drone_id: 0,
                    creature_id: id,
                    dir: BlipDirection::TL,
                })
                .collect(),
            ..Default::default()
        };
        world.apply_turn(snap);
        world
    }

    fn my_drone(world: &World) -> &Drone {
        &world.me.drones[&0]
    }

    #[test]
    fn higher_tier_wins_at_equal_distance() {
        let world = world_with_creatures(vec![
            (1, 0, 0, Vec2::new(5000., 4000.)),
            (2, 1, 2, Vec2::new(5000., 6000.)),
        ]);

        let ranked = rank_targets(&world, my_drone(&world), &HashSet::new(), &Config::default());

        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].id, 2);
        assert!(ranked[0].score > ranked[1].score);
    }

    #[test]
    fn claimed_targets_are_excluded() {
        let world = world_with_creatures(vec![
            (1, 0, 0, Vec2::new(5000., 4000.)),
            (2, 1, 2, Vec2::new(5000., 6000.)),
        ]);

        let claimed: HashSet<i32> = [2].into_iter().collect();
        let ranked = rank_targets(&world, my_drone(&world), &claimed, &Config::default());

        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].id, 1);
    }

    #[test]
    fn everything_claimed_yields_empty_ranking() {
        let world = world_with_creatures(vec![
            (1, 0, 0, Vec2::new(5000., 4000.)),
            (2, 1, 2, Vec2::new(5000., 6000.)),
        ]);

        let claimed: HashSet<i32> = [1, 2].into_iter().collect();
        assert!(rank_targets(&world, my_drone(&world), &claimed, &Config::default()).is_empty());
    }

    #[test]
    fn redundant_categories_score_lower() {
        // two tier-1 candidates at the same distance; one also repeats the
        // color of an already-claimed scan
        let world = world_with_creatures(vec![
            (1, 0, 0, Vec2::new(4000., 4000.)),
            (2, 1, 0, Vec2::new(4000., 6000.)),
            (3, 0, 0, Vec2::new(6000., 4000.)),
        ]);

        let claimed: HashSet<i32> = [3].into_iter().collect();
        let ranked = rank_targets(&world, my_drone(&world), &claimed, &Config::default());

        assert_eq!(ranked.len(), 2);
        // creature 1 repeats color 0 on top of type 0; creature 2 only
        // repeats the type
        assert_eq!(ranked[0].id, 2);
    }

    #[test]
    fn rescoring_is_idempotent() {
        let world = world_with_creatures(vec![
            (1, 0, 0, Vec2::new(3000., 4000.)),
            (2, 1, 1, Vec2::new(7000., 6000.)),
            (3, 2, 2, Vec2::new(5000., 8000.)),
        ]);

        let claimed: HashSet<i32> = [1].into_iter().collect();
        let config = Config::default();
        let drone = my_drone(&world);

        assert_eq!(
            rank_targets(&world, drone, &claimed, &config),
            rank_targets(&world, drone, &claimed, &config)
        );
    }

    #[test]
    fn terminal_creatures_are_never_candidates() {
        let mut world = world_with_creatures(vec![
            (1, 0, 0, Vec2::new(5000., 4000.)),
            (2, 1, 2, Vec2::new(5000., 6000.)),
        ]);
        world.creatures.get_mut(&1).unwrap().terminal = true;

        let ranked = rank_targets(&world, my_drone(&world), &HashSet::new(), &Config::default());
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].id, 2);
    }
}
