use std::collections::{HashMap, HashSet};

use tracing::debug;

use crate::config::Config;
use crate::vec2::Vec2;
use crate::world::{BlipDirection, World};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub top_left: Vec2,
    pub bot_right: Vec2,
}

impl Bounds {
    pub fn new(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        Bounds {
            top_left: Vec2::new(x1, y1),
            bot_right: Vec2::new(x2, y2),
        }
    }

    pub fn around(pos: Vec2, radius: f32) -> Self {
        Bounds {
            top_left: pos - Vec2::new(radius, radius),
            bot_right: pos + Vec2::new(radius, radius),
        }
    }

    fn is_valid(&self) -> bool {
        self.top_left.x <= self.bot_right.x && self.top_left.y <= self.bot_right.y
    }

    /// Guarded intersection: a cut that would leave an empty or inverted
    /// rectangle is dropped and the region keeps its previous value.
    pub fn intersect(&mut self, other: &Bounds) -> bool {
        let cut = Bounds {
            top_left: self.top_left.max(other.top_left),
            bot_right: self.bot_right.min(other.bot_right),
        };

        if cut.is_valid() {
            *self = cut;
            true
        } else {
            false
        }
    }

    pub fn extend(&mut self, size: f32) {
        self.top_left.x -= size;
        self.top_left.y -= size;
        self.bot_right.x += size;
        self.bot_right.y += size;
    }

    pub fn get_center(&self) -> Vec2 {
        (self.bot_right + self.top_left) * 0.5
    }

    pub fn area(&self) -> f32 {
        (self.bot_right.x - self.top_left.x) * (self.bot_right.y - self.top_left.y)
    }

    pub fn contains(&self, pos: Vec2) -> bool {
        pos.x >= self.top_left.x
            && pos.x <= self.bot_right.x
            && pos.y >= self.top_left.y
            && pos.y <= self.bot_right.y
    }
}

/// Legal domain per creature type: the full width crossed with its depth band.
pub fn get_bounds_for_type(typ: i8) -> Bounds {
    match typ {
        -1 => Bounds::new(0., 2500., 10000., 10000.),
        0 => Bounds::new(0., 2500., 10000., 5000.),
        1 => Bounds::new(0., 5000., 10000., 7500.),
        2 => Bounds::new(0., 7500., 10000., 10000.),
        _ => unreachable!(),
    }
}

fn get_directional_bounds(dir: BlipDirection, pos: Vec2) -> Bounds {
    match dir {
        BlipDirection::TL => Bounds::new(0., 0., pos.x, pos.y),
        BlipDirection::TR => Bounds::new(pos.x, 0., 10000., pos.y),
        BlipDirection::BL => Bounds::new(0., pos.y, pos.x, 10000.),
        BlipDirection::BR => Bounds::new(pos.x, pos.y, 10000., 10000.),
    }
}

/// Narrows a bounding region per unobserved creature, turn over turn.
///
/// The true position stays inside the region as long as the inputs are
/// truthful: the region only widens by one speed step per turn and every
/// cut comes from an actual sensor reading.
pub struct BoundsDetector {
    pub bounds: HashMap<i32, Bounds>,
    prev_blips: HashMap<(i32, i32), BlipDirection>,
    prev_drone_pos: HashMap<i32, Vec2>,
    seen_scans: HashSet<(i32, i32)>,
    drone_bat: HashMap<i32, i32>,
}

impl BoundsDetector {
    pub fn new() -> Self {
        BoundsDetector {
            bounds: HashMap::new(),
            prev_blips: HashMap::new(),
            prev_drone_pos: HashMap::new(),
            seen_scans: HashSet::new(),
            drone_bat: HashMap::new(),
        }
    }

    fn initialize(&mut self, world: &World) {
        if self.bounds.is_empty() {
            for c in world.creatures.values() {
                self.bounds.insert(c.id, get_bounds_for_type(c.typ));
            }
        }
    }

    /// Step 1+2: one speed-step widening per elapsed turn, clipped to the
    /// creature's depth band. Directly observed creatures collapse to their
    /// reported position instead.
    fn extend_bounds(&mut self, world: &World, config: &Config) {
        for c in world.creatures.values() {
            let bounds = match self.bounds.get_mut(&c.id) {
                Some(b) => b,
                None => continue,
            };

            if let Some(pos) = c.pos {
                *bounds = Bounds::around(pos, 0.);
                continue;
            }

            bounds.extend(config.creature_speed);
            bounds.intersect(&get_bounds_for_type(c.typ));
        }
    }

    /// The sensor radius a drone must have used this turn. A battery drop
    /// since last turn means the light was on.
    fn effective_scan_radius(&self, drone_id: i32, bat: i32, config: &Config) -> f32 {
        let used_light = match self.drone_bat.get(&drone_id) {
            Some(&old_bat) => old_bat > bat,
            None => false,
        };

        if used_light {
            config.light_radius
        } else {
            config.scan_radius
        }
    }

    /// Step 3: a scan sighting pins the creature inside the scanning
    /// drone's sensor square at sighting time.
    fn handle_scan_sightings(&mut self, world: &World, config: &Config) {
        for drone in world.me.drones.values() {
            for &id in &drone.scans {
                if !self.seen_scans.insert((drone.id, id)) {
                    continue;
                }

                let radius = self.effective_scan_radius(drone.id, drone.bat, config);
                if let Some(bounds) = self.bounds.get_mut(&id) {
                    if !bounds.intersect(&Bounds::around(drone.pos, radius)) {
                        debug!(creature = id, "scan sighting cut rejected, keeping region");
                    }
                }
            }
        }
    }

    /// Step 4: quadrant hints, one half-plane pair per blip.
    fn handle_blips(&mut self, world: &World) {
        for drone in world.me.drones.values() {
            for (id, blip) in &drone.blips {
                if let Some(bounds) = self.bounds.get_mut(id) {
                    if !bounds.intersect(&get_directional_bounds(*blip, drone.pos)) {
                        debug!(creature = id, "blip cut rejected, keeping region");
                    }
                }
            }
        }
    }

    /// Step 5: a flipped blip means the creature crossed the drone's axis
    /// within the last turn's movement budget; narrow to the crossing band.
    /// The band spans the drone's old and new coordinate so a moving sensor
    /// cannot cut the true position away.
    fn handle_blip_flips(&mut self, world: &World, config: &Config) {
        for drone in world.me.drones.values() {
            let prev_pos = self.prev_drone_pos.get(&drone.id).copied();

            for (&id, &blip) in &drone.blips {
                let prev = match self.prev_blips.get(&(drone.id, id)) {
                    Some(&prev) => prev,
                    None => continue,
                };

                let bounds = match self.bounds.get_mut(&id) {
                    Some(b) => b,
                    None => continue,
                };

                let anchor = prev_pos.unwrap_or(drone.pos);

                if prev.is_left() != blip.is_left() {
                    let band = Bounds::new(
                        anchor.x.min(drone.pos.x) - config.creature_speed,
                        0.,
                        anchor.x.max(drone.pos.x) + config.creature_speed,
                        10000.,
                    );
                    if !bounds.intersect(&band) {
                        debug!(creature = id, "x crossing band rejected, keeping region");
                    }
                }

                if prev.is_top() != blip.is_top() {
                    let band = Bounds::new(
                        0.,
                        anchor.y.min(drone.pos.y) - config.creature_speed,
                        10000.,
                        anchor.y.max(drone.pos.y) + config.creature_speed,
                    );
                    if !bounds.intersect(&band) {
                        debug!(creature = id, "y crossing band rejected, keeping region");
                    }
                }
            }
        }
    }

    fn remember_turn(&mut self, world: &World) {
        for drone in world.me.drones.values() {
            for (&id, &blip) in &drone.blips {
                self.prev_blips.insert((drone.id, id), blip);
            }
            self.prev_drone_pos.insert(drone.id, drone.pos);
            self.drone_bat.insert(drone.id, drone.bat);
        }
    }

    /// Step 6: collapse to the centroid as the working position estimate.
    fn update_estimates(&self, world: &mut World) {
        for c in world.creatures.values_mut() {
            if c.observed() || c.terminal {
                continue;
            }
            if let Some(bounds) = self.bounds.get(&c.id) {
                c.est_pos = bounds.get_center();
            }
        }
    }

    pub fn update(&mut self, world: &mut World, config: &Config) {
        self.initialize(world);
        self.extend_bounds(world, config);
        self.handle_scan_sightings(world, config);
        self.handle_blips(world);
        self.handle_blip_flips(world, config);
        self.remember_turn(world);
        self.update_estimates(world);

        for (id, bounds) in &self.bounds {
            debug!(
                creature = id,
                tl = ?bounds.top_left,
                br = ?bounds.bot_right,
                "belief region"
            );
        }
    }

    pub fn get_bounds(&self, id: i32) -> Option<&Bounds> {
        self.bounds.get(&id)
    }
}

impl Default for BoundsDetector {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::{BlipObs, CreatureObs, DroneObs, TurnSnapshot};
    use proptest::prelude::*;

    fn drone_obs(pos: Vec2) -> DroneObs {
        DroneObs {
            id: 0,
            pos,
            emergency: 0,
            bat: 30,
        }
    }

    fn snapshot(drone_pos: Vec2, blips: Vec<(i32, BlipDirection)>) -> TurnSnapshot {
        TurnSnapshot {
            my_drones: vec![drone_obs(drone_pos)],
            blips: blips
                .into_iter()
                .map(|(creature_id, dir)| BlipObs {
                    drone_id: 0,
                    creature_id,
                    dir,
                })
                .collect(),
            ..Default::default()
        }
    }

    #[test]
    fn speed_expansion_intersected_with_quadrant_hint() {
        // region (0,0)-(1000,1000), speed 200, then a "top-right of
        // (500,500)" hint: expanded box cut to x >= 500, y <= 500
        let mut bounds = Bounds::new(0., 0., 1000., 1000.);
        bounds.extend(200.);
        assert!(bounds.intersect(&get_directional_bounds(
            BlipDirection::TR,
            Vec2::new(500., 500.),
        )));
        assert_eq!(bounds, Bounds::new(500., -200., 1200., 500.));
    }

    #[test]
    fn narrowing_is_monotonic_within_a_turn() {
        let config = Config::default();
        let mut world = World::new([(1, 0, 0)]);
        let mut detector = BoundsDetector::new();

        world.apply_turn(snapshot(Vec2::new(4000., 4000.), vec![(1, BlipDirection::TL)]));
        detector.update(&mut world, &config);

        let after_expansion = {
            let mut b = *detector.get_bounds(1).unwrap();
            b.extend(config.creature_speed);
            b.intersect(&get_bounds_for_type(0));
            b
        };

        world.apply_turn(snapshot(Vec2::new(4000., 4000.), vec![(1, BlipDirection::TL)]));
        detector.update(&mut world, &config);

        assert!(detector.get_bounds(1).unwrap().area() <= after_expansion.area());
    }

    #[test]
    fn degenerate_cut_keeps_previous_region() {
        // contradictory quadrants from two sensors around a narrowed region
        let mut bounds = Bounds::new(4000., 4000., 4500., 4500.);
        let kept = bounds;

        let applied = bounds.intersect(&get_directional_bounds(
            BlipDirection::TL,
            Vec2::new(3000., 3000.),
        ));

        assert!(!applied);
        assert_eq!(bounds, kept);
        assert!(bounds.is_valid());
    }

    #[test]
    fn blip_flip_narrows_to_crossing_band() {
        let config = Config::default();
        let mut world = World::new([(1, 0, 0)]);
        let mut detector = BoundsDetector::new();

        let drone_pos = Vec2::new(5000., 6000.);
        world.apply_turn(snapshot(drone_pos, vec![(1, BlipDirection::TL)]));
        detector.update(&mut world, &config);

        world.apply_turn(snapshot(drone_pos, vec![(1, BlipDirection::TR)]));
        detector.update(&mut world, &config);

        let bounds = detector.get_bounds(1).unwrap();
        assert!(bounds.top_left.x >= drone_pos.x - config.creature_speed);
        assert!(bounds.bot_right.x <= drone_pos.x + config.creature_speed);
    }

    #[test]
    fn sighting_collapses_then_reexpands() {
        let config = Config::default();
        let mut world = World::new([(1, 0, 0)]);
        let mut detector = BoundsDetector::new();

        let seen_at = Vec2::new(3000., 4000.);
        let mut snap = snapshot(Vec2::new(3100., 4100.), vec![(1, BlipDirection::TL)]);
        snap.visible.push(CreatureObs {
            id: 1,
            pos: seen_at,
            speed: Vec2::default(),
        });
        world.apply_turn(snap);
        detector.update(&mut world, &config);
        assert_eq!(detector.get_bounds(1).unwrap().get_center(), seen_at);

        world.apply_turn(snapshot(Vec2::new(3100., 4100.), vec![(1, BlipDirection::TL)]));
        detector.update(&mut world, &config);

        let bounds = detector.get_bounds(1).unwrap();
        assert!(bounds.contains(seen_at));
        // one turn unobserved: at most one speed step in every direction
        assert!(bounds.area() <= (2. * config.creature_speed).powi(2) + 1.);
    }

    #[test]
    fn new_scan_pins_creature_to_sensor_square() {
        let config = Config::default();
        let mut world = World::new([(1, 0, 0)]);
        let mut detector = BoundsDetector::new();

        let drone_pos = Vec2::new(5000., 4000.);
        let mut snap = snapshot(drone_pos, vec![(1, BlipDirection::TL)]);
        snap.drone_scans.push((0, 1));
        world.apply_turn(snap);
        detector.update(&mut world, &config);

        let bounds = detector.get_bounds(1).unwrap();
        assert!(bounds.bot_right.x <= drone_pos.x);
        assert!(bounds.top_left.x >= drone_pos.x - config.scan_radius);
    }

    proptest! {
        /// Region invariant: with truthful blips, the ground-truth position
        /// never escapes the belief region.
        #[test]
        fn region_always_contains_ground_truth(
            seed_x in 0f32..10000f32,
            seed_y in 5000f32..7500f32,
            steps in proptest::collection::vec((-1f32..1f32, -1f32..1f32), 1..25),
        ) {
            let config = Config::default();
            let mut world = World::new([(1, 0, 1)]);
            let mut detector = BoundsDetector::new();
            let drone_pos = Vec2::new(5000., 6000.);

            let mut truth = Vec2::new(seed_x, seed_y);
            for (dx, dy) in steps {
                truth = (truth + Vec2::new(dx, dy) * config.creature_speed)
                    .clamp(Vec2::new(0., 5000.), Vec2::new(10000., 7500.));

                let dir = match (truth.x < drone_pos.x, truth.y < drone_pos.y) {
                    (true, true) => BlipDirection::TL,
                    (false, true) => BlipDirection::TR,
                    (true, false) => BlipDirection::BL,
                    (false, false) => BlipDirection::BR,
                };

                world.apply_turn(snapshot(drone_pos, vec![(1, dir)]));
                detector.update(&mut world, &config);

                prop_assert!(detector.get_bounds(1).unwrap().contains(truth));
            }
        }
    }
}
