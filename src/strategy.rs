use tracing::debug;

use super::*;

/// Owns the persistent estimators and runs the full turn pipeline:
/// tracker, belief regions, then the rule chain per drone.
pub struct Strategy {
    pub bounds_detector: BoundsDetector,
    pub tracker: Tracker,
    config: Config,
}

impl Strategy {
    pub fn new(config: Config) -> Self {
        Strategy {
            bounds_detector: BoundsDetector::new(),
            tracker: Tracker::new(),
            config,
        }
    }

    /// One decision per friendly drone, in id order. Reads are done against
    /// a fixed snapshot of the turn; the only writes (claims, returning
    /// flags) are applied after every drone has decided.
    pub fn play(&mut self, world: &mut World) -> Vec<(i32, Command)> {
        self.tracker.update(world, &self.config);
        self.bounds_detector.update(world, &self.config);

        let hostiles = self.tracker.projected_paths(&self.config);
        let mut claimed = side_claims(world);

        let drone_ids: Vec<i32> = world.me.drones.keys().copied().collect();
        let mut commands = Vec::with_capacity(drone_ids.len());
        let mut flags = Vec::with_capacity(drone_ids.len());

        for id in drone_ids {
            let drone = &world.me.drones[&id];
            let decision = decide(world, drone, &hostiles, &claimed, &self.config);

            debug!(
                drone = id,
                rule = ?decision.rule,
                command = %decision.command,
                "turn decision"
            );

            if let Some(target) = decision.target {
                claimed.insert(target);
            }
            flags.push((id, decision.returning));
            commands.push((id, decision.command));
        }

        for (id, returning) in flags {
            if let Some(drone) = world.me.drones.get_mut(&id) {
                drone.returning = returning;
            }
        }

        commands
    }
}
