use crate::vec2::Vec2;

pub const MAP_SIZE: f32 = 10000.;

/// Every tuning constant of the bot in one place, threaded by reference
/// into the turn-step functions.
#[derive(Debug, Clone)]
pub struct Config {
    /// Drone movement per turn.
    pub drone_speed: f32,
    /// Creature drift per turn, used when widening belief regions.
    pub creature_speed: f32,
    /// Monster speed when chasing a drone.
    pub monster_chase_speed: f32,
    /// Monster cruising speed cap when nothing is in range.
    pub monster_idle_speed: f32,
    /// Sensor radius without the light.
    pub scan_radius: f32,
    /// Sensor radius with the light on.
    pub light_radius: f32,
    /// Monsters aggro onto drones within this radius of their light.
    pub aggression_radius: f32,
    /// Minimum separation from a monster's projected path, per time step.
    pub danger_dist: f32,
    /// Waypoints per projected trajectory.
    pub trajectory_steps: usize,
    /// Rotation attempts before giving up on a safe route.
    pub max_avoid_attempts: usize,
    /// Battery cost of one light flash, passive recharge per turn, and
    /// the recharge cap.
    pub light_cost: i32,
    pub battery_recharge: i32,
    pub battery_max: i32,
    /// Lights stay off above this depth; nothing scannable lives shallower.
    pub min_light_depth: f32,
    /// Drones bank their scans above this depth.
    pub surface_y: f32,
    /// Unsaved scan value that justifies heading home.
    pub return_value_threshold: f32,
    /// Scoring: per-tier bonus base (> 1) and per-category decays (< 1).
    pub value_bonus: f32,
    pub type_decay: f32,
    pub color_decay: f32,
    /// Scoring: distance at which proximity halves.
    pub proximity_scale: f32,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            drone_speed: 600.,
            creature_speed: 200.,
            monster_chase_speed: 540.,
            monster_idle_speed: 270.,
            scan_radius: 800.,
            light_radius: 2000.,
            aggression_radius: 2000.,
            danger_dist: 600.,
            trajectory_steps: 10,
            max_avoid_attempts: 12,
            light_cost: 5,
            battery_recharge: 1,
            battery_max: 30,
            min_light_depth: 2000.,
            surface_y: 500.,
            return_value_threshold: 8.,
            value_bonus: 1.5,
            type_decay: 0.6,
            color_decay: 0.7,
            proximity_scale: 2000.,
        }
    }
}

impl Config {
    /// Full map rectangle, the outer legal domain for every entity.
    pub fn map_top_left(&self) -> Vec2 {
        Vec2::new(0., 0.)
    }

    pub fn map_bot_right(&self) -> Vec2 {
        Vec2::new(MAP_SIZE, MAP_SIZE)
    }
}
