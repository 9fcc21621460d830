pub mod bounds_detector {
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

}
pub mod config {
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
}
pub mod io {
use std::io::BufRead;

use thiserror::Error;

use crate::vec2::Vec2;
use crate::world::{BlipDirection, BlipObs, CreatureObs, DroneObs, TurnSnapshot};

/// Input from the judge is trusted to be well formed; anything else is
/// unrecoverable and has to kill the turn loop before a command is printed.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("input stream ended mid-turn")]
    Eof,
    #[error("failed to read input: {0}")]
    Io(#[from] std::io::Error),
    #[error("expected {expected} fields, got {got} in line {line:?}")]
    FieldCount {
        expected: usize,
        got: usize,
        line: String,
    },
    #[error("invalid integer {token:?}")]
    BadInt { token: String },
    #[error("unknown radar direction {0:?}")]
    BadDirection(String),
    #[error("census entry {id} has color {color} / type {typ} out of range")]
    BadCensus { id: i32, color: i8, typ: i8 },
}

fn parse_int(token: &str) -> Result<i64, ParseError> {
    token.parse().map_err(|_| ParseError::BadInt {
        token: token.to_string(),
    })
}

fn parse_direction(token: &str) -> Result<BlipDirection, ParseError> {
    match token {
        "TL" => Ok(BlipDirection::TL),
        "TR" => Ok(BlipDirection::TR),
        "BL" => Ok(BlipDirection::BL),
        "BR" => Ok(BlipDirection::BR),
        other => Err(ParseError::BadDirection(other.to_string())),
    }
}

/// Line-oriented reader for the judge protocol.
pub struct TurnReader<R> {
    input: R,
    line: String,
}

impl<R: BufRead> TurnReader<R> {
    pub fn new(input: R) -> Self {
        TurnReader {
            input,
            line: String::new(),
        }
    }

    fn next_line(&mut self) -> Result<&str, ParseError> {
        self.line.clear();
        if self.input.read_line(&mut self.line)? == 0 {
            return Err(ParseError::Eof);
        }
        Ok(self.line.trim())
    }

    fn next_int(&mut self) -> Result<i64, ParseError> {
        let line = self.next_line()?;
        parse_int(line)
    }

    /// Reads one line of exactly `expected` whitespace-separated integers.
    fn next_ints(&mut self, expected: usize) -> Result<Vec<i64>, ParseError> {
        let line = self.next_line()?;
        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.len() != expected {
            return Err(ParseError::FieldCount {
                expected,
                got: tokens.len(),
                line: line.to_string(),
            });
        }
        tokens.iter().map(|t| parse_int(t)).collect::<Result<Vec<_>, _>>()
    }

    /// The pre-game census: one count line, then `(id, color, type)` per
    /// line. Type and color are range-checked here so every later lookup
    /// keyed on them can index without a guard.
    pub fn read_census(&mut self) -> Result<Vec<(i32, i8, i8)>, ParseError> {
        let count = self.next_int()? as usize;
        let mut census = Vec::with_capacity(count);
        for _ in 0..count {
            let fields = self.next_ints(3)?;
            let (id, color, typ) = (fields[0] as i32, fields[1] as i8, fields[2] as i8);

            let valid = match typ {
                -1 => color == -1,
                0..=2 => (0..=3).contains(&color),
                _ => false,
            };
            if !valid {
                return Err(ParseError::BadCensus { id, color, typ });
            }

            census.push((id, color, typ));
        }
        Ok(census)
    }

    /// One full turn of observations, in judge order. `Ok(None)` when the
    /// stream ends cleanly before the turn starts (the judge is done);
    /// running dry mid-turn is still a hard [`ParseError::Eof`].
    pub fn read_turn(&mut self) -> Result<Option<TurnSnapshot>, ParseError> {
        let my_score = match self.next_int() {
            Ok(score) => score as i32,
            Err(ParseError::Eof) => return Ok(None),
            Err(e) => return Err(e),
        };

        let mut snap = TurnSnapshot {
            my_score,
            foe_score: self.next_int()? as i32,
            ..Default::default()
        };

        let my_scan_count = self.next_int()? as usize;
        for _ in 0..my_scan_count {
            snap.my_scans.push(self.next_int()? as i32);
        }

        let foe_scan_count = self.next_int()? as usize;
        for _ in 0..foe_scan_count {
            snap.foe_scans.push(self.next_int()? as i32);
        }

        let my_drone_count = self.next_int()? as usize;
        for _ in 0..my_drone_count {
            snap.my_drones.push(self.read_drone()?);
        }

        let foe_drone_count = self.next_int()? as usize;
        for _ in 0..foe_drone_count {
            snap.foe_drones.push(self.read_drone()?);
        }

        let drone_scan_count = self.next_int()? as usize;
        for _ in 0..drone_scan_count {
            let fields = self.next_ints(2)?;
            snap.drone_scans.push((fields[0] as i32, fields[1] as i32));
        }

        let visible_count = self.next_int()? as usize;
        for _ in 0..visible_count {
            let fields = self.next_ints(5)?;
            snap.visible.push(CreatureObs {
                id: fields[0] as i32,
                pos: Vec2::new(fields[1] as f32, fields[2] as f32),
                speed: Vec2::new(fields[3] as f32, fields[4] as f32),
            });
        }

        let blip_count = self.next_int()? as usize;
        for _ in 0..blip_count {
            snap.blips.push(self.read_blip()?);
        }

        Ok(Some(snap))
    }

    fn read_drone(&mut self) -> Result<DroneObs, ParseError> {
        let fields = self.next_ints(5)?;
        Ok(DroneObs {
            id: fields[0] as i32,
            pos: Vec2::new(fields[1] as f32, fields[2] as f32),
            emergency: fields[3] as i32,
            bat: fields[4] as i32,
        })
    }

    fn read_blip(&mut self) -> Result<BlipObs, ParseError> {
        let line = self.next_line()?;
        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.len() != 3 {
            return Err(ParseError::FieldCount {
                expected: 3,
                got: tokens.len(),
                line: line.to_string(),
            });
        }
        Ok(BlipObs {
            drone_id: parse_int(tokens[0])? as i32,
            creature_id: parse_int(tokens[1])? as i32,
            dir: parse_direction(tokens[2])?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TURN: &str = "\
12
8
1
4
0
2
0 2000 3000 0 25
1 4000 500 0 30
2
2 8000 3000 0 30
3 9000 500 0 30
1
0 5
1
5 2100 3100 -50 0
2
0 5 BR
1 5 TL
";

    #[test]
    fn parses_a_full_turn() {
        let mut reader = TurnReader::new(TURN.as_bytes());
        let snap = reader.read_turn().unwrap().unwrap();

        assert_eq!(snap.my_score, 12);
        assert_eq!(snap.foe_score, 8);
        assert_eq!(snap.my_scans, vec![4]);
        assert_eq!(snap.my_drones.len(), 2);
        assert_eq!(snap.my_drones[1].bat, 30);
        assert_eq!(snap.drone_scans, vec![(0, 5)]);
        assert_eq!(snap.visible[0].speed, Vec2::new(-50., 0.));
        assert_eq!(snap.blips.len(), 2);
        assert_eq!(snap.blips[1].dir, BlipDirection::TL);
    }

    #[test]
    fn wrong_field_count_is_fatal() {
        let mut reader = TurnReader::new("0\n0\n0\n0\n1\n0 2000 3000 0\n".as_bytes());
        match reader.read_turn() {
            Err(ParseError::FieldCount { expected: 5, got: 4, .. }) => {}
            other => panic!("expected field count error, got {other:?}"),
        }
    }

    #[test]
    fn truncated_stream_is_fatal() {
        let mut reader = TurnReader::new("12\n8\n1\n".as_bytes());
        match reader.read_turn() {
            Err(ParseError::Eof) => {}
            other => panic!("expected eof error, got {other:?}"),
        }
    }

    #[test]
    fn clean_end_of_stream_is_not_an_error() {
        let mut reader = TurnReader::new("".as_bytes());
        assert!(reader.read_turn().unwrap().is_none());
    }

    #[test]
    fn unknown_radar_code_is_fatal() {
        let mut reader =
            TurnReader::new("0\n0\n0\n0\n0\n0\n0\n0\n1\n0 5 XX\n".as_bytes());
        match reader.read_turn() {
            Err(ParseError::BadDirection(code)) => assert_eq!(code, "XX"),
            other => panic!("expected direction error, got {other:?}"),
        }
    }

    #[test]
    fn census_round_trip() {
        let mut reader = TurnReader::new("2\n4 0 1\n5 3 2\n".as_bytes());
        let census = reader.read_census().unwrap();
        assert_eq!(census, vec![(4, 0, 1), (5, 3, 2)]);
    }

    #[test]
    fn out_of_range_census_entry_is_fatal() {
        // a type outside -1..=2 must fail at parse time, not later
        let mut reader = TurnReader::new("1\n4 0 7\n".as_bytes());
        match reader.read_census() {
            Err(ParseError::BadCensus { id: 4, typ: 7, .. }) => {}
            other => panic!("expected census error, got {other:?}"),
        }

        // a non-monster with the monster color marker is just as bad
        let mut reader = TurnReader::new("1\n4 -1 0\n".as_bytes());
        match reader.read_census() {
            Err(ParseError::BadCensus { id: 4, color: -1, .. }) => {}
            other => panic!("expected census error, got {other:?}"),
        }
    }
}
}
pub mod policy {
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::{BlipDirection, BlipObs, CreatureObs, DroneObs, TurnSnapshot};

    fn base_snapshot() -> TurnSnapshot {
        TurnSnapshot {
            my_drones: vec![DroneObs {
                id: 0,
                pos: Vec2::new(5000., 6000.),
                emergency: 0,
                bat: 30,
            }],
            visible: vec![CreatureObs {
                id: 1,
                pos: Vec2::new(6000., 6000.),
                speed: Vec2::default(),
            }],
            blips: vec![BlipObs {
                drone_id: 0,
                creature_id: 1,
                dir: BlipDirection::BR,
            }],
            ..Default::default()
        }
    }

    fn world_from(snap: TurnSnapshot) -> World {
        let mut world = World::new([(1, 0, 2)]);
        world.apply_turn(snap);
        world
    }

    fn decide_for(world: &World, claimed: &HashSet<i32>) -> Decision {
        decide(
            world,
            &world.me.drones[&0],
            &[],
            claimed,
            &Config::default(),
        )
    }

    #[test]
    fn pursues_best_target_by_default() {
        let world = world_from(base_snapshot());
        let decision = decide_for(&world, &HashSet::new());

        assert_eq!(decision.rule, Rule::PursueBestTarget);
        assert_eq!(decision.target, Some(1));
        assert!(!decision.returning);
        match decision.command {
            Command::Move { x, y, .. } => {
                // heading toward the creature at (6000, 6000)
                assert!(x > 5000);
                assert_eq!(y, 6000);
            }
            other => panic!("expected a move, got {other:?}"),
        }
    }

    #[test]
    fn full_haul_triggers_return() {
        let mut snap = base_snapshot();
        snap.drone_scans = vec![(0, 1)];
        let world = world_from(snap);

        // one tier-3 scan is below the default threshold, so lower it
        let mut config = Config::default();
        config.return_value_threshold = 3.;
        let decision = decide(&world, &world.me.drones[&0], &[], &HashSet::new(), &config);

        assert_eq!(decision.rule, Rule::ReturnWithHaul);
        assert!(decision.returning);
        match decision.command {
            Command::Move { y, .. } => assert!(y < 6000),
            other => panic!("expected a move, got {other:?}"),
        }
    }

    #[test]
    fn committed_return_continues_while_carrying() {
        let mut snap = base_snapshot();
        snap.drone_scans = vec![(0, 1)];
        let mut world = world_from(snap);
        world.me.drones.get_mut(&0).unwrap().returning = true;

        let decision = decide_for(&world, &HashSet::new());

        assert_eq!(decision.rule, Rule::ContinueExtraction);
        assert!(decision.returning);
    }

    #[test]
    fn emergency_outranks_chasing() {
        let mut snap = base_snapshot();
        snap.my_drones[0].emergency = 1;
        let world = world_from(snap);

        let decision = decide_for(&world, &HashSet::new());

        assert_eq!(decision.rule, Rule::EmergencyIdle);
        assert_eq!(decision.command, Command::Wait { light: false });
        assert!(!decision.returning);
    }

    #[test]
    fn all_claimed_falls_back_to_returning() {
        let world = world_from(base_snapshot());
        let claimed: HashSet<i32> = [1].into_iter().collect();

        let decision = decide_for(&world, &claimed);

        assert_eq!(decision.rule, Rule::NothingLeft);
        assert_eq!(decision.target, None);
        match decision.command {
            Command::Move { y, .. } => assert!(y < 6000),
            Command::Wait { .. } => {}
        }
    }

    #[test]
    fn shallow_drone_keeps_light_off() {
        let mut snap = base_snapshot();
        // both above the light depth gate, creature well within flash range
        snap.my_drones[0].pos = Vec2::new(5000., 1000.);
        snap.visible[0].pos = Vec2::new(5500., 1000.);
        let world = world_from(snap);

        let decision = decide_for(&world, &HashSet::new());

        assert_eq!(decision.rule, Rule::PursueBestTarget);
        match decision.command {
            Command::Move { light, .. } => assert!(!light),
            other => panic!("expected a move, got {other:?}"),
        }
    }

    #[test]
    fn commands_print_in_judge_format() {
        let move_cmd = Command::Move {
            x: 1234,
            y: 567,
            light: true,
        };
        assert_eq!(move_cmd.to_string(), "MOVE 1234 567 1");
        assert_eq!(Command::Wait { light: false }.to_string(), "WAIT 0");
    }
}
}
pub mod scoring {
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

}
pub mod strategy {
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

}
pub mod tracker {
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::{CreatureObs, DroneObs, TurnSnapshot};

    fn world_with_monster(pos: Vec2, vel: Vec2) -> World {
        let mut world = World::new([(20, -1, -1)]);
        world.apply_turn(TurnSnapshot {
            my_drones: vec![DroneObs {
                id: 0,
                pos: Vec2::new(500., 500.),
                emergency: 0,
                bat: 30,
            }],
            visible: vec![CreatureObs {
                id: 20,
                pos,
                speed: vel,
            }],
            ..Default::default()
        });
        world
    }

    #[test]
    fn visible_monster_snaps_to_report() {
        let config = Config::default();
        let mut tracker = Tracker::new();
        let world = world_with_monster(Vec2::new(4000., 6000.), Vec2::new(100., 0.));

        tracker.update(&world, &config);

        assert_eq!(tracker.monsters.len(), 1);
        assert_eq!(tracker.monsters[0].pos, Vec2::new(4000., 6000.));
    }

    #[test]
    fn unobserved_monster_is_dead_reckoned() {
        let config = Config::default();
        let mut tracker = Tracker::new();
        let world = world_with_monster(Vec2::new(4000., 6000.), Vec2::new(100., 0.));
        tracker.update(&world, &config);

        // monster out of everyone's view: estimate advances by its velocity
        let mut empty = World::new([(20, -1, -1)]);
        empty.apply_turn(TurnSnapshot::default());
        tracker.update(&empty, &config);

        assert_eq!(tracker.monsters[0].pos, Vec2::new(4100., 6000.));
    }

    #[test]
    fn estimate_stays_in_monster_domain() {
        let config = Config::default();
        let mut tracker = Tracker::new();
        let world = world_with_monster(Vec2::new(9950., 6000.), Vec2::new(200., 0.));
        tracker.update(&world, &config);

        let mut empty = World::new([(20, -1, -1)]);
        empty.apply_turn(TurnSnapshot::default());
        tracker.update(&empty, &config);
        tracker.update(&empty, &config);

        let m = &tracker.monsters[0];
        assert!(m.pos.x <= 10000.);
        // bounced off the wall, now heading back in
        assert!(m.vel.x < 0.);
    }
}
}
pub mod trajectory {
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

}
pub mod vec2 {
use std::ops::{Add, Mul, Sub};

#[derive(Default, Debug, Copy, Clone, PartialEq)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Add for Vec2 {
    type Output = Vec2;

    fn add(self, other: Vec2) -> Vec2 {
        Vec2 {
            x: self.x + other.x,
            y: self.y + other.y,
        }
    }
}

impl Sub for Vec2 {
    type Output = Vec2;

    fn sub(self, other: Vec2) -> Vec2 {
        Vec2 {
            x: self.x - other.x,
            y: self.y - other.y,
        }
    }
}

impl Mul<f32> for Vec2 {
    type Output = Vec2;
    fn mul(self, other: f32) -> Vec2 {
        Vec2 {
            x: self.x * other,
            y: self.y * other,
        }
    }
}

impl Vec2 {
    pub fn new(x: f32, y: f32) -> Self {
        Vec2 { x, y }
    }

    pub fn len(self) -> f32 {
        ((self.x * self.x) + (self.y * self.y)).sqrt()
    }

    pub fn dist(self, other: Vec2) -> f32 {
        (self - other).len()
    }

    /// Unit vector in the same direction; the zero vector stays zero.
    pub fn norm(self) -> Vec2 {
        let len = self.len();
        if len == 0.0 {
            Vec2::default()
        } else {
            Vec2::new(self.x / len, self.y / len)
        }
    }

    pub fn rotate(self, angle: f32) -> Vec2 {
        let (sin, cos) = angle.sin_cos();
        Vec2 {
            x: self.x * cos - self.y * sin,
            y: self.x * sin + self.y * cos,
        }
    }

    pub fn clamp(self, lt: Vec2, rb: Vec2) -> Vec2 {
        let x = self.x.clamp(lt.x, rb.x);
        let y = self.y.clamp(lt.y, rb.y);
        Vec2 { x, y }
    }

    pub fn max(self, other: Vec2) -> Vec2 {
        Vec2 {
            x: self.x.max(other.x),
            y: self.y.max(other.y),
        }
    }

    pub fn min(self, other: Vec2) -> Vec2 {
        Vec2 {
            x: self.x.min(other.x),
            y: self.y.min(other.y),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    #[test]
    fn rotate_quarter_turn() {
        let v = Vec2::new(1., 0.).rotate(PI / 2.);
        assert!(v.x.abs() < 1e-5);
        assert!((v.y - 1.).abs() < 1e-5);
    }

    #[test]
    fn norm_of_zero_is_zero() {
        assert_eq!(Vec2::default().norm(), Vec2::default());
    }

    #[test]
    fn norm_has_unit_length() {
        let v = Vec2::new(3., -4.).norm();
        assert!((v.len() - 1.).abs() < 1e-5);
    }
}
}
pub mod world {
use super::vec2::Vec2;

use std::{
    collections::{BTreeMap, HashMap, HashSet},
    fmt::Debug,
};

/// Anything the bot keeps a per-turn position for, observed or estimated.
pub trait Tracked {
    fn ident(&self) -> i32;
    fn position(&self) -> Vec2;
    fn is_terminal(&self) -> bool;
}

#[derive(Clone, Copy, PartialEq, Eq)]
pub enum BlipDirection {
    TL,
    TR,
    BL,
    BR,
}

impl BlipDirection {
    pub fn is_left(self) -> bool {
        matches!(self, BlipDirection::TL | BlipDirection::BL)
    }

    pub fn is_top(self) -> bool {
        matches!(self, BlipDirection::TL | BlipDirection::TR)
    }
}

impl Default for BlipDirection {
    fn default() -> Self {
        BlipDirection::BL
    }
}

impl Debug for BlipDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TL => write!(f, "TL"),
            Self::TR => write!(f, "TR"),
            Self::BL => write!(f, "BL"),
            Self::BR => write!(f, "BR"),
        }
    }
}

#[derive(Default, Debug)]
pub struct Creature {
    pub id: i32,
    pub color: i8,
    pub typ: i8,
    /// Reported position, present only while directly observed.
    pub pos: Option<Vec2>,
    pub speed: Option<Vec2>,
    /// Estimator output: belief-region centroid, always usable.
    pub est_pos: Vec2,
    /// Turn of the last direct sighting, if any.
    pub last_seen: Option<i32>,
    /// Gone from every radar, never coming back.
    pub terminal: bool,
}

impl Creature {
    pub fn new(id: i32, color: i8, typ: i8) -> Self {
        Creature {
            id,
            color,
            typ,
            est_pos: Vec2::new(5000., 5000.),
            ..Default::default()
        }
    }

    pub fn observed(&self) -> bool {
        self.pos.is_some()
    }

    /// Value tier used by the scorer: deeper types are worth more.
    pub fn tier(&self) -> i32 {
        (self.typ + 1) as i32
    }
}

impl Tracked for Creature {
    fn ident(&self) -> i32 {
        self.id
    }

    fn position(&self) -> Vec2 {
        self.pos.unwrap_or(self.est_pos)
    }

    fn is_terminal(&self) -> bool {
        self.terminal
    }
}

#[derive(Default, Debug, Clone)]
pub struct Drone {
    pub id: i32,
    pub pos: Vec2,
    pub bat: i32,
    pub emergency: i32,
    pub blips: HashMap<i32, BlipDirection>,
    pub scans: HashSet<i32>,
    /// Sticky across turns: set once the drone commits to surfacing.
    pub returning: bool,
}

impl Drone {
    fn new(id: i32) -> Self {
        Drone {
            id,
            ..Default::default()
        }
    }
}

impl Tracked for Drone {
    fn ident(&self) -> i32 {
        self.id
    }

    fn position(&self) -> Vec2 {
        self.pos
    }

    fn is_terminal(&self) -> bool {
        self.emergency == 1
    }
}

#[derive(Default, Debug)]
pub struct Player {
    pub score: i32,
    pub scans: HashSet<i32>,
    pub drones: BTreeMap<i32, Drone>,
}

/// One turn's worth of parsed observation tuples, produced by the I/O
/// layer and merged into the persistent [`World`].
#[derive(Default, Debug)]
pub struct TurnSnapshot {
    pub my_score: i32,
    pub foe_score: i32,
    pub my_scans: Vec<i32>,
    pub foe_scans: Vec<i32>,
    pub my_drones: Vec<DroneObs>,
    pub foe_drones: Vec<DroneObs>,
    pub drone_scans: Vec<(i32, i32)>,
    pub visible: Vec<CreatureObs>,
    pub blips: Vec<BlipObs>,
}

#[derive(Debug, Clone, Copy)]
pub struct DroneObs {
    pub id: i32,
    pub pos: Vec2,
    pub emergency: i32,
    pub bat: i32,
}

#[derive(Debug, Clone, Copy)]
pub struct CreatureObs {
    pub id: i32,
    pub pos: Vec2,
    pub speed: Vec2,
}

#[derive(Debug, Clone, Copy)]
pub struct BlipObs {
    pub drone_id: i32,
    pub creature_id: i32,
    pub dir: BlipDirection,
}

#[derive(Default, Debug)]
pub struct World {
    pub creatures: HashMap<i32, Creature>,
    pub me: Player,
    pub opponent: Player,
    pub iter: i32,
}

impl World {
    /// Builds the registry from the pre-game census of (id, color, type).
    pub fn new(census: impl IntoIterator<Item = (i32, i8, i8)>) -> Self {
        let creatures = census
            .into_iter()
            .map(|(id, color, typ)| (id, Creature::new(id, color, typ)))
            .collect();

        World {
            creatures,
            ..Default::default()
        }
    }

    /// Merges one turn of observations into the persistent state. Entities
    /// are updated in place; identities seen before are never replaced.
    pub fn apply_turn(&mut self, snap: TurnSnapshot) {
        self.iter += 1;

        self.me.score = snap.my_score;
        self.opponent.score = snap.foe_score;
        self.me.scans = snap.my_scans.into_iter().collect();
        self.opponent.scans = snap.foe_scans.into_iter().collect();

        merge_drones(&mut self.me.drones, &snap.my_drones);
        merge_drones(&mut self.opponent.drones, &snap.foe_drones);

        for &(drone_id, creature_id) in &snap.drone_scans {
            if let Some(drone) = self.me.drones.get_mut(&drone_id) {
                drone.scans.insert(creature_id);
            } else if let Some(drone) = self.opponent.drones.get_mut(&drone_id) {
                drone.scans.insert(creature_id);
            }
        }

        for creature in self.creatures.values_mut() {
            creature.pos = None;
            creature.speed = None;
        }

        let iter = self.iter;
        for obs in &snap.visible {
            if let Some(creature) = self.creatures.get_mut(&obs.id) {
                creature.pos = Some(obs.pos);
                creature.speed = Some(obs.speed);
                creature.est_pos = obs.pos;
                creature.last_seen = Some(iter);
            }
        }

        for blip in &snap.blips {
            if let Some(drone) = self.me.drones.get_mut(&blip.drone_id) {
                drone.blips.insert(blip.creature_id, blip.dir);
            }
        }

        self.flag_terminal();
    }

    /// A creature gone from every friendly radar and not visible has left
    /// the map for good; it must never be scored again.
    fn flag_terminal(&mut self) {
        if self.me.drones.is_empty() {
            return;
        }

        // an emergency drone's radar is down; a turn with every drone
        // disabled carries no absence information
        if self.me.drones.values().all(|d| d.emergency == 1) {
            return;
        }

        for creature in self.creatures.values_mut() {
            if creature.typ < 0 || creature.terminal || creature.observed() {
                continue;
            }

            let on_radar = self
                .me
                .drones
                .values()
                .any(|d| d.blips.contains_key(&creature.id));

            if !on_radar {
                creature.terminal = true;
            }
        }
    }

    /// Total scan value a drone is carrying that has not been banked yet.
    pub fn unsaved_value(&self, drone: &Drone) -> f32 {
        drone
            .scans
            .iter()
            .filter(|id| !self.me.scans.contains(id))
            .filter_map(|id| self.creatures.get(id))
            .map(|c| c.tier() as f32)
            .sum()
    }
}

fn merge_drones(drones: &mut BTreeMap<i32, Drone>, observed: &[DroneObs]) {
    for drone in drones.values_mut() {
        drone.blips.clear();
        drone.scans.clear();
    }

    for obs in observed {
        let drone = drones.entry(obs.id).or_insert_with(|| Drone::new(obs.id));
        drone.pos = obs.pos;
        drone.emergency = obs.emergency;
        drone.bat = obs.bat;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot_with_blips(blips: Vec<BlipObs>) -> TurnSnapshot {
        TurnSnapshot {
            my_drones: vec![DroneObs {
                id: 0,
                pos: Vec2::new(1000., 1000.),
                emergency: 0,
                bat: 30,
            }],
            blips,
            ..Default::default()
        }
    }

    fn blip(creature_id: i32) -> BlipObs {
        BlipObs {
            drone_id: 0,
            creature_id,
            dir: BlipDirection::BR,
        }
    }

    #[test]
    fn merge_updates_in_place() {
        let mut world = World::new([(7, 0, 1)]);

        world.apply_turn(snapshot_with_blips(vec![blip(7)]));
        world.me.drones.get_mut(&0).unwrap().returning = true;

        let mut snap = snapshot_with_blips(vec![blip(7)]);
        snap.my_drones[0].pos = Vec2::new(2000., 3000.);
        world.apply_turn(snap);

        assert_eq!(world.me.drones.len(), 1);
        let drone = &world.me.drones[&0];
        assert_eq!(drone.pos, Vec2::new(2000., 3000.));
        // bookkeeping on the same identity survives the merge
        assert!(drone.returning);
    }

    #[test]
    fn unobserved_creature_falls_back_to_estimate() {
        let mut world = World::new([(7, 0, 1)]);

        let mut snap = snapshot_with_blips(vec![blip(7)]);
        snap.visible.push(CreatureObs {
            id: 7,
            pos: Vec2::new(4000., 6000.),
            speed: Vec2::default(),
        });
        world.apply_turn(snap);
        assert_eq!(world.creatures[&7].position(), Vec2::new(4000., 6000.));

        world.apply_turn(snapshot_with_blips(vec![blip(7)]));
        let creature = &world.creatures[&7];
        assert!(!creature.observed());
        assert_eq!(creature.position(), Vec2::new(4000., 6000.));
        assert_eq!(creature.last_seen, Some(1));
    }

    #[test]
    fn creature_off_all_radars_is_terminal() {
        let mut world = World::new([(7, 0, 1), (8, 1, 1)]);

        world.apply_turn(snapshot_with_blips(vec![blip(7), blip(8)]));
        assert!(!world.creatures[&7].terminal);

        world.apply_turn(snapshot_with_blips(vec![blip(8)]));
        assert!(world.creatures[&7].terminal);
        assert!(!world.creatures[&8].terminal);

        // terminal is sticky even if a stray blip reappears
        world.apply_turn(snapshot_with_blips(vec![blip(7), blip(8)]));
        assert!(world.creatures[&7].terminal);
    }

    #[test]
    fn all_emergency_turn_does_not_flag_terminal() {
        let mut world = World::new([(7, 0, 1)]);
        world.apply_turn(snapshot_with_blips(vec![blip(7)]));
        assert!(!world.creatures[&7].terminal);

        // every friendly radar is down, so no blips arrive at all
        let mut snap = snapshot_with_blips(vec![]);
        snap.my_drones[0].emergency = 1;
        world.apply_turn(snap);
        assert!(!world.creatures[&7].terminal);

        // the drone recovers and the creature is back on radar
        world.apply_turn(snapshot_with_blips(vec![blip(7)]));
        assert!(!world.creatures[&7].terminal);
    }

    #[test]
    fn unsaved_value_ignores_already_banked_scans() {
        let mut world = World::new([(1, 0, 0), (2, 0, 2)]);

        let mut snap = snapshot_with_blips(vec![blip(1), blip(2)]);
        snap.my_scans = vec![1];
        snap.drone_scans = vec![(0, 1), (0, 2)];
        world.apply_turn(snap);

        let drone = &world.me.drones[&0];
        // creature 1 is already banked; only the tier-3 scan counts
        assert_eq!(world.unsaved_value(drone), 3.);
    }
}
}

pub use bounds_detector::*;
pub use config::*;
pub use policy::*;
pub use scoring::*;
pub use strategy::*;
pub use tracker::*;
pub use trajectory::*;
pub use vec2::*;
pub use world::*;

use std::io::{stderr, stdin};

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use config::Config;
use io::TurnReader;
use strategy::Strategy;
use world::World;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(stderr)
        .init();

    let stdin = stdin();
    let mut reader = TurnReader::new(stdin.lock());

    let census = reader.read_census().context("reading creature census")?;
    let mut world = World::new(census);
    let mut strategy = Strategy::new(Config::default());

    // game loop: runs until the judge closes stdin
    while let Some(snap) = reader.read_turn().context("reading turn input")? {
        world.apply_turn(snap);

        for (_, command) in strategy.play(&mut world) {
            println!("{command}");
        }
    }

    Ok(())
}
