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
