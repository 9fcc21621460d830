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
