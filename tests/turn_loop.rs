//! Drives the full pipeline the way the binary does: scripted judge
//! transcript in, one command per drone out.

use std::fmt::Write;

use seabot::config::Config;
use seabot::io::{ParseError, TurnReader};
use seabot::policy::Command;
use seabot::strategy::Strategy;
use seabot::world::World;

fn census_block() -> String {
    let mut s = String::from("14\n");
    for typ in 0..3 {
        for color in 0..4 {
            writeln!(s, "{} {} {}", typ * 4 + color, color, typ).unwrap();
        }
    }
    s.push_str("12 -1 -1\n13 -1 -1\n");
    s
}

fn turn_block() -> String {
    let mut s = String::new();
    s.push_str("0\n0\n"); // scores
    s.push_str("0\n0\n"); // banked scans
    s.push_str("2\n14 2000 500 0 30\n15 8000 500 0 30\n");
    s.push_str("2\n16 3000 500 0 30\n17 7000 500 0 30\n");
    s.push_str("0\n"); // drone scans
    s.push_str("1\n12 5000 6000 200 0\n"); // one visible monster
    let mut blips = String::new();
    let mut count = 0;
    for creature in 0..12 {
        for drone in [14, 15] {
            writeln!(blips, "{} {} BR", drone, creature).unwrap();
            count += 1;
        }
    }
    writeln!(s, "{count}").unwrap();
    s.push_str(&blips);
    s
}

#[test]
fn full_turn_produces_one_command_per_drone() {
    let transcript = format!("{}{}{}", census_block(), turn_block(), turn_block());
    let mut reader = TurnReader::new(transcript.as_bytes());

    let mut world = World::new(reader.read_census().unwrap());
    let mut strategy = Strategy::new(Config::default());

    let mut turns = 0;
    while let Some(snap) = reader.read_turn().unwrap() {
        world.apply_turn(snap);
        let commands = strategy.play(&mut world);

        assert_eq!(commands.len(), 2);
        for (_, command) in commands {
            match command {
                Command::Move { x, y, .. } => {
                    assert!((0..10000).contains(&x));
                    assert!((0..10000).contains(&y));
                }
                Command::Wait { .. } => {}
            }
        }
        turns += 1;
    }

    assert_eq!(turns, 2);
}

#[test]
fn truncated_turn_fails_before_any_command() {
    let transcript = format!("{}0\n0\n0\n", census_block());
    let mut reader = TurnReader::new(transcript.as_bytes());

    let mut world = World::new(reader.read_census().unwrap());
    let mut strategy = Strategy::new(Config::default());

    match reader.read_turn() {
        Err(ParseError::Eof) => {
            // the turn never reached the strategy; nothing was printed
        }
        other => panic!("expected eof, got {other:?}"),
    }

    // the world was never updated, so there is nothing to decide on
    assert_eq!(world.iter, 0);
    let _ = &mut strategy;
}
