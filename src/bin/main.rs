extern crate seabot;

use std::io::{stderr, stdin};

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use seabot::config::Config;
use seabot::io::TurnReader;
use seabot::strategy::Strategy;
use seabot::world::World;

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
