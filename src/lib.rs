pub mod bounds_detector;
pub mod config;
pub mod io;
pub mod policy;
pub mod scoring;
pub mod strategy;
pub mod tracker;
pub mod trajectory;
pub mod vec2;
pub mod world;

pub use bounds_detector::*;
pub use config::*;
pub use policy::*;
pub use scoring::*;
pub use strategy::*;
pub use tracker::*;
pub use trajectory::*;
pub use vec2::*;
pub use world::*;
