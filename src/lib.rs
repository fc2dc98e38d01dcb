pub mod agent;
pub mod autopilot;
pub mod config;
pub mod constants;
pub mod engine;
pub mod error;
pub mod ghost;
pub mod input;
pub mod maze;
pub mod motion;
pub mod types;
