pub mod arrivals;
pub mod cli;
pub mod config;
pub mod control;
pub mod engine;
pub mod error;
pub mod events;
pub mod generators;
pub mod models;
pub mod observer;
pub mod output;
pub mod routing;
pub mod state;
pub mod stats;
