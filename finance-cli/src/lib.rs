//! Command-line front end for the car-financing application client.

pub mod app;
pub mod commands;
pub mod config;
pub mod logging;
