#[macro_use]
extern crate tracing;
#[macro_use]
extern crate lazy_static;

pub mod commands;
pub mod configuration;
pub mod telemetry;
pub mod terminal;
