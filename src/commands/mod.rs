// ABOUTME: Command module aggregator for the warship CLI.
// ABOUTME: Re-exports deploy, probe, inspect, and status command handlers.

mod deploy;
mod inspect;
mod probe;
mod status;

pub use deploy::deploy;
pub use inspect::inspect;
pub use probe::probe;
pub use status::status;
