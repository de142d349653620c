// Library root for the dualvalue CLI: roster loading, config discovery and
// report rendering, exposed so integration tests can drive them directly.

pub mod cli;
pub mod report;
pub mod roster;
pub mod settings;
