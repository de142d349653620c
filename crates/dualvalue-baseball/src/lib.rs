// Library root: dual-value evaluation engine for dynasty baseball.
//
// Rows in, records out. No I/O beyond reading an optional config file.

pub mod config;
pub mod player;
pub mod valuation;
