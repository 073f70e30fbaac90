#![cfg_attr(
    not(test),
    warn(clippy::print_stdout, clippy::dbg_macro),
    deny(clippy::unwrap_used, clippy::expect_used)
)]

pub mod client;
pub mod config;
pub mod engine;
pub mod error;
pub mod metrics;
pub mod utils;
