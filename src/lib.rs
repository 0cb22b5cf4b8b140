pub mod cli;
pub mod config;
pub mod logging;
pub mod policy;
pub mod rate;
pub mod sync;
pub mod ui;
