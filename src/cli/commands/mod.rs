pub mod ai;
pub mod chapter;
pub mod config;
pub mod project;
