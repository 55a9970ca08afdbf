pub mod config;
pub mod pose;
pub mod render;
pub mod tracker;
