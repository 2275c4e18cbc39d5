// shared/src/lib.rs

pub mod config;
