// src/config/mod.rs
//! Configuration system for sealed-file-vault
//!
//! Central, lazy-loaded global config with TOML + env overrides.

pub use app::{load, Config, Features, Keys, Paths, Share};

mod app;
mod defaults;
