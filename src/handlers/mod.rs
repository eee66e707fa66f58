// src/handlers/mod.rs

pub mod attempt;
pub mod profile;
pub mod quiz;
