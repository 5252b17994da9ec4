// src/handlers/mod.rs

pub mod admin;
pub mod diagnostic;
pub mod exam;
pub mod health;
