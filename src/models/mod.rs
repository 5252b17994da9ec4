// src/models/mod.rs

pub mod diagnostic;
pub mod exam;
pub mod placement;
pub mod question;
