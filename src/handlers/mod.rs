// src/handlers/mod.rs

pub mod admin;
pub mod auth;
pub mod lessons;
pub mod quiz;
pub mod wallet;
