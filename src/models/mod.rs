// src/models/mod.rs

pub mod cheat_flag;
pub mod lesson;
pub mod question;
pub mod quiz;
pub mod user;
pub mod wallet;
