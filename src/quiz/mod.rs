// src/quiz/mod.rs
//
// The quiz-attempt anti-cheat core: request-time policy evaluation over the
// relational store. Handlers stay thin; everything that decides whether an
// attempt may start, how it is graded and what gets flagged lives here.

pub mod attempt;
pub mod cooldown;
pub mod patterns;
pub mod rate_limit;
pub mod sampler;
