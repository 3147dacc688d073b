//! CodeBot Academy - AI Tutoring Orchestration Engine
//!
//! This crate implements the AI request orchestration layer for an
//! educational platform: tutoring chat, problem generation, and code
//! grading routed through a hosted generative text model with a strict
//! structured-response contract, retry/fallback resilience, and a
//! deterministic offline grading path.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
