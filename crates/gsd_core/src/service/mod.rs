//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into use-case level APIs.
//! - Keep transport layers decoupled from storage details.
//!
//! # Invariants
//! - Services never bypass repository validation/persistence contracts.
//! - Hub wiring lives here; repositories know nothing about broadcasting.

pub mod inbox_service;
pub mod next_action_service;
pub mod project_service;
