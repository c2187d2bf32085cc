//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate store calls into the navigation, sampling, save-state,
//!   preference and trending use-cases.
//! - Translate store faults into the [`error::ContentError`] taxonomy.

pub mod error;
pub mod navigation_service;
pub mod preference_service;
pub mod recommendation_service;
pub mod save_state_service;
pub mod trending_service;
