//! Domain model for the content hierarchy, folders and preferences.
//!
//! # Responsibility
//! - Define canonical data structures used by navigation and recommendation.
//! - Define the sibling ordering shared by every hierarchy level.
//!
//! # Invariants
//! - The hierarchy is a strict tree: Intent -> Theme -> Subject -> Set -> Capsule.
//! - Every entity is identified by a creation-ordered `ContentId`.
//! - Save-state is derived from folders, never stored on a capsule.

pub mod capsule;
pub mod folder;
pub mod hierarchy;
pub mod ids;
pub mod ordinal;
pub mod preference;
