//! # GameLink Social Crate
//!
//! Core business logic for the GameLink social gaming network: game-library
//! compatibility scoring, gaming-session coordination, groups, session chat,
//! and the friend graph.
//!
//! ## Architecture
//!
//! - **compatibility**: pure scoring over two owned-game collections
//! - **coordination**: pure join/leave/kick/transition rules for sessions
//! - **services**: business logic orchestrating the repositories
//! - **catalog**: external game-catalog search client
//! - **types**: errors and typed notification events
//! - **utils**: permission checks and request validation
//!
//! Acting users are always explicit parameters; authentication and HTTP
//! concerns live with the surrounding application.

pub mod catalog;
pub mod compatibility;
pub mod coordination;
pub mod services;
pub mod types;
pub mod utils;

// Re-export main types for convenience
pub use catalog::{CatalogClient, CatalogEntry, CatalogSearch};
pub use compatibility::{score_compatibility, CompatibilityReport, MatchRating};
pub use coordination::{evaluate_join, evaluate_leave, JoinContext};
pub use services::{
    AddGameOutcome, ConnectionService, GroupService, LibraryService, MessageService, SessionService,
};
pub use types::{NotificationSink, SocialError, SocialEvent, SocialResult};
