//! Shared types for the social domain.

pub mod errors;
pub mod events;

pub use errors::{SocialError, SocialResult};
pub use events::{LoggingSink, NotificationSink, NullSink, SocialEvent};
