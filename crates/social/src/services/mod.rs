//! Business-logic services for the social domain.

pub mod connection_service;
pub mod group_service;
pub mod library_service;
pub mod message_service;
pub mod session_service;

pub use connection_service::ConnectionService;
pub use group_service::GroupService;
pub use library_service::{AddGameOutcome, LibraryService};
pub use message_service::MessageService;
pub use session_service::SessionService;
