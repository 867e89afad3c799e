//! Repository implementations for GameLink entities.

pub mod connection_repository;
pub mod game_repository;
pub mod gamertag_repository;
pub mod group_repository;
pub mod invite_repository;
pub mod message_repository;
pub mod participant_repository;
pub mod session_repository;

pub use connection_repository::ConnectionRepository;
pub use game_repository::GameRepository;
pub use gamertag_repository::GamertagRepository;
pub use group_repository::GroupRepository;
pub use invite_repository::InviteRepository;
pub use message_repository::MessageRepository;
pub use participant_repository::ParticipantRepository;
pub use session_repository::SessionRepository;
