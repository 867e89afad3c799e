//! Domain entities for the GameLink social gaming network.

pub mod connection;
pub mod game;
pub mod gamertag;
pub mod group;
pub mod invite;
pub mod message;
pub mod participant;
pub mod platform;
pub mod session;

pub use connection::{Connection, ConnectionStatus};
pub use game::{CreateGameRequest, GameRecord, OwnershipStatus, UpdateGameRequest};
pub use gamertag::{CreateGamertagRequest, Gamertag};
pub use group::{
    CreateGroupRequest, GamingGroup, GroupInvite, GroupInviteStatus, GroupMember, GroupPrivacy,
    GroupRole,
};
pub use invite::{CreateInviteRequest, InviteStatus, SessionInvite};
pub use message::{CreateMessageRequest, MessageKind, SessionMessage};
pub use participant::{ParticipantStatus, SessionParticipant};
pub use platform::Platform;
pub use session::{
    CreateSessionRequest, GamingSession, SessionPrivacy, SessionStatus, UpdateSessionRequest,
};
