pub mod dashboard;
pub mod domain;
pub mod ports;
pub mod synthesis;

pub use domain::{
    AuthGrant, CurrentUser, JoinedRoomRecord, Material, Message, Mode, NewRoom, Participant,
    ParticipantDraft, Role, RoomDraft, RoomSummary, Session, Status, StudyRoom, Visibility,
};
pub use ports::{KeyValueStore, PortError, PortResult, StorageKey, StudyApi};
pub use synthesis::{synthesize, LocalOverrides, RoomOrigin, SynthesisContext, SynthesizedRoom};
