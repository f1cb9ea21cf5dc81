pub mod allow_list;
pub mod directory;
pub mod error;
pub mod event;
pub mod ids;
pub mod paginate;
pub mod roster;

pub use allow_list::CategoryAllowList;
pub use directory::{Category, ChannelRef, DirectorySnapshot};
pub use error::{Result, SyncError};
pub use event::{InboundEvent, InboundKind, RefreshOutcome, RefreshReport};
pub use ids::{ConversationId, CycleId, MessageId};
pub use paginate::{paginate, Chunk};
pub use roster::{format_roster, RosterDocument, RosterLine};
