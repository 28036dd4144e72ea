pub mod channel;
pub mod error;
pub mod message;
pub mod traits;
pub mod types;

pub use channel::{AgentBus, AgentHandle, DEFAULT_BUFFER_SIZE};
pub use error::AgentError;
pub use message::{Message, ReplySender};
pub use traits::{Component, PhoneAlert, ProfileService};
pub use types::{
    ringer_characteristic, AlertStatus, CallState, Command, CommandReply, ProfileChange,
    RINGER_SILENT,
};
