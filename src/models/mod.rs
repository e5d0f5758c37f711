pub mod message;
pub mod profile;
pub mod utility;

pub use message::{Message, MessagePriority};
pub use profile::UserProfile;
pub use utility::{ConsumptionData, MeterReport, UtilitySnapshot, WasteSchedule, WasteStatus};
