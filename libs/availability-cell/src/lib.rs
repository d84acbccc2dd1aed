pub mod handlers;
pub mod models;
pub mod router;
pub mod services;

pub use models::{AvailabilitySlot, CreateSlotRequest, SlotError, UpdateSlotRequest};
pub use services::SlotService;
