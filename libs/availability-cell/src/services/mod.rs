pub mod slots;

pub use slots::SlotService;
