//! Service layer - business logic orchestration
//!
//! Services coordinate domain logic and port interactions. Each service
//! focuses on a specific use case or feature area.

pub mod logging;
mod payment;
pub mod screen;

pub use logging::{EntryPoint, LogEntry, LogEvent, LoggingService};
pub use payment::PaymentService;
pub use screen::{Action, Outcome, Screen};
