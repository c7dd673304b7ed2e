//! Domain services
//!
//! - [`event_ordering`] - re-ranking of the event collection

pub mod event_ordering;

pub use event_ordering::{
    EventOrderingService, INVALID_FORMAT_MESSAGE, OrderingError, ReorderPolicy,
};
