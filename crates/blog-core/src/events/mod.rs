//! Domain events emitted after successful writes

mod domain_event;

pub use domain_event::DomainEvent;
