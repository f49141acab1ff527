//! Core domain and execution runtime: aggregates, entities, domain events,
//! the indicator and options/futures calculation services, advanced order
//! scheduling, gateway trait abstractions, and persistence.

pub mod aggregates;
pub mod contracts;
pub mod domain_service;
pub mod engine;
pub mod entities;
pub mod error;
pub mod events;
pub mod gateway;
pub mod notifier;
pub mod persistence;
pub mod value_objects;

pub use error::{Result, RuntimeError};

#[cfg(test)]
mod tests {
    #[test]
    fn crate_links() {
        assert_eq!(2 + 2, 4);
    }
}
