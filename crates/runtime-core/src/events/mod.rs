mod domain_event;
mod event_bus;

pub use domain_event::{DomainEvent, GreekName, RiskLevel, RiskLimitType};
pub use event_bus::{EventBus, SubscriptionHandle};
