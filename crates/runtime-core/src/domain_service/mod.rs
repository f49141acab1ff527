//! Pure domain services: calculation, risk and execution logic with no
//! aggregate state of its own. Each service takes value objects in and
//! returns value objects (plus, where something notable happened, domain
//! events) out.

pub mod advanced_order_scheduler;
pub mod calculation;
pub mod contract_factory;
pub mod delta_hedging_engine;
pub mod expiry_calendar;
pub mod future_selection_service;
pub mod gamma_scalping_engine;
pub mod greeks_calculator;
pub mod indicator_service;
pub mod option_selector_service;
pub mod portfolio_risk_aggregator;
pub mod position_sizing_service;
pub mod signal_service;
pub mod smart_order_executor;
pub mod symbol_generator;
pub mod vol_surface_builder;

pub use advanced_order_scheduler::AdvancedOrderScheduler;
pub use contract_factory::ContractFactory;
pub use delta_hedging_engine::DeltaHedgingEngine;
pub use expiry_calendar::ExpiryCalendar;
pub use future_selection_service::FutureSelectionService;
pub use gamma_scalping_engine::GammaScalpingEngine;
pub use greeks_calculator::GreeksCalculator;
pub use indicator_service::IndicatorService;
pub use option_selector_service::{OptionSelectorConfig, OptionSelectorService};
pub use portfolio_risk_aggregator::PortfolioRiskAggregator;
pub use position_sizing_service::{PositionSizingConfig, PositionSizingService, SizingRejection};
pub use signal_service::{DivergenceSignalService, SignalService};
pub use smart_order_executor::{SmartOrderExecutor, TrackedOrder};
pub use symbol_generator::SymbolGenerator;
pub use vol_surface_builder::VolSurfaceBuilder;
