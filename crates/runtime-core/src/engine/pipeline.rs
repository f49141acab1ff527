//! TradingPipeline: the single-threaded event-pipeline orchestrator.
//!
//! Owns the two aggregates ([`InstrumentManager`], [`PositionAggregate`]),
//! the domain services that turn a bar into a signal and a signal into an
//! order, and the gateway the strategy trades through. Every public method
//! here is meant to be driven by one cooperative worker — there is no
//! internal locking because nothing here ever runs concurrently with itself.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Timelike, Utc};

use crate::aggregates::{InstrumentManager, OrderUpdate, PositionAggregate, PositionUpdate, TradeUpdate};
use crate::contracts::{OrderData, PositionData, TradeData};
use crate::domain_service::{
    ContractFactory, DivergenceSignalService, FutureSelectionService, IndicatorService, OptionSelectorConfig,
    OptionSelectorService, PositionSizingConfig, PositionSizingService, SignalService, SmartOrderExecutor,
};
use crate::entities::{IndicatorSlot, Position};
use crate::events::EventBus;
use crate::gateway::{AccountGateway, MarketDataGateway, QuoteGateway, TradeExecutionGateway};
use crate::notifier::Notifier;
use crate::value_objects::contract_meta::ParsedSymbol;
use crate::value_objects::{Bar, Direction, MarketTick, Offset, OptionType, OrderExecutionConfig, OrderInstruction};

use super::bar_pipeline::BarPipeline;
use super::clock::Clock;

/// Tunables that are not already captured by a domain service's own config
/// type: the rollover check time, the universe-validation cadence, and the
/// monitoring/persistence snapshot interval.
#[derive(Debug, Clone, Copy)]
pub struct PipelineConfig {
    pub rollover_check_hour: u32,
    pub rollover_check_minute: u32,
    pub universe_validation_every_n_bars: u32,
    pub snapshot_interval_secs: i64,
    pub min_bid_volume: i64,
    pub min_bid_price: f64,
    pub max_spread_ticks: f64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            rollover_check_hour: 14,
            rollover_check_minute: 50,
            universe_validation_every_n_bars: 60,
            snapshot_interval_secs: 60,
            min_bid_volume: 1,
            min_bid_price: 0.0,
            max_spread_ticks: 10.0,
        }
    }
}

/// Read-only counters the driver can surface to an operator or a monitor
/// repository without reaching into the aggregates directly.
#[derive(Debug, Clone, Copy, Default)]
pub struct MonitoringSnapshot {
    pub timestamp: Option<DateTime<Utc>>,
    pub tracked_symbols: usize,
    pub active_positions: usize,
    pub pending_orders: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    WarmingUp,
    Live,
}

/// The event-pipeline orchestrator, generic over any gateway implementing
/// the four demand interfaces from [`crate::gateway`].
pub struct TradingPipeline<G> {
    gateway: G,
    clock: Box<dyn Clock>,
    event_bus: EventBus,
    notifier: Option<Notifier>,
    bar_pipeline: Option<BarPipeline>,

    instrument_manager: InstrumentManager,
    position_aggregate: PositionAggregate,

    indicator_service: IndicatorService,
    signal_service: Box<dyn SignalService>,
    option_selector: OptionSelectorService,
    position_sizer: PositionSizingService,
    future_selector: FutureSelectionService,
    contract_factory: ContractFactory,
    smart_order_executor: SmartOrderExecutor,

    config: PipelineConfig,

    phase: Phase,
    last_bars: HashMap<String, Bar>,
    active_products: Vec<String>,
    rollover_done_for_minute: Option<(u32, u32)>,
    bars_since_validation: u32,
    last_snapshot_at: Option<DateTime<Utc>>,
    next_order_seq: u64,
}

impl<G> TradingPipeline<G>
where
    G: MarketDataGateway + AccountGateway + TradeExecutionGateway + QuoteGateway,
{
    pub fn new(
        gateway: G,
        clock: Box<dyn Clock>,
        option_selector_config: OptionSelectorConfig,
        sizing_config: PositionSizingConfig,
        execution_config: OrderExecutionConfig,
        config: PipelineConfig,
    ) -> Self {
        Self {
            gateway,
            clock,
            event_bus: EventBus::new(),
            notifier: None,
            bar_pipeline: None,
            instrument_manager: InstrumentManager::new(),
            position_aggregate: PositionAggregate::new(),
            indicator_service: IndicatorService::default(),
            signal_service: Box::new(DivergenceSignalService::new()),
            option_selector: OptionSelectorService::new(option_selector_config),
            position_sizer: PositionSizingService::new(sizing_config),
            future_selector: FutureSelectionService::new(),
            contract_factory: ContractFactory::new(),
            smart_order_executor: SmartOrderExecutor::new(execution_config),
            config,
            phase: Phase::WarmingUp,
            last_bars: HashMap::new(),
            active_products: Vec::new(),
            rollover_done_for_minute: None,
            bars_since_validation: 0,
            last_snapshot_at: None,
            next_order_seq: 0,
        }
    }

    pub fn with_notifier(mut self, notifier: Notifier) -> Self {
        self.notifier = Some(notifier);
        self
    }

    pub fn with_signal_service(mut self, signal_service: Box<dyn SignalService>) -> Self {
        self.signal_service = signal_service;
        self
    }

    /// Installs a windowing aggregator (§4.A.2). Once set, `on_bars` feeds
    /// raw bars through it and only calls `process_bars` when a window
    /// closes, instead of forwarding every raw bar straight through.
    pub fn with_bar_pipeline(mut self, bar_pipeline: BarPipeline) -> Self {
        self.bar_pipeline = Some(bar_pipeline);
        self
    }

    /// Registers a product code (e.g. `"rb"`) the per-60-bar universe
    /// validation pass should keep an active contract subscribed for.
    pub fn track_product(&mut self, product_code: impl Into<String>) {
        self.active_products.push(product_code.into());
    }

    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }

    pub fn instrument_manager(&self) -> &InstrumentManager {
        &self.instrument_manager
    }

    pub fn position_aggregate(&self) -> &PositionAggregate {
        &self.position_aggregate
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    pub fn gateway_mut(&mut self) -> &mut G {
        &mut self.gateway
    }

    /// Builds the persistable snapshot of both aggregates (§4.F). The
    /// driver owns when to call this and where to write the result.
    pub fn state_snapshot(&self, saved_at: DateTime<Utc>) -> crate::persistence::StateSnapshot {
        crate::persistence::StateSnapshot::new(self.instrument_manager.clone(), self.position_aggregate.clone(), saved_at)
    }

    /// Restores both aggregates from a previously saved snapshot, e.g. on
    /// process restart before warm-up replay resumes filling in any bars
    /// that arrived since the snapshot was taken.
    pub fn restore_state_snapshot(&mut self, snapshot: crate::persistence::StateSnapshot) {
        self.instrument_manager = snapshot.target_aggregate;
        self.position_aggregate = snapshot.position_aggregate;
    }

    // ---- lifecycle -----------------------------------------------------

    pub fn on_init(&mut self) {
        self.phase = Phase::WarmingUp;
    }

    pub fn on_start(&mut self) {
        self.phase = Phase::Live;
    }

    /// Forces warm-up semantics (no order emission, see `is_warming_up`)
    /// for the duration of `f`, then restores whatever phase was active
    /// beforehand — regardless of what `f` does internally. Used to replay
    /// historical bars into an already-live pipeline (e.g. a mid-session
    /// resync) without it trying to open or close positions on replayed data.
    pub fn run_warm_up<F: FnOnce(&mut Self)>(&mut self, f: F) {
        let previous = self.phase;
        self.phase = Phase::WarmingUp;
        f(self);
        self.phase = previous;
    }

    pub fn on_stop(&mut self) {
        self.smart_order_executor.clear();
    }

    pub fn is_warming_up(&self) -> bool {
        self.phase == Phase::WarmingUp
    }

    // ---- tick / bar ingestion -------------------------------------------

    /// No bar-windowing aggregator is owned by the pipeline itself; a
    /// caller wiring one in feeds raw ticks to it directly and only calls
    /// `on_bars`/`process_bars` with the synthesized output. Without one,
    /// ticks are simply not part of this pipeline's contract.
    pub fn on_tick(&mut self) {}

    /// The primary ingestion point. Caches the bars, runs the rollover and
    /// universe-validation checks (only once warmed up and once at least
    /// one product has an active contract), then processes the batch.
    pub fn on_bars(&mut self, bars: HashMap<String, Bar>) {
        for (vt_symbol, bar) in &bars {
            self.last_bars.insert(vt_symbol.clone(), *bar);
        }

        if !self.is_warming_up() && !self.instrument_manager.all_active_contracts().is_empty() {
            let now = self.clock.now();
            let minute_key = (now.hour(), now.minute());

            if now.hour() == self.config.rollover_check_hour && now.minute() == self.config.rollover_check_minute {
                if self.rollover_done_for_minute != Some(minute_key) {
                    self.rollover_check(now);
                    self.rollover_done_for_minute = Some(minute_key);
                }
            } else {
                self.rollover_done_for_minute = None;
            }

            self.bars_since_validation += 1;
            if self.bars_since_validation >= self.config.universe_validation_every_n_bars {
                self.bars_since_validation = 0;
                self.universe_validation(now);
            }
        }

        match &mut self.bar_pipeline {
            Some(bar_pipeline) => {
                if let Some(synthesized) = bar_pipeline.handle_bars(&bars) {
                    self.process_bars(synthesized);
                }
            }
            None => self.process_bars(bars),
        }
    }

    /// Per-symbol ordering: update instrument state, recompute indicators,
    /// then drive signal routing only for instruments with enough history.
    pub fn process_bars(&mut self, bars: HashMap<String, Bar>) {
        let now = self.clock.now();

        for (vt_symbol, bar) in bars {
            let prev_dullness = match self.instrument_manager.instrument(&vt_symbol).and_then(|i| i.get_indicator("dullness")) {
                Some(IndicatorSlot::Dullness(d)) => Some(*d),
                _ => None,
            };
            let prev_divergence = match self.instrument_manager.instrument(&vt_symbol).and_then(|i| i.get_indicator("divergence")) {
                Some(IndicatorSlot::Divergence(d)) => Some(*d),
                _ => None,
            };

            self.instrument_manager.update_bar(&vt_symbol, bar);

            let result = {
                let instrument = self.instrument_manager.instrument(&vt_symbol).expect("just updated");
                self.indicator_service.calculate_all(instrument, prev_dullness, prev_divergence)
            };

            let instrument = self.instrument_manager.instrument_mut(&vt_symbol).expect("just updated");
            if let Some(macd) = result.macd_value {
                instrument.set_indicator("macd", IndicatorSlot::Macd(macd));
            }
            instrument.set_indicator("ema", IndicatorSlot::Ema(result.ema_state));
            if let Some(td) = result.td_value {
                instrument.set_indicator("td", IndicatorSlot::Td(td));
            }
            if let Some(dullness) = result.dullness_state {
                instrument.set_indicator("dullness", IndicatorSlot::Dullness(dullness));
            }
            if let Some(divergence) = result.divergence_state {
                instrument.set_indicator("divergence", IndicatorSlot::Divergence(divergence));
            }

            if !self.instrument_manager.has_enough_data(&vt_symbol) || self.is_warming_up() {
                continue;
            }

            let instrument = self.instrument_manager.instrument(&vt_symbol).expect("just updated").clone();

            if let Some(signal) = self.signal_service.check_open_signal(&instrument) {
                self.execute_open(&vt_symbol, &signal, now);
            }

            let closing_vt_symbols: Vec<String> = self
                .position_aggregate
                .positions_by_underlying(&vt_symbol)
                .into_iter()
                .map(|p| p.vt_symbol.clone())
                .collect();

            for position_symbol in closing_vt_symbols {
                let Some(position) = self.position_aggregate.position(&position_symbol).cloned() else {
                    continue;
                };
                if let Some(signal) = self.signal_service.check_close_signal(&instrument, &position) {
                    self.execute_close(&position, &signal, now);
                }
            }

            for event in self.position_aggregate.pop_domain_events() {
                self.event_bus.publish(&event);
                if let Some(notifier) = &mut self.notifier {
                    notifier.notify(&event);
                }
            }
        }
    }

    // ---- gateway callbacks -----------------------------------------------

    pub fn on_order(&mut self, order: OrderData) {
        let status = parse_order_status(&order.status);
        self.smart_order_executor.update_status(&order.vt_orderid, status);
        self.position_aggregate.update_from_order(
            OrderUpdate { vt_orderid: order.vt_orderid, status, traded: order.traded },
            order.datetime,
        );
    }

    pub fn on_trade(&mut self, trade: TradeData) {
        self.position_aggregate.update_from_trade(TradeUpdate {
            vt_symbol: trade.vt_symbol,
            volume: trade.volume,
            offset: trade.offset,
            price: trade.price,
            datetime: trade.datetime,
        });
    }

    pub fn on_position(&mut self, position: PositionData, now: DateTime<Utc>) {
        self.position_aggregate.update_from_position(
            PositionUpdate { vt_symbol: position.vt_symbol, actual_volume: position.volume.round() as i64 },
            now,
        );
    }

    // ---- monitoring / persistence hooks -----------------------------------

    pub fn monitoring_snapshot(&self) -> MonitoringSnapshot {
        MonitoringSnapshot {
            timestamp: Some(self.clock.now()),
            tracked_symbols: self.instrument_manager.all_symbols().len(),
            active_positions: self.position_aggregate.active_positions().len(),
            pending_orders: self.position_aggregate.all_pending_orders().len(),
        }
    }

    pub fn snapshot_due(&self, now: DateTime<Utc>) -> bool {
        match self.last_snapshot_at {
            None => true,
            Some(last) => (now - last).num_seconds() >= self.config.snapshot_interval_secs,
        }
    }

    pub fn mark_snapshot_taken(&mut self, now: DateTime<Utc>) {
        self.last_snapshot_at = Some(now);
    }

    // ---- order timeout / retry sweep (driver calls once per cycle) -------

    pub fn sweep_timeouts(&mut self) {
        let now = self.clock.now();
        let (cancel_ids, events) = self.smart_order_executor.check_timeouts(now);
        for vt_orderid in cancel_ids {
            let _ = self.gateway.cancel_order(&vt_orderid);
        }
        for event in events {
            self.event_bus.publish(&event);
            if let Some(notifier) = &mut self.notifier {
                notifier.notify(&event);
            }
        }
    }

    // ---- internal: rollover / universe validation -------------------------

    fn futures_by_product(&self) -> HashMap<String, Vec<String>> {
        let mut by_product: HashMap<String, Vec<String>> = HashMap::new();
        for contract in self.gateway.get_all_contracts() {
            if let ParsedSymbol::Future(future) = self.contract_factory.create(&contract.vt_symbol) {
                by_product.entry(future.product_code).or_default().push(contract.vt_symbol);
            }
        }
        by_product
    }

    fn rollover_check(&mut self, now: DateTime<Utc>) {
        let today = now.date_naive();
        for (product, symbols) in self.futures_by_product() {
            let Some(selected) = self.future_selector.select_dominant_contract(&symbols, today) else {
                continue;
            };
            if !selected.rolled_over {
                continue;
            }
            let current = self.instrument_manager.active_contract(&product).map(|s| s.to_string());
            if current.as_deref() == Some(selected.vt_symbol.as_str()) {
                continue;
            }
            let from_vt_symbol = current.unwrap_or_default();
            self.instrument_manager.set_active_contract(&product, &selected.vt_symbol);
            let _ = self.gateway.subscribe(&selected.vt_symbol);
            self.event_bus.publish(&crate::events::DomainEvent::RolloverExecuted {
                product_code: product,
                from_vt_symbol,
                to_vt_symbol: selected.vt_symbol,
                timestamp: now,
            });
        }
    }

    /// Ensures every tracked product still has an active contract
    /// subscribed, selecting and subscribing a new one when missing.
    fn universe_validation(&mut self, now: DateTime<Utc>) {
        let today = now.date_naive();
        let by_product = self.futures_by_product();
        for product in &self.active_products {
            if self.instrument_manager.active_contract(product).is_some() {
                continue;
            }
            let Some(symbols) = by_product.get(product) else {
                continue;
            };
            if let Some(selected) = self.future_selector.select_dominant_contract(symbols, today) {
                self.instrument_manager.set_active_contract(product, &selected.vt_symbol);
                let _ = self.gateway.subscribe(&selected.vt_symbol);
            }
        }
    }

    // ---- internal: open/close execution -----------------------------------

    fn next_client_orderid(&mut self) -> String {
        self.next_order_seq += 1;
        format!("pl-{}", self.next_order_seq)
    }

    /// §4.C open path: select an OTM leg per option side, gate on liquidity
    /// and sizing, place the order and create the position.
    fn execute_open(&mut self, underlying_vt_symbol: &str, signal: &str, now: DateTime<Utc>) {
        self.position_aggregate.on_new_trading_day(now.date_naive());

        let underlying_price = self.instrument_manager.latest_price(underlying_vt_symbol);
        let chain = self.gateway.option_chain(underlying_vt_symbol);
        if chain.is_empty() {
            return;
        }

        let active_positions_count = self.position_aggregate.active_positions().len();

        for option_type in [OptionType::Call, OptionType::Put] {
            let Some(contract) = self.option_selector.select(&chain, option_type, underlying_price) else {
                continue;
            };

            let Some(tick_view) = self.gateway.get_tick(&contract.vt_symbol) else {
                continue;
            };
            let pricetick = self.gateway.get_contract(&contract.vt_symbol).map(|c| c.pricetick).unwrap_or(1.0);
            let tick = MarketTick {
                bid_price: tick_view.bid_price,
                bid_volume_1: tick_view.bid_volume,
                ask_price: tick_view.ask_price,
                volume: tick_view.volume,
            };
            if !self.option_selector.check_liquidity(
                &tick,
                &contract,
                self.config.min_bid_volume,
                self.config.min_bid_volume,
                self.config.max_spread_ticks,
                pricetick,
            ) {
                continue;
            }

            let same_symbol_active = self.position_aggregate.position(&contract.vt_symbol).map(|p| p.is_active()).unwrap_or(false);
            let today_open_count_global =
                self.position_aggregate.global_daily_open_volume() + self.position_aggregate.reserved_open_volume(None);
            let today_open_count_contract = self.position_aggregate.daily_open_volume(&contract.vt_symbol)
                + self.position_aggregate.reserved_open_volume(Some(&contract.vt_symbol));

            let volume = match self.position_sizer.size_open(
                active_positions_count,
                same_symbol_active,
                today_open_count_global,
                today_open_count_contract,
                contract.bid_price,
            ) {
                Ok(volume) => volume,
                Err(_rejection) => continue,
            };

            let direction = Direction::Short;
            let price = self.smart_order_executor.adaptive_price(direction, tick.bid_price, tick.ask_price, contract.bid_price);

            let instruction =
                OrderInstruction::new(contract.vt_symbol.clone(), direction, Offset::Open, volume).with_price(price).with_signal(signal);

            let Ok(ids) = self.gateway.send_order(&instruction) else {
                continue;
            };

            for vt_orderid in &ids {
                let order = crate::entities::Order::new(vt_orderid.clone(), contract.vt_symbol.clone(), direction, Offset::Open, volume, now);
                self.position_aggregate.add_pending_order(order);
                self.smart_order_executor.register(crate::domain_service::TrackedOrder::new(
                    vt_orderid.clone(),
                    contract.vt_symbol.clone(),
                    direction,
                    now,
                ));
            }
            let _ = self.next_client_orderid();

            if !ids.is_empty() {
                self.position_aggregate.create_position(contract.vt_symbol.clone(), underlying_vt_symbol, signal, volume, now);
            }
        }

        if let Some(notifier) = &mut self.notifier {
            notifier.notify_raw("open_signal", format!("open signal {signal} on {underlying_vt_symbol}"));
        }
    }

    /// §4.C close path: idempotent per position, buys back a short or
    /// sells out a long at a limit-at-market price.
    fn execute_close(&mut self, position: &Position, signal: &str, now: DateTime<Utc>) {
        if self.position_aggregate.has_pending_close(position) {
            return;
        }

        let direction = match position.side {
            Direction::Short => Direction::Long,
            Direction::Long => Direction::Short,
        };

        let price = self
            .gateway
            .get_tick(&position.vt_symbol)
            .map(|t| match direction {
                Direction::Long => t.ask_price,
                Direction::Short => t.bid_price,
            })
            .unwrap_or(0.0);

        let instruction =
            OrderInstruction::new(position.vt_symbol.clone(), direction, Offset::Close, position.volume).with_price(price).with_signal(signal);

        if let Ok(ids) = self.gateway.send_order(&instruction) {
            for vt_orderid in ids {
                let order =
                    crate::entities::Order::new(vt_orderid.clone(), position.vt_symbol.clone(), direction, Offset::Close, position.volume, now);
                self.position_aggregate.add_pending_order(order);
                self.smart_order_executor.register(crate::domain_service::TrackedOrder::new(
                    vt_orderid,
                    position.vt_symbol.clone(),
                    direction,
                    now,
                ));
            }
        }

        if let Some(notifier) = &mut self.notifier {
            notifier.notify_raw("close_signal", format!("close signal {signal} on {}", position.vt_symbol));
        }
    }
}

fn parse_order_status(status: &str) -> crate::entities::OrderStatus {
    use crate::entities::OrderStatus;
    match status {
        "NOTTRADED" => OrderStatus::NotTraded,
        "PARTTRADED" => OrderStatus::PartTraded,
        "ALLTRADED" => OrderStatus::AllTraded,
        "CANCELLED" => OrderStatus::Cancelled,
        "REJECTED" => OrderStatus::Rejected,
        _ => OrderStatus::Submitting,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::backtest::BacktestGateway;
    use crate::value_objects::OptionContract;
    use chrono::TimeZone;

    fn build_pipeline() -> TradingPipeline<BacktestGateway> {
        let mut gateway = BacktestGateway::new(1_000_000.0);
        gateway.register_contract("IO2501.CFFEX", 100.0, 0.2);
        gateway.register_contract("IO2501-C-4100.CFFEX", 1.0, 0.2);
        gateway.register_contract("IO2501-P-3900.CFFEX", 1.0, 0.2);
        gateway.on_bar_close("IO2501.CFFEX", 4000.0);
        gateway.on_bar_close("IO2501-C-4100.CFFEX", 20.0);
        gateway.on_bar_close("IO2501-P-3900.CFFEX", 18.0);
        gateway.set_option_chain(
            "IO2501.CFFEX",
            vec![
                OptionContract {
                    vt_symbol: "IO2501-C-4100.CFFEX".into(),
                    underlying_symbol: "IO2501.CFFEX".into(),
                    option_type: OptionType::Call,
                    strike_price: 4100.0,
                    expiry_date: "2025-01-17".into(),
                    diff1: 0.0,
                    bid_price: 20.0,
                    bid_volume: 50,
                    ask_price: 21.0,
                    ask_volume: 50,
                    days_to_expiry: 20,
                },
                OptionContract {
                    vt_symbol: "IO2501-P-3900.CFFEX".into(),
                    underlying_symbol: "IO2501.CFFEX".into(),
                    option_type: OptionType::Put,
                    strike_price: 3900.0,
                    expiry_date: "2025-01-17".into(),
                    diff1: 0.0,
                    bid_price: 18.0,
                    bid_volume: 50,
                    ask_price: 19.0,
                    ask_volume: 50,
                    days_to_expiry: 20,
                },
            ],
        );

        let clock = Box::new(super::super::clock::FixedClock::new(Utc.with_ymd_and_hms(2025, 1, 6, 10, 0, 0).unwrap()));
        let mut pipeline = TradingPipeline::new(
            gateway,
            clock,
            OptionSelectorConfig::default(),
            PositionSizingConfig::default(),
            OrderExecutionConfig::default(),
            PipelineConfig::default(),
        );
        pipeline.on_init();
        pipeline.on_start();
        pipeline
    }

    fn warm_up_bars(pipeline: &mut TradingPipeline<BacktestGateway>, closes: &[f64]) {
        for &close in closes {
            let mut bars = HashMap::new();
            bars.insert("IO2501.CFFEX".to_string(), Bar::new(Utc::now(), close, close + 1.0, close - 1.0, close, 10));
            pipeline.on_bars(bars);
        }
    }

    #[test]
    fn instrument_accumulates_bars_and_indicators() {
        let mut pipeline = build_pipeline();
        warm_up_bars(&mut pipeline, &[4000.0; 40]);
        assert!(pipeline.instrument_manager().has_enough_data("IO2501.CFFEX"));
    }

    #[test]
    fn no_open_without_a_quoted_chain() {
        let mut gateway = BacktestGateway::new(1_000_000.0);
        gateway.register_contract("IO2501.CFFEX", 100.0, 0.2);
        gateway.on_bar_close("IO2501.CFFEX", 4000.0);
        let clock = Box::new(super::super::clock::FixedClock::new(Utc.with_ymd_and_hms(2025, 1, 6, 10, 0, 0).unwrap()));
        let mut pipeline = TradingPipeline::new(
            gateway,
            clock,
            OptionSelectorConfig::default(),
            PositionSizingConfig::default(),
            OrderExecutionConfig::default(),
            PipelineConfig::default(),
        );
        pipeline.on_init();
        pipeline.on_start();
        warm_up_bars(&mut pipeline, &[4000.0; 40]);
        assert!(pipeline.position_aggregate().all_positions().is_empty());
    }

    #[test]
    fn monitoring_snapshot_reports_tracked_symbols() {
        let mut pipeline = build_pipeline();
        warm_up_bars(&mut pipeline, &[4000.0; 5]);
        let snapshot = pipeline.monitoring_snapshot();
        assert_eq!(snapshot.tracked_symbols, 1);
    }

    #[test]
    fn snapshot_due_is_true_before_any_snapshot_taken() {
        let pipeline = build_pipeline();
        assert!(pipeline.snapshot_due(Utc::now()));
    }

    #[test]
    fn without_a_bar_pipeline_on_bars_reaches_process_bars_for_every_call() {
        let mut pipeline = build_pipeline();
        for i in 0..3 {
            let mut bars = HashMap::new();
            bars.insert("IO2501.CFFEX".to_string(), Bar::new(Utc::now(), 4000.0 + i as f64, 4001.0, 3999.0, 4000.0, 10));
            pipeline.on_bars(bars);
        }
        assert_eq!(pipeline.instrument_manager().instrument("IO2501.CFFEX").unwrap().bar_count(), 3);
    }

    #[test]
    fn with_a_bar_pipeline_raw_bars_only_reach_process_bars_on_window_close() {
        let mut gateway = BacktestGateway::new(1_000_000.0);
        gateway.register_contract("IO2501.CFFEX", 100.0, 0.2);
        let clock = Box::new(super::super::clock::FixedClock::new(Utc.with_ymd_and_hms(2025, 1, 6, 10, 0, 0).unwrap()));
        let mut pipeline = TradingPipeline::new(
            gateway,
            clock,
            OptionSelectorConfig::default(),
            PositionSizingConfig::default(),
            OrderExecutionConfig::default(),
            PipelineConfig::default(),
        )
        .with_bar_pipeline(super::super::bar_pipeline::BarPipeline::new(super::super::bar_pipeline::BarInterval::Minute, 5));
        pipeline.on_init();
        pipeline.on_start();

        for i in 0..4 {
            let mut bars = HashMap::new();
            bars.insert("IO2501.CFFEX".to_string(), Bar::new(Utc::now(), 4000.0 + i as f64, 4001.0, 3999.0, 4000.0, 10));
            pipeline.on_bars(bars);
        }
        assert!(pipeline.instrument_manager().instrument("IO2501.CFFEX").is_none());

        let mut bars = HashMap::new();
        bars.insert("IO2501.CFFEX".to_string(), Bar::new(Utc::now(), 4004.0, 4001.0, 3999.0, 4000.0, 10));
        pipeline.on_bars(bars);
        assert_eq!(pipeline.instrument_manager().instrument("IO2501.CFFEX").unwrap().bar_count(), 1);
    }

    #[test]
    fn state_snapshot_round_trips_into_a_restored_pipeline() {
        let mut pipeline = build_pipeline();
        warm_up_bars(&mut pipeline, &[4000.0; 40]);
        let snapshot = pipeline.state_snapshot(Utc::now());

        let mut fresh = build_pipeline();
        fresh.restore_state_snapshot(snapshot);
        assert!(fresh.instrument_manager().has_enough_data("IO2501.CFFEX"));
    }

    #[test]
    fn run_warm_up_restores_the_previous_phase_afterwards() {
        let mut pipeline = build_pipeline();
        assert!(!pipeline.is_warming_up());
        pipeline.run_warm_up(|p| {
            assert!(p.is_warming_up());
        });
        assert!(!pipeline.is_warming_up());
    }
}
