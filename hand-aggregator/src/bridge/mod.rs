//! Bridge module - JS ↔ Rust communication
//!
//! All #[wasm_bindgen] entry points live here.
//! Re-exports only in mod.rs, logic in submodules.

mod aggregator;

pub use aggregator::{
    aggregate_tick, aggregate_tick_now, get_tick_report, init_aggregator, push_hand,
    register_source, source_count, BridgeError,
};
