//! AquaWatch live event fan-out.
//!
//! [`EventBus`] is the in-process publish/subscribe hub for
//! [`MonitorEvent`]s produced by the simulation loop. WebSocket forwarders
//! subscribe to it; the periodic driver publishes into it.

pub mod bus;

pub use aquawatch_core::monitor_event::MonitorEvent;
pub use bus::{encode_frame, EventBus};
