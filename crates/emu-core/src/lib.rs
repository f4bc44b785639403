//! Shared vocabulary for cycle-driven chip emulation.
//!
//! Time is counted in master clock ticks and nothing else. Chips hang off a
//! register bus and expose their internal state for inspection without
//! disturbing it.

mod bus;
mod clock;
mod observable;
mod ticks;

pub use bus::Bus;
pub use clock::MasterClock;
pub use observable::{Observable, Value};
pub use ticks::Ticks;
