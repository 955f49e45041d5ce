//! Reconnection grace periods for Devour rooms.
//!
//! When a client drops without consenting to leave, its player is kept in
//! the world, marked offline, for a grace period. This crate owns the
//! timers for those grace periods:
//!
//! ```text
//!   leave(consented = false) ──→ start_grace_period() ──┬──(rejoin)──→ cancel()
//!                                                       │
//!                                                       └──(deadline)──→ GraceExpired
//!                                                                          │
//!                                                            confirm_expiry() → remove player
//! ```
//!
//! Timers never touch the world themselves. Expiry is delivered as a
//! [`GraceExpired`] message on a channel the room owns, so it is handled
//! in order with every other room event.

mod error;
mod manager;

pub use error::SessionError;
pub use manager::{GraceExpired, GraceTicket, ReconnectionManager};
