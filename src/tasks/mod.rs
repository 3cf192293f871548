//! Background Tasks Module
//!
//! Contains the tasks that run alongside a store.
//!
//! # Tasks
//! - Expiry waiter: one per entry timer, removes the entry once the timer
//!   runs out

mod expiry;

pub(crate) use expiry::spawn_expiry_waiter;
