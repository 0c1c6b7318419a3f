//! Data models for messages moving through the emulator
//!
//! Outgoing and received messages, their REST encodings, and the domain
//! events published by the notifier.

pub mod event;
pub mod message;
