//! # Lumen
//!
//! `lumen` is a push-based subscription broadcast engine for GraphQL
//! servers, speaking the Lighthouse subscriptions protocol. A query layer
//! registers a client's subscription once; every later write operation is
//! fanned out into one personalized, re-resolved result per subscriber and
//! pushed over an out-of-band transport.
//!
//! ## Core Modules
//!
//! The library is structured into several modules, each with a distinct responsibility:
//!
//! - `broker`: The central component that registers subscribers, derives topics, filters
//!   eligibility and fans events out into per-subscriber deliveries.
//! - `subscriber`: The persisted snapshot of a single client's subscription intent.
//! - `storage`: Durable subscriber stores (in-memory and `sled`), indexed by channel and topic.
//! - `graphql`: The seam to the external query executor and the response shapes.
//! - `drivers`: Swappable delivery drivers (log accumulator, in-process bus, websocket push).
//! - `transport`: The websocket gateway clients listen on for pushed results.
//! - `config`: Handles loading and managing configuration.
//! - `utils`: Contains shared utilities, such as error handling and logging setup.

pub mod broker;
pub mod config;
pub mod drivers;
pub mod graphql;
pub mod storage;
pub mod subscriber;
pub mod transport;
pub mod utils;

#[cfg(test)]
mod tests;
