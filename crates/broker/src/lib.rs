//! Wire models and client boundary for the dbaas aggregator.
//!
//! This crate contains the serde-serializable types exchanged with the
//! database-as-a-service broker plus the [`BrokerClient`] trait consumed by
//! driver crates. Types here are pure data: the shapes of payloads as they
//! appear on the wire. Session caching and recovery logic live in
//! `dbaas-cassandra`, built on top of this boundary.

pub mod client;
pub mod http;
pub mod model;

pub use client::{BrokerClient, BrokerError};
pub use http::HttpBroker;
pub use model::{BaseDbParams, Classifier, ConnectionProperties, LogicalDatabase, Scope};
