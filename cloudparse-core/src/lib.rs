#![doc = "cloudparse-core: client library for the CloudParse hosted parsing API."]

//! This crate contains the data model, configuration, transport and client
//! logic for parsing documents through the hosted service. The CLI and other
//! integration surfaces live in dependent crates.
//!
//! # Usage
//! Construct a [`ParseConfig`], build a [`CloudParseClient`] and call
//! [`CloudParseClient::parse`] (async) or
//! [`CloudParseClient::parse_blocking`] (sync).

pub mod client;
pub mod config;
pub mod contract;
pub mod transport;

pub use client::CloudParseClient;
pub use config::ParseConfig;
pub use contract::{Document, FileExtractor, Job, JobStatus, ParseError, ParseTransport, ResultType};
pub use transport::HttpTransport;
