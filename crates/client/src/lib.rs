//! Packline Client - receiving API client and submission workflow.
//!
//! Wraps the HTTP endpoints that accept package rows and return the packages
//! the server created, and drives a draft through validation, reconciliation,
//! submission and label printing.
//!
//! # Modules
//!
//! - [`config`] - Environment-based configuration
//! - [`client`] - Authenticated JSON client
//! - [`receiving`] - Per-flow receiving endpoints
//! - [`workflow`] - End-to-end submission of a draft
//! - [`error`] - API errors and message extraction

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod client;
pub mod config;
pub mod error;
pub mod receiving;
pub mod workflow;

pub use client::{PacklineClient, REQUEST_ID_HEADER};
pub use config::{ClientConfig, ConfigError};
pub use error::ApiError;
pub use receiving::{PackagesResponse, ReceiptSubmitter, ReceiveRequest, flow_endpoint};
pub use workflow::{CommitHook, Outcome, Receipt, SubmissionWorkflow};
