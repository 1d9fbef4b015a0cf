//! Management API client and effect interpreter.
//!
//! This module provides the implementation for executing management effects
//! over HTTP with reqwest. It implements the `ManagementInterpreter` trait
//! defined in the effects module.
//!
//! Key features:
//! - Bearer-token authentication, configured once by the caller
//! - Errors categorized so "object is gone" (404/403) can be told apart from
//!   failed calls
//! - No automatic retries: a failed call is reported as-is

mod client;
mod error;
mod interpreter;

pub use client::{ClientConfig, ManagementClient};
pub use error::{ApiError, ApiErrorKind};
pub use interpreter::execute_effect;
