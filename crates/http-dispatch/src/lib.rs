//! Generic HTTP dispatch for a described remote API.
//!
//! A single operation turns a method, a path template and runtime-supplied parameters into an
//! outbound request, and normalizes whatever comes back. There is no per-endpoint code: the
//! endpoint catalog lives in `rexi-openapi-catalog`, and this crate only knows how to send.
//!
//! It intentionally contains **no** description parsing and **no** protocol-server wiring.

pub mod config;
pub mod dispatcher;
pub mod error;
pub mod path_template;
pub mod redact;
pub mod verb;

pub use config::{CREDENTIAL_HEADER, Credential, RuntimeConfig};
pub use dispatcher::{CallRequest, CallResult, Dispatcher, ResponseData};
pub use error::{DispatchError, Result};
pub use verb::HttpVerb;
