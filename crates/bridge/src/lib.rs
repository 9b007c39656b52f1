//! Rexi API bridge.
//!
//! Wires the endpoint catalog and the generic dispatcher into the operations a tool-calling agent
//! consumes: discovering endpoints, calling any of them, and reading the API description and
//! schema documents. [`surface`] describes those operations as MCP tools and resources for
//! whichever protocol server hosts them.

pub mod app;
pub mod error;
pub mod ops;
pub mod surface;

pub use app::{AppState, StartupOptions};
pub use error::{BridgeError, Result};
pub use ops::CallArgs;
