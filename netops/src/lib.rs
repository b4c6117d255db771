//! # netops
//!
//! Core of a tool server that lets an agent operate network devices over
//! SSH or Telnet.
//!
//! ## Layers
//!
//! - [`inventory`]: TOML device inventory with `[default]` inheritance
//! - [`transport`], [`channel`], [`platform`], [`driver`]: CLI sessions for
//!   many vendor dialects (prompt detection, privilege levels, commit or save)
//! - [`broker`]: one session per operation, optional per-device lock
//! - [`executor`] and [`committer`]: read commands, configuration pushes
//! - [`tools`]: `list_devices`, `send_command_and_get_output` and
//!   `set_config_commands_and_commit_or_save` as JSON in, JSON out
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use netops::{Inventory, SessionBroker, ToolSurface};
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), netops::Error> {
//!     let inventory = Arc::new(Inventory::load_file("devices.toml")?);
//!     let tools = ToolSurface::new(inventory, SessionBroker::new());
//!
//!     let reply = tools
//!         .call(
//!             "send_command_and_get_output",
//!             json!({"device_name": "qfx1", "commands": ["show version"]}),
//!         )
//!         .await;
//!     println!("{}", reply.content);
//!     Ok(())
//! }
//! ```

pub mod batch;
pub mod broker;
pub mod channel;
pub mod committer;
pub mod driver;
pub mod error;
pub mod executor;
pub mod inventory;
pub mod platform;
pub mod tools;
pub mod transport;

#[cfg(test)]
mod mock;

// Re-export main types for convenience
pub use batch::{CommandBatch, ConfigResult, ExecutionResult, Finalization};
pub use broker::{Connector, DriverConnector, Session, SessionBroker};
pub use driver::{CliSession, DriverBuilder, GenericDriver, Response};
pub use error::Error;
pub use inventory::{DeviceProfile, Inventory};
pub use platform::{DeviceType, Dialect, PlatformDefinition};
pub use tools::{ToolError, ToolReply, ToolSurface};
pub use transport::{AuthMethod, Protocol};
