//! High-level driver for device interaction.
//!
//! The driver layer sends commands, tracks privilege levels and finalizes
//! configuration changes. [`CliSession`] is the capability the rest of the
//! crate programs against; [`GenericDriver`] implements it for every dialect.

mod builder;
mod generic;
mod interactive;
mod privilege;
mod response;

pub use builder::DriverBuilder;
pub use generic::GenericDriver;
pub use interactive::{InteractiveEvent, InteractiveResult, InteractiveStep};
pub use privilege::{PrivilegeManager, TransitionInfo};
pub use response::Response;

use std::future::Future;

use crate::error::Result;
use crate::platform::FinalizeAction;

/// An open CLI session to one device.
pub trait CliSession: Send {
    /// Dialect name the session speaks, e.g. `"juniper_junos"`.
    fn dialect(&self) -> &str;

    /// Send one line and wait for the prompt.
    ///
    /// A device rejection is not an error: the response comes back with
    /// `failure_message` set. Errors mean the session itself failed.
    fn send_command(&mut self, command: &str) -> impl Future<Output = Result<Response>> + Send;

    /// Move to the dialect's configuration privilege.
    fn enter_config_mode(&mut self) -> impl Future<Output = Result<()>> + Send;

    /// How this dialect finalizes a change, `None` when it cannot.
    fn finalize_action(&self) -> Option<FinalizeAction>;

    /// Commit or save, whichever the dialect uses.
    fn finalize(&mut self) -> impl Future<Output = Result<Response>> + Send;

    /// Close the session. Closing a closed session does nothing.
    fn close(&mut self) -> impl Future<Output = Result<()>> + Send;

    /// Whether the session still holds a connection.
    fn is_open(&self) -> bool;
}
