//! The three tools an agent calls: list devices, run commands, push config.
//!
//! Framing (stdio, HTTP) is left to the host; [`ToolSurface::call`] takes a
//! tool name and JSON arguments and always returns a [`ToolReply`].

use std::sync::Arc;

use log::{debug, warn};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use thiserror::Error;

use crate::batch::{CommandBatch, ConfigResult, ExecutionResult};
use crate::broker::{Connector, DriverConnector, SessionBroker};
use crate::error::{BrokerError, ConnectError, ConnectFailureReason};
use crate::inventory::{DeviceEntry, DeviceProfile, Inventory};

pub const LIST_DEVICES: &str = "list_devices";
pub const SEND_COMMAND: &str = "send_command_and_get_output";
pub const SET_CONFIG: &str = "set_config_commands_and_commit_or_save";

/// Error returned to the calling agent.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ToolError {
    #[error("unknown device '{device}'")]
    UnknownDevice { device: String },

    #[error("cannot connect to {device} ({host}:{port}): {reason}: {message}")]
    ConnectionError {
        device: String,
        host: String,
        port: u16,
        reason: ConnectFailureReason,
        message: String,
    },

    #[error("{device}: {message}")]
    CommandFailure { device: String, message: String },

    #[error("invalid arguments: {message}")]
    InvalidArguments { message: String },

    #[error("unknown tool '{name}'")]
    UnknownTool { name: String },
}

impl From<ConnectError> for ToolError {
    fn from(e: ConnectError) -> Self {
        ToolError::ConnectionError {
            message: e.source.to_string(),
            device: e.device,
            host: e.host,
            port: e.port,
            reason: e.reason,
        }
    }
}

impl From<BrokerError> for ToolError {
    fn from(e: BrokerError) -> Self {
        match e {
            BrokerError::Connect(e) => e.into(),
            BrokerError::Session { device, source } => ToolError::CommandFailure {
                device,
                message: source.to_string(),
            },
        }
    }
}

/// Tool result as handed back to the host.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolReply {
    #[serde(rename = "isError")]
    pub is_error: bool,
    pub content: Value,
}

impl ToolReply {
    fn from_result<T: Serialize>(result: Result<T, ToolError>) -> Self {
        match result.map(serde_json::to_value) {
            Ok(Ok(content)) => Self {
                is_error: false,
                content,
            },
            Ok(Err(e)) => Self::error(&ToolError::CommandFailure {
                device: String::new(),
                message: format!("cannot serialize result: {e}"),
            }),
            Err(e) => Self::error(&e),
        }
    }

    fn error(error: &ToolError) -> Self {
        let content = serde_json::to_value(error).unwrap_or_else(|_| json!({ "message": error.to_string() }));
        Self {
            is_error: true,
            content,
        }
    }
}

/// Name, description and JSON schema of one tool.
#[derive(Debug, Clone, Serialize)]
pub struct ToolDefinition {
    pub name: &'static str,
    pub description: &'static str,
    #[serde(rename = "inputSchema")]
    pub input_schema: Value,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct CommandArgs {
    device_name: String,
    #[serde(alias = "command")]
    commands: CommandBatch,
}

/// Maps tool calls onto the registry and the session broker.
pub struct ToolSurface<C: Connector = DriverConnector> {
    inventory: Arc<Inventory>,
    broker: SessionBroker<C>,
}

impl<C: Connector> ToolSurface<C> {
    /// Serve tools for `inventory`, opening sessions through `broker`.
    pub fn new(inventory: Arc<Inventory>, broker: SessionBroker<C>) -> Self {
        Self { inventory, broker }
    }

    /// Devices this surface knows about.
    pub fn inventory(&self) -> &Inventory {
        &self.inventory
    }

    fn resolve(&self, device_name: &str) -> Result<&DeviceProfile, ToolError> {
        self.inventory
            .resolve(device_name)
            .map_err(|_| ToolError::UnknownDevice {
                device: device_name.to_string(),
            })
    }

    /// Every device with its type, in inventory order.
    pub fn list_devices(&self) -> Vec<DeviceEntry> {
        self.inventory.list()
    }

    /// Run read-only commands and return their output.
    pub async fn send_command_and_get_output(
        &self,
        device_name: &str,
        commands: &CommandBatch,
    ) -> Result<ExecutionResult, ToolError> {
        let profile = self.resolve(device_name)?;
        Ok(self.broker.execute(profile, commands).await?)
    }

    /// Apply configuration commands, then commit or save.
    pub async fn set_config_commands_and_commit_or_save(
        &self,
        device_name: &str,
        commands: &CommandBatch,
    ) -> Result<ConfigResult, ToolError> {
        let profile = self.resolve(device_name)?;
        Ok(self.broker.configure(profile, commands).await?)
    }

    /// Dispatch a tool call by name. Never fails: errors come back as
    /// replies with `is_error` set.
    pub async fn call(&self, name: &str, arguments: Value) -> ToolReply {
        debug!("tool call: {}", name);

        let reply = match name {
            LIST_DEVICES => ToolReply::from_result(Ok::<_, ToolError>(self.list_devices())),
            SEND_COMMAND => match parse_args::<CommandArgs>(arguments) {
                Ok(args) => ToolReply::from_result(
                    self.send_command_and_get_output(&args.device_name, &args.commands)
                        .await,
                ),
                Err(e) => ToolReply::error(&e),
            },
            SET_CONFIG => match parse_args::<CommandArgs>(arguments) {
                Ok(args) => ToolReply::from_result(
                    self.set_config_commands_and_commit_or_save(&args.device_name, &args.commands)
                        .await,
                ),
                Err(e) => ToolReply::error(&e),
            },
            other => ToolReply::error(&ToolError::UnknownTool {
                name: other.to_string(),
            }),
        };

        if reply.is_error {
            warn!("tool call {} failed: {}", name, reply.content);
        }
        reply
    }
}

/// Schemas for the three tools.
pub fn definitions() -> Vec<ToolDefinition> {
    let commands_schema = json!({
        "oneOf": [
            { "type": "string" },
            { "type": "array", "items": { "type": "string" } }
        ],
        "description": "One command, or a list of commands sent in order"
    });

    vec![
        ToolDefinition {
            name: LIST_DEVICES,
            description: "List the network devices that can be operated, with their device types.",
            input_schema: json!({ "type": "object", "properties": {} }),
        },
        ToolDefinition {
            name: SEND_COMMAND,
            description: "Run read-only commands on a device and return each command's output. \
                          Commands must suit the device type.",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "device_name": { "type": "string", "description": "Device name from list_devices" },
                    "commands": commands_schema
                },
                "required": ["device_name", "commands"]
            }),
        },
        ToolDefinition {
            name: SET_CONFIG,
            description: "Send configuration commands to a device in configuration mode, then \
                          commit (candidate-config devices) or save (direct-apply devices).",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "device_name": { "type": "string", "description": "Device name from list_devices" },
                    "commands": commands_schema
                },
                "required": ["device_name", "commands"]
            }),
        },
    ]
}

fn parse_args<T: DeserializeOwned>(arguments: Value) -> Result<T, ToolError> {
    // a call without arguments arrives as null
    let arguments = if arguments.is_null() { json!({}) } else { arguments };
    serde_json::from_value(arguments).map_err(|e| ToolError::InvalidArguments {
        message: e.to_string(),
    })
}
