//! Tool call example
//!
//! Loads a device inventory and runs one tool call against it, printing the
//! JSON reply. This is what a host process does for every call it receives.
//!
//! # Usage
//!
//! ```bash
//! # list the tools and their schemas
//! cargo run --example tool_call -- devices.toml
//!
//! cargo run --example tool_call -- devices.toml list_devices
//!
//! cargo run --example tool_call -- devices.toml send_command_and_get_output \
//!     '{"device_name": "qfx1", "commands": ["show version", "show chassis hardware"]}'
//!
//! cargo run --example tool_call -- devices.toml set_config_commands_and_commit_or_save \
//!     '{"device_name": "qfx1", "commands": "set system ntp server 10.0.0.1"}'
//! ```
//!
//! Set `RUST_LOG=debug` to watch the session.

use std::env;
use std::sync::Arc;

use netops::inventory::Inventory;
use netops::tools::{self, ToolSurface};
use netops::SessionBroker;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut args = env::args().skip(1);
    let Some(inventory_path) = args.next() else {
        eprintln!("usage: tool_call <inventory.toml> [tool] [arguments-json]");
        std::process::exit(2);
    };

    let inventory = Arc::new(Inventory::load_file(&inventory_path)?);

    let Some(tool) = args.next() else {
        println!("{}", serde_json::to_string_pretty(&tools::definitions())?);
        return Ok(());
    };

    let arguments = match args.next() {
        Some(json) => serde_json::from_str(&json)?,
        None => serde_json::Value::Null,
    };

    let surface = ToolSurface::new(inventory, SessionBroker::new().with_device_locking(true));
    let reply = surface.call(&tool, arguments).await;

    println!("{}", serde_json::to_string_pretty(&reply)?);
    if reply.is_error {
        std::process::exit(1);
    }
    Ok(())
}
