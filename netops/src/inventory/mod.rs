//! Device inventory loaded from a TOML document.
//!
//! Every top-level table is a device, except the reserved `[default]` table
//! whose keys fill in whatever a device leaves unset:
//!
//! ```toml
//! [default]
//! username = "rouser"
//! password = "rouserpassword"
//!
//! [qfx1]
//! hostname = "172.16.0.40"
//! device_type = "juniper_junos"
//!
//! [edge1]
//! hostname = "edge1.lab"
//! device_type = "cisco_ios_telnet"
//! secret = "enablepw"
//! ```
//!
//! Values may be strings or integers. Loading is all-or-nothing: one invalid
//! device fails the whole document.

mod profile;

pub use profile::{DEFAULT_COMMAND_TIMEOUT, DEFAULT_CONNECT_TIMEOUT, DeviceProfile};

use std::fmt::Display;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use indexmap::IndexMap;
use log::{debug, warn};
use secrecy::SecretString;
use serde::Serialize;
use toml::{Table, Value};

use crate::error::{Error, InventoryError, Result};
use crate::platform::DeviceType;
use crate::transport::HostKeyVerification;

/// Name of the section that supplies defaults.
pub const DEFAULT_SECTION: &str = "default";

const KNOWN_KEYS: [&str; 10] = [
    "hostname",
    "device_type",
    "username",
    "password",
    "port",
    "secret",
    "key_file",
    "connect_timeout",
    "command_timeout",
    "host_key_verification",
];

/// Device name and type, as listed to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceEntry {
    pub name: String,
    pub device_type: String,
}

/// All known devices in document order.
#[derive(Debug, Default)]
pub struct Inventory {
    devices: IndexMap<String, DeviceProfile>,
}

impl Inventory {
    /// Parse an inventory document.
    pub fn load(document: &str) -> Result<Self> {
        let table: Table = toml::from_str(document).map_err(InventoryError::from)?;

        let defaults = match table.get(DEFAULT_SECTION) {
            Some(Value::Table(defaults)) => defaults.clone(),
            Some(_) => return Err(invalid(DEFAULT_SECTION, "section must be a table")),
            None => Table::new(),
        };
        warn_unknown_keys(DEFAULT_SECTION, &defaults);

        let mut devices = IndexMap::with_capacity(table.len());
        for (name, section) in &table {
            if name == DEFAULT_SECTION {
                continue;
            }

            let Value::Table(section) = section else {
                return Err(invalid(name, "section must be a table"));
            };
            warn_unknown_keys(name, section);

            let fields = Fields {
                device: name,
                section,
                defaults: &defaults,
            };
            devices.insert(name.clone(), fields.profile()?);
        }

        debug!("inventory: loaded {} devices", devices.len());
        Ok(Self { devices })
    }

    /// Read and parse an inventory file.
    pub fn load_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let document = std::fs::read_to_string(path).map_err(|source| InventoryError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::load(&document)
    }

    /// Look up a device by name.
    ///
    /// Fails with `UnknownDevice` for names not in the inventory, including
    /// `default`.
    pub fn resolve(&self, name: &str) -> Result<&DeviceProfile> {
        self.devices.get(name).ok_or_else(|| {
            InventoryError::UnknownDevice {
                name: name.to_string(),
            }
            .into()
        })
    }

    /// Names and device types, in document order.
    pub fn list(&self) -> Vec<DeviceEntry> {
        self.devices
            .values()
            .map(|p| DeviceEntry {
                name: p.name.clone(),
                device_type: p.device_type.tag().to_string(),
            })
            .collect()
    }

    /// Profiles in document order.
    pub fn iter(&self) -> impl Iterator<Item = &DeviceProfile> {
        self.devices.values()
    }

    /// Number of devices.
    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }
}

fn invalid(device: &str, message: impl Into<String>) -> Error {
    InventoryError::InvalidDeviceConfig {
        device: device.to_string(),
        message: message.into(),
    }
    .into()
}

fn warn_unknown_keys(section_name: &str, section: &Table) {
    for key in section.keys().filter(|k| !KNOWN_KEYS.contains(&k.as_str())) {
        warn!("inventory: ignoring unknown key '{}' in [{}]", key, section_name);
    }
}

/// One device section with the defaults behind it.
struct Fields<'a> {
    device: &'a str,
    section: &'a Table,
    defaults: &'a Table,
}

impl Fields<'_> {
    fn get(&self, key: &str) -> Option<&Value> {
        self.section.get(key).or_else(|| self.defaults.get(key))
    }

    fn string(&self, key: &str) -> Result<Option<String>> {
        match self.get(key) {
            None => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.clone())),
            Some(Value::Integer(i)) => Ok(Some(i.to_string())),
            Some(other) => Err(invalid(
                self.device,
                format!("'{key}' must be a string or integer, not {}", other.type_str()),
            )),
        }
    }

    fn required(&self, key: &str) -> Result<String> {
        self.string(key)?
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| invalid(self.device, format!("missing required field '{key}'")))
    }

    fn parsed<T>(&self, key: &str) -> Result<Option<T>>
    where
        T: FromStr,
        T::Err: Display,
    {
        self.string(key)?
            .map(|s| {
                s.trim()
                    .parse::<T>()
                    .map_err(|e| invalid(self.device, format!("invalid {key} '{s}': {e}")))
            })
            .transpose()
    }

    fn timeout(&self, key: &str) -> Result<Option<Duration>> {
        match self.parsed::<u64>(key)? {
            Some(0) => Err(invalid(self.device, format!("{key} must be at least 1 second"))),
            other => Ok(other.map(Duration::from_secs)),
        }
    }

    fn profile(&self) -> Result<DeviceProfile> {
        let hostname = self.required("hostname")?;

        let device_type = self
            .required("device_type")?
            .parse::<DeviceType>()
            .map_err(|e| invalid(self.device, e.to_string()))?;

        let port = match self.parsed::<u16>("port")? {
            Some(0) => return Err(invalid(self.device, "port must be between 1 and 65535")),
            other => other,
        };

        Ok(DeviceProfile {
            name: self.device.to_string(),
            hostname: hostname.trim().to_string(),
            device_type,
            username: self.string("username")?,
            password: self.string("password")?.map(SecretString::from),
            port,
            secret: self.string("secret")?.map(SecretString::from),
            key_file: self.string("key_file")?.map(PathBuf::from),
            connect_timeout: self.timeout("connect_timeout")?,
            command_timeout: self.timeout("command_timeout")?,
            host_key_verification: self.parsed::<HostKeyVerification>("host_key_verification")?,
        })
    }
}
