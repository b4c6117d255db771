//! Supported dialects and `device_type` parsing.

use std::fmt;
use std::str::FromStr;

use super::PlatformDefinition;
use super::vendors;
use crate::error::PlatformError;
use crate::transport::Protocol;

/// Vendor CLI dialects the driver knows how to operate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dialect {
    AristaEos,
    ArrcusArcos,
    ArubaOs,
    CiscoIos,
    CiscoXe,
    CiscoNxos,
    CiscoXr,
    HpComware,
    Huawei,
    HuaweiVrpv8,
    JuniperJunos,
    Linux,
    NokiaSros,
}

impl Dialect {
    pub const ALL: [Dialect; 13] = [
        Dialect::AristaEos,
        Dialect::ArrcusArcos,
        Dialect::ArubaOs,
        Dialect::CiscoIos,
        Dialect::CiscoXe,
        Dialect::CiscoNxos,
        Dialect::CiscoXr,
        Dialect::HpComware,
        Dialect::Huawei,
        Dialect::HuaweiVrpv8,
        Dialect::JuniperJunos,
        Dialect::Linux,
        Dialect::NokiaSros,
    ];

    /// Canonical dialect name.
    pub fn as_str(self) -> &'static str {
        match self {
            Dialect::AristaEos => "arista_eos",
            Dialect::ArrcusArcos => "arrcus_arcos",
            Dialect::ArubaOs => "aruba_os",
            Dialect::CiscoIos => "cisco_ios",
            Dialect::CiscoXe => "cisco_xe",
            Dialect::CiscoNxos => "cisco_nxos",
            Dialect::CiscoXr => "cisco_xr",
            Dialect::HpComware => "hp_comware",
            Dialect::Huawei => "huawei",
            Dialect::HuaweiVrpv8 => "huawei_vrpv8",
            Dialect::JuniperJunos => "juniper_junos",
            Dialect::Linux => "linux",
            Dialect::NokiaSros => "nokia_sros",
        }
    }

    /// Build the platform definition for this dialect.
    pub fn platform(self) -> PlatformDefinition {
        match self {
            Dialect::AristaEos => vendors::arista_eos::platform(),
            Dialect::ArrcusArcos => vendors::arrcus_arcos::platform(),
            Dialect::ArubaOs => vendors::aruba_os::platform(),
            Dialect::CiscoIos => vendors::cisco_ios::platform(),
            Dialect::CiscoXe => vendors::cisco_ios::xe_platform(),
            Dialect::CiscoNxos => vendors::cisco_nxos::platform(),
            Dialect::CiscoXr => vendors::cisco_xr::platform(),
            Dialect::HpComware => vendors::hp_comware::platform(),
            Dialect::Huawei => vendors::huawei::platform(),
            Dialect::HuaweiVrpv8 => vendors::huawei::vrpv8_platform(),
            Dialect::JuniperJunos => vendors::juniper_junos::platform(),
            Dialect::Linux => vendors::linux::platform(),
            Dialect::NokiaSros => vendors::nokia_sros::platform(),
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Dialect {
    type Err = PlatformError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().to_ascii_lowercase();
        if name == "juniper" {
            return Ok(Dialect::JuniperJunos);
        }
        Dialect::ALL
            .into_iter()
            .find(|d| d.as_str() == name)
            .ok_or(PlatformError::UnknownPlatform { name })
    }
}

/// A parsed `device_type` tag: dialect plus transport.
///
/// `cisco_ios_telnet` selects Telnet, `cisco_ios_ssh` or a bare `cisco_ios`
/// selects SSH. The tag is kept verbatim for listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceType {
    pub dialect: Dialect,
    pub protocol: Protocol,
    tag: String,
}

impl DeviceType {
    /// The tag as written in the inventory.
    pub fn tag(&self) -> &str {
        &self.tag
    }
}

impl FromStr for DeviceType {
    type Err = PlatformError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tag = s.trim();
        let lowered = tag.to_ascii_lowercase();

        let (base, protocol) = if let Some(base) = lowered.strip_suffix("_telnet") {
            (base, Protocol::Telnet)
        } else if let Some(base) = lowered.strip_suffix("_ssh") {
            (base, Protocol::Ssh)
        } else {
            (lowered.as_str(), Protocol::Ssh)
        };

        let dialect = base.parse::<Dialect>().map_err(|_| PlatformError::UnknownPlatform {
            name: tag.to_string(),
        })?;

        Ok(Self {
            dialect,
            protocol,
            tag: tag.to_string(),
        })
    }
}

impl fmt::Display for DeviceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.tag)
    }
}
