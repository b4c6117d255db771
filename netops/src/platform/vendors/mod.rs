//! Built-in vendor platform definitions.

pub mod arista_eos;
pub mod arrcus_arcos;
pub mod aruba_os;
pub mod cisco_ios;
pub mod cisco_nxos;
pub mod cisco_xr;
pub mod hp_comware;
pub mod huawei;
pub mod juniper_junos;
pub mod linux;
pub mod nokia_sros;
