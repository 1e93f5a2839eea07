//! ForgeTopology compiles a declarative network-fabric topology plan into a
//! concrete wired inventory: switch and server devices, their interfaces,
//! and the point-to-point links between them.
//!
//! The crate is the planning-time engine only. Import/export, dashboards and
//! command-line surfaces live in their own services and talk to this crate
//! through [`generator::TopologyGenerator`] and the [`db::Store`] it writes
//! to. A generation run is idempotent: it removes everything previously
//! generated for the plan and rebuilds it inside one transaction, so two
//! runs over an unchanged plan produce byte-identical names and counts.

pub mod config;
pub mod db;
pub mod error;
pub mod generator;
pub mod models;
pub mod ports;
pub mod utils;
