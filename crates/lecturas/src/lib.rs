//! Meter reading validation and consumption derivation for billing sectors.
//!
//! The `readings` module holds the pure computation (digit checks, rollover-aware
//! consumption, anomaly heuristics and input normalizers). `meters` carries the backend
//! record shapes, the clave catalog and the submission payload builders layered on top.

pub mod config;
pub mod error;
pub mod meters;
pub mod readings;
pub mod telemetry;
