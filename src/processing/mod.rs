//! Summaries of data produced by the scanner's collaborators

pub mod kinematics;
pub mod rssi;

pub use kinematics::{integrate_paths, KinematicsSettings, ModuleKinematics};
pub use rssi::{summarize_window, RssiSummary};
