//! Infrastructure layer: concrete implementations of application port traits.
//!
//! This module contains all I/O-performing code: AWS IoT API calls, the MQTT
//! connection, environment loading and template files.
//!
//! Imports from `crate::domain` and `crate::application::ports` are allowed.
//! Imports from `crate::commands` or `crate::output` are forbidden.

pub mod aws;
pub mod config;
pub mod fs;
pub mod mqtt;
