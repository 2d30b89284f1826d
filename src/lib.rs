//! gdnpro - batch PDF to GIF conversion, file renaming and QR codes
//!
//! This library crate exposes the core functionality for integration testing.

pub mod config;
pub mod convert;
pub mod qr;
pub mod rename;
pub mod settings;
