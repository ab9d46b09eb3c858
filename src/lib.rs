// Library crate for the course catalogue message service
// Exposes modules for use in binaries and integration tests

pub mod config;
pub mod i18n;
pub mod server;
