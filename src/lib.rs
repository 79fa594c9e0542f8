// Library exports for integration tests and the storefront client runtime

pub mod cache;
pub mod client;
pub mod config;
pub mod i18n;
pub mod resolver;
pub mod retry;
pub mod security;
pub mod server;
pub mod translator;
