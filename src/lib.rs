//! Transit Analyst Gateway Library

pub mod auth;
pub mod config;
pub mod controllers;
pub mod feeds;
pub mod http;
pub mod lifecycle;
pub mod net;
pub mod observability;
pub mod routing;
pub mod storage;

pub use config::schema::ServiceConfig;
pub use lifecycle::{Bootstrap, Gateway, Shutdown};
