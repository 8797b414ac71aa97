pub mod cli;
pub mod config;
pub mod error;
pub mod render;
pub mod selection;
pub mod service;
pub mod snapshot;
pub mod validator;
