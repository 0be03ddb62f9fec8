//! HTTP Handlers

pub mod chat;
pub mod command;
pub mod fs;
pub mod health;
pub mod tools;
