//! Core ledger-term library (dispatch, services, typing engine, config).

pub mod address;
pub mod config;
pub mod dispatch;
pub mod parser;
pub mod services;
pub mod session;
pub mod transcript;
pub mod typing;
