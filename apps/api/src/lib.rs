//! Lingua: article reading with AI word analysis, highlight and quiz engines.
//!
//! The library holds every engine; `lingua-api` (HTTP service) and `lingua`
//! (terminal client) are thin front ends over it.

pub mod config;
pub mod db;
pub mod errors;
pub mod highlight;
pub mod models;
pub mod prompts;
pub mod quiz;
pub mod replay;
pub mod reply;
pub mod routes;
pub mod session;
pub mod state;
pub mod store;
pub mod stream;
pub mod webhook;

#[cfg(test)]
mod test_support;
