//! Résumé tailoring service and client.
//!
//! Server side: the two generation gateways and the text-extraction endpoint
//! (`routes::build_router`). Client side: the generation workflow with its
//! history, session and export collaborators, driven by the `tailor` binary.

pub mod auth;
pub mod client;
pub mod config;
pub mod db;
pub mod errors;
pub mod export;
pub mod extraction;
pub mod generation;
pub mod history;
pub mod llm_client;
pub mod models;
pub mod routes;
pub mod session;
pub mod state;
pub mod workflow;
