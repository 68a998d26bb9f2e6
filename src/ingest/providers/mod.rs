// src/ingest/providers/mod.rs
pub mod curated;
pub mod remoteok;
pub mod rozee;
