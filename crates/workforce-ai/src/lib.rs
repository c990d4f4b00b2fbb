//! Multi-tenant workforce analytics: productivity scoring over task records
//! and an organization-scoped TTL cache in front of generative-AI analyses.

pub mod ai;
pub mod analytics;
pub mod cache;
pub mod config;
pub mod error;
pub mod scoring;
pub mod telemetry;
pub mod workforce;
