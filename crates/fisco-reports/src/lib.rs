//! # fisco-reports: Aggregation and Orchestration
//!
//! Turns a report request into a typed [`ReportResult`].
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         fisco-reports                                   │
//! │                                                                         │
//! │   ReportEngine::generate(tag, from, to)        orchestrator.rs          │
//! │        │                                                                │
//! │        ▼                                                                │
//! │   ┌─────────┬────────┬───────┬───────────┬───────────┬────────┬──────┐  │
//! │   │ sales   │ itbis  │ ncf   │ inventory │ customers │ audit  │ dgii │  │
//! │   └────┬────┴───┬────┴───┬───┴─────┬─────┴─────┬─────┴───┬────┴──┬───┘  │
//! │        │        │        │         │           │         │       │      │
//! │        ▼        ▼        ▼         ▼           ▼         ▼       ▼      │
//! │   fisco-db grouped queries ─► enrich.rs (batched) ─► fisco-core math    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust,ignore
//! let engine = ReportEngine::new(db);
//! let report = engine.generate("itbis", Some(from), Some(to)).await?;
//! ```

pub mod aggregator;
pub mod enrich;
pub mod error;
pub mod orchestrator;

pub use error::{EngineResult, ErrorCode, ReportError};
pub use fisco_core::{ReportResult, ReportType};
pub use orchestrator::ReportEngine;
