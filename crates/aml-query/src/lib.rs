//! Read-only reporting over the audit chain.
//!
//! Pure reads against any [`ChainReader`]: filtered pagination for review
//! queues and a full-chain export for external audit tooling. Nothing in
//! this crate mutates the store.
//!
//! [`ChainReader`]: aml_store::ChainReader

pub mod error;
pub mod filter;
pub mod report;

pub use error::QueryError;
pub use filter::RecordFilter;
pub use report::{export, export_json, query, RecordHit, RecordPage};
