//! Lineage Core Types
//!
//! This crate provides the foundational types used throughout lineage:
//! - Identity types (ClassId, TxnId)
//! - Write stamps used to detect superseded tentative state (Stamp)
//! - The shared error taxonomy (HierarchyError, CycleKind)

mod error;
mod id;

pub use error::*;
pub use id::*;
