#![allow(clippy::missing_errors_doc, clippy::missing_panics_doc, clippy::doc_markdown)]

//! AIRequest controller core library
//!
//! Provides the `AIRequest` custom resource definition and the level-triggered
//! reconciliation loop that turns user prompts into proposed manifests
//! awaiting human approval.

pub mod crds;
pub mod requests;
