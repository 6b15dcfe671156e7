//! Agent Selector - picks the best agent profiles for a task.
//!
//! Retrieves the closest agent document by embedding similarity, masks the
//! names and phone numbers in it before asking a language model, and restores
//! them in the model's answer.

pub mod api;
pub mod completion;
pub mod config;
pub mod corpus;
pub mod logging;
pub mod markdown;
pub mod masking;
pub mod pipeline;
pub mod retrieval;
