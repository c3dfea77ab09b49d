//! Job ad form assistant.
//!
//! A recruiter's free-text description goes through one primary completion,
//! the reply is parsed into a draft, a single supplementary call fills any
//! required gaps, and the draft is mapped onto the session's form.

pub mod extractor;
pub mod field_mapper;
pub mod form;
pub mod gap_filler;
pub mod handlers;
pub mod models;
pub mod pipeline;
pub mod prompts;
pub mod session;
