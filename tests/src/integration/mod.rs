//! # Integration Tests
//!
//! End-to-end flows through a discovery session, the in-memory bus and the
//! stub protocol backend.

pub mod flows;
