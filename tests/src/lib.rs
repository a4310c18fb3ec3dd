//! # LAN Discovery Test Suite
//!
//! ## Structure
//!
//! ```text
//! tests/
//! ├── benches/          # Relay and fan-out throughput (criterion)
//! └── src/integration/  # Session + bus + stub backend, end to end
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p lan-tests
//! cargo bench -p lan-tests
//! ```

pub mod integration;
