//! Benchmark fixtures for the scripting runtime.
//!
//! - **Micro benchmarks** (`scripting_micro`): datum append and search, scope append and
//!   lookup, deep copies of scope trees.
//! - **Scene benchmarks** (`scripting_scenes`): JSON scene parsing and whole-scene frame updates.
//!
//! # Running Benchmarks
//!
//! ```bash
//! cargo bench -p rusty_bench
//! cargo bench -p rusty_bench -- parse
//! ```
//!
//! Results are written to `target/criterion/` with HTML reports.

pub mod scene;
