//! Workspace stub crate. The actual library lives in `crates/`.
