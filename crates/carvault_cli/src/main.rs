//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `carvault_core` linkage.
//! - Keep output deterministic for quick local sanity checks.

fn main() {
    println!("carvault_core version={}", carvault_core::core_version());
}
