//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `gsd_core` linkage.
//! - Keep output deterministic for quick local sanity checks.

fn main() {
    println!("gsd_core ping={}", gsd_core::ping());
    println!("gsd_core version={}", gsd_core::core_version());
}
