use std::env;

/// Overrides the package version, e.g. with a release tag from CI.
const VERSION_OVERRIDE: &str = "GPUMON_BUILD_VERSION";

fn main() {
    println!("cargo:rerun-if-env-changed={VERSION_OVERRIDE}");
    let version = env::var(VERSION_OVERRIDE)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| env!("CARGO_PKG_VERSION").to_string());
    println!("cargo:rustc-env=GPUMON_VERSION={version}");

    // Tarball builds have no repository; the version then reports an unknown commit.
    if let Err(err) = emit_commit() {
        println!("cargo:warning=git metadata unavailable: {err}");
    }
}

fn emit_commit() -> anyhow::Result<()> {
    let git = vergen_git2::Git2Builder::default()
        .sha(true)
        .dirty(true)
        .build()?;

    vergen_git2::Emitter::default()
        .fail_on_error()
        .add_instructions(&git)?
        .emit()
}
