//! Derives the `--version` string from `git describe`, falling back to the
//! crate version outside a checkout.

fn main() {
    println!("cargo:rerun-if-changed=../../.git/HEAD");

    let described = std::process::Command::new("git")
        .args(["describe", "--tags", "--always", "--dirty=-dev"])
        .output()
        .ok()
        .filter(|o| o.status.success())
        .and_then(|o| String::from_utf8(o.stdout).ok())
        .map(|s| s.trim().trim_start_matches('v').to_string())
        .filter(|s| !s.is_empty());

    let version = described.unwrap_or_else(|| env!("CARGO_PKG_VERSION").to_string());
    println!("cargo:rustc-env=PYFINISH_VERSION={version}");
}
