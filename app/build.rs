use std::process::Command;

/// `git describe`, if the crate is built from a git checkout.
fn git_version() -> Option<String> {
    let output = Command::new("git").args(["describe", "--tags", "--always"]).output().ok()?;
    if !output.status.success() {
        return None;
    }
    let version = String::from_utf8(output.stdout).ok()?;
    let version = version.trim();
    if version.is_empty() { None } else { Some(version.to_owned()) }
}

fn main() {
    let version = git_version().unwrap_or_else(|| env!("CARGO_PKG_VERSION").to_owned());
    println!("cargo:rustc-env=VERSION={version}");
    println!("cargo:rerun-if-changed=build.rs");
}
