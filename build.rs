// SPDX-License-Identifier: MPL-2.0

use std::process::Command;

fn main() {
    // Re-run build script if git HEAD changes
    println!("cargo::rerun-if-changed=.git/HEAD");
    println!("cargo::rerun-if-changed=.git/refs/tags");
    println!("cargo::rerun-if-env-changed=RETRO_CAMERA_VERSION");

    // Packaged builds pin the version explicitly
    let version = match std::env::var("RETRO_CAMERA_VERSION") {
        Ok(v) => v,
        Err(_) => describe_version(),
    };

    println!("cargo::rustc-env=GIT_VERSION={}", version);
}

fn describe_version() -> String {
    let package_version = env!("CARGO_PKG_VERSION");

    match git(&["describe", "--tags", "--always", "--match", "v*"]) {
        // "v0.1.0" at a tag, "v0.1.0-5-gabcdef1" past it
        Some(described) => {
            let described = described.strip_prefix('v').unwrap_or(&described);
            let parts: Vec<&str> = described.rsplitn(3, '-').collect();
            if parts.len() >= 3 {
                let hash = parts[0].strip_prefix('g').unwrap_or(parts[0]);
                format!("{}-dirty-{}", parts[2], hash)
            } else if described.contains('.') {
                described.to_string()
            } else {
                // No tags yet: described is just the short hash
                format!("{}-{}", package_version, described)
            }
        }
        None => package_version.to_string(),
    }
}

fn git(args: &[&str]) -> Option<String> {
    let output = Command::new("git").args(args).output().ok()?;

    if output.status.success() {
        Some(String::from_utf8_lossy(&output.stdout).trim().to_string())
    } else {
        None
    }
}
