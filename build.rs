use std::process::Command;

fn main() {
    let git_hash = Command::new("git")
        .args(["rev-parse", "--short", "HEAD"])
        .output()
        .ok()
        .filter(|output| output.status.success())
        .and_then(|output| String::from_utf8(output.stdout).ok())
        .map(|hash| hash.trim().to_string())
        .filter(|hash| !hash.is_empty())
        .unwrap_or_else(|| "unknown".to_string());

    println!("cargo:rustc-env=GIT_SHORT_HASH={git_hash}");

    // outdir: <workspace>/target/aarch64-linux-android/release-smaller/build/...
    let out_dir = std::env::var("OUT_DIR").unwrap_or_default();
    let profile =
        out_dir.split("/target/").nth(1).unwrap_or_default().split('/').nth(1).unwrap_or("unknown");

    println!("cargo:rustc-env=BUILD_PROFILE={profile}");

    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=.git/refs");
}
