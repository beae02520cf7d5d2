use chrono::Utc;
use std::env;
use std::fs;
use std::path::Path;
use std::process::Command;

fn main() {
    let out_dir = env::var_os("OUT_DIR").expect("OUT_DIR is set by cargo");
    let manifest_dir = env::var("CARGO_MANIFEST_DIR").expect("CARGO_MANIFEST_DIR is set by cargo");
    let manifest = Path::new(&manifest_dir).join("Cargo.toml");

    // [package.metadata] component_api_version = YYYYMMDD
    let component_api_version = fs::read_to_string(&manifest)
        .ok()
        .and_then(|content| content.parse::<toml::Table>().ok())
        .and_then(|table| {
            table
                .get("package")?
                .get("metadata")?
                .get("component_api_version")?
                .as_integer()
        })
        .map(|v| v.to_string())
        .unwrap_or_else(|| "unknown".to_string());

    let git_hash = Command::new("git")
        .args(["rev-parse", "--short", "HEAD"])
        .output()
        .ok()
        .filter(|output| output.status.success())
        .and_then(|output| String::from_utf8(output.stdout).ok())
        .map(|hash| hash.trim().to_string())
        .unwrap_or_else(|| "unknown".to_string());

    let build_time = Utc::now().format("%Y-%m-%d %H:%M:%S UTC");

    let generated = format!(
        "pub const COMPONENT_API_VERSION: &str = \"{component_api_version}\";\n\
         pub const BUILD_TIME: &str = \"{build_time}\";\n\
         pub const GIT_HASH: &str = \"{git_hash}\";\n"
    );
    fs::write(Path::new(&out_dir).join("version.rs"), generated)
        .expect("failed to write version.rs");

    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-changed=Cargo.toml");
    println!("cargo:rerun-if-changed=.git/HEAD");
}
