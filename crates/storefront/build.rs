//! Build script for the storefront crate.
//!
//! Fingerprints static assets so they can be served with immutable cache
//! headers. Each asset is copied to `static/derived/` with an 8-character
//! content hash in its file name, and the hash is exposed to the crate as a
//! compile-time environment variable.

use std::env;
use std::fs;
use std::path::Path;

use sha2::{Digest, Sha256};

/// (source path under `static/`, env var, derived file stem, extension)
const ASSETS: &[(&str, &str, &str, &str)] = &[
    ("css/main.css", "CSS_HASH", "main", "css"),
    ("js/router.js", "ROUTER_JS_HASH", "router", "js"),
];

fn main() {
    let manifest_dir =
        env::var("CARGO_MANIFEST_DIR").expect("CARGO_MANIFEST_DIR must be set by Cargo");
    let static_dir = Path::new(&manifest_dir).join("static");
    let derived_dir = static_dir.join("derived");

    for &(source, env_var, stem, ext) in ASSETS {
        fingerprint(&static_dir.join(source), &derived_dir, env_var, stem, ext);
    }
}

fn fingerprint(source: &Path, derived_dir: &Path, env_var: &str, stem: &str, ext: &str) {
    println!("cargo:rerun-if-changed={}", source.display());

    let content = match fs::read(source) {
        Ok(content) => content,
        Err(e) => {
            println!("cargo:warning=Could not read {}: {e}", source.display());
            println!("cargo:rustc-env={env_var}=");
            return;
        }
    };

    let hash = format!("{:x}", Sha256::digest(&content));
    let short_hash = &hash[..8];
    println!("cargo:rustc-env={env_var}={short_hash}");

    fs::create_dir_all(derived_dir).expect("Failed to create derived asset directory");
    let derived_path = derived_dir.join(format!("{stem}.{short_hash}.{ext}"));
    fs::copy(source, &derived_path).expect("Failed to copy asset to derived directory");
}
