use std::env;
use std::path::Path;

const SEARCH_DIRS: &[&str] = &[
    "/usr/lib/x86_64-linux-gnu",
    "/lib/x86_64-linux-gnu",
    "/usr/lib/aarch64-linux-gnu",
    "/lib/aarch64-linux-gnu",
    "/usr/lib64",
    "/usr/lib",
    "/lib",
    "/usr/local/lib",
];

/// Links against the host libpam. Distributions that ship only the
/// runtime package provide `libpam.so.0` without the `libpam.so` dev
/// symlink the linker wants, so recreate that symlink in OUT_DIR.
fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    for dir in SEARCH_DIRS {
        if Path::new(dir).join("libpam.so").exists() {
            println!("cargo:rustc-link-lib=pam");
            return;
        }
    }

    #[cfg(unix)]
    for dir in SEARCH_DIRS {
        let runtime = Path::new(dir).join("libpam.so.0");
        if runtime.exists() {
            let out_dir = env::var("OUT_DIR").expect("OUT_DIR not set");
            let link = Path::new(&out_dir).join("libpam.so");
            if !link.exists() {
                std::os::unix::fs::symlink(&runtime, &link)
                    .expect("failed to symlink libpam.so.0");
            }
            println!("cargo:rustc-link-search=native={out_dir}");
            println!("cargo:rustc-link-lib=pam");
            return;
        }
    }

    // No probe hit; let the linker search its default paths.
    println!("cargo:rustc-link-lib=pam");
}
