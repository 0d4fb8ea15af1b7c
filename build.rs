//! Puts `memory.x` on the linker search path of the firmware build.

use std::env;
use std::fs::File;
use std::io::Write;
use std::path::PathBuf;

fn main() {
    let out = PathBuf::from(env::var_os("OUT_DIR").unwrap());
    File::create(out.join("memory.x"))
        .unwrap()
        .write_all(include_bytes!("memory.x"))
        .unwrap();
    println!("cargo:rustc-link-search={}", out.display());

    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-env-changed=ATS02_DEV_EUI");
    println!("cargo:rerun-if-env-changed=ATS02_APP_EUI");
    println!("cargo:rerun-if-env-changed=ATS02_DEV_ADDR");
    println!("cargo:rerun-if-env-changed=ATS02_APP_KEY");
    println!("cargo:rerun-if-env-changed=ATS02_NWK_S_KEY");
    println!("cargo:rerun-if-env-changed=ATS02_APP_S_KEY");
}
