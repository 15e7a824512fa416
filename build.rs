use std::env;

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-changed=native/kernels.c");

    if env::var_os("CARGO_FEATURE_NATIVE").is_none() {
        return;
    }

    cc::Build::new()
        .file("native/kernels.c")
        .opt_level(3)
        .flag_if_supported("-std=c99")
        // Keep a*b+c as two roundings so results match the CPU backend.
        .flag_if_supported("-ffp-contract=off")
        .warnings(true)
        .compile("bnnkernels");
}
