fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-env-changed=OPENRF_LIB_DIR");

    // Only the firmware build needs the ESP-IDF environment; host test
    // builds run without the toolchain installed.
    #[cfg(feature = "espidf")]
    {
        embuild::espidf::sysenv::output();

        // The OpenRF MAC library ships as a prebuilt static archive.
        if let Ok(dir) = std::env::var("OPENRF_LIB_DIR") {
            println!("cargo:rustc-link-search=native={dir}");
            println!("cargo:rustc-link-lib=static=openrf");
        }
    }
}
