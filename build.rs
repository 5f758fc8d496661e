fn main() {
    // ── macOS: embed Info.plist so CoreBluetooth lets the CLI scan ───────────
    //
    // CBCentralManager stays "unauthorised" for a bare binary unless it
    // carries NSBluetoothAlwaysUsageDescription.  Without an app bundle the
    // plist has to live in the __TEXT,__info_plist section of the Mach-O
    // image, which the linker creates via `-sectcreate`.
    //
    // `CARGO_CFG_TARGET_OS` is the target, not the host, so cross builds
    // for macOS pick this up as well.
    if std::env::var("CARGO_CFG_TARGET_OS").as_deref() == Ok("macos") {
        let dir = std::env::var("CARGO_MANIFEST_DIR")
            .expect("CARGO_MANIFEST_DIR must be set by Cargo");

        let plist = format!("{dir}/Info.plist");

        for arg in ["-sectcreate", "__TEXT", "__info_plist", plist.as_str()] {
            println!("cargo:rustc-link-arg-bins={arg}");
        }

        println!("cargo:rerun-if-changed=Info.plist");
    }
}
