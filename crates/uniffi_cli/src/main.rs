//! Binding generator for the scanner library
//!
//! ```sh
//! cargo build --release
//! cargo run -p uniffi_cli -- generate --library target/release/libbarcode_scanner.so \
//!     --language kotlin --out-dir bindings/kotlin
//! ```

fn main() {
    uniffi::uniffi_bindgen_main()
}
