//! Binary entry point for `manifest-fixer`.

use std::process;

fn main() {
    if let Err(e) = manifest_fixer::run() {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}
