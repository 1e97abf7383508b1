//! genrec demo entry point
//!
//! Runs the customer round-trip against `customer-generic.grc` in the
//! current directory. Takes no arguments.

use std::io;
use std::path::Path;

use genrec::demo;

fn main() {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    if let Err(e) = demo::run(&mut out, Path::new(demo::OUTPUT_FILE)) {
        eprintln!("[{}] {}", e.code(), e);
        std::process::exit(1);
    }
}
