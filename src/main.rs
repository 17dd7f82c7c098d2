//! # picam-darkroom CLI
//!
//! Command-line companion for the Pi camera core.
//!
//! ## Usage
//! ```bash
//! picam-darkroom library list --json
//! RUST_LOG=debug picam-darkroom exposure describe --iso-index 4 --shutter-index 0
//! ```

mod cli;

use picam_darkroom::Result;

fn main() -> Result<()> {
    picam_darkroom::init_tracing();
    cli::run()
}
