//! Fortran kernel extraction driver.
//!
//! Reads a symbol index and the parser's kernel document (both JSON), runs
//! scope resolution and kernel assembly, and writes the native and
//! interface-module contexts to `<prefix>.kernels.json` for the emitter.

mod config;
mod error;
mod pipeline;

pub use config::{ConfigError, RunConfig};
pub use error::{DriverError, EXIT_FAILURE};
pub use pipeline::{read_index, read_kernels, run, Invocation, KernelDocument, OUTPUT_SUFFIX};

use std::sync::Once;

static TRACING_INIT: Once = Once::new();

/// Install the tracing subscriber once.
///
/// Filter directives come from `FKC_LOG`, then `RUST_LOG`; with neither
/// set no subscriber is installed.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{prelude::*, EnvFilter};

        let directives = std::env::var("FKC_LOG").or_else(|_| std::env::var("RUST_LOG"));
        if let Ok(directives) = directives {
            tracing_subscriber::registry()
                .with(
                    tracing_tree::HierarchicalLayer::new(2)
                        .with_targets(true)
                        .with_writer(std::io::stderr),
                )
                .with(EnvFilter::new(directives))
                .init();
        }
    });
}
