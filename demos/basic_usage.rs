//! Basic logger usage example
//!
//! Demonstrates console logging, per-transport minimum levels and the
//! logging macros.
//!
//! Run with: cargo run --example basic_usage

use rust_log_dispatch::prelude::*;
use rust_log_dispatch::{info, warn};
use std::sync::Arc;

fn main() -> Result<()> {
    println!("=== Rust Log Dispatch - Basic Usage Example ===\n");

    let logger = Logger::new();

    // Everything from DEBUG up goes to stdout
    logger.add_transport(Arc::new(ConsoleTransport::new(Level::DEBUG)));

    println!("1. Logging at different levels:");
    logger.debug("This is a debug message");
    logger.info("This is an info message");
    logger.warn("This is a warning message");
    logger.error("This is an error message");

    println!("\n2. A second transport with its own minimum level:");
    let errors: Arc<dyn Transport> = Arc::new(ConsoleTransport::stderr(Level::ERROR));
    logger.add_transport(errors.clone());
    logger.info("Only on stdout");
    logger.error("On stdout and stderr");
    logger.remove_transport(&errors);

    println!("\n3. Logging macros:");
    let port = 8080;
    info!(logger, "Server listening on port {}", port);
    warn!(logger, "{} connections pending", 3);

    println!("\n4. Structured formats on a per-call basis:");
    logger
        .entry()
        .field("user", "cesar")
        .formatter(Arc::new(JsonFormatter::new()))
        .info("Signed in");
    logger
        .with_formatter(Arc::new(LogfmtFormatter::new()))
        .warn("Quota at 90%");

    logger.close()?;
    println!("\n=== Example completed successfully! ===");

    Ok(())
}
