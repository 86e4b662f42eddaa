//! File logging example
//!
//! Demonstrates logging to the console and to plain and rotating files at
//! the same time, then building the same setup from a YAML document.
//!
//! Run with: cargo run --example file_logging

use rust_log_dispatch::prelude::*;
use rust_log_dispatch::RotationPolicy;
use std::sync::Arc;

fn main() -> Result<()> {
    println!("=== Rust Log Dispatch - File Logging Example ===\n");

    let logger = Logger::new();
    logger.add_transport(Arc::new(ConsoleTransport::new(Level::INFO)));
    logger.add_transport(Arc::new(FileTransport::open("application.log", Level::DEBUG)?));
    logger.add_transport(Arc::new(
        RotatingFileTransport::with_policy(
            "rotating.log",
            Level::DEBUG,
            RotationPolicy::new().with_max_size(4 * 1024).with_max_backups(3),
        )?
        .with_formatter(Arc::new(JsonFormatter::new())),
    ));

    println!("1. Logging to console and files:");
    logger.info("Application started");
    logger.debug("Loading configuration...");
    logger.warn("Using default settings for some options");
    logger.error("Failed to load optional plugin");

    println!("\n2. Enough volume to rotate:");
    for i in 1..=200 {
        logger.log_with_fields(Level::DEBUG, "Processing item", fields! { "item" => i });
    }
    logger.info("Processing complete");

    logger.close()?;
    println!("\nWrote application.log and rotating.log (with rotating.log.1..3)");

    #[cfg(feature = "yaml")]
    {
        println!("\n3. The same kind of setup from configuration:");
        let config = LoggerConfig::from_yaml_str(
            r#"
transports:
  - type: console
    level: warn
  - type: rotating_file
    level: debug
    formatter: logfmt
    options:
      path: configured.log
      max_size_mb: 1
      max_backups: 2
      compress: true
"#,
        )?;
        let configured = Logger::from_config(&config)?;
        configured.warn("Built from YAML");
        configured.close()?;
    }

    println!("\n=== Example completed successfully! ===");

    Ok(())
}
