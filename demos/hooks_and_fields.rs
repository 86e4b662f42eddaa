//! Hooks and fields example
//!
//! Demonstrates before/after/error hooks, field-bound loggers, request
//! contexts and stack trace capture.
//!
//! Run with: cargo run --example hooks_and_fields

use rust_log_dispatch::prelude::*;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

struct FlakyTransport;

impl Transport for FlakyTransport {
    fn write_log(&self, _event: &Event) -> Result<()> {
        Err(LoggerError::writer("remote collector unavailable"))
    }

    fn min_level(&self) -> Level {
        Level::WARN
    }

    fn name(&self) -> &str {
        "flaky"
    }
}

fn main() -> Result<()> {
    println!("=== Rust Log Dispatch - Hooks and Fields Example ===\n");

    let sequence = Arc::new(AtomicU64::new(0));
    let seq = sequence.clone();

    let logger = Logger::builder()
        .transport(Arc::new(ConsoleTransport::new(Level::DEBUG)))
        .transport(Arc::new(FlakyTransport))
        .before_hook(move |event| {
            event.fields.insert("seq", seq.fetch_add(1, Ordering::Relaxed));
        })
        .error_hook(|event, transport, error| {
            eprintln!(
                "   transport '{}' dropped \"{}\": {}",
                transport.name(),
                event.message,
                error
            );
        })
        .build();

    println!("1. Before-hooks enrich every event:");
    logger.info("Service starting");

    println!("\n2. Field-bound loggers:");
    let auth = logger.with_fields(fields! { "service" => "auth" });
    auth.info("Token issued");
    auth.log_with_fields(Level::INFO, "Token refreshed", fields! { "user" => "cesar" });

    let db = auth.with_fields(fields! { "component" => "db" });
    db.debug("Pool warmed");

    println!("\n3. Request contexts carry a trace id:");
    let ctx = RequestContext::new().with_typed(CtxKey::TRACE_ID, "4bf92f3577b34da6");
    logger.info_ctx(&ctx, "Handling request", Some(fields! { "path" => "/login" }));

    println!("\n4. Failures go to error-hooks, never to the caller:");
    logger.warn("Disk usage high");

    println!("\n5. Stack traces for errors:");
    logger.enable_stacktrace([Level::ERROR]);
    logger.error("Unexpected state");
    logger.disable_stacktrace();

    let after = logger.add_after_hook(|event| {
        println!("   after-hook saw [{}] {}", event.level_name, event.message);
    });
    logger.info("Observed");
    logger.remove_hook(after);

    println!("\nMetrics:");
    println!("   events dispatched: {}", logger.metrics().events_dispatched());
    println!("   writes failed:     {}", logger.metrics().writes_failed());

    logger.close()?;
    println!("\n=== Example completed successfully! ===");

    Ok(())
}
