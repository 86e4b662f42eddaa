//! Field-bound logger views

use super::{
    context::ContextLookup,
    fields::Fields,
    level::Level,
    logger::{DispatchOptions, Logger},
};

/// A view over a [`Logger`] that adds a fixed set of fields to every event
///
/// The view owns no transports or hooks. Call-site fields win over bound
/// fields on collision, merging nested maps key by key.
///
/// # Example
///
/// ```
/// use rust_log_dispatch::prelude::*;
/// use std::sync::Arc;
///
/// let buffer = SharedBuffer::new();
/// let logger = Logger::new();
/// logger.add_transport(Arc::new(
///     WriterTransport::new(buffer.clone(), Level::INFO).with_formatter(Arc::new(JsonFormatter::new())),
/// ));
///
/// let auth = logger.with_fields(fields! { "service" => "auth" });
/// auth.info("token issued");
///
/// assert!(buffer.contents().contains("\"service\":\"auth\""));
/// ```
#[derive(Debug, Clone)]
pub struct FieldLogger {
    parent: Logger,
    fields: Fields,
}

impl FieldLogger {
    pub(crate) fn new(parent: Logger, fields: Fields) -> Self {
        Self { parent, fields }
    }

    /// Fields bound to this view
    pub fn fields(&self) -> &Fields {
        &self.fields
    }

    pub fn parent(&self) -> &Logger {
        &self.parent
    }

    /// Derive a further view; `fields` win over the ones already bound
    pub fn with_fields(&self, fields: Fields) -> FieldLogger {
        FieldLogger::new(self.parent.clone(), self.fields.merged(fields))
    }

    fn bound_with(&self, call_site: Option<Fields>) -> Fields {
        match call_site {
            Some(fields) => self.fields.merged(fields),
            None => self.fields.clone(),
        }
    }

    pub fn log(&self, level: Level, message: impl Into<String>) {
        self.log_with_fields(level, message, Fields::new());
    }

    pub fn log_with_fields(&self, level: Level, message: impl Into<String>, fields: Fields) {
        let merged = self.bound_with(Some(fields));
        self.parent
            .dispatch(level, message.into(), DispatchOptions::with_fields(Some(merged)));
    }

    pub fn debug(&self, message: impl Into<String>) {
        self.log(Level::DEBUG, message);
    }

    pub fn info(&self, message: impl Into<String>) {
        self.log(Level::INFO, message);
    }

    pub fn warn(&self, message: impl Into<String>) {
        self.log(Level::WARN, message);
    }

    pub fn error(&self, message: impl Into<String>) {
        self.log(Level::ERROR, message);
    }

    pub fn log_ctx(
        &self,
        ctx: &dyn ContextLookup,
        level: Level,
        message: impl Into<String>,
        fields: Option<Fields>,
    ) {
        let merged = self.bound_with(fields);
        self.parent
            .dispatch(level, message.into(), DispatchOptions::with_context(ctx, Some(merged)));
    }

    pub fn debug_ctx(&self, ctx: &dyn ContextLookup, message: impl Into<String>, fields: Option<Fields>) {
        self.log_ctx(ctx, Level::DEBUG, message, fields);
    }

    pub fn info_ctx(&self, ctx: &dyn ContextLookup, message: impl Into<String>, fields: Option<Fields>) {
        self.log_ctx(ctx, Level::INFO, message, fields);
    }

    pub fn warn_ctx(&self, ctx: &dyn ContextLookup, message: impl Into<String>, fields: Option<Fields>) {
        self.log_ctx(ctx, Level::WARN, message, fields);
    }

    pub fn error_ctx(&self, ctx: &dyn ContextLookup, message: impl Into<String>, fields: Option<Fields>) {
        self.log_ctx(ctx, Level::ERROR, message, fields);
    }

    /// See [`Logger::fatal`]
    pub fn fatal(&self, message: impl Into<String>, fields: Option<Fields>) -> ! {
        self.parent.fatal(message, Some(self.bound_with(fields)))
    }

    /// See [`Logger::panic`]
    pub fn panic(&self, message: impl Into<String>, fields: Option<Fields>) -> ! {
        self.parent.panic(message, Some(self.bound_with(fields)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{error::Result, event::Event, transport::Transport};
    use parking_lot::Mutex;
    use std::sync::Arc;

    #[derive(Default)]
    struct Recording {
        events: Mutex<Vec<Event>>,
    }

    impl Transport for Recording {
        fn write_log(&self, event: &Event) -> Result<()> {
            self.events.lock().push(event.clone());
            Ok(())
        }

        fn min_level(&self) -> Level {
            Level::DEBUG
        }
    }

    fn logger_with_recording() -> (Logger, Arc<Recording>) {
        let logger = Logger::new();
        let transport = Arc::new(Recording::default());
        logger.add_transport(transport.clone());
        (logger, transport)
    }

    #[test]
    fn test_bound_fields_are_added() {
        let (logger, transport) = logger_with_recording();
        logger
            .with_fields(Fields::new().with_field("service", "auth"))
            .info("x");

        let events = transport.events.lock();
        assert_eq!(events[0].fields.get("service"), Some(&"auth".into()));
    }

    #[test]
    fn test_call_site_fields_win() {
        let (logger, transport) = logger_with_recording();
        let view = logger.with_fields(
            Fields::new()
                .with_field("service", "auth")
                .with_field("region", "eu"),
        );
        view.log_with_fields(Level::INFO, "x", Fields::new().with_field("region", "us"));

        let events = transport.events.lock();
        assert_eq!(events[0].fields.get("service"), Some(&"auth".into()));
        assert_eq!(events[0].fields.get("region"), Some(&"us".into()));
        assert_eq!(view.fields().get("region"), Some(&"eu".into()));
    }

    #[test]
    fn test_nested_maps_merge_recursively() {
        let (logger, transport) = logger_with_recording();
        let bound = Fields::new().with_field(
            "a",
            Fields::new().with_field("x", 0).with_field("z", 9),
        );
        let call = Fields::new().with_field(
            "a",
            Fields::new().with_field("x", 1).with_field("y", 2),
        );
        logger.with_fields(bound).log_with_fields(Level::INFO, "nested", call);

        let events = transport.events.lock();
        let a = events[0].fields.get("a").and_then(|v| v.as_map()).cloned().unwrap_or_default();
        assert_eq!(a.get("x"), Some(&1.into()));
        assert_eq!(a.get("y"), Some(&2.into()));
        assert_eq!(a.get("z"), Some(&9.into()));
    }

    #[test]
    fn test_views_are_independent() {
        let (logger, transport) = logger_with_recording();
        let auth = logger.with_fields(Fields::new().with_field("service", "auth"));
        let billing = logger.with_fields(Fields::new().with_field("service", "billing"));
        let nested = auth.with_fields(Fields::new().with_field("component", "tokens"));

        auth.info("a");
        billing.info("b");
        nested.info("c");
        logger.info("d");

        let events = transport.events.lock();
        assert_eq!(events[0].fields.get("service"), Some(&"auth".into()));
        assert_eq!(events[1].fields.get("service"), Some(&"billing".into()));
        assert_eq!(events[2].fields.get("service"), Some(&"auth".into()));
        assert_eq!(events[2].fields.get("component"), Some(&"tokens".into()));
        assert!(events[3].fields.is_empty());
        assert!(!auth.fields().contains_key("component"));
    }

    #[test]
    fn test_view_follows_parent_configuration() {
        let (logger, transport) = logger_with_recording();
        let view = logger.with_fields(Fields::new().with_field("k", "v"));
        logger.add_before_hook(|event| {
            event.fields.insert("hooked", true);
        });

        view.warn("after hook added");

        assert!(transport.events.lock()[0].fields.contains_key("hooked"));
    }
}
