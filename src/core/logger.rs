//! Dispatch engine
//!
//! Every log call takes a snapshot of the logger's configuration, assembles
//! one [`Event`], runs before-hooks, writes the event to each eligible
//! transport in registration order and finally runs after-hooks. The call
//! returns only after every transport in its snapshot has been attempted.
//!
//! Configuration lives in copy-on-write lists behind a single `RwLock`. The
//! lock is held only long enough to clone a handful of `Arc`s, so slow
//! transports never block configuration changes and configuration changes
//! never block in-flight dispatch.

use super::{
    context::{self, ContextLookup},
    error::{LoggerError, Result},
    event::{BacktraceCapture, Event, StackCapture, TRACE_ID_KEY},
    field_logger::FieldLogger,
    fields::Fields,
    formatter::{render, Formatter},
    hooks::{ErrorHook, Hook, HookId, HookPhase, Registered},
    level::{Level, LevelRegistry},
    metrics::DispatchMetrics,
    transport::Transport,
};
use parking_lot::RwLock;
use std::collections::HashSet;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

/// Which levels get a captured stack trace
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StacktracePolicy {
    pub enabled: bool,
    pub levels: HashSet<Level>,
}

impl StacktracePolicy {
    #[must_use]
    pub fn disabled() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn for_levels<I: IntoIterator<Item = Level>>(levels: I) -> Self {
        Self {
            enabled: true,
            levels: levels.into_iter().collect(),
        }
    }

    #[must_use]
    pub fn applies(&self, level: Level) -> bool {
        self.enabled && self.levels.contains(&level)
    }
}

#[derive(Default)]
struct DispatchConfig {
    transports: Arc<Vec<Arc<dyn Transport>>>,
    before_hooks: Arc<Vec<Registered<Hook>>>,
    after_hooks: Arc<Vec<Registered<Hook>>>,
    error_hooks: Arc<Vec<Registered<ErrorHook>>>,
    stacktrace: Arc<StacktracePolicy>,
    next_hook_id: u64,
}

impl DispatchConfig {
    fn next_id(&mut self) -> HookId {
        self.next_hook_id += 1;
        HookId(self.next_hook_id)
    }
}

/// Point-in-time view of the configuration used by one dispatch
struct Snapshot {
    transports: Arc<Vec<Arc<dyn Transport>>>,
    before_hooks: Arc<Vec<Registered<Hook>>>,
    after_hooks: Arc<Vec<Registered<Hook>>>,
    error_hooks: Arc<Vec<Registered<ErrorHook>>>,
    stacktrace: Arc<StacktracePolicy>,
}

/// Per-call options beyond level and message
#[derive(Default)]
pub(crate) struct DispatchOptions<'a> {
    pub(crate) fields: Option<Fields>,
    pub(crate) formatter: Option<Arc<dyn Formatter>>,
    pub(crate) context: Option<&'a dyn ContextLookup>,
    pub(crate) force_stacktrace: bool,
}

impl<'a> DispatchOptions<'a> {
    pub(crate) fn with_fields(fields: Option<Fields>) -> Self {
        Self {
            fields,
            ..Self::default()
        }
    }

    pub(crate) fn with_context(ctx: &'a dyn ContextLookup, fields: Option<Fields>) -> Self {
        Self {
            fields,
            context: Some(ctx),
            ..Self::default()
        }
    }

    pub(crate) fn terminal(fields: Option<Fields>) -> Self {
        Self {
            fields,
            force_stacktrace: true,
            ..Self::default()
        }
    }
}

/// Synchronous, thread-safe logger
///
/// `Logger` is a handle: clones share transports, hooks, registry and
/// metrics.
///
/// # Example
///
/// ```
/// use rust_log_dispatch::prelude::*;
/// use std::sync::Arc;
///
/// let buffer = SharedBuffer::new();
/// let logger = Logger::new();
/// logger.add_transport(Arc::new(WriterTransport::new(buffer.clone(), Level::INFO)));
///
/// logger.debug("not delivered");
/// logger.info("delivered");
///
/// assert!(!buffer.contents().contains("not delivered"));
/// assert!(buffer.contents().contains("[INFO] delivered"));
/// ```
#[derive(Clone)]
pub struct Logger {
    config: Arc<RwLock<DispatchConfig>>,
    registry: Arc<LevelRegistry>,
    metrics: Arc<DispatchMetrics>,
    stack_capture: Arc<dyn StackCapture>,
}

impl Default for Logger {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Logger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let config = self.config.read();
        f.debug_struct("Logger")
            .field("transports", &config.transports.len())
            .field("before_hooks", &config.before_hooks.len())
            .field("after_hooks", &config.after_hooks.len())
            .field("error_hooks", &config.error_hooks.len())
            .field("stacktrace", &*config.stacktrace)
            .finish()
    }
}

impl Logger {
    /// Logger with no transports, naming levels with the process-wide registry
    #[must_use]
    pub fn new() -> Self {
        Self::with_registry(Arc::clone(LevelRegistry::global()))
    }

    #[must_use]
    pub fn with_registry(registry: Arc<LevelRegistry>) -> Self {
        Self {
            config: Arc::new(RwLock::new(DispatchConfig::default())),
            registry,
            metrics: Arc::new(DispatchMetrics::new()),
            stack_capture: Arc::new(BacktraceCapture),
        }
    }

    /// Create a builder for Logger
    ///
    /// # Example
    /// ```
    /// use rust_log_dispatch::prelude::*;
    ///
    /// let logger = Logger::builder()
    ///     .stacktrace_levels([Level::ERROR])
    ///     .build();
    /// assert_eq!(logger.transport_count(), 0);
    /// ```
    #[must_use]
    pub fn builder() -> LoggerBuilder {
        LoggerBuilder::new()
    }

    pub fn registry(&self) -> &Arc<LevelRegistry> {
        &self.registry
    }

    pub fn metrics(&self) -> &DispatchMetrics {
        &self.metrics
    }

    // ---- transports ----

    /// Append a transport to the fan-out list
    ///
    /// The same transport may be added more than once; each entry receives
    /// its own write.
    pub fn add_transport(&self, transport: Arc<dyn Transport>) {
        let mut config = self.config.write();
        Arc::make_mut(&mut config.transports).push(transport);
    }

    /// Remove the first entry that is the same allocation as `transport`
    pub fn remove_transport(&self, transport: &Arc<dyn Transport>) -> bool {
        let mut config = self.config.write();
        let Some(index) = config
            .transports
            .iter()
            .position(|t| Arc::ptr_eq(t, transport))
        else {
            return false;
        };
        Arc::make_mut(&mut config.transports).remove(index);
        true
    }

    /// Current transport list, in fan-out order
    pub fn transports(&self) -> Vec<Arc<dyn Transport>> {
        self.config.read().transports.as_ref().clone()
    }

    pub fn transport_count(&self) -> usize {
        self.config.read().transports.len()
    }

    // ---- hooks ----

    pub fn add_before_hook<F>(&self, hook: F) -> HookId
    where
        F: Fn(&mut Event) + Send + Sync + 'static,
    {
        self.add_hook(HookPhase::Before, Arc::new(hook))
    }

    pub fn add_after_hook<F>(&self, hook: F) -> HookId
    where
        F: Fn(&mut Event) + Send + Sync + 'static,
    {
        self.add_hook(HookPhase::After, Arc::new(hook))
    }

    pub fn add_hook(&self, phase: HookPhase, hook: Hook) -> HookId {
        let mut config = self.config.write();
        let id = config.next_id();
        let list = match phase {
            HookPhase::Before => &mut config.before_hooks,
            HookPhase::After => &mut config.after_hooks,
        };
        Arc::make_mut(list).push(Registered { id, hook });
        id
    }

    /// Register a callback fired once per failing transport write
    pub fn add_error_hook<F>(&self, hook: F) -> HookId
    where
        F: Fn(&Event, &Arc<dyn Transport>, &LoggerError) + Send + Sync + 'static,
    {
        let mut config = self.config.write();
        let id = config.next_id();
        Arc::make_mut(&mut config.error_hooks).push(Registered {
            id,
            hook: Arc::new(hook),
        });
        id
    }

    /// Remove a hook from whichever list holds it
    pub fn remove_hook(&self, id: HookId) -> bool {
        let mut config = self.config.write();
        if let Some(index) = config.before_hooks.iter().position(|h| h.id == id) {
            Arc::make_mut(&mut config.before_hooks).remove(index);
            return true;
        }
        if let Some(index) = config.after_hooks.iter().position(|h| h.id == id) {
            Arc::make_mut(&mut config.after_hooks).remove(index);
            return true;
        }
        if let Some(index) = config.error_hooks.iter().position(|h| h.id == id) {
            Arc::make_mut(&mut config.error_hooks).remove(index);
            return true;
        }
        false
    }

    // ---- stack traces ----

    /// Capture a stack trace for events logged at any of `levels`
    pub fn enable_stacktrace<I: IntoIterator<Item = Level>>(&self, levels: I) {
        self.set_stacktrace_policy(StacktracePolicy::for_levels(levels));
    }

    pub fn disable_stacktrace(&self) {
        self.set_stacktrace_policy(StacktracePolicy::disabled());
    }

    pub fn set_stacktrace_policy(&self, policy: StacktracePolicy) {
        self.config.write().stacktrace = Arc::new(policy);
    }

    pub fn stacktrace_policy(&self) -> StacktracePolicy {
        self.config.read().stacktrace.as_ref().clone()
    }

    // ---- logging ----

    pub fn log(&self, level: Level, message: impl Into<String>) {
        self.dispatch(level, message.into(), DispatchOptions::default());
    }

    pub fn log_with_fields(&self, level: Level, message: impl Into<String>, fields: Fields) {
        self.dispatch(level, message.into(), DispatchOptions::with_fields(Some(fields)));
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

    /// Log with a trace identifier taken from `ctx`, if it carries one
    pub fn log_ctx(
        &self,
        ctx: &dyn ContextLookup,
        level: Level,
        message: impl Into<String>,
        fields: Option<Fields>,
    ) {
        self.dispatch(level, message.into(), DispatchOptions::with_context(ctx, fields));
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

    /// Log at ERROR with a stack trace, close every transport, exit with status 1
    pub fn fatal(&self, message: impl Into<String>, fields: Option<Fields>) -> ! {
        self.dispatch(Level::ERROR, message.into(), DispatchOptions::terminal(fields));
        self.shutdown_for_exit();
        std::process::exit(1)
    }

    /// Log at ERROR with a stack trace, then panic with the message
    pub fn panic(&self, message: impl Into<String>, fields: Option<Fields>) -> ! {
        let message = message.into();
        self.dispatch(Level::ERROR, message.clone(), DispatchOptions::terminal(fields));
        panic!("{}", message)
    }

    /// Start a log call with per-call options
    ///
    /// # Example
    ///
    /// ```
    /// use rust_log_dispatch::prelude::*;
    /// use std::sync::Arc;
    ///
    /// let buffer = SharedBuffer::new();
    /// let logger = Logger::new();
    /// logger.add_transport(Arc::new(WriterTransport::new(buffer.clone(), Level::DEBUG)));
    ///
    /// logger
    ///     .entry()
    ///     .field("request_id", "r-1")
    ///     .formatter(Arc::new(JsonFormatter::new()))
    ///     .info("handled");
    ///
    /// assert!(buffer.contents().contains("\"request_id\":\"r-1\""));
    /// ```
    pub fn entry(&self) -> EntryBuilder<'_> {
        EntryBuilder::new(self)
    }

    /// Shorthand for `entry().formatter(formatter)`
    pub fn with_formatter(&self, formatter: Arc<dyn Formatter>) -> EntryBuilder<'_> {
        self.entry().formatter(formatter)
    }

    /// Derived logger that merges `fields` into every event
    pub fn with_fields(&self, fields: Fields) -> FieldLogger {
        FieldLogger::new(self.clone(), fields)
    }

    /// Close every transport that holds a releasable resource
    ///
    /// All closeable transports are attempted; the first error is returned.
    pub fn close(&self) -> Result<()> {
        let transports = Arc::clone(&self.config.read().transports);

        let mut first_error = None;
        for transport in transports.iter() {
            let Some(closeable) = transport.closeable() else {
                continue;
            };
            if let Err(e) = closeable.close() {
                first_error.get_or_insert(e);
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    fn shutdown_for_exit(&self) {
        if let Err(e) = self.close() {
            eprintln!("[LOGGER ERROR] Failed to close transports before exit: {}", e);
        }
    }

    fn snapshot(&self) -> Snapshot {
        let config = self.config.read();
        Snapshot {
            transports: Arc::clone(&config.transports),
            before_hooks: Arc::clone(&config.before_hooks),
            after_hooks: Arc::clone(&config.after_hooks),
            error_hooks: Arc::clone(&config.error_hooks),
            stacktrace: Arc::clone(&config.stacktrace),
        }
    }

    pub(crate) fn dispatch(&self, level: Level, message: String, options: DispatchOptions<'_>) {
        let snapshot = self.snapshot();

        let mut event = Event::with_registry(&self.registry, level, message);
        if let Some(fields) = options.fields {
            event.fields.merge(fields);
        }
        if options.force_stacktrace || snapshot.stacktrace.applies(level) {
            event.set_stacktrace(self.stack_capture.capture());
        }
        if let Some(trace_id) = options.context.and_then(context::trace_id) {
            event.fields.insert(TRACE_ID_KEY, trace_id);
        }

        for registered in snapshot.before_hooks.iter() {
            (registered.hook)(&mut event);
        }

        // Encoded once, on first use, for the per-call formatter override
        let mut override_bytes: Option<Vec<u8>> = None;

        for transport in snapshot.transports.iter() {
            if event.level < transport.min_level() {
                continue;
            }
            if !transport.accepts(&event) {
                self.metrics.record_filtered();
                continue;
            }

            self.metrics.record_write();
            let result = catch_unwind(AssertUnwindSafe(|| match &options.formatter {
                Some(formatter) => match transport.raw_sink() {
                    Some(sink) => {
                        let bytes = override_bytes
                            .get_or_insert_with(|| render(formatter.as_ref(), &event));
                        sink.write_raw(bytes)
                    }
                    None => transport.write_log(&event),
                },
                None => transport.write_log(&event),
            }));

            let error = match result {
                Ok(Ok(())) => continue,
                Ok(Err(e)) => e,
                Err(panic_info) => {
                    self.metrics.record_panic();
                    LoggerError::panicked(transport.name(), panic_message(panic_info.as_ref()))
                }
            };

            self.metrics.record_failure();
            for registered in snapshot.error_hooks.iter() {
                (registered.hook)(&event, transport, &error);
            }
        }

        for registered in snapshot.after_hooks.iter() {
            (registered.hook)(&mut event);
        }

        self.metrics.record_dispatched();
    }
}

fn panic_message(panic_info: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = panic_info.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic_info.downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown panic".to_string()
    }
}

/// One log call with per-call options
///
/// Created by [`Logger::entry`]. Options only apply to this call; the logger
/// and its transports are never modified.
#[must_use = "an entry does nothing until a level method is called"]
pub struct EntryBuilder<'a> {
    logger: &'a Logger,
    fields: Option<Fields>,
    formatter: Option<Arc<dyn Formatter>>,
    context: Option<&'a dyn ContextLookup>,
}

impl<'a> EntryBuilder<'a> {
    fn new(logger: &'a Logger) -> Self {
        Self {
            logger,
            fields: None,
            formatter: None,
            context: None,
        }
    }

    /// Merge `fields` into this call's field set
    pub fn fields(mut self, fields: Fields) -> Self {
        match self.fields.as_mut() {
            Some(existing) => existing.merge(fields),
            None => self.fields = Some(fields),
        }
        self
    }

    pub fn field(mut self, key: impl Into<String>, value: impl Into<super::fields::FieldValue>) -> Self {
        self.fields.get_or_insert_with(Fields::new).insert(key, value);
        self
    }

    /// Format this call with `formatter` instead of each transport's own
    pub fn formatter(mut self, formatter: Arc<dyn Formatter>) -> Self {
        self.formatter = Some(formatter);
        self
    }

    pub fn context(mut self, ctx: &'a dyn ContextLookup) -> Self {
        self.context = Some(ctx);
        self
    }

    pub fn log(self, level: Level, message: impl Into<String>) {
        let options = DispatchOptions {
            fields: self.fields,
            formatter: self.formatter,
            context: self.context,
            force_stacktrace: false,
        };
        self.logger.dispatch(level, message.into(), options);
    }

    pub fn debug(self, message: impl Into<String>) {
        self.log(Level::DEBUG, message);
    }

    pub fn info(self, message: impl Into<String>) {
        self.log(Level::INFO, message);
    }

    pub fn warn(self, message: impl Into<String>) {
        self.log(Level::WARN, message);
    }

    pub fn error(self, message: impl Into<String>) {
        self.log(Level::ERROR, message);
    }
}

/// Builder for creating a Logger with custom configuration
pub struct LoggerBuilder {
    transports: Vec<Arc<dyn Transport>>,
    before_hooks: Vec<Hook>,
    after_hooks: Vec<Hook>,
    error_hooks: Vec<ErrorHook>,
    stacktrace: StacktracePolicy,
    registry: Option<Arc<LevelRegistry>>,
    stack_capture: Option<Arc<dyn StackCapture>>,
}

impl LoggerBuilder {
    /// Create a new builder with default values
    pub fn new() -> Self {
        Self {
            transports: Vec::new(),
            before_hooks: Vec::new(),
            after_hooks: Vec::new(),
            error_hooks: Vec::new(),
            stacktrace: StacktracePolicy::disabled(),
            registry: None,
            stack_capture: None,
        }
    }

    /// Add a transport
    #[must_use = "builder methods return a new value"]
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transports.push(transport);
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn before_hook<F>(mut self, hook: F) -> Self
    where
        F: Fn(&mut Event) + Send + Sync + 'static,
    {
        self.before_hooks.push(Arc::new(hook));
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn after_hook<F>(mut self, hook: F) -> Self
    where
        F: Fn(&mut Event) + Send + Sync + 'static,
    {
        self.after_hooks.push(Arc::new(hook));
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn error_hook<F>(mut self, hook: F) -> Self
    where
        F: Fn(&Event, &Arc<dyn Transport>, &LoggerError) + Send + Sync + 'static,
    {
        self.error_hooks.push(Arc::new(hook));
        self
    }

    /// Capture stack traces for the given levels
    #[must_use = "builder methods return a new value"]
    pub fn stacktrace_levels<I: IntoIterator<Item = Level>>(mut self, levels: I) -> Self {
        self.stacktrace = StacktracePolicy::for_levels(levels);
        self
    }

    /// Use `registry` instead of the process-wide one
    #[must_use = "builder methods return a new value"]
    pub fn registry(mut self, registry: Arc<LevelRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Replace the default backtrace-based stack capture
    #[must_use = "builder methods return a new value"]
    pub fn stack_capture<S: StackCapture + 'static>(mut self, capture: S) -> Self {
        self.stack_capture = Some(Arc::new(capture));
        self
    }

    /// Build the logger
    pub fn build(self) -> Logger {
        let mut logger = match self.registry {
            Some(registry) => Logger::with_registry(registry),
            None => Logger::new(),
        };
        if let Some(capture) = self.stack_capture {
            logger.stack_capture = capture;
        }

        for transport in self.transports {
            logger.add_transport(transport);
        }
        for hook in self.before_hooks {
            logger.add_hook(HookPhase::Before, hook);
        }
        for hook in self.after_hooks {
            logger.add_hook(HookPhase::After, hook);
        }
        {
            let mut config = logger.config.write();
            for hook in self.error_hooks {
                let id = config.next_id();
                Arc::make_mut(&mut config.error_hooks).push(Registered { id, hook });
            }
        }
        logger.set_stacktrace_policy(self.stacktrace);
        logger
    }
}

impl Default for LoggerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::formatter::JsonFormatter;
    use crate::core::transport::RawSink;
    use parking_lot::Mutex;

    #[derive(Default)]
    struct Recording {
        min_level: Level,
        events: Mutex<Vec<Event>>,
        raw: Mutex<Vec<Vec<u8>>>,
        expose_raw: bool,
    }

    impl Recording {
        fn at(min_level: Level) -> Arc<Self> {
            Arc::new(Self {
                min_level,
                ..Self::default()
            })
        }

        fn messages(&self) -> Vec<String> {
            self.events.lock().iter().map(|e| e.message.clone()).collect()
        }
    }

    impl Transport for Recording {
        fn write_log(&self, event: &Event) -> Result<()> {
            self.events.lock().push(event.clone());
            Ok(())
        }

        fn min_level(&self) -> Level {
            self.min_level
        }

        fn name(&self) -> &str {
            "recording"
        }

        fn raw_sink(&self) -> Option<&dyn RawSink> {
            if self.expose_raw {
                Some(self)
            } else {
                None
            }
        }
    }

    impl RawSink for Recording {
        fn write_raw(&self, bytes: &[u8]) -> Result<()> {
            self.raw.lock().push(bytes.to_vec());
            Ok(())
        }
    }

    struct Failing;

    impl Transport for Failing {
        fn write_log(&self, _event: &Event) -> Result<()> {
            Err(LoggerError::writer("disk on fire"))
        }

        fn min_level(&self) -> Level {
            Level::DEBUG
        }

        fn name(&self) -> &str {
            "failing"
        }
    }

    struct Panicking;

    impl Transport for Panicking {
        fn write_log(&self, _event: &Event) -> Result<()> {
            panic!("transport exploded")
        }

        fn min_level(&self) -> Level {
            Level::DEBUG
        }

        fn name(&self) -> &str {
            "panicking"
        }
    }

    #[test]
    fn test_level_filtering() {
        let logger = Logger::new();
        let transport = Recording::at(Level::WARN);
        logger.add_transport(transport.clone());

        logger.debug("d");
        logger.info("i");
        logger.warn("w");
        logger.error("e");

        assert_eq!(transport.messages(), vec!["w", "e"]);
    }

    #[test]
    fn test_fan_out_order_and_duplicates() {
        let logger = Logger::new();
        let first = Recording::at(Level::DEBUG);
        let first_dyn: Arc<dyn Transport> = first.clone();

        logger.add_transport(first_dyn.clone());
        logger.add_transport(first_dyn.clone());
        assert_eq!(logger.transport_count(), 2);

        logger.info("twice");
        assert_eq!(first.messages().len(), 2);

        assert!(logger.remove_transport(&first_dyn));
        assert_eq!(logger.transport_count(), 1);
        assert!(logger.remove_transport(&first_dyn));
        assert!(!logger.remove_transport(&first_dyn));
    }

    #[test]
    fn test_error_isolation() {
        let logger = Logger::new();
        let healthy = Recording::at(Level::DEBUG);
        logger.add_transport(Arc::new(Failing));
        logger.add_transport(healthy.clone());

        let hook_calls = Arc::new(Mutex::new(Vec::new()));
        for tag in ["first", "second"] {
            let calls = Arc::clone(&hook_calls);
            logger.add_error_hook(move |event, transport, error| {
                calls.lock().push(format!(
                    "{}:{}:{}:{}",
                    tag,
                    transport.name(),
                    event.message,
                    error
                ));
            });
        }

        logger.info("payload");

        assert_eq!(healthy.messages(), vec!["payload"]);
        let calls = hook_calls.lock();
        assert_eq!(calls.len(), 2);
        assert!(calls[0].starts_with("first:failing:payload:"));
        assert!(calls[1].starts_with("second:failing:payload:"));
        assert_eq!(logger.metrics().writes_failed(), 1);
    }

    #[test]
    fn test_error_hooks_fire_in_fan_out_order() {
        let logger = Logger::new();
        logger.add_transport(Arc::new(Failing));
        logger.add_transport(Arc::new(Panicking));

        let calls = Arc::new(Mutex::new(Vec::new()));
        for tag in ["a", "b"] {
            let calls = Arc::clone(&calls);
            logger.add_error_hook(move |_, transport, _| {
                calls.lock().push(format!("{}-{}", transport.name(), tag));
            });
        }

        logger.error("boom");

        assert_eq!(
            *calls.lock(),
            vec!["failing-a", "failing-b", "panicking-a", "panicking-b"]
        );
    }

    #[test]
    fn test_panicking_transport_is_isolated() {
        let logger = Logger::new();
        let healthy = Recording::at(Level::DEBUG);
        logger.add_transport(Arc::new(Panicking));
        logger.add_transport(healthy.clone());

        let seen = Arc::new(Mutex::new(None));
        let seen_clone = Arc::clone(&seen);
        logger.add_error_hook(move |_, _, error| {
            *seen_clone.lock() = Some(error.to_string());
        });

        logger.info("survives");

        assert_eq!(healthy.messages(), vec!["survives"]);
        let seen = seen.lock();
        assert!(seen.as_deref().unwrap_or_default().contains("transport exploded"));
        assert_eq!(logger.metrics().transport_panics(), 1);
    }

    #[test]
    fn test_hooks_run_in_order_around_fan_out() {
        let logger = Logger::new();
        let transport = Recording::at(Level::DEBUG);
        logger.add_transport(transport.clone());

        logger.add_before_hook(|event| {
            event.fields.insert("step", "one");
        });
        logger.add_before_hook(|event| {
            let saw_one = event.fields.get("step").and_then(|v| v.as_str()) == Some("one");
            event.fields.insert("saw_one", saw_one);
        });

        let after_count = Arc::new(Mutex::new(0));
        let after_clone = Arc::clone(&after_count);
        logger.add_after_hook(move |event| {
            event.fields.insert("after", true);
            *after_clone.lock() += 1;
        });

        logger.info("hooked");

        let events = transport.events.lock();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].fields.get("saw_one"), Some(&true.into()));
        assert!(!events[0].fields.contains_key("after"));
        assert_eq!(*after_count.lock(), 1);
    }

    #[test]
    fn test_remove_hook() {
        let logger = Logger::new();
        let transport = Recording::at(Level::DEBUG);
        logger.add_transport(transport.clone());

        let id = logger.add_before_hook(|event| {
            event.fields.insert("hooked", true);
        });
        logger.info("first");
        assert!(logger.remove_hook(id));
        assert!(!logger.remove_hook(id));
        logger.info("second");

        let events = transport.events.lock();
        assert!(events[0].fields.contains_key("hooked"));
        assert!(!events[1].fields.contains_key("hooked"));
    }

    #[test]
    fn test_stacktrace_policy() {
        let logger = Logger::builder()
            .stack_capture(|| "frame-0".to_string())
            .stacktrace_levels([Level::ERROR])
            .build();
        let transport = Recording::at(Level::DEBUG);
        logger.add_transport(transport.clone());

        logger.warn("no trace");
        logger.error("with trace");
        logger.disable_stacktrace();
        logger.error("disabled");

        let events = transport.events.lock();
        assert!(events[0].stacktrace().is_none());
        assert_eq!(events[1].stacktrace(), Some("frame-0"));
        assert!(events[2].stacktrace().is_none());
    }

    #[test]
    fn test_before_hook_sees_and_overrides_stacktrace() {
        let logger = Logger::builder()
            .stack_capture(|| "captured".to_string())
            .stacktrace_levels([Level::ERROR])
            .before_hook(|event| {
                if event.stacktrace() == Some("captured") {
                    event.set_stacktrace("rewritten");
                }
            })
            .build();
        let transport = Recording::at(Level::DEBUG);
        logger.add_transport(transport.clone());

        logger.error("trace me");

        assert_eq!(transport.events.lock()[0].stacktrace(), Some("rewritten"));
    }

    #[test]
    fn test_context_trace_id_injected() {
        use crate::core::context::{CtxKey, RequestContext};

        let logger = Logger::new();
        let transport = Recording::at(Level::DEBUG);
        logger.add_transport(transport.clone());

        let ctx = RequestContext::new().with_typed(CtxKey::TRACE_ID, "t-1");
        logger.info_ctx(&ctx, "traced", None);
        logger.info_ctx(&RequestContext::new(), "untraced", Some(Fields::new().with_field("k", 1)));

        let events = transport.events.lock();
        assert_eq!(events[0].fields.get("trace_id"), Some(&"t-1".into()));
        assert!(!events[1].fields.contains_key("trace_id"));
        assert_eq!(events[1].fields.len(), 1);
    }

    #[test]
    fn test_formatter_override_uses_raw_sink() {
        let logger = Logger::new();
        let raw = Arc::new(Recording {
            min_level: Level::DEBUG,
            expose_raw: true,
            ..Recording::default()
        });
        let plain = Recording::at(Level::DEBUG);
        logger.add_transport(raw.clone());
        logger.add_transport(plain.clone());

        logger.with_formatter(Arc::new(JsonFormatter::new())).info("override");

        let raw_writes = raw.raw.lock();
        assert_eq!(raw_writes.len(), 1);
        let parsed: serde_json::Value = serde_json::from_slice(&raw_writes[0]).unwrap();
        assert_eq!(parsed["message"], "override");
        assert!(raw.events.lock().is_empty());

        assert_eq!(plain.messages(), vec!["override"]);
    }

    #[test]
    fn test_snapshot_excludes_transport_added_by_hook() {
        let logger = Logger::new();
        let late = Recording::at(Level::DEBUG);
        let late_clone = late.clone();
        let handle = logger.clone();
        logger.add_before_hook(move |_| {
            if handle.transport_count() == 0 {
                handle.add_transport(late_clone.clone());
            }
        });

        logger.info("first");
        assert!(late.messages().is_empty());

        logger.info("second");
        assert_eq!(late.messages(), vec!["second"]);
    }

    #[test]
    fn test_close_first_error_wins() {
        use crate::core::transport::Closeable;
        use std::sync::atomic::{AtomicUsize, Ordering};

        struct Closing {
            fail: bool,
            closed: AtomicUsize,
        }

        impl Transport for Closing {
            fn write_log(&self, _event: &Event) -> Result<()> {
                Ok(())
            }
            fn min_level(&self) -> Level {
                Level::DEBUG
            }
            fn closeable(&self) -> Option<&dyn Closeable> {
                Some(self)
            }
        }

        impl Closeable for Closing {
            fn close(&self) -> Result<()> {
                self.closed.fetch_add(1, Ordering::SeqCst);
                if self.fail {
                    Err(LoggerError::closed("closing"))
                } else {
                    Ok(())
                }
            }
        }

        let a = Arc::new(Closing { fail: true, closed: AtomicUsize::new(0) });
        let b = Arc::new(Closing { fail: false, closed: AtomicUsize::new(0) });
        let logger = Logger::new();
        logger.add_transport(a.clone());
        logger.add_transport(Recording::at(Level::DEBUG));
        logger.add_transport(b.clone());

        assert!(matches!(logger.close(), Err(LoggerError::TransportClosed { .. })));
        assert_eq!(a.closed.load(Ordering::SeqCst), 1);
        assert_eq!(b.closed.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_custom_registry_names_events() {
        let registry = Arc::new(LevelRegistry::new());
        registry.register("NOTICE", Level::new(2));
        let logger = Logger::with_registry(registry);
        let transport = Recording::at(Level::DEBUG);
        logger.add_transport(transport.clone());

        logger.warn("renamed");

        assert_eq!(transport.events.lock()[0].level_name, "NOTICE");
    }

    #[test]
    #[should_panic(expected = "unrecoverable")]
    fn test_panic_dispatches_then_panics() {
        let logger = Logger::builder().stack_capture(|| "frames".to_string()).build();
        logger.panic("unrecoverable", None);
    }

    #[test]
    fn test_panic_event_is_delivered_first() {
        let logger = Logger::builder().stack_capture(|| "frames".to_string()).build();
        let transport = Recording::at(Level::DEBUG);
        logger.add_transport(transport.clone());

        let handle = logger.clone();
        let result = std::panic::catch_unwind(AssertUnwindSafe(move || {
            handle.panic("going down", Some(Fields::new().with_field("code", 7)))
        }));

        assert!(result.is_err());
        let events = transport.events.lock();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].level, Level::ERROR);
        assert_eq!(events[0].stacktrace(), Some("frames"));
        assert_eq!(events[0].fields.get("code"), Some(&7.into()));
    }
}
