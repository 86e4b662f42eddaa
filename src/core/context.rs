//! Request-scoped context lookups
//!
//! Context-aware log calls look for a trace identifier in a caller-supplied
//! context, first under the typed key [`CtxKey::TRACE_ID`] and then under the
//! plain string key `"trace_id"`.

use super::event::TRACE_ID_KEY;
use super::fields::FieldValue;
use std::collections::HashMap;

/// Namespaced context key, distinct from any plain string key of the same text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CtxKey(pub &'static str);

impl CtxKey {
    pub const TRACE_ID: CtxKey = CtxKey(TRACE_ID_KEY);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContextKey<'a> {
    Typed(CtxKey),
    Plain(&'a str),
}

/// Read-only key-value view of a request context
pub trait ContextLookup {
    fn lookup(&self, key: &ContextKey<'_>) -> Option<FieldValue>;
}

/// Trace identifier carried by `ctx`, typed key first
pub fn trace_id(ctx: &dyn ContextLookup) -> Option<FieldValue> {
    ctx.lookup(&ContextKey::Typed(CtxKey::TRACE_ID))
        .or_else(|| ctx.lookup(&ContextKey::Plain(TRACE_ID_KEY)))
}

/// Map-backed request context
///
/// ```
/// use rust_log_dispatch::{CtxKey, RequestContext};
///
/// let ctx = RequestContext::new().with_typed(CtxKey::TRACE_ID, "abc-123");
/// assert!(rust_log_dispatch::core::context::trace_id(&ctx).is_some());
/// ```
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    typed: HashMap<CtxKey, FieldValue>,
    plain: HashMap<String, FieldValue>,
}

impl RequestContext {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_typed(mut self, key: CtxKey, value: impl Into<FieldValue>) -> Self {
        self.typed.insert(key, value.into());
        self
    }

    #[must_use]
    pub fn with_value(mut self, key: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.plain.insert(key.into(), value.into());
        self
    }
}

impl ContextLookup for RequestContext {
    fn lookup(&self, key: &ContextKey<'_>) -> Option<FieldValue> {
        match key {
            ContextKey::Typed(typed) => self.typed.get(typed).cloned(),
            ContextKey::Plain(plain) => self.plain.get(*plain).cloned(),
        }
    }
}

impl ContextLookup for HashMap<String, FieldValue> {
    fn lookup(&self, key: &ContextKey<'_>) -> Option<FieldValue> {
        match key {
            ContextKey::Typed(_) => None,
            ContextKey::Plain(plain) => self.get(*plain).cloned(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_typed_key_wins() {
        let ctx = RequestContext::new()
            .with_value("trace_id", "plain")
            .with_typed(CtxKey::TRACE_ID, "typed");
        assert_eq!(trace_id(&ctx), Some(FieldValue::from("typed")));
    }

    #[test]
    fn test_plain_key_fallback() {
        let ctx = RequestContext::new().with_value("trace_id", "abc-123");
        assert_eq!(trace_id(&ctx), Some(FieldValue::from("abc-123")));
    }

    #[test]
    fn test_missing_trace_id() {
        let ctx = RequestContext::new().with_value("user", "cesar");
        assert_eq!(trace_id(&ctx), None);
    }

    #[test]
    fn test_typed_and_plain_are_distinct() {
        let ctx = RequestContext::new().with_typed(CtxKey("user"), "typed-user");
        assert!(ctx.lookup(&ContextKey::Plain("user")).is_none());
        assert!(ctx.lookup(&ContextKey::Typed(CtxKey("user"))).is_some());
    }

    #[test]
    fn test_hash_map_context() {
        let mut ctx: HashMap<String, FieldValue> = HashMap::new();
        ctx.insert("trace_id".to_string(), FieldValue::from(42));
        assert_eq!(trace_id(&ctx), Some(FieldValue::Int(42)));
    }
}
