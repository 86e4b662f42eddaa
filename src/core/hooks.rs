//! Hook callbacks run at fixed points of a dispatch
//!
//! - before-hooks run after event assembly and may rewrite fields
//! - after-hooks run once every transport has been attempted
//! - error-hooks run once per failing transport, right after its failure

use super::error::LoggerError;
use super::event::Event;
use super::transport::Transport;
use std::fmt;
use std::sync::Arc;

pub type Hook = Arc<dyn Fn(&mut Event) + Send + Sync>;

pub type ErrorHook = Arc<dyn Fn(&Event, &Arc<dyn Transport>, &LoggerError) + Send + Sync>;

/// Handle returned on hook registration, used to remove the hook again
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HookId(pub(crate) u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookPhase {
    Before,
    After,
}

#[derive(Clone)]
pub(crate) struct Registered<H> {
    pub(crate) id: HookId,
    pub(crate) hook: H,
}

impl<H> fmt::Debug for Registered<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Registered").field(&self.id).finish()
    }
}
