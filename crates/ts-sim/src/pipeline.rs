//! Priority-ordered, hookable execution pipelines.
//!
//! A pipeline is an append-only list of named callables, kept sorted
//! ascending by priority (ties preserve hook order — the sort is stable and
//! re-applied on every hook).  Elements cannot be removed at runtime.

use ts_engine::SimEngine;

use crate::{AgentEnvironment, Context, Pacer, SimResult};

/// What a hook tells the pipeline about continuation.
///
/// Only the explicit [`Halt`][HookOutcome::Halt] stops the invocation;
/// every other outcome proceeds.  (The semantic deliberately mirrors
/// "only a literal failure value short-circuits" — hooks without an
/// opinion return [`Proceed`][HookOutcome::Proceed].)
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum HookOutcome {
    Proceed,
    Halt,
}

/// The shared argument bundle every hook receives, by reference, for the
/// lifetime of one run.  `ctx` is the only environment↔core and
/// hook↔hook communication channel.
pub struct HookArgs<'a> {
    pub engine: &'a mut dyn SimEngine,
    pub env: &'a mut AgentEnvironment,
    pub ctx: &'a mut Context,
    pub pacing: &'a mut Pacer,
}

type HookFn = Box<dyn FnMut(&mut HookArgs<'_>) -> SimResult<HookOutcome>>;

/// One named, prioritized pipeline element.
pub struct PipelineElement {
    name: String,
    priority: i32,
    exec: HookFn,
}

impl PipelineElement {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn priority(&self) -> i32 {
        self.priority
    }
}

/// An ordered sequence of [`PipelineElement`]s.
///
/// Invariant: sorted ascending by priority, ties broken by original hook
/// order; re-sorted whenever a new element is hooked in.
pub struct Pipeline {
    name: &'static str,
    elements: Vec<PipelineElement>,
}

impl Pipeline {
    pub fn new(name: &'static str) -> Self {
        Self { name, elements: Vec::new() }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Append an element and restore the priority ordering.
    pub fn hook(
        &mut self,
        name: impl Into<String>,
        exec: impl FnMut(&mut HookArgs<'_>) -> SimResult<HookOutcome> + 'static,
        priority: i32,
    ) {
        self.elements.push(PipelineElement {
            name: name.into(),
            priority,
            exec: Box::new(exec),
        });
        // Stable sort: equal priorities keep their relative hook order.
        self.elements.sort_by_key(|e| e.priority);
    }

    /// Execute the elements in sorted order.
    ///
    /// Stops at the first element returning [`HookOutcome::Halt`] and
    /// reports `false`; otherwise runs them all and reports `true`.
    /// Errors abort the invocation and propagate.
    pub fn invoke(&mut self, args: &mut HookArgs<'_>) -> SimResult<bool> {
        for element in &mut self.elements {
            if (element.exec)(args)? == HookOutcome::Halt {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// The elements in execution order (for introspection).
    pub fn elements(&self) -> impl Iterator<Item = &PipelineElement> {
        self.elements.iter()
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}
