//! Script bodies and the attack-pattern wrapper

use cinder_core::{CinderError, Result};
use cinder_runtime::Timer;
use std::fmt::Debug;

/// What a body did when resumed
#[derive(Debug, Clone, PartialEq)]
pub enum Resume<T> {
    /// Suspended; resume again next frame
    Yield,
    /// Ran to completion with a result
    Complete(T),
}

/// Read-only snapshot of a body's internal variable
#[derive(Debug, Clone)]
pub enum ExposedValue {
    Float(f64),
    Int(i64),
    Text(String),
    Timer(Timer),
}

impl ExposedValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ExposedValue::Float(v) => Some(*v),
            ExposedValue::Int(v) => Some(*v as f64),
            _ => None,
        }
    }

    pub fn as_timer(&self) -> Option<&Timer> {
        match self {
            ExposedValue::Timer(t) => Some(t),
            _ => None,
        }
    }
}

/// A resumable behavior, written as an explicit state machine.
///
/// `start` runs from the top of the body to its first suspension point;
/// each `resume` continues to the next one or to completion.
pub trait ScriptBody {
    type Args;
    type Input;
    type Output: Clone + Debug;
    /// World state the body acts on (e.g. entity pools)
    type Context: ?Sized;

    const NAME: &'static str;

    /// Variables external inspectors may read; everything else is hidden
    const EXPOSED: &'static [&'static str];

    fn start(&mut self, ctx: &mut Self::Context, args: Self::Args);

    fn resume(&mut self, ctx: &mut Self::Context, input: Self::Input) -> Resume<Self::Output>;

    /// Current value of an internal variable. Only called for names in `EXPOSED`.
    fn expose(&self, name: &str) -> Option<ExposedValue>;
}

/// Lifecycle wrapper around a [`ScriptBody`]
#[derive(Debug)]
pub struct AttackPattern<B: ScriptBody> {
    body: B,
    initialized: bool,
    is_over: bool,
    result: Option<B::Output>,
}

impl<B: ScriptBody> AttackPattern<B> {
    pub fn new(body: B) -> Self {
        Self {
            body,
            initialized: false,
            is_over: false,
            result: None,
        }
    }

    /// Start the body and run it to its first suspension point
    pub fn initialize(&mut self, ctx: &mut B::Context, args: B::Args) -> Result<()> {
        if self.initialized {
            return Err(violation(format!("{} initialized twice", B::NAME)));
        }
        self.body.start(ctx, args);
        self.initialized = true;
        log::debug!("[script] {} initialized", B::NAME);
        Ok(())
    }

    /// Resume the body once.
    ///
    /// Returns `Ok(None)` while the body keeps suspending and `Ok(Some(result))`
    /// on the frame it completes. Resuming before `initialize` or after
    /// completion is a protocol violation.
    pub fn process_frame(&mut self, ctx: &mut B::Context, input: B::Input) -> Result<Option<B::Output>> {
        if !self.initialized {
            return Err(violation(format!(
                "{} resumed before initialize",
                B::NAME
            )));
        }
        if self.is_over {
            return Err(violation(format!(
                "{} resumed after completion",
                B::NAME
            )));
        }
        match self.body.resume(ctx, input) {
            Resume::Yield => Ok(None),
            Resume::Complete(output) => {
                self.is_over = true;
                self.result = Some(output.clone());
                log::debug!("[script] {} completed with {:?}", B::NAME, output);
                Ok(Some(output))
            }
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn is_over(&self) -> bool {
        self.is_over
    }

    /// The completion value, once the body has finished
    pub fn result(&self) -> Option<&B::Output> {
        self.result.as_ref()
    }

    /// Read an exposed internal variable by name
    pub fn inspect(&self, name: &str) -> Result<ExposedValue> {
        let unexposed = || CinderError::UnexposedVariable {
            script: B::NAME,
            name: name.to_string(),
        };
        if !B::EXPOSED.contains(&name) {
            return Err(unexposed());
        }
        if !self.initialized {
            return Err(violation(format!(
                "{} inspected before initialize",
                B::NAME
            )));
        }
        self.body.expose(name).ok_or_else(unexposed)
    }
}

fn violation(msg: String) -> CinderError {
    log::error!("[script] protocol violation: {msg}");
    CinderError::ScriptProtocolViolation(msg)
}

/// Object-safe handle on an initialized pattern, so a driver can hold
/// patterns of different body types over the same context.
pub trait RunningScript<C: ?Sized> {
    fn name(&self) -> &'static str;

    fn is_over(&self) -> bool;

    /// Resume once with default input; `Ok(true)` on the frame the body completes
    fn step(&mut self, ctx: &mut C) -> Result<bool>;

    fn inspect(&self, name: &str) -> Result<ExposedValue>;
}

impl<B> RunningScript<B::Context> for AttackPattern<B>
where
    B: ScriptBody,
    B::Input: Default,
{
    fn name(&self) -> &'static str {
        B::NAME
    }

    fn is_over(&self) -> bool {
        self.is_over
    }

    fn step(&mut self, ctx: &mut B::Context) -> Result<bool> {
        Ok(self.process_frame(ctx, B::Input::default())?.is_some())
    }

    fn inspect(&self, name: &str) -> Result<ExposedValue> {
        AttackPattern::inspect(self, name)
    }
}
