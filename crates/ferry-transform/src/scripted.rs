// scripted.rs — Transformations backed by an externally supplied function.
//
// The scripting engine is not part of Ferry. It hands us something that
// implements `ScriptFunction`: a named callable that receives the work
// context, mutates it and returns nothing. Anything it returns is treated
// as a usage error; evaluation failures become validation errors; an
// interruption is surfaced as `Cancelled` and never swallowed.

use std::fmt;
use std::sync::Arc;

use ferry_work::{Console, TransformWork};
use thiserror::Error;

use crate::error::{Result, TransformError};
use crate::transformation::Transformation;

/// Failure reported by a script function.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScriptError {
    /// The function raised an error while running.
    #[error("{0}")]
    Eval(String),

    /// Execution was interrupted from outside.
    #[error("interrupted")]
    Interrupted,
}

/// A named callable supplied by a scripting engine.
pub trait ScriptFunction: Send + Sync {
    fn name(&self) -> &str;

    /// Run the function against the work context.
    ///
    /// `Ok(None)` means the function returned nothing. `Ok(Some(repr))`
    /// carries a rendering of whatever it returned instead.
    fn call(&self, work: &mut TransformWork) -> std::result::Result<Option<String>, ScriptError>;
}

/// A [`ScriptFunction`] built from a closure.
pub struct FnScript<F> {
    name: String,
    f: F,
}

impl<F> FnScript<F>
where
    F: Fn(&mut TransformWork) -> std::result::Result<Option<String>, ScriptError> + Send + Sync,
{
    pub fn new(name: impl Into<String>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
        }
    }
}

impl<F> ScriptFunction for FnScript<F>
where
    F: Fn(&mut TransformWork) -> std::result::Result<Option<String>, ScriptError> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn call(&self, work: &mut TransformWork) -> std::result::Result<Option<String>, ScriptError> {
        (self.f)(work)
    }
}

/// Runs a [`ScriptFunction`] as a transformation.
#[derive(Clone)]
pub struct Scripted {
    function: Arc<dyn ScriptFunction>,
    reverse: Option<Box<Transformation>>,
}

impl Scripted {
    pub fn new(function: Arc<dyn ScriptFunction>) -> Self {
        Self {
            function,
            reverse: None,
        }
    }

    /// Shorthand for wrapping a closure.
    pub fn from_fn<F>(name: impl Into<String>, f: F) -> Self
    where
        F: Fn(&mut TransformWork) -> std::result::Result<Option<String>, ScriptError>
            + Send
            + Sync
            + 'static,
    {
        Self::new(Arc::new(FnScript::new(name, f)))
    }

    /// Pair this function with the transformation that undoes it.
    pub fn with_reverse(mut self, reverse: Transformation) -> Self {
        self.reverse = Some(Box::new(reverse));
        self
    }

    pub fn name(&self) -> &str {
        self.function.name()
    }

    pub fn transform(&self, work: &mut TransformWork, _console: &dyn Console) -> Result<()> {
        let name = self.function.name();
        tracing::debug!(function = name, "running script function");
        match self.function.call(work) {
            Ok(None) => Ok(()),
            Ok(Some(returned)) => Err(TransformError::Validation(format!(
                "Transformation functions should not return anything, but '{}' returned: {}",
                name, returned
            ))),
            Err(ScriptError::Eval(message)) => Err(TransformError::Validation(format!(
                "Error while executing the transformation {}: {}",
                name, message
            ))),
            Err(ScriptError::Interrupted) => Err(TransformError::Cancelled {
                name: name.to_string(),
            }),
        }
    }

    /// Scripted functions are opaque: only an explicitly configured reverse
    /// makes them reversible.
    pub fn reverse(&self) -> Result<Transformation> {
        match &self.reverse {
            Some(reverse) => Ok(Transformation::explicit(
                (**reverse).clone(),
                Transformation::Scripted(self.clone()),
            )),
            None => Err(TransformError::NonReversible(format!(
                "'{}' is a scripted transformation without a configured reverse",
                self.function.name()
            ))),
        }
    }

    pub fn describe(&self) -> String {
        self.function.name().to_string()
    }
}

impl fmt::Debug for Scripted {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scripted")
            .field("function", &self.function.name())
            .field("reverse", &self.reverse)
            .finish()
    }
}

impl PartialEq for Scripted {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.function, &other.function) && self.reverse == other.reverse
    }
}

impl Eq for Scripted {}

#[cfg(test)]
mod tests {
    use super::*;
    use ferry_work::{Author, CapturingConsole};

    fn work() -> TransformWork {
        TransformWork::new("/checkout", "Original", Author::new("Foo", "foo@bar.com"))
    }

    #[test]
    fn function_mutates_work() {
        let scripted = Scripted::from_fn("set_message", |work| {
            work.set_message("Changed");
            Ok(None)
        });
        let mut work = work();
        scripted.transform(&mut work, &CapturingConsole::new()).unwrap();
        assert_eq!(work.message(), "Changed");
        assert_eq!(scripted.describe(), "set_message");
    }

    #[test]
    fn returned_value_is_validation_error() {
        let scripted = Scripted::from_fn("returns", |_| Ok(Some("42".to_string())));
        let err = scripted
            .transform(&mut work(), &CapturingConsole::new())
            .unwrap_err();
        assert!(matches!(err, TransformError::Validation(_)));
        assert!(err.to_string().contains("'returns' returned: 42"));
    }

    #[test]
    fn eval_error_names_function() {
        let scripted = Scripted::from_fn("broken", |_| Err(ScriptError::Eval("boom".into())));
        let err = scripted
            .transform(&mut work(), &CapturingConsole::new())
            .unwrap_err();
        assert!(err.is_validation());
        assert_eq!(
            err.to_string(),
            "Error while executing the transformation broken: boom"
        );
    }

    #[test]
    fn interruption_is_cancellation() {
        let scripted = Scripted::from_fn("slow", |_| Err(ScriptError::Interrupted));
        let err = scripted
            .transform(&mut work(), &CapturingConsole::new())
            .unwrap_err();
        assert!(err.is_fatal());
        assert!(!err.is_validation());
        assert!(matches!(err, TransformError::Cancelled { ref name } if name == "slow"));
    }

    #[test]
    fn not_reversible_by_default() {
        let scripted = Scripted::from_fn("f", |_| Ok(None));
        assert!(matches!(
            scripted.reverse(),
            Err(TransformError::NonReversible(_))
        ));
    }

    #[test]
    fn configured_reverse_runs_on_reverse() {
        let forward = Scripted::from_fn("forward", |work| {
            work.add_label("FORWARD", "yes");
            Ok(None)
        });
        let backward = Scripted::from_fn("backward", |work| {
            work.remove_label("FORWARD");
            Ok(None)
        });
        let paired = forward.with_reverse(Transformation::Scripted(backward.clone()));

        let reversed = paired.reverse().unwrap();
        assert_eq!(reversed.describe(), "backward");

        let mut work = work();
        Transformation::Scripted(paired.clone())
            .transform(&mut work, &CapturingConsole::new())
            .unwrap();
        assert_eq!(work.message(), "Original\n\nFORWARD=yes\n");
        reversed.transform(&mut work, &CapturingConsole::new()).unwrap();
        assert_eq!(work.message(), "Original\n\n");

        let round_trip = reversed.reverse().unwrap();
        assert_eq!(round_trip.describe(), "forward");
        assert_eq!(
            round_trip,
            Transformation::explicit(
                Transformation::Scripted(paired),
                Transformation::Scripted(backward)
            )
        );
    }
}
