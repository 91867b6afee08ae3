use rustc_hash::FxHashMap;
use serde_json::Value;
use thiserror::Error;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("helper failed: {0}")]
pub struct HelperError(pub String);

/// What a helper is called with: up to two resolved positional arguments
/// and, for block-style helpers, the raw body and else-body text. A block
/// helper decides for itself how and whether its body is re-expanded; the
/// evaluator re-expands whatever text the helper returns.
pub struct HelperInput<'a> {
    pub args: &'a [Value],
    pub body: Option<&'a str>,
    pub inverse: Option<&'a str>,
}

impl HelperInput<'_> {
    #[must_use]
    pub fn arg(&self, index: usize) -> Option<&Value> {
        self.args.get(index)
    }
}

pub type HelperFn = Box<dyn Fn(&HelperInput<'_>) -> Result<Value, HelperError> + Send + Sync>;

/// Named pure functions callable from templates.
///
/// The registry is an explicit value handed to the interpreter per render
/// call; there is no process-wide helper table. A lookup miss is not an
/// error, the evaluator applies the unknown-helper policy instead.
#[derive(Default)]
pub struct HelperRegistry {
    entries: FxHashMap<String, HelperFn>,
}

impl HelperRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry pre-loaded with the stock helpers.
    #[must_use]
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register("eq", |input: &HelperInput<'_>| {
            Ok(Value::Bool(input.arg(0) == input.arg(1)))
        });
        registry
    }

    pub fn register<F>(&mut self, name: &str, helper: F)
    where
        F: Fn(&HelperInput<'_>) -> Result<Value, HelperError> + Send + Sync + 'static,
    {
        self.entries.insert(name.to_string(), Box::new(helper));
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&HelperFn> {
        self.entries.get(name)
    }
}
