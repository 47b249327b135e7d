//! Interpreter configuration.

use serde::Deserialize;

/// Tunables for an [`Interpreter`](crate::Interpreter).
///
/// All fields have defaults, so a host may deserialize a partial
/// document.
///
/// # Example
///
/// ```
/// use interpreter::InterpreterConfig;
///
/// let config = InterpreterConfig::default()
///     .with_swf_version(6)
///     .with_recursion_limit(64);
/// assert_eq!(config.swf_version, 6);
/// assert_eq!(config.recursion_limit, 64);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct InterpreterConfig {
    /// SWF version of the root movie; selects conversion and lookup rules.
    pub swf_version: u8,
    /// Maximum number of simultaneously active user function frames.
    pub recursion_limit: usize,
    /// Longest prototype chain walked before lookup gives up.
    ///
    /// SWF5 movies use a limit two lower than this.
    pub max_prototype_depth: usize,
    /// Log recoverable script mistakes, such as calling a non-function.
    pub verbose_as_coding_errors: bool,
    /// Trace frame pushes, preloads and native calls.
    pub verbose_action: bool,
    /// Fixed seed for the random number generator; clock-seeded if absent.
    pub rng_seed: Option<u64>,
}

impl Default for InterpreterConfig {
    fn default() -> Self {
        Self {
            swf_version: 8,
            recursion_limit: 256,
            max_prototype_depth: 257,
            verbose_as_coding_errors: false,
            verbose_action: false,
            rng_seed: None,
        }
    }
}

impl InterpreterConfig {
    /// Sets the SWF version.
    pub fn with_swf_version(mut self, version: u8) -> Self {
        self.swf_version = version;
        self
    }

    /// Sets the recursion limit.
    pub fn with_recursion_limit(mut self, limit: usize) -> Self {
        self.recursion_limit = limit;
        self
    }

    /// Sets the prototype depth limit.
    pub fn with_max_prototype_depth(mut self, depth: usize) -> Self {
        self.max_prototype_depth = depth;
        self
    }

    /// Enables or disables coding-error logging.
    pub fn with_verbose_as_coding_errors(mut self, enabled: bool) -> Self {
        self.verbose_as_coding_errors = enabled;
        self
    }

    /// Enables or disables action tracing.
    pub fn with_verbose_action(mut self, enabled: bool) -> Self {
        self.verbose_action = enabled;
        self
    }

    /// Fixes the random seed.
    pub fn with_rng_seed(mut self, seed: u64) -> Self {
        self.rng_seed = Some(seed);
        self
    }

    /// Prototype depth limit in effect for `version`.
    pub fn prototype_depth_for(&self, version: u8) -> usize {
        if version == 5 {
            self.max_prototype_depth.saturating_sub(2)
        } else {
            self.max_prototype_depth
        }
    }
}
