//! Injected interactive surface.
//!
//! The reconciliation engine never talks to a terminal directly: every
//! prompt goes through [`Interact`], so the pipeline runs headless under
//! tests and in `--yes` mode.

/// Blocking prompts consumed by the reconciliation engine.
///
/// Prompts are strictly sequential; each one may depend on the answer to
/// the previous.
pub trait Interact: Send + Sync {
    /// Ask a yes/no question.
    fn confirm(&self, message: &str, default: bool) -> bool;

    /// Offer `options` for multi-selection, returning the chosen subset.
    fn multi_select(&self, message: &str, options: &[String]) -> Vec<String>;

    /// Whether this surface can actually prompt. Non-interactive
    /// implementations return false and the engine applies defaults
    /// instead of prompting.
    fn is_interactive(&self) -> bool {
        true
    }
}

/// Non-interactive surface: every confirmation takes its default, every
/// selection is empty.
pub struct AssumeDefaults;

impl Interact for AssumeDefaults {
    fn confirm(&self, _message: &str, default: bool) -> bool {
        default
    }

    fn multi_select(&self, _message: &str, _options: &[String]) -> Vec<String> {
        Vec::new()
    }

    fn is_interactive(&self) -> bool {
        false
    }
}
