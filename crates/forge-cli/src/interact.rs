//! Terminal implementation of the library's prompt surface.

use dialoguer::{theme::ColorfulTheme, Confirm, MultiSelect};
use modelforge_library::Interact;
use std::io::IsTerminal;

/// Prompts on the controlling terminal via dialoguer.
///
/// Prompt failures (closed terminal, interrupt) fall back to the
/// default answer rather than aborting the run mid-pipeline.
pub struct TermInteract;

impl Interact for TermInteract {
    fn confirm(&self, message: &str, default: bool) -> bool {
        Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt(message)
            .default(default)
            .interact()
            .unwrap_or(default)
    }

    fn multi_select(&self, message: &str, options: &[String]) -> Vec<String> {
        let picked = MultiSelect::with_theme(&ColorfulTheme::default())
            .with_prompt(message)
            .items(options)
            .interact()
            .unwrap_or_default();
        picked
            .into_iter()
            .filter_map(|i| options.get(i).cloned())
            .collect()
    }

    fn is_interactive(&self) -> bool {
        std::io::stdin().is_terminal()
    }
}
