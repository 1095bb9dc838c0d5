//! Yes/no gate consulted before destructive operations.

pub trait Confirm {
    /// Returns `true` when the user agreed to `prompt`.
    fn confirm(&self, prompt: &str) -> bool;
}

impl<F> Confirm for F
where
    F: Fn(&str) -> bool,
{
    fn confirm(&self, prompt: &str) -> bool {
        self(prompt)
    }
}

/// Gate that always agrees, for non-interactive callers that confirmed
/// upfront (for example a `--yes` flag).
#[derive(Debug, Clone, Copy, Default)]
pub struct Preconfirmed;

impl Confirm for Preconfirmed {
    fn confirm(&self, _prompt: &str) -> bool {
        true
    }
}
