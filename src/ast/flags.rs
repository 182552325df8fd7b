//! Module instantiation modifier flags (spec §4.1: `*`, `#`, `%`, `!`).

use bitflags::bitflags;

bitflags! {
    /// Modifier prefixes on a `module_instantiation`.
    ///
    /// `*` drops the statement entirely during static lowering. The other
    /// three are recorded but degrade to no-ops at evaluation time
    /// (highlighting/transparency/isolation are not modeled) -- each still
    /// emits a [`crate::Warning::UnsupportedModifier`] once, per spec's
    /// explicit non-goal.
    #[derive(PartialEq, Eq, Clone, Copy)]
    pub struct ModifierFlags: u8 {
        /// `*` -- disable, the statement is dropped.
        const DISABLE = 0b_0001;
        /// `#` -- highlight (no-op).
        const HIGHLIGHT = 0b_0010;
        /// `%` -- transparent/background (no-op).
        const BACKGROUND = 0b_0100;
        /// `!` -- root/isolate (no-op).
        const ROOT = 0b_1000;
    }
}

impl ModifierFlags {
    pub const NONE: Self = Self::empty();

    /// The modifier character to report in a warning, if any non-`*`
    /// modifier is set.
    pub fn warn_char(self) -> Option<char> {
        if self.contains(Self::HIGHLIGHT) {
            Some('#')
        } else if self.contains(Self::BACKGROUND) {
            Some('%')
        } else if self.contains(Self::ROOT) {
            Some('!')
        } else {
            None
        }
    }
}

impl std::fmt::Debug for ModifierFlags {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:#06b}", self.bits())
    }
}
