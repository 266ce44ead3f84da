/// Tells stop events the session caused apart from a track running out.
///
/// The output reports "stopped" for user stops, device trouble and the real
/// end of the stream alike. Each transition that may make the output stop on
/// its own account arms the guard, and the first stop event afterwards is
/// swallowed.
///
/// | transition        | guard   |
/// |-------------------|---------|
/// | `load`            | arm     |
/// | `play`            | disarm  |
/// | `pause`           | arm     |
/// | `stop`            | arm     |
/// | output stopped    | consume |
#[derive(Debug, Default)]
pub(crate) struct AdvanceGuard {
    armed: bool,
}

impl AdvanceGuard {
    pub(crate) fn arm(&mut self) {
        self.armed = true;
    }

    pub(crate) fn disarm(&mut self) {
        self.armed = false;
    }

    /// Clear the guard, returning whether it was armed.
    pub(crate) fn consume(&mut self) -> bool {
        std::mem::take(&mut self.armed)
    }
}
