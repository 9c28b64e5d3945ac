/// Lifecycle of one generator instance. Session-scoped, never persisted;
/// `Failed` is terminal until the generator is recreated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationState {
    /// No run attempted yet.
    Initial,
    /// A run is in flight; further runs are blocked until it resolves.
    Generating,
    /// The last run succeeded and its artifact was recorded.
    Generated,
    /// The last run failed for a reason other than cancellation.
    Failed,
}

/// Answer to "is a (re)generation run warranted for this document?".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShouldGenerate {
    Yes,
    /// The document's language is outside the generator's supported set.
    NotSupported,
    /// Nothing changed since the last successful run.
    Unchanged,
    /// A run is already in flight.
    InProgress,
    /// The generator failed earlier and is sticky until recreated.
    HasFailed,
}

impl ShouldGenerate {
    pub fn is_yes(self) -> bool {
        matches!(self, ShouldGenerate::Yes)
    }
}
