/// Identifies one in-flight fetch in a deterministic, stable way.
///
/// This is intentionally a small, copyable handle: the async completion
/// carries it back, and it is compared against the guard instead of
/// cancelling the underlying transfer.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestGeneration(pub u64);

/// Monotonic request-generation guard.
///
/// Each new request supersedes every earlier one: `begin` bumps the
/// current generation, and a completion is applied only while its
/// generation `is_current`. Responses that lose the race are discarded by
/// the caller, never applied out of order.
#[derive(Debug, Default)]
pub struct GenerationGuard {
    current: u64,
}

impl GenerationGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new request, invalidating all earlier generations.
    pub fn begin(&mut self) -> RequestGeneration {
        self.current += 1;
        RequestGeneration(self.current)
    }

    pub fn current(&self) -> RequestGeneration {
        RequestGeneration(self.current)
    }

    /// Whether a completion for `generation` may still be applied.
    pub fn is_current(&self, generation: RequestGeneration) -> bool {
        generation.0 == self.current
    }
}
