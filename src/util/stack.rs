/// Stack space that must remain before another recursive evaluation step.
const RED_ZONE: usize = 100 * 1024;

/// Size of each newly allocated stack segment.
const STACK_PER_RECURSION: usize = 1024 * 1024;

/// Runs `f`, first growing the stack if less than [`RED_ZONE`] remains.
///
/// Evaluation recurses once per nested expression and per script-level
/// function call, so deep script recursion would otherwise overflow the
/// native stack.
#[inline]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, STACK_PER_RECURSION, f)
}
