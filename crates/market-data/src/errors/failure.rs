/// Classification of a failed lookup.
///
/// | Class | Stale fallback? | Negative-cached? |
/// |-------|-----------------|------------------|
/// | `Transient` | Yes, if a previous success exists | Only when there is nothing to fall back to |
/// | `Terminal` | No | Yes |
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FailureClass {
    /// Timeout or connection failure. The provider may answer next time,
    /// so the last known good value is still the best answer.
    Transient,

    /// The provider answered and the answer was "no price": non-success
    /// status, malformed payload, unknown symbol.
    Terminal,
}
