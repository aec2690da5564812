pub mod random;

use burrow_core::ShortCode;

pub use random::{GeneratorError, RandomGenerator, DEFAULT_ALPHABET};

/// Trait for generating candidate short codes.
///
/// Implementations are pure generators that don't interact with storage.
/// Collision avoidance is the caller's job: a candidate may already be
/// taken, and callers are expected to check and draw again.
pub trait Generator: Send + Sync + 'static {
    type Output: Into<ShortCode>;

    /// Draws a new candidate.
    fn generate(&self) -> Self::Output;
}
