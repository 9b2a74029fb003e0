//! Trying candidates in order until one works.

use std::future::Future;

/// Outcome of trying one candidate.
#[derive(Debug, Clone, PartialEq)]
pub enum Attempt<T, E> {
    /// Done; stop trying.
    Success(T),
    /// This candidate is no good; try the next.
    Soft(E),
    /// Give up on all candidates.
    Hard(E),
}

/// Why no candidate succeeded.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FallbackError<E> {
    /// There was nothing to try
    #[error("no candidates to try")]
    Empty,

    /// Every candidate soft-failed; this is the last failure
    #[error("all candidates failed, last error: {0}")]
    Exhausted(E),

    /// A candidate failed in a way that rules out the rest
    #[error("aborted: {0}")]
    Aborted(E),
}

/// Run `attempt` on each candidate in order, returning the first success.
///
/// Candidates after a success or a hard failure are never tried.
pub async fn first_success<I, F, Fut, T, E>(
    candidates: I,
    mut attempt: F,
) -> Result<T, FallbackError<E>>
where
    I: IntoIterator,
    F: FnMut(I::Item) -> Fut,
    Fut: Future<Output = Attempt<T, E>>,
{
    let mut last_soft = None;

    for candidate in candidates {
        match attempt(candidate).await {
            Attempt::Success(value) => return Ok(value),
            Attempt::Soft(err) => last_soft = Some(err),
            Attempt::Hard(err) => return Err(FallbackError::Aborted(err)),
        }
    }

    Err(match last_soft {
        Some(err) => FallbackError::Exhausted(err),
        None => FallbackError::Empty,
    })
}
