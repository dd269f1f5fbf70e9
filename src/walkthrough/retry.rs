//! Retry plumbing for the interactive creation steps.

use std::future::Future;
use std::pin::Pin;

use anyhow::Result;

/// One attempt of a retryable step. `Ok(None)` means the step has already
/// shown its failure to the user and should run again.
pub type StepFuture<'a, T> = Pin<Box<dyn Future<Output = Result<Option<T>>> + 'a>>;

/// Drives `step` until it yields a value. `Ok(None)` re-runs the step
/// (re-prompting through its input source); `Err` is fatal and
/// propagates, so a dead input source ends the walkthrough instead of
/// spinning.
pub async fn until_some<S, T>(
    state: &mut S,
    mut step: impl for<'a> FnMut(&'a mut S) -> StepFuture<'a, T>,
) -> Result<T> {
    loop {
        if let Some(value) = step(state).await? {
            return Ok(value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn reruns_the_step_until_it_yields() {
        let mut attempts = 0u32;
        let value = until_some(&mut attempts, |count| {
            Box::pin(async move {
                *count += 1;
                if *count < 3 {
                    Ok(None)
                } else {
                    Ok(Some(*count))
                }
            })
        })
        .await
        .unwrap();
        assert_eq!(value, 3);
        assert_eq!(attempts, 3);
    }

    #[tokio::test]
    async fn fatal_errors_propagate() {
        let mut attempts = 0u32;
        let result: Result<u32> = until_some(&mut attempts, |count| {
            Box::pin(async move {
                *count += 1;
                if *count < 2 {
                    Ok(None)
                } else {
                    anyhow::bail!("input closed")
                }
            })
        })
        .await;
        assert_eq!(result.unwrap_err().to_string(), "input closed");
        assert_eq!(attempts, 2);
    }
}
