//! Completion handler contract.
//!
//! The handler performs the real create operation once the last step
//! validates. It receives the full accumulated data and may fail; failures
//! are returned to the host untouched.

use std::future::Future;

use async_trait::async_trait;

/// Performs the final action of a wizard.
#[async_trait]
pub trait CompletionHandler<D>: Send + Sync {
    async fn complete(&self, data: D) -> anyhow::Result<()>;
}

/// Any async closure taking the final data is a handler.
#[async_trait]
impl<D, F, Fut> CompletionHandler<D> for F
where
    D: Send + 'static,
    F: Fn(D) -> Fut + Send + Sync,
    Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
{
    async fn complete(&self, data: D) -> anyhow::Result<()> {
        self(data).await
    }
}

/// Resets the submitting flag when dropped, so a cancelled completion future
/// cannot leave the wizard locked.
pub(crate) struct SubmittingFlag<'a> {
    flag: &'a mut bool,
}

impl<'a> SubmittingFlag<'a> {
    pub(crate) fn raise(flag: &'a mut bool) -> Self {
        *flag = true;
        Self { flag }
    }
}

impl Drop for SubmittingFlag<'_> {
    fn drop(&mut self) {
        *self.flag = false;
    }
}
