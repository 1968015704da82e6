use std::future::Future;

use loader_core::FetchFailure;

/// The data-fetch capability a controller drives.
///
/// Return [`FetchFailure::Cancelled`] when the fetch stopped because it no longer
/// matters; every other failure is shown to the user as-is.
#[async_trait::async_trait]
pub trait Fetcher<Id, Data, Err>: Send + Sync {
    async fn fetch(&self, id: Id) -> Result<Data, FetchFailure<Err>>;
}

#[async_trait::async_trait]
impl<Id, Data, Err, F, Fut> Fetcher<Id, Data, Err> for F
where
    F: Fn(Id) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Data, FetchFailure<Err>>> + Send + 'static,
    Id: Send + 'static,
    Data: Send + 'static,
    Err: Send + 'static,
{
    async fn fetch(&self, id: Id) -> Result<Data, FetchFailure<Err>> {
        (self)(id).await
    }
}
