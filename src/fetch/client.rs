use async_trait::async_trait;
use reqwest::{Request, Response};

/// Sends a prepared request. Decorators such as [`ApiKey`](super::auth::ApiKey)
/// adjust the request and delegate to an inner client.
#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn execute(&self, req: Request) -> reqwest::Result<Response>;
}

#[async_trait]
impl<T: HttpClient + ?Sized> HttpClient for &T {
    async fn execute(&self, req: Request) -> reqwest::Result<Response> {
        (**self).execute(req).await
    }
}
