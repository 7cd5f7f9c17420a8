//! Fetch capability built from an `ApiClient` and a host-provided transport.
//!
//! # Design
//! The host owns the network. It implements `Transport` for whatever HTTP
//! stack it runs on, and `HttpFetcher` glues that to the stateless
//! `ApiClient`. The futures returned by `get`/`post` own everything they
//! need, so they can be handed straight to a `Query` as its fetch source:
//!
//! ```ignore
//! let api = HttpFetcher::new(ApiClient::new(base), transport);
//! let query = Query::new(move || api.get::<User>("/users/1"));
//! ```

use std::future::Future;
use std::sync::Arc;

use futures_util::future::BoxFuture;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::client::ApiClient;
use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse};

/// Executes an `HttpRequest` and yields the raw response.
///
/// Non-2xx statuses are data, not errors: implementations return `Err` only
/// when no response was obtained at all.
pub trait Transport: Send + Sync + 'static {
    fn execute(&self, request: HttpRequest) -> BoxFuture<'static, Result<HttpResponse, ApiError>>;
}

pub struct HttpFetcher<X: ?Sized> {
    client: ApiClient,
    transport: Arc<X>,
}

impl<X: ?Sized> Clone for HttpFetcher<X> {
    fn clone(&self) -> Self {
        Self {
            client: self.client.clone(),
            transport: Arc::clone(&self.transport),
        }
    }
}

impl<X: Transport + ?Sized> HttpFetcher<X> {
    pub fn new(client: ApiClient, transport: Arc<X>) -> Self {
        Self { client, transport }
    }

    /// GET `path` and decode a 200 response as `T`.
    pub fn get<T>(&self, path: &str) -> impl Future<Output = Result<T, ApiError>> + Send + 'static
    where
        T: DeserializeOwned + Send + 'static,
    {
        let request = self.client.build_get(path);
        self.round_trip(Ok(request), 200)
    }

    /// POST `body` as JSON to `path` and decode a 201 response as `T`.
    pub fn post<B, T>(
        &self,
        path: &str,
        body: &B,
    ) -> impl Future<Output = Result<T, ApiError>> + Send + 'static
    where
        B: Serialize,
        T: DeserializeOwned + Send + 'static,
    {
        let request = self.client.build_post(path, body);
        self.round_trip(request, 201)
    }

    fn round_trip<T>(
        &self,
        request: Result<HttpRequest, ApiError>,
        expected: u16,
    ) -> impl Future<Output = Result<T, ApiError>> + Send + 'static
    where
        T: DeserializeOwned + Send + 'static,
    {
        let client = self.client.clone();
        let transport = Arc::clone(&self.transport);
        async move {
            let request = request?;
            tracing::trace!(method = request.method.as_str(), url = %request.url, "executing request");
            let response = transport.execute(request).await?;
            client.parse_json(response, expected)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CreateUser, User};
    use parking_lot::Mutex;

    /// Replays canned responses and records every request it sees.
    struct Canned {
        responses: Mutex<Vec<Result<HttpResponse, ApiError>>>,
        seen: Mutex<Vec<HttpRequest>>,
    }

    impl Canned {
        fn new(responses: Vec<Result<HttpResponse, ApiError>>) -> Arc<Self> {
            Arc::new(Self {
                responses: Mutex::new(responses),
                seen: Mutex::new(Vec::new()),
            })
        }
    }

    impl Transport for Canned {
        fn execute(&self, request: HttpRequest) -> BoxFuture<'static, Result<HttpResponse, ApiError>> {
            self.seen.lock().push(request);
            let next = self.responses.lock().remove(0);
            Box::pin(async move { next })
        }
    }

    fn fetcher(transport: Arc<Canned>) -> HttpFetcher<Canned> {
        HttpFetcher::new(ApiClient::new("http://api.local"), transport)
    }

    #[tokio::test]
    async fn get_decodes_success() {
        let transport = Canned::new(vec![Ok(HttpResponse::new(200, r#"{"id":1,"name":"Ann"}"#))]);
        let user: User = fetcher(transport.clone()).get("/users/1").await.unwrap();
        assert_eq!(user.name, "Ann");
        assert_eq!(transport.seen.lock()[0].url, "http://api.local/users/1");
    }

    #[tokio::test]
    async fn get_maps_404() {
        let transport = Canned::new(vec![Ok(HttpResponse::new(404, ""))]);
        let err = fetcher(transport).get::<User>("/users/9").await.unwrap_err();
        assert!(matches!(err, ApiError::NotFound));
    }

    #[tokio::test]
    async fn transport_error_propagates() {
        let transport = Canned::new(vec![Err(ApiError::Transport("Network error".to_string()))]);
        let err = fetcher(transport).get::<User>("/users/1").await.unwrap_err();
        assert_eq!(err.to_string(), "transport failed: Network error");
    }

    #[tokio::test]
    async fn post_expects_created() {
        let transport = Canned::new(vec![Ok(HttpResponse::new(201, r#"{"id":7,"name":"Bo"}"#))]);
        let body = CreateUser {
            name: "Bo".to_string(),
        };
        let user: User = fetcher(transport.clone()).post("/users", &body).await.unwrap();
        assert_eq!(user.id, 7);
        let seen = transport.seen.lock();
        assert_eq!(seen[0].body.as_deref(), Some(r#"{"name":"Bo"}"#));
    }

    #[tokio::test]
    async fn request_is_not_sent_until_polled() {
        let transport = Canned::new(vec![Ok(HttpResponse::new(200, "[]"))]);
        let pending = fetcher(transport.clone()).get::<Vec<User>>("/users");
        assert!(transport.seen.lock().is_empty());
        let users = pending.await.unwrap();
        assert!(users.is_empty());
        assert_eq!(transport.seen.lock().len(), 1);
    }
}
