//! HTTP capability used by the bridge client.

use futures::future::BoxFuture;
use serde_json::Value;

use crate::errors::TransportError;

type Result<T> = std::result::Result<T, TransportError>;

/// GET and JSON-PUT requests returning decoded JSON bodies.
///
/// Implementations treat any status >= 400 as [`TransportError::Status`] and
/// a body that is not JSON as [`TransportError::Decode`].
pub trait Transport: Send + Sync {
    fn get<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<Value>>;

    fn put<'a>(&'a self, url: &'a str, body: &'a Value) -> BoxFuture<'a, Result<Value>>;
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn get<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<Value>> {
        (**self).get(url)
    }

    fn put<'a>(&'a self, url: &'a str, body: &'a Value) -> BoxFuture<'a, Result<Value>> {
        (**self).put(url, body)
    }
}

#[cfg(feature = "http")]
pub use http::HttpTransport;

#[cfg(feature = "http")]
mod http {
    use std::time::Duration;

    use futures::FutureExt;
    use futures::future::BoxFuture;
    use log::debug;
    use reqwest::{Client, Response};
    use serde_json::Value;

    use super::{Result, Transport};
    use crate::errors::TransportError;

    /// [`Transport`] backed by a reqwest client.
    #[derive(Debug, Clone)]
    pub struct HttpTransport {
        client: Client,
    }

    impl HttpTransport {
        pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

        pub fn new() -> Result<Self> {
            Self::with_timeout(Self::DEFAULT_TIMEOUT)
        }

        pub fn with_timeout(timeout: Duration) -> Result<Self> {
            let client = Client::builder()
                .timeout(timeout)
                .build()
                .map_err(|e| TransportError::Client(e.to_string()))?;
            Ok(HttpTransport { client })
        }

        async fn decode(method: &'static str, url: &str, response: Response) -> Result<Value> {
            let status = response.status();
            if status.is_client_error() || status.is_server_error() {
                return Err(TransportError::status(method, url, status.as_u16()));
            }

            let body = response
                .text()
                .await
                .map_err(|e| TransportError::request(method, url, e))?;
            debug!("{method} {url} -> {status}: {body}");
            serde_json::from_str(&body).map_err(|e| TransportError::decode(method, url, e))
        }
    }

    impl Transport for HttpTransport {
        fn get<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<Value>> {
            async move {
                debug!("GET {url}");
                let response = self
                    .client
                    .get(url)
                    .send()
                    .await
                    .map_err(|e| TransportError::request("GET", url, e))?;
                Self::decode("GET", url, response).await
            }
            .boxed()
        }

        fn put<'a>(&'a self, url: &'a str, body: &'a Value) -> BoxFuture<'a, Result<Value>> {
            async move {
                debug!("PUT {url} {body}");
                let response = self
                    .client
                    .put(url)
                    .json(body)
                    .send()
                    .await
                    .map_err(|e| TransportError::request("PUT", url, e))?;
                Self::decode("PUT", url, response).await
            }
            .boxed()
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! Scripted transport for unit tests.

    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    use futures::FutureExt;
    use futures::future::BoxFuture;
    use serde_json::{Value, json};

    use super::{Result, Transport};
    use crate::errors::TransportError;

    #[derive(Debug, Clone, PartialEq)]
    pub(crate) struct Request {
        pub method: &'static str,
        pub url: String,
        pub body: Option<Value>,
    }

    enum Reply {
        Body(Value),
        Status(u16),
        Undecodable(&'static str),
    }

    #[derive(Default)]
    struct State {
        requests: Vec<Request>,
        replies: VecDeque<Reply>,
        fail_after: Option<usize>,
    }

    /// Records every request. Replies come from the scripted queue first,
    /// then default to a bridge-style success body.
    #[derive(Clone, Default)]
    pub(crate) struct MockTransport {
        state: Arc<Mutex<State>>,
    }

    impl MockTransport {
        pub(crate) fn new() -> Self {
            Self::default()
        }

        /// A transport whose first reply identifies a bridge named `name`.
        pub(crate) fn bridge(name: &str) -> Self {
            let mock = Self::new();
            mock.reply(json!({"name": name, "apiversion": "1.50.0"}));
            mock
        }

        pub(crate) fn reply(&self, body: Value) {
            self.push(Reply::Body(body));
        }

        pub(crate) fn reply_status(&self, status: u16) {
            self.push(Reply::Status(status));
        }

        /// Answer the next request with a body that is not JSON.
        pub(crate) fn reply_decode_error(&self, body: &'static str) {
            self.push(Reply::Undecodable(body));
        }

        fn push(&self, reply: Reply) {
            self.state.lock().unwrap().replies.push_back(reply);
        }

        /// Every request after the first `count` fails with status 503.
        pub(crate) fn fail_after(&self, count: usize) {
            self.state.lock().unwrap().fail_after = Some(count);
        }

        pub(crate) fn requests(&self) -> Vec<Request> {
            self.state.lock().unwrap().requests.clone()
        }

        pub(crate) fn puts(&self) -> Vec<Request> {
            self.requests()
                .into_iter()
                .filter(|r| r.method == "PUT")
                .collect()
        }

        fn handle(&self, method: &'static str, url: &str, body: Option<&Value>) -> Result<Value> {
            let mut state = self.state.lock().unwrap();
            state.requests.push(Request {
                method,
                url: url.to_string(),
                body: body.cloned(),
            });

            if let Some(limit) = state.fail_after {
                if state.requests.len() > limit {
                    return Err(TransportError::status(method, url, 503));
                }
            }

            match state.replies.pop_front() {
                Some(Reply::Body(body)) => Ok(body),
                Some(Reply::Status(status)) => Err(TransportError::status(method, url, status)),
                Some(Reply::Undecodable(body)) => serde_json::from_str(body)
                    .map_err(|e| TransportError::decode(method, url, e)),
                None => Ok(json!([{"success": {}}])),
            }
        }
    }

    impl Transport for MockTransport {
        fn get<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<Value>> {
            let result = self.handle("GET", url, None);
            async move { result }.boxed()
        }

        fn put<'a>(&'a self, url: &'a str, body: &'a Value) -> BoxFuture<'a, Result<Value>> {
            let result = self.handle("PUT", url, Some(body));
            async move { result }.boxed()
        }
    }
}
