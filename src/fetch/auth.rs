use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, HeaderName, HeaderValue};

use super::HttpClient;
use crate::error::ReportError;

/// An [`HttpClient`] wrapper that sends the caller's token on every request.
///
/// The header value is validated once at construction so a malformed
/// token is rejected before any request is issued.
pub struct ApiKey<C> {
    inner: C,
    header_name: HeaderName,
    value: HeaderValue,
}

impl<C> ApiKey<C> {
    /// Uses `Authorization: Bearer <token>`.
    pub fn bearer(inner: C, token: &str) -> Result<Self, ReportError> {
        let mut value = HeaderValue::from_str(&format!("Bearer {token}"))
            .map_err(|_| ReportError::InvalidRequest("token_not_valid"))?;
        value.set_sensitive(true);

        Ok(Self {
            inner,
            header_name: AUTHORIZATION,
            value,
        })
    }
}

#[async_trait]
impl<C: HttpClient> HttpClient for ApiKey<C> {
    async fn execute(&self, mut req: reqwest::Request) -> reqwest::Result<reqwest::Response> {
        req.headers_mut()
            .insert(self.header_name.clone(), self.value.clone());
        self.inner.execute(req).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Unused;

    #[async_trait]
    impl HttpClient for Unused {
        async fn execute(&self, _req: reqwest::Request) -> reqwest::Result<reqwest::Response> {
            unreachable!("no request is issued in these tests")
        }
    }

    #[test]
    fn test_bearer_header_is_sensitive() {
        let client = ApiKey::bearer(Unused, "abc123").unwrap();

        assert_eq!(client.header_name, AUTHORIZATION);
        assert_eq!(client.value.to_str().unwrap(), "Bearer abc123");
        assert!(client.value.is_sensitive());
    }

    #[test]
    fn test_bearer_rejects_control_characters() {
        let result = ApiKey::bearer(Unused, "bad\ntoken");
        assert!(matches!(
            result,
            Err(ReportError::InvalidRequest("token_not_valid"))
        ));
    }
}
