//! Source factory functions.

use std::sync::Arc;

use crate::error::Result;
use crate::http_client::RetryPolicy;
use crate::traits::SourceProvider;
use crate::types::ProviderCredentials;

#[cfg(feature = "cloudflare")]
use crate::providers::CloudflareProvider;

/// Creates a [`SourceProvider`] from the given credentials.
///
/// The concrete source type is determined by the [`ProviderCredentials`] variant.
/// Every request the source sends is retried according to `retry`.
///
/// # Examples
///
/// ```rust,no_run
/// use zonesync_provider::{create_source, ProviderCredentials, RetryPolicy};
///
/// let source = create_source(
///     ProviderCredentials::Cloudflare {
///         api_token: "your-token".to_string(),
///     },
///     RetryPolicy::default(),
/// );
/// assert!(source.is_ok());
/// ```
pub fn create_source(
    credentials: ProviderCredentials,
    retry: RetryPolicy,
) -> Result<Arc<dyn SourceProvider>> {
    match credentials {
        #[cfg(feature = "cloudflare")]
        ProviderCredentials::Cloudflare { api_token } => {
            Ok(Arc::new(CloudflareProvider::new(api_token, retry)?))
        }
    }
}

#[cfg(all(test, feature = "cloudflare"))]
mod tests {
    use super::*;

    #[test]
    fn creates_cloudflare_source() {
        let res = create_source(
            ProviderCredentials::Cloudflare {
                api_token: "token".to_string(),
            },
            RetryPolicy::disabled(),
        );
        assert!(res.is_ok());
        let Ok(source) = res else {
            return;
        };
        assert_eq!(source.id(), "cloudflare");
    }
}
