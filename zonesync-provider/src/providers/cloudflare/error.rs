//! Cloudflare error mapping

use crate::error::ProviderError;
use crate::traits::{ErrorContext, ProviderErrorMapper, RawApiError};

use super::CloudflareProvider;

/// Cloudflare error code mapping
/// Reference: <https://api.cloudflare.com/#getting-started-responses>
impl ProviderErrorMapper for CloudflareProvider {
    fn provider_name(&self) -> &'static str {
        "cloudflare"
    }

    fn map_error(&self, raw: RawApiError, context: ErrorContext) -> ProviderError {
        match raw.code.as_deref() {
            // 6003: Invalid request headers
            // 6103: Invalid format for X-Auth-Key header
            // 6111: Invalid format for Authorization header
            // 10000: Authentication error
            Some("6003" | "6103" | "6111" | "10000") => ProviderError::InvalidCredentials {
                provider: self.provider_name().to_string(),
                raw_message: Some(raw.message),
            },

            // 9109: Unauthorized to access requested resource
            Some("9109") => ProviderError::PermissionDenied {
                provider: self.provider_name().to_string(),
                raw_message: Some(raw.message),
            },

            // 81044: Record does not exist
            Some("81044") => ProviderError::RecordNotFound {
                provider: self.provider_name().to_string(),
                record_id: context.record_id.unwrap_or_else(|| "<unknown>".to_string()),
                raw_message: Some(raw.message),
            },

            // 7000: No route for that URI
            // 7003: Could not route to /path. perhaps your object identifier is invalid?
            Some("7000" | "7003") => ProviderError::ZoneNotFound {
                provider: self.provider_name().to_string(),
                zone: context.zone.unwrap_or_else(|| "<unknown>".to_string()),
                raw_message: Some(raw.message),
            },

            // 1004: DNS Validation Error
            Some("1004") => ProviderError::InvalidParameter {
                provider: self.provider_name().to_string(),
                param: "general".to_string(),
                detail: raw.message,
            },

            _ => self.unknown_error(raw),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::http_client::RetryPolicy;

    fn provider() -> CloudflareProvider {
        CloudflareProvider::new(String::new(), RetryPolicy::disabled()).unwrap()
    }

    #[test]
    fn auth_errors() {
        let p = provider();
        for code in ["6003", "6103", "6111", "10000"] {
            let err = p.map_error(RawApiError::with_code(code, "bad auth"), ErrorContext::default());
            assert!(
                matches!(err, ProviderError::InvalidCredentials { .. }),
                "code {code} mapped to {err:?}"
            );
        }
    }

    #[test]
    fn unauthorized_resource_is_permission_denied() {
        let p = provider();
        let err = p.map_error(
            RawApiError::with_code("9109", "unauthorized"),
            ErrorContext::default(),
        );
        assert!(matches!(err, ProviderError::PermissionDenied { .. }));
    }

    #[test]
    fn zone_not_found_carries_context() {
        let p = provider();
        let ctx = ErrorContext {
            record_id: None,
            zone: Some("zone-123".to_string()),
        };
        let err = p.map_error(RawApiError::with_code("7003", "could not route"), ctx);
        assert!(
            matches!(&err, ProviderError::ZoneNotFound { zone, .. } if zone == "zone-123"),
            "unexpected: {err:?}"
        );
    }

    #[test]
    fn unknown_code_falls_back() {
        let p = provider();
        let err = p.map_error(
            RawApiError::with_code("99999", "mystery"),
            ErrorContext::default(),
        );
        assert!(
            matches!(&err, ProviderError::Unknown { raw_code: Some(c), .. } if c == "99999"),
            "unexpected: {err:?}"
        );
    }
}
