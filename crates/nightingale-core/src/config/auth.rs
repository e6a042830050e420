//! Authentication configuration.
//!
//! Nightingale only *validates* bearer credentials; issuing them is the
//! identity collaborator's job. The secret here must match the issuer's.

use serde::{Deserialize, Serialize};

/// Bearer-token validation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// HMAC secret shared with the token issuer.
    pub jwt_secret: String,
    /// Leeway in seconds applied when checking token expiry.
    #[serde(default = "default_leeway")]
    pub expiry_leeway_seconds: u64,
}

fn default_leeway() -> u64 {
    30
}
