use serde::{Deserialize, Serialize};

/// Configuration for MRR computation and serving
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MrrConfig {
    /// Serve the demo series when the subscription store is unreachable
    #[serde(default = "default_demo_fallback")]
    pub demo_fallback: bool,
    /// Seconds to reuse a computed series; 0 disables caching
    #[serde(default)]
    pub cache_ttl_seconds: u64,
    /// Treat an empty snapshot as an error instead of an empty series
    #[serde(default)]
    pub require_data: bool,
}

fn default_demo_fallback() -> bool {
    true
}

impl Default for MrrConfig {
    fn default() -> Self {
        Self {
            demo_fallback: default_demo_fallback(),
            cache_ttl_seconds: 0,
            require_data: false,
        }
    }
}
