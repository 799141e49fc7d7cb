//! Cloud backend configuration.
//!
//! Two environment values identify the hosted backend. Their absence
//! (or the placeholder sentinel left by project scaffolding) switches
//! the whole adapter layer into demo mode: reads degrade to empty
//! results and authentication mutations fail with a configuration
//! error.

/// Sentinel URL shipped in scaffolding; treated the same as unset.
pub const PLACEHOLDER_URL: &str = "https://placeholder.supabase.co";

/// Sentinel key shipped in scaffolding; treated the same as unset.
pub const PLACEHOLDER_KEY: &str = "placeholder-key";

/// Connection settings for the hosted backend.
#[derive(Debug, Clone)]
pub struct CloudConfig {
    pub url: String,
    pub anon_key: String,
}

impl CloudConfig {
    /// Read configuration from `SUPABASE_URL` / `SUPABASE_ANON_KEY`.
    ///
    /// Returns `None` (demo mode) when either value is missing, empty,
    /// or a placeholder.
    pub fn from_env() -> Option<Self> {
        dotenvy::dotenv().ok();
        Self::from_values(
            std::env::var("SUPABASE_URL").ok(),
            std::env::var("SUPABASE_ANON_KEY").ok(),
        )
    }

    /// Validate candidate values into a configuration.
    pub fn from_values(url: Option<String>, anon_key: Option<String>) -> Option<Self> {
        match (url, anon_key) {
            (Some(url), Some(anon_key))
                if !url.is_empty()
                    && !anon_key.is_empty()
                    && url != PLACEHOLDER_URL
                    && anon_key != PLACEHOLDER_KEY =>
            {
                Some(Self {
                    url: url.trim_end_matches('/').to_string(),
                    anon_key,
                })
            }
            _ => {
                tracing::warn!(
                    "cloud backend not configured, running in demo mode \
                     (set SUPABASE_URL and SUPABASE_ANON_KEY to enable sync)"
                );
                None
            }
        }
    }
}
