//! Shared HTTP agent and API credentials.

use anyhow::Result;
use lazy_static::lazy_static;

lazy_static! {
    /// One agent for all outbound requests so connections are reused.
    pub static ref UREQ_AGENT: ureq::Agent = ureq::Agent::new_with_defaults();
}

/// API credential, read once at startup and handed to worker threads by
/// value. Never re-read per request.
#[derive(Clone)]
pub struct Credentials {
    api_key: String,
}

impl Credentials {
    /// Reads `OPENAI_API_KEY` from the environment, loading a `.env` file
    /// first if one is present. A missing or blank key is a startup error;
    /// the app refuses to open a window without it.
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv();
        let api_key = std::env::var("OPENAI_API_KEY").unwrap_or_default();
        if api_key.trim().is_empty() {
            return Err(anyhow::anyhow!(
                "OPENAI_API_KEY is not set. Export it or put it in a .env file."
            ));
        }
        Ok(Self { api_key })
    }

    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.api_key)
    }

    #[cfg(test)]
    pub fn for_tests(api_key: &str) -> Self {
        Self {
            api_key: api_key.to_string(),
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials").field("api_key", &"***").finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bearer_header_has_scheme_prefix() {
        let creds = Credentials::for_tests("sk-test");
        assert_eq!(creds.bearer(), "Bearer sk-test");
    }

    #[test]
    fn debug_output_never_leaks_the_key() {
        let creds = Credentials::for_tests("sk-secret-value");
        let rendered = format!("{:?}", creds);
        assert!(
            !rendered.contains("sk-secret-value"),
            "debug output leaked the key: {}",
            rendered
        );
    }
}
