//! Environment-derived configuration.
//!
//! Missing credentials are fatal at startup; the process refuses to run in a
//! partially configured state.

use std::env;
use std::sync::Arc;

use anyhow::{bail, Context, Result};

use crate::gateway::{GeminiBackend, GenerationBackend, HuggingFaceBackend};

const DEFAULT_PORT: u16 = 10000;

#[derive(Clone, Debug)]
pub enum BackendConfig {
    Gemini {
        api_key: String,
        base_url: Option<String>,
    },
    HuggingFace {
        api_token: String,
        model_url: Option<String>,
    },
}

#[derive(Clone, Debug)]
pub struct Config {
    pub telegram_token: String,
    pub backend: BackendConfig,
    /// Listen port for the health endpoint.
    pub port: u16,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let telegram_token =
            env::var("TELEGRAM_TOKEN").context("TELEGRAM_TOKEN must be set")?;

        let backend_name =
            env::var("GENERATION_BACKEND").unwrap_or_else(|_| "gemini".to_string());
        let backend = match backend_name.to_lowercase().as_str() {
            "gemini" => BackendConfig::Gemini {
                api_key: env::var("GEMINI_API_KEY")
                    .context("GEMINI_API_KEY must be set for the gemini backend")?,
                base_url: env::var("GEMINI_API_BASE").ok(),
            },
            "huggingface" => BackendConfig::HuggingFace {
                api_token: env::var("HF_API_TOKEN")
                    .context("HF_API_TOKEN must be set for the huggingface backend")?,
                model_url: env::var("HF_MODEL_URL").ok(),
            },
            other => bail!("unknown GENERATION_BACKEND: {other}"),
        };

        let port = parse_port(env::var("PORT").ok())?;

        Ok(Self {
            telegram_token,
            backend,
            port,
        })
    }

    pub fn build_backend(&self) -> Arc<dyn GenerationBackend> {
        match &self.backend {
            BackendConfig::Gemini { api_key, base_url } => match base_url {
                Some(base) => Arc::new(GeminiBackend::with_base_url(
                    api_key.clone(),
                    base.clone(),
                )),
                None => Arc::new(GeminiBackend::new(api_key.clone())),
            },
            BackendConfig::HuggingFace {
                api_token,
                model_url,
            } => match model_url {
                Some(url) => Arc::new(HuggingFaceBackend::with_model_url(
                    api_token.clone(),
                    url.clone(),
                )),
                None => Arc::new(HuggingFaceBackend::new(api_token.clone())),
            },
        }
    }
}

fn parse_port(raw: Option<String>) -> Result<u16> {
    match raw {
        Some(value) => value
            .parse()
            .with_context(|| format!("PORT must be a number, got {value:?}")),
        None => Ok(DEFAULT_PORT),
    }
}
