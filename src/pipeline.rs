//! encode → analyze → present, composed for a single upload.

use rand::Rng;
use tracing::warn;

use crate::analyzer::{analyze, ChatTransport};
use crate::config::Config;
use crate::encoder::{encode, ImageAsset};
use crate::error::AnalysisOutcome;
use crate::fallback::present;

pub const DEFAULT_PROMPT: &str =
    "Please analyze this image and identify all ingredients or components visible.";

/// Substitutes [`DEFAULT_PROMPT`] for a missing or blank prompt.
pub fn effective_prompt(prompt: Option<&str>) -> &str {
    prompt
        .filter(|p| !p.trim().is_empty())
        .unwrap_or(DEFAULT_PROMPT)
}

pub async fn run<T>(
    transport: &T,
    asset: &ImageAsset,
    prompt: Option<&str>,
    config: &Config,
) -> AnalysisOutcome
where
    T: ChatTransport + ?Sized,
{
    let image = match encode(asset) {
        Ok(image) => image,
        Err(err) => return err.into(),
    };

    analyze(transport, &image, effective_prompt(prompt), config).await
}

/// Displayable result of [`describe`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Description {
    pub markdown: String,
    /// Set when `markdown` is fallback content rather than provider output.
    pub degraded: bool,
}

/// Like [`run`], but always yields displayable markdown.
pub async fn describe<T, R>(
    transport: &T,
    asset: &ImageAsset,
    prompt: Option<&str>,
    config: &Config,
    rng: &mut R,
) -> Description
where
    T: ChatTransport + ?Sized,
    R: Rng,
{
    let outcome = run(transport, asset, prompt, config).await;
    if let AnalysisOutcome::Failure { kind, message } = &outcome {
        warn!(?kind, %message, "serving fallback markdown");
    }

    Description {
        degraded: !outcome.is_success(),
        markdown: present(&outcome, asset.filename.as_deref().unwrap_or_default(), rng),
    }
}
