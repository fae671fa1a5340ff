use std::env;

use semantic::{build_embedder, EmbedderMode, SemanticConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let mut args = env::args().skip(1);
    let text = args
        .next()
        .unwrap_or_else(|| "cross-language information retrieval".into());
    let other = args
        .next()
        .unwrap_or_else(|| "query translation for multilingual search".into());

    let cfg = SemanticConfig::default().with_env_overrides();
    let cfg = if cfg.api_url.is_some() {
        SemanticConfig {
            mode: EmbedderMode::Api,
            ..cfg
        }
    } else {
        cfg
    };

    let embedder = build_embedder(&cfg)?;
    let batch = embedder.embed_batch(&[text.clone(), other.clone()]).await?;

    println!("provider: {}", embedder.name());
    println!("dim: {}", batch[0].len());
    println!("first values: {:?}", &batch[0][..batch[0].len().min(8)]);

    let dot: f32 = batch[0].iter().zip(&batch[1]).map(|(a, b)| a * b).sum();
    let norm = semantic::normalize::l2_norm(&batch[0]) * semantic::normalize::l2_norm(&batch[1]);
    let cosine = if norm > 0.0 { dot / norm } else { 0.0 };
    println!("cosine({text:?}, {other:?}) = {cosine:.4}");

    Ok(())
}
