//! Job-based generation with a custom polling schedule and Ctrl-C cancellation.
//!
//! Run with: `cargo run --example veo3_polling`
//!
//! Requires `VEO3_API_KEY` environment variable.

use std::time::Duration;
use tokio_util::sync::CancellationToken;
use vidgen::{GenerationRequest, PollConfig, ProviderOptions, VideoRouter};

#[tokio::main]
async fn main() -> vidgen::Result<()> {
    let router = VideoRouter::builder()
        .poll_config(PollConfig {
            interval: Duration::from_secs(5),
            timeout: Duration::from_secs(600),
        })
        .build();

    let request = GenerationRequest::new("veo-3", "A hummingbird drinking from a flower")
        .with_duration(8)
        .with_options(ProviderOptions {
            model_tier: Some("veo3-quality".into()),
            resolution: Some("1080p".into()),
            ..Default::default()
        });

    let cancel = CancellationToken::new();
    let on_ctrl_c = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_ctrl_c.cancel();
        }
    });

    let api_key = std::env::var("VEO3_API_KEY").ok();
    println!("Generating video (this may take a few minutes)...");
    let result = router
        .generate_video_with_cancel("veo-3", &request, api_key.as_deref(), &cancel)
        .await;

    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}
