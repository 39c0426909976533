//! Basic video generation example.
//!
//! Run with: `cargo run --example generate_video`
//!
//! Requires `LUMA_API_KEY` environment variable.

use vidgen::{estimate_cost, get_provider_by_id, GenerationRequest, VideoRouter};

#[tokio::main]
async fn main() -> vidgen::Result<()> {
    let descriptor = get_provider_by_id("luma")
        .ok_or_else(|| vidgen::VidGenError::ProviderNotFound("luma".into()))?;
    let api_key = std::env::var(descriptor.credential_env).ok();

    let request = GenerationRequest::new("luma", "Ocean waves crashing on a rocky shore at sunset")
        .with_duration(5);

    let estimate = estimate_cost(descriptor, request.duration_secs, request.number_of_videos);
    println!("Estimated cost: {:.2} {}", estimate.total, estimate.currency);

    let router = VideoRouter::new();
    let result = router.generate_video("luma", &request, api_key.as_deref()).await;

    match result.error {
        None => println!("Generated video: {:?} (cost: {:?})", result.videos, result.cost),
        Some(err) => eprintln!("Generation failed: {err}"),
    }

    Ok(())
}
