//! CLI for VidGen - AI video generation across providers.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use vidgen::{
    get_all_providers, get_provider_by_id, get_providers_by_budget, GenerationResult, PriceTier,
    RawGenerationParams, RawImage, VideoRouter,
};

#[derive(Parser)]
#[command(name = "vidgen")]
#[command(about = "Generate videos via AI APIs (Veo, Runway, Luma, Stability, Sora)")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a video from a text prompt
    Generate(GenerateArgs),

    /// List registered providers
    Providers {
        /// Only show providers at or below this price per second
        #[arg(long)]
        max_cost: Option<f64>,
    },

    /// Estimate the cost of a generation without running it
    Estimate(EstimateArgs),
}

#[derive(Args)]
struct GenerateArgs {
    /// The text prompt describing the video
    prompt: String,

    /// Provider id (see `vidgen providers`)
    #[arg(short, long, default_value = "veo-3")]
    provider: String,

    /// Clip length in seconds (provider default when omitted)
    #[arg(short, long)]
    duration: Option<u32>,

    /// Number of videos to generate
    #[arg(short = 'n', long)]
    count: Option<u32>,

    /// Aspect ratio (e.g., 16:9)
    #[arg(long)]
    aspect_ratio: Option<String>,

    /// What the video should not contain
    #[arg(long)]
    negative_prompt: Option<String>,

    /// Reference image to condition the video on
    #[arg(short, long)]
    image: Option<PathBuf>,

    /// Model tier (e.g., veo3-fast, veo3-quality)
    #[arg(long)]
    model_tier: Option<String>,

    /// Output resolution (e.g., 720p, 1080p)
    #[arg(long)]
    resolution: Option<String>,

    /// Frames per second
    #[arg(long)]
    fps: Option<u32>,

    /// Disable generated audio where supported
    #[arg(long)]
    no_audio: bool,
}

#[derive(Args)]
struct EstimateArgs {
    /// Provider id
    provider: String,

    /// Clip length in seconds (provider default when omitted)
    #[arg(short, long)]
    duration: Option<u32>,

    /// Number of videos
    #[arg(short = 'n', long, default_value_t = 1)]
    count: u32,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is fine
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Generate(args) => {
            generate_video(args, cli.json).await?;
        }
        Commands::Providers { max_cost } => {
            list_providers(max_cost, cli.json)?;
        }
        Commands::Estimate(args) => {
            estimate(args, cli.json)?;
        }
    }

    Ok(())
}

async fn generate_video(args: GenerateArgs, json_output: bool) -> anyhow::Result<()> {
    let mut params = RawGenerationParams::new(&args.provider, &args.prompt);
    params.negative_prompt = args.negative_prompt;
    params.duration_seconds = args.duration.map(|d| d.to_string());
    params.number_of_videos = args.count.map(|n| n.to_string());
    params.aspect_ratio = args.aspect_ratio;
    params.model_tier = args.model_tier;
    params.resolution = args.resolution;
    params.fps = args.fps.map(|f| f.to_string());
    if args.no_audio {
        params.audio = Some("false".into());
    }
    if let Some(ref path) = args.image {
        params.conditioning_image = Some(RawImage::from_path(path).await?);
    }

    let api_key = get_provider_by_id(&args.provider)
        .and_then(|p| std::env::var(p.credential_env).ok())
        .filter(|k| !k.trim().is_empty());

    let router = VideoRouter::new();
    let result = tokio::select! {
        result = router.submit(&params, api_key.as_deref()) => result,
        _ = tokio::signal::ctrl_c() => anyhow::bail!("generation cancelled"),
    };

    if json_output {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return ensure_success(&result);
    }

    ensure_success(&result)?;

    println!("Generated {} video(s) via {}", result.videos.len(), result.provider);
    for url in &result.videos {
        println!("  {}", url);
    }
    if let Some(cost) = result.cost {
        println!("Cost: ${:.2}", cost);
    }

    Ok(())
}

/// Turns a failure result into an error so `main` exits non-zero.
fn ensure_success(result: &GenerationResult) -> anyhow::Result<()> {
    if result.success {
        return Ok(());
    }
    let message = result.error.as_deref().unwrap_or("generation failed");
    anyhow::bail!("{}: {}", result.provider, message)
}

fn list_providers(max_cost: Option<f64>, json_output: bool) -> anyhow::Result<()> {
    #[derive(serde::Serialize)]
    struct ProviderInfo {
        id: &'static str,
        name: &'static str,
        cost_per_second: f64,
        currency: &'static str,
        tier: PriceTier,
        max_duration: u32,
        aspect_ratios: &'static [&'static str],
        env_var: &'static str,
        implemented: bool,
    }

    let router = VideoRouter::new();
    let descriptors = match max_cost {
        Some(limit) => get_providers_by_budget(limit),
        None => get_all_providers().iter().collect(),
    };

    let providers: Vec<ProviderInfo> = descriptors
        .into_iter()
        .map(|p| ProviderInfo {
            id: p.id,
            name: p.name,
            cost_per_second: p.pricing.cost_per_second,
            currency: p.pricing.currency,
            tier: PriceTier::for_cost_per_second(p.pricing.cost_per_second),
            max_duration: p.max_duration,
            aspect_ratios: p.supported_aspect_ratios,
            env_var: p.credential_env,
            implemented: router.is_implemented(p.id),
        })
        .collect();

    if json_output {
        println!("{}", serde_json::to_string_pretty(&providers)?);
    } else {
        println!("Available providers:\n");
        for p in &providers {
            let status = if p.implemented { "✓" } else { "✗" };
            println!("  {} {} ({})", status, p.name, p.id);
            println!(
                "    ${:.2}/s {} ({}), up to {}s, {}",
                p.cost_per_second,
                p.currency,
                p.tier,
                p.max_duration,
                p.aspect_ratios.join(", ")
            );
            println!("    API key: {}", p.env_var);
        }
    }

    Ok(())
}

fn estimate(args: EstimateArgs, json_output: bool) -> anyhow::Result<()> {
    let router = VideoRouter::builder().without_defaults().build();
    let duration = match args.duration {
        Some(d) => d,
        None => get_provider_by_id(&args.provider)
            .map(|p| p.default_duration())
            .unwrap_or(5),
    };
    let estimate = router.estimate(&args.provider, duration, args.count)?;

    if json_output {
        println!("{}", serde_json::to_string_pretty(&estimate)?);
    } else {
        println!(
            "{}: {} x {}s = {:.2} {} ({} tier)",
            estimate.provider,
            args.count,
            duration,
            estimate.total,
            estimate.currency,
            estimate.tier
        );
        if let Some(free) = estimate.free_tier_seconds {
            println!("Free tier: {}s per month", free);
        }
    }

    Ok(())
}
