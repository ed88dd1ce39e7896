mod api;
mod server;

use anyhow::{bail, Context};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use collab_pricing::config::PricingConfig;
use collab_pricing::creator::{generate_synthetic_history, generate_synthetic_pool, CreatorStore};
use collab_pricing::dates::parse_date;
use collab_pricing::ranking::Ranker;
use collab_pricing::scoring::{HistoryQuote, QuoteBreakdown};
use collab_pricing::{
    format_money, format_number, format_percent, CampaignBrief, ContentType, CreatorProfile,
    PricingEngine, PricingInput, PricingRequest, PricingResult, RankedCreator,
};

#[derive(Parser)]
#[command(name = "collab-pricing", about = "Sponsored post pricing engine")]
struct Cli {
    /// Path to a TOML config file (defaults to PRICING_CONFIG_PATH or config/pricing.toml).
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Price one post from a JSON input (history shape or theme shape).
    Quote(QuoteArgs),
    /// Rank a creator pool against a campaign brief.
    Recommend(RecommendArgs),
    /// Price a seeded synthetic history.
    Demo(DemoArgs),
    /// Run the HTTP API.
    Serve(ServeArgs),
}

#[derive(Args, Debug, Clone)]
struct QuoteArgs {
    /// JSON file, or `-` for stdin.
    #[arg(long, default_value = "-")]
    input: String,
    #[arg(long)]
    json: bool,
    #[arg(long)]
    details: bool,
}

#[derive(Args, Debug, Clone)]
struct RecommendArgs {
    #[arg(long)]
    brief: PathBuf,
    /// Creator pool JSON; falls back to the configured store path.
    #[arg(long)]
    pool: Option<PathBuf>,
    #[arg(long)]
    json: bool,
}

#[derive(Args, Debug, Clone)]
struct DemoArgs {
    #[arg(long, default_value_t = 42)]
    seed: u64,
    #[arg(long, default_value_t = 12)]
    posts: usize,
    #[arg(long, default_value_t = 25_000)]
    followers: u64,
    #[arg(long, default_value = "REEL")]
    content_type: String,
    #[arg(long, default_value = "lifestyle")]
    niche: String,
    #[arg(long, default_value = "europe_west")]
    destination: String,
    /// Publish date (YYYY-MM-DD); defaults to today.
    #[arg(long)]
    publish_date: Option<String>,
    /// Also rank a synthetic pool of this many creators.
    #[arg(long, default_value_t = 0)]
    pool: usize,
    #[arg(long)]
    details: bool,
}

#[derive(Args, Debug, Clone)]
pub struct ServeArgs {
    #[arg(long, default_value = "127.0.0.1")]
    host: String,
    #[arg(long, default_value_t = 8787)]
    port: u16,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    load_dotenv();
    let cli = Cli::parse();
    let (config, config_path) = PricingConfig::load(cli.config.clone())?;
    init_tracing(&config.logging.level)?;
    if let Some(path) = config_path.as_ref() {
        tracing::debug!(path = %path.display(), "configuration loaded");
    }

    let command = cli.command.unwrap_or(Command::Demo(DemoArgs {
        seed: 42,
        posts: 12,
        followers: 25_000,
        content_type: "REEL".to_string(),
        niche: "lifestyle".to_string(),
        destination: "europe_west".to_string(),
        publish_date: None,
        pool: 0,
        details: false,
    }));

    match command {
        Command::Quote(args) => run_quote(args, &config),
        Command::Recommend(args) => run_recommend(args, &config).await,
        Command::Demo(args) => run_demo(args, &config),
        Command::Serve(args) => server::serve(args, config).await,
    }
}

fn init_tracing(level: &str) -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(level))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(io::stderr)
        .init();
    Ok(())
}

fn run_quote(args: QuoteArgs, config: &PricingConfig) -> anyhow::Result<()> {
    let payload = read_input(&args.input)?;
    let engine = PricingEngine::from_config(config);
    let input = engine.parse(&payload)?;

    if args.details {
        if let PricingInput::History(quote) = &input {
            let breakdown = engine
                .request_strategy()
                .quote_detailed(&quote.influencer_history, &quote.request);
            return print_breakdown(&breakdown, args.json);
        }
    }

    let result = engine.price(&input);
    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print_result(&result);
    }
    Ok(())
}

async fn run_recommend(args: RecommendArgs, config: &PricingConfig) -> anyhow::Result<()> {
    let brief = load_brief(&args.brief)?;

    let pool_path = args.pool.unwrap_or_else(|| config.store.creators_path.clone());
    let store = CreatorStore::load(pool_path).await?;
    let pool = store.list();
    if pool.is_empty() {
        bail!("creator pool is empty");
    }

    let ranked = Ranker::from_config(config).rank(&brief, pool);
    if args.json {
        println!("{}", serde_json::to_string_pretty(&ranked)?);
    } else {
        print_ranking(&ranked, pool.len());
    }
    Ok(())
}

fn run_demo(args: DemoArgs, config: &PricingConfig) -> anyhow::Result<()> {
    let publish_date = match args.publish_date.as_deref() {
        Some(value) => {
            parse_date(value).with_context(|| format!("invalid publish date: {}", value))?
        }
        None => chrono::Local::now().date_naive(),
    };
    let content_type = ContentType::parse(&args.content_type);
    let last_post = publish_date - chrono::Duration::days(3);
    let history =
        generate_synthetic_history(args.seed, args.posts, args.followers, content_type, last_post);

    let mut request = PricingRequest::new(content_type, publish_date);
    request.niche_category = args.niche.clone();
    request.destination = args.destination.clone();
    request.cpm_weight = config.composer.default_cpm_weight;
    request.cpa_weight = config.composer.default_cpa_weight;
    request.followers = Some(args.followers);

    println!(
        "Synthetic history: {} posts, seed {}, {} followers (not real data)",
        history.len(),
        args.seed,
        format_number(args.followers as f64)
    );

    let engine = PricingEngine::from_config(config);
    if args.details {
        let breakdown = engine.request_strategy().quote_detailed(&history, &request);
        print_breakdown(&breakdown, false)?;
    } else {
        let result = engine.price(&PricingInput::History(HistoryQuote {
            influencer_history: history,
            request,
        }));
        print_result(&result);
    }

    if args.pool > 0 {
        let pool: Vec<CreatorProfile> =
            generate_synthetic_pool(args.seed.wrapping_add(1), args.pool, last_post);
        let brief = demo_brief(content_type, publish_date, &args.niche, &args.destination);
        let ranked = Ranker::from_config(config).rank(&brief, &pool);
        println!();
        print_ranking(&ranked, pool.len());
    }
    Ok(())
}

fn demo_brief(
    content_type: ContentType,
    publish_date: NaiveDate,
    niche: &str,
    destination: &str,
) -> CampaignBrief {
    CampaignBrief {
        age_range: None,
        target_gender: None,
        min_engagement_rate: 0.02,
        min_reach: 5_000,
        max_budget: 2_500.0,
        campaign_goal: "awareness".to_string(),
        niche_category: niche.to_string(),
        content_type,
        publish_date,
        destination: destination.to_string(),
        usage_rights: Default::default(),
        exclusivity: Default::default(),
    }
}

fn print_result(result: &PricingResult) {
    println!(
        "Base price: {} (range {} - {})",
        format_money(result.base_price),
        format_money(result.min_price),
        format_money(result.max_price)
    );
    println!("Estimated views: {}", format_number(result.estimated_views as f64));
    println!("Applied CPM: {}", format_money(result.applied_cpm));
    println!(
        "Confidence: {} ({} strategy)",
        format_percent(result.confidence),
        result.strategy.label()
    );
}

fn print_breakdown(breakdown: &QuoteBreakdown, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(breakdown)?);
        return Ok(());
    }

    print_result(&breakdown.result);

    let prediction = &breakdown.prediction;
    let signals = &prediction.signals;
    println!("\nPrediction ({} comparable posts):", prediction.sample_size);
    println!("  weighted views: {}", format_number(prediction.weighted_views));
    println!("  adjustment: {:.3}", prediction.adjustment);
    println!("  confidence factor: {:.3}", prediction.confidence_factor);
    println!("  engagement rate: {}", format_percent(signals.engagement_rate));
    println!("  save ratio: {}", format_percent(signals.save_ratio));
    println!("  seasonal factor: {:.2}", signals.seasonal_factor);

    let cpm = &breakdown.cpm;
    println!("\nCPM:");
    println!("  audience size: {}", format_number(breakdown.audience_size));
    println!(
        "  base {:.2} x audience {:.2} x engagement {:.2} x quality {:.2} x niche {:.2} = {:.2}",
        cpm.base, cpm.audience, cpm.engagement, cpm.quality, cpm.niche, cpm.cpm
    );
    println!("  CPM price: {}", format_money(breakdown.cpm_price));

    let cpa = &breakdown.cpa;
    println!("\nCPA:");
    println!("  conversion rate: {}", format_percent(cpa.conversion_rate));
    println!("  target CPA: {}", format_money(cpa.target_cpa));
    println!("  component: {}", format_money(cpa.component));

    println!("\nHybrid base: {}", format_money(breakdown.hybrid_base));
    Ok(())
}

fn print_ranking(ranked: &[RankedCreator], considered: usize) {
    println!("Recommended creators: {} of {}", ranked.len(), considered);
    for (idx, creator) in ranked.iter().enumerate() {
        println!(
            "{:>3}. {:<20} {:>12}  {:>10} views  confidence {}",
            idx + 1,
            creator.influencer,
            format_money(creator.estimated_price),
            format_number(creator.estimated_views as f64),
            format_percent(creator.confidence)
        );
    }
}

/// Reads a brief file with the same validation the HTTP endpoint applies.
fn load_brief(path: &Path) -> anyhow::Result<CampaignBrief> {
    let body = std::fs::read(path)
        .with_context(|| format!("failed to read brief {}", path.display()))?;
    let brief = api::parse_brief(&body)
        .with_context(|| format!("invalid brief {}", path.display()))?;
    Ok(brief)
}

fn read_input(source: &str) -> anyhow::Result<String> {
    if source != "-" {
        return std::fs::read_to_string(source)
            .with_context(|| format!("failed to read input {}", source));
    }

    let mut buffer = String::new();
    io::stdin()
        .read_to_string(&mut buffer)
        .context("failed reading stdin")?;
    if buffer.trim().is_empty() {
        bail!("missing input: pass --input <file> or pipe JSON on stdin");
    }
    Ok(buffer)
}

fn load_dotenv() {
    let _ = dotenvy::dotenv();
    let manifest_dir = env!("CARGO_MANIFEST_DIR");
    let manifest_path = Path::new(manifest_dir).join(".env");
    let _ = dotenvy::from_path(manifest_path);
}
