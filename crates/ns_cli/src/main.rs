use clap::Parser;
use ns_inference::speech::{GoogleTranslateTts, TtsConfig};
use ns_inference::{create_model, Aggregator, Annotator, Narrator, StructuredClient};
use ns_scrappers::{create_source, AnalysisManager, ManagerConfig, SourceConfig, DEFAULT_ARTICLE_LIMIT};
use ns_storage::{AudioConfig, AudioStore};
use ns_web::AppState;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct HumanDuration(Duration);

const DURATION_TOO_LARGE: &str = "Duration too large";
// Keeps `Instant + duration` from overflowing in timers and timeouts.
const MAX_DURATION_SECS: u64 = 100 * 365 * 86400;

impl FromStr for HumanDuration {
    type Err = String;

    /// Accepts `s`, `m`, `h` and `d` units (`1h15m30s`); a trailing bare
    /// number counts as seconds.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        fn add(total: u64, digits: &str, unit_seconds: u64) -> std::result::Result<u64, String> {
            let num: u64 = digits.parse().map_err(|_| DURATION_TOO_LARGE.to_string())?;
            num.checked_mul(unit_seconds)
                .and_then(|seconds| total.checked_add(seconds))
                .ok_or_else(|| DURATION_TOO_LARGE.to_string())
        }

        let mut total_seconds = 0u64;
        let mut digits = String::new();
        let mut has_number = false;

        for c in s.chars() {
            if c.is_ascii_digit() {
                digits.push(c);
                continue;
            }
            if c.is_whitespace() && digits.is_empty() {
                continue;
            }
            let unit_seconds = match c {
                's' => 1,
                'm' => 60,
                'h' => 3600,
                'd' => 86400,
                _ => return Err(format!("Invalid duration unit: {}", c)),
            };
            if digits.is_empty() {
                return Err(format!("Missing number before unit: {}", c));
            }
            total_seconds = add(total_seconds, &digits, unit_seconds)?;
            digits.clear();
            has_number = true;
        }

        if !digits.is_empty() {
            total_seconds = add(total_seconds, &digits, 1)?;
            has_number = true;
        }

        if !has_number {
            return Err("Duration must include a number".to_string());
        }
        if total_seconds == 0 {
            return Err("Duration must be greater than zero".to_string());
        }
        if total_seconds > MAX_DURATION_SECS {
            return Err(DURATION_TOO_LARGE.to_string());
        }

        Ok(HumanDuration(Duration::from_secs(total_seconds)))
    }
}

#[derive(Parser, Debug)]
#[command(author, version, about = "News sentiment analysis with a spoken summary", long_about = None)]
struct Cli {
    #[arg(long, env = "NS_MODEL", default_value = ns_inference::DEFAULT_PROVIDER, global = true,
          help = "Model backend. Available models: gemini (default), dummy")]
    model: String,
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true, global = true)]
    api_key: Option<String>,
    #[arg(long, env = "NS_MODEL_NAME", default_value = ns_inference::DEFAULT_MODEL_NAME, global = true)]
    model_name: String,
    #[arg(long, env = "NS_BASE_URL", default_value = ns_inference::DEFAULT_BASE_URL, global = true)]
    base_url: String,
    /// Language the audio summary is spoken in (ISO 639-1)
    #[arg(long, env = "NS_LANGUAGE", default_value = ns_inference::DEFAULT_TARGET_LANGUAGE, global = true)]
    language: String,
    #[arg(long, env = "NS_AUDIO_DIR", default_value = "audio", global = true)]
    audio_dir: String,
    /// Timeout for every outbound request (e.g. 30s, 1m)
    #[arg(long, default_value = "30s", global = true)]
    timeout: HumanDuration,
    #[arg(long, default_value = "google-news", global = true)]
    source: String,
    /// Annotation calls allowed in flight at once
    #[arg(long, default_value_t = 4, global = true)]
    concurrency: usize,
    /// Skip translation and speech; `audio_path` is null
    #[arg(long, global = true)]
    no_audio: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Analyze recent coverage of a company and print the report as JSON
    Analyze {
        company: String,
        #[arg(long, default_value_t = DEFAULT_ARTICLE_LIMIT)]
        limit: usize,
    },
    /// Run the HTTP service
    Serve {
        #[arg(long, env = "NS_HOST", default_value = "0.0.0.0")]
        host: String,
        #[arg(long, env = "NS_PORT", default_value_t = 8000)]
        port: u16,
        /// Remove audio files older than this (e.g. 1h, 30m, 1d)
        #[arg(long, default_value = "1h")]
        cleanup_after: HumanDuration,
        /// How often the cleanup runs
        #[arg(long, default_value = "10m")]
        cleanup_interval: HumanDuration,
    },
}

fn build_manager(cli: &Cli, store: AudioStore) -> anyhow::Result<AnalysisManager> {
    let config = ns_inference::Config {
        provider: cli.model.clone(),
        api_key: cli.api_key.clone(),
        model_name: cli.model_name.clone(),
        base_url: cli.base_url.clone(),
        request_timeout: cli.timeout.0,
        target_language: cli.language.clone(),
    };
    let model = create_model(&config)?;
    info!("🧠 Inference model initialized successfully (using {})", model.name());
    let client = StructuredClient::new(model);

    let source_config = SourceConfig {
        request_timeout: cli.timeout.0,
        ..SourceConfig::default()
    };
    let source = create_source(&cli.source, &source_config)?;
    info!("🦗 News source initialized successfully: {}", source.name());

    let narrator = if cli.no_audio {
        info!("🔇 Audio summary disabled");
        None
    } else {
        let speech = GoogleTranslateTts::new(&TtsConfig {
            request_timeout: cli.timeout.0,
            ..TtsConfig::default()
        })?;
        Some(Narrator::new(client.clone(), Arc::new(speech), store, cli.language.clone()))
    };

    Ok(AnalysisManager::new(
        source,
        Annotator::new(client.clone()),
        Aggregator::new(client),
        narrator,
        ManagerConfig {
            max_concurrent_annotations: cli.concurrency.max(1),
        },
    ))
}

fn spawn_cleanup(store: AudioStore, every: Duration, max_age: Duration) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        loop {
            ticker.tick().await;
            if let Err(e) = store.cleanup_older_than(max_age).await {
                warn!("⚠️ Audio cleanup failed: {}", e);
            }
        }
    });
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
    let cli = Cli::parse();

    let store = AudioStore::new(AudioConfig::new(&cli.audio_dir));
    let manager = build_manager(&cli, store.clone())?;

    match cli.command {
        Commands::Analyze { company, limit } => {
            let report = manager.analyze(&company, limit).await?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Commands::Serve {
            host,
            port,
            cleanup_after,
            cleanup_interval,
        } => {
            info!(
                "🧹 Removing audio older than {}s every {}s",
                cleanup_after.0.as_secs(),
                cleanup_interval.0.as_secs()
            );
            spawn_cleanup(store.clone(), cleanup_interval.0, cleanup_after.0);
            let state = AppState {
                manager: Arc::new(manager),
                audio_dir: store.dir().to_path_buf(),
            };
            ns_web::serve(state, &format!("{}:{}", host, port)).await?;
        }
    }

    Ok(())
}
