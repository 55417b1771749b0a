use std::path::PathBuf;

use common::Config;
use trendpost::ingestion;
use trendpost::llm::gemini::GeminiProvider;
use trendpost::pipeline;

/// Runs the collect and generate stages against the live services and prints
/// the post instead of delivering it. Needs the Gemini API key in the
/// environment; the Telegram secrets are not required.
#[tokio::main(flavor = "current_thread")]
async fn main() {
    dotenv::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let override_path = PathBuf::from("config.toml");
    let config = Config::load_with_defaults(
        None,
        if override_path.exists() { Some(&override_path) } else { None },
    )
    .await
    .expect("Failed to load configuration");

    let api_key = std::env::var(&config.generator.api_key_env).unwrap_or_else(|_| {
        panic!("Set {} to preview a generated post", config.generator.api_key_env)
    });

    println!("\n{}", "=".repeat(60));
    println!("Trendpost preview (nothing is delivered)");
    println!("{}", "=".repeat(60));

    println!("\n[Step 1] Collecting news...");
    let digest = ingestion::collect_digest(&config.feeds).await;
    if digest.is_empty() {
        eprintln!("✗ No news collected; nothing to preview");
        return;
    }
    println!("✓ Collected {} bullets:", digest.lines().count());
    println!("{}", digest);

    println!("\n[Step 2] Generating post...");
    let provider = GeminiProvider::from_config(&config.generator, api_key);
    let today = chrono::Local::now().date_naive();
    match pipeline::generate_post(&provider, &digest, today).await {
        Some(post) => {
            println!("✓ Success!\n");
            println!("{}", post);
        }
        None => {
            eprintln!("✗ Generation failed");
        }
    }

    println!("\n{}", "=".repeat(60));
    println!("Preview completed");
    println!("{}", "=".repeat(60));
}
