use mail_assist::assistant::Assistant;
use mail_assist::config::Config;
use mail_assist::jmap::JmapClient;
use mail_assist::session::Session;

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = Config::from_env();

    eprintln!("📬 mail-assist v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Model: {}", config.model);
    eprintln!("   Generation endpoint: {}", config.ollama_url);

    let jmap = JmapClient::new(&config);
    let assistant = Assistant::new(&config);

    let inbox_id = match jmap.locate_inbox().await {
        Ok(Some(id)) => id,
        Ok(None) => {
            eprintln!("Inbox not found.");
            std::process::exit(1);
        }
        Err(e) => {
            eprintln!("An error occurred: {e}");
            std::process::exit(1);
        }
    };
    tracing::debug!(inbox_id = %inbox_id, "located inbox");

    let session = Session::new(jmap, assistant, inbox_id, config.fetch_limit);
    if let Err(e) = session.run().await {
        eprintln!("An error occurred: {e}");
        std::process::exit(1);
    }
}
