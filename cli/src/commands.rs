//! Command implementations: config -> client -> analyzer -> renderer.

use std::sync::Arc;

use raidlens_core::analysis::ReportAnalyzer;
use raidlens_core::api::GraphQlClient;
use raidlens_core::config;

use crate::Commands;
use crate::render;

pub async fn run(command: Commands) -> Result<(), String> {
    match command {
        Commands::Interrupts {
            report,
            fight,
            player,
        } => interrupts(&report, fight, player.as_deref()).await,
        Commands::Deaths {
            report,
            fight,
            player,
        } => deaths(&report, fight, player.as_deref()).await,
        Commands::Players { report } => players(&report).await,
        Commands::Config { endpoint, token } => configure(endpoint, token),
    }
}

fn analyzer() -> Result<ReportAnalyzer<GraphQlClient>, String> {
    let config = config::load().map_err(|e| e.to_string())?;
    if !config.has_token() {
        return Err(
            "no API token configured; run `raidlens config --token <TOKEN>` first".to_string(),
        );
    }
    tracing::debug!("[CLI] using endpoint {}", config.endpoint);
    Ok(ReportAnalyzer::new(Arc::new(GraphQlClient::new(&config))))
}

async fn interrupts(report: &str, fight: i64, player: Option<&str>) -> Result<(), String> {
    let analyzer = analyzer()?;
    let analysis = analyzer
        .interrupt_analysis(report, fight, player)
        .await
        .map_err(|e| e.to_string())?;
    render::interrupt_analysis(&analysis, player);
    Ok(())
}

async fn deaths(report: &str, fight: i64, player: Option<&str>) -> Result<(), String> {
    let analyzer = analyzer()?;
    let analysis = analyzer
        .death_analysis(report, fight, player)
        .await
        .map_err(|e| e.to_string())?;
    render::death_analysis(&analysis, player);
    Ok(())
}

async fn players(report: &str) -> Result<(), String> {
    let analyzer = analyzer()?;
    let overview = analyzer
        .report_overview(report)
        .await
        .map_err(|e| e.to_string())?;
    let players = analyzer.players(report).await.map_err(|e| e.to_string())?;
    render::players(&overview, &players);
    Ok(())
}

fn configure(endpoint: Option<String>, token: Option<String>) -> Result<(), String> {
    let mut stored = config::load().map_err(|e| e.to_string())?;

    let updating = endpoint.is_some() || token.is_some();
    if let Some(endpoint) = endpoint {
        stored.endpoint = endpoint;
    }
    if let Some(token) = token {
        stored.access_token = token;
    }
    if updating {
        config::store(&stored).map_err(|e| e.to_string())?;
        println!("Configuration saved.");
    }

    println!("Endpoint: {}", stored.endpoint);
    println!(
        "Token:    {}",
        if stored.has_token() {
            "configured"
        } else {
            "not configured"
        }
    );
    if let Some(path) = config::path() {
        println!("File:     {}", path.display());
    }
    Ok(())
}
