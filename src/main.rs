//! MeanMax Referee
//!
//! Runs a demo match between in-process bots, then replays the recorded
//! transcript to check that the referee is deterministic.

use anyhow::{bail, Context, Result};
use tracing::info;
use tracing_subscriber::EnvFilter;

use meanmax_referee::{
    game::{config::RefereeConfig, replay::replay_match},
    runner::{BotClient, ChaserBot, MatchSession, WaitBot},
    VERSION,
};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let config = RefereeConfig::from_env();
    config.validate().context("invalid referee config")?;

    info!("MeanMax Referee v{}", VERSION);
    info!(
        seed = config.seed,
        players = config.player_count,
        max_rounds = config.max_rounds,
        timeout_ms = config.response_timeout.as_millis() as u64,
        "Config loaded"
    );

    // Last seat waits, the others chase
    let bots: Vec<Box<dyn BotClient>> = (0..config.player_count)
        .map(|i| -> Box<dyn BotClient> {
            if i + 1 == config.player_count && i > 0 {
                Box::new(WaitBot)
            } else {
                Box::new(ChaserBot::new())
            }
        })
        .collect();

    let mut session = MatchSession::new(config, bots)?;
    let summary = session.run().await;

    info!("=== Match Results ===");
    for (player, score) in summary.scores.iter().enumerate() {
        let status = if summary.eliminated.contains(&player) { "eliminated" } else { "alive" };
        info!(
            "Player {}: score {} ({} ranking points, {})",
            player, score, summary.ranking_points[player], status
        );
    }
    info!("Frames: {} lines", session.frames().len());
    info!("{}", serde_json::to_string(&summary)?);

    info!("=== Verifying Determinism ===");
    let outcome = replay_match(session.transcript())?;
    info!("Live State Hash:   {}", summary.state_hash);
    info!("Replay State Hash: {}", hex::encode(outcome.state_hash));

    if !outcome.matches(session.transcript()) {
        bail!("DETERMINISM FAILURE: hashes differ");
    }
    info!("DETERMINISM VERIFIED: Hashes match!");
    Ok(())
}
