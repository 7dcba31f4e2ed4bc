mod cli;

use anyhow::{Context, Result};
use chess::{parse_pgn, GameState};
use clap::Parser;
use cli::{AnalyzeGameCommand, AnalyzePositionCommand, Cli, Commands};
use common::{get_env_usize, ConfigLoader, FsExt};
use dotenv::dotenv;
use engine::{Evaluation, Side};
use env_logger::Env;
use log::{info, warn};
use risk::{
    compute, Cancellation, ContinuationSampler, GameRiskAggregator, RiskOptions, RiskProfile,
};
use serde::Serialize;
use uci::{UciOptions, UciOracle};

#[derive(Serialize)]
struct PositionReport {
    fen: String,
    side_to_move: Side,
    evaluation: Option<Evaluation>,
    risk: RiskProfile,
}

fn main() -> Result<()> {
    dotenv().ok();
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let mut builder = tokio::runtime::Builder::new_multi_thread();

    builder.enable_all();

    if let Some(worker_threads) = get_env_usize("TOKIO_THREADS")? {
        builder.worker_threads(worker_threads);
    }

    info!("{:?}", builder);

    builder.build()?.block_on(async_main())?;

    Ok(())
}

async fn async_main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::AnalyzeGame(args) => analyze_game(args).await,
        Commands::AnalyzePosition(args) => analyze_position(args).await,
    }
}

async fn analyze_game(args: AnalyzeGameCommand) -> Result<()> {
    let (mut risk_options, uci_options) = load_options(&args.config)?;

    if let Some(max_moves) = args.max_moves {
        risk_options.max_moves = max_moves;
    }

    let pgn_path = args.pgn.relative_to_cwd()?;
    let pgn = std::fs::read_to_string(&pgn_path)
        .with_context(|| format!("Failed to read PGN file {:?}", pgn_path))?;
    let game = parse_pgn(&pgn)?;

    info!("Loaded game of {} plies from {:?}", game.plies.len(), pgn_path);

    let oracle = UciOracle::start(uci_options).await?;
    let engine = chess::Engine::new();
    let cancellation = Cancellation::new();
    cancel_on_ctrl_c(cancellation.clone());

    let aggregator = GameRiskAggregator::new(&engine, &oracle, &risk_options);
    let report = aggregator.analyze(&game, &cancellation).await?;

    if !report.complete {
        warn!("Analysis was interrupted, writing the {} plies completed", report.plies.len());
    }

    info!(
        "White accuracy {:?}, black accuracy {:?}, {} blunders",
        report.white.accuracy, report.black.accuracy, report.summary.total_blunders
    );

    write_output(&report, args.output.as_deref())
}

async fn analyze_position(args: AnalyzePositionCommand) -> Result<()> {
    let (risk_options, uci_options) = load_options(&args.config)?;

    let game_state = args.fen.parse::<GameState>()?;
    let oracle = UciOracle::start(uci_options).await?;
    let engine = chess::Engine::new();
    let sampler = ContinuationSampler::new(&engine, &oracle, &risk_options);

    let rollouts = sampler
        .sample(
            &game_state,
            risk_options.n_simulations,
            risk_options.max_ply,
            risk_options.search_depth,
            risk_options.seed,
        )
        .await
        .into_rollouts()?;

    let report = PositionReport {
        fen: game_state.fen(),
        side_to_move: game_state.turn(),
        evaluation: rollouts.first().map(|rollout| rollout.seed_evaluation),
        risk: compute(&rollouts, &risk_options),
    };

    write_output(&report, args.output.as_deref())
}

fn load_options(config: &str) -> Result<(RiskOptions, UciOptions)> {
    let config_path = config.relative_to_cwd()?;
    let config = ConfigLoader::new_or_defaults(config_path, "risk".to_string())?;

    let risk_options: RiskOptions = config.load()?;
    let uci_options: UciOptions = config.scoped("uci").load()?;

    risk_options.validate()?;

    Ok((risk_options, uci_options))
}

fn cancel_on_ctrl_c(cancellation: Cancellation) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, stopping after the current ply");
            cancellation.cancel();
        }
    });
}

fn write_output<T: Serialize>(value: &T, output: Option<&str>) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;

    match output {
        Some(path) => {
            let path = path.relative_to_cwd()?;
            std::fs::write(&path, json)
                .with_context(|| format!("Failed to write report to {:?}", path))?;
            info!("Wrote report to {:?}", path);
        }
        None => println!("{}", json),
    }

    Ok(())
}
