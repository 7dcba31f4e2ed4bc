use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[clap(author, version)]
#[clap(name = "chess-risk")]
#[clap(about = "Measures the risk of chess positions and grades the moves of played games", long_about = None)]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    AnalyzeGame(AnalyzeGameCommand),
    AnalyzePosition(AnalyzePositionCommand),
}

#[derive(Args)]
#[clap(about = "Analyses every position of a PGN game and classifies each move", long_about = None)]
pub struct AnalyzeGameCommand {
    #[clap(short, long, default_value_t = String::from("client.conf"))]
    pub config: String,

    #[clap(short, long)]
    pub pgn: String,

    /// Only analyse the first N plies.
    #[clap(short, long)]
    pub max_moves: Option<usize>,

    /// Writes the report here instead of stdout.
    #[clap(short, long)]
    pub output: Option<String>,
}

#[derive(Args)]
#[clap(about = "Samples continuations from a single FEN and reports its risk profile", long_about = None)]
pub struct AnalyzePositionCommand {
    #[clap(short, long, default_value_t = String::from("client.conf"))]
    pub config: String,

    #[clap(short, long)]
    pub fen: String,

    #[clap(short, long)]
    pub output: Option<String>,
}
