use engine::Evaluation;
use once_cell::sync::Lazy;
use regex::Regex;

/// A line written by a UCI engine, reduced to what an analysis needs.
#[derive(Debug, PartialEq)]
pub enum EngineOutput {
    UciOk,
    ReadyOk,
    Info(SearchInfo),
    /// The final move of a search. `None` when the engine reports `(none)`.
    BestMove(Option<String>),
    Other,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Score {
    Centipawns(i32),
    Mate(i32),
}

impl Score {
    pub fn to_evaluation(self) -> Evaluation {
        match self {
            Score::Centipawns(cp) => Evaluation::Centipawns(cp),
            Score::Mate(moves) => Evaluation::from_uci_mate(moves),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SearchInfo {
    pub depth: Option<usize>,
    pub multipv: usize,
    pub score: Option<Score>,
    /// Set when the score is only a lower or upper bound.
    pub bound: bool,
    pub pv: Vec<String>,
}

static DEPTH_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\bdepth\s+(\d+)").unwrap());
static MULTIPV_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\bmultipv\s+(\d+)").unwrap());
static SCORE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\bscore\s+(cp|mate)\s+(-?\d+)(\s+(?:lowerbound|upperbound))?").unwrap()
});
static PV_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\bpv\s+(.+)$").unwrap());
static BEST_MOVE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^bestmove\s+(\S+)").unwrap());

pub fn parse_engine_line(line: &str) -> EngineOutput {
    let line = line.trim();

    match line {
        "uciok" => EngineOutput::UciOk,
        "readyok" => EngineOutput::ReadyOk,
        _ if line.starts_with("info string") => EngineOutput::Other,
        _ if line.starts_with("info ") => EngineOutput::Info(parse_info(line)),
        _ if BEST_MOVE_RE.is_match(line) => {
            let best_move = BEST_MOVE_RE
                .captures(line)
                .map(|cap| cap[1].to_string())
                .filter(|mv| mv != "(none)" && mv != "0000");
            EngineOutput::BestMove(best_move)
        }
        _ => EngineOutput::Other,
    }
}

fn parse_info(line: &str) -> SearchInfo {
    let depth = DEPTH_RE
        .captures(line)
        .and_then(|cap| cap[1].parse().ok());

    let multipv = MULTIPV_RE
        .captures(line)
        .and_then(|cap| cap[1].parse().ok())
        .unwrap_or(1);

    let (score, bound) = match SCORE_RE.captures(line) {
        Some(cap) => {
            let value = cap[2].parse::<i32>().ok();
            let score = match &cap[1] {
                "cp" => value.map(Score::Centipawns),
                _ => value.map(Score::Mate),
            };
            (score, cap.get(3).is_some())
        }
        None => (None, false),
    };

    let pv = PV_RE
        .captures(line)
        .map(|cap| cap[1].split_whitespace().map(|m| m.to_string()).collect())
        .unwrap_or_default();

    SearchInfo {
        depth,
        multipv,
        score,
        bound,
        pv,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_multipv_info() {
        let line = "info depth 12 seldepth 18 multipv 2 score cp -35 nodes 41820 nps 1045500 hashfull 14 tbhits 0 time 40 pv e7e5 g1f3 b8c6";

        assert_eq!(
            parse_engine_line(line),
            EngineOutput::Info(SearchInfo {
                depth: Some(12),
                multipv: 2,
                score: Some(Score::Centipawns(-35)),
                bound: false,
                pv: vec!["e7e5".to_string(), "g1f3".to_string(), "b8c6".to_string()],
            })
        );
    }

    #[test]
    fn test_parse_mate_score() {
        let line = "info depth 5 seldepth 5 score mate -2 nodes 900 pv h7h6 d1h5";

        match parse_engine_line(line) {
            EngineOutput::Info(info) => {
                assert_eq!(info.multipv, 1);
                assert_eq!(info.score, Some(Score::Mate(-2)));
                assert_eq!(info.score.unwrap().to_evaluation(), Evaluation::MatedIn(2));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_parse_bound_score() {
        let line = "info depth 20 multipv 1 score cp 48 lowerbound nodes 1 pv d2d4";

        match parse_engine_line(line) {
            EngineOutput::Info(info) => {
                assert!(info.bound);
                assert_eq!(info.score, Some(Score::Centipawns(48)));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_info_without_score() {
        match parse_engine_line("info depth 7 currmove g1f3 currmovenumber 3") {
            EngineOutput::Info(info) => {
                assert_eq!(info.depth, Some(7));
                assert_eq!(info.score, None);
                assert!(info.pv.is_empty());
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_mated_position() {
        match parse_engine_line("info depth 0 score mate 0") {
            EngineOutput::Info(info) => {
                assert_eq!(info.score.unwrap().to_evaluation(), Evaluation::MatedIn(0));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_best_move() {
        assert_eq!(
            parse_engine_line("bestmove e2e4 ponder e7e5"),
            EngineOutput::BestMove(Some("e2e4".to_string()))
        );
        assert_eq!(
            parse_engine_line("bestmove (none)"),
            EngineOutput::BestMove(None)
        );
    }

    #[test]
    fn test_handshake_and_noise() {
        assert_eq!(parse_engine_line("uciok"), EngineOutput::UciOk);
        assert_eq!(parse_engine_line("readyok\r"), EngineOutput::ReadyOk);
        assert_eq!(parse_engine_line("id name Stockfish 16"), EngineOutput::Other);
        assert_eq!(
            parse_engine_line("info string NNUE evaluation using nn.nnue enabled"),
            EngineOutput::Other
        );
    }
}
