use anyhow::{anyhow, Context, Result};
use engine::{GameRecord, GameState as GameStateTrait};
use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;
use shakmaty::san::SanPlus;

use super::{Action, GameState};

pub type ChessGame = GameRecord<GameState, Action>;

static TAG_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"^\s*\[([A-Za-z0-9_]+)\s+"((?:[^"\\]|\\.)*)"\s*\]\s*$"#).unwrap());
static MOVE_NUMBER_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+\.+").unwrap());
static ANNOTATION_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[!?]+$").unwrap());

const RESULTS: [&str; 4] = ["1-0", "0-1", "1/2-1/2", "*"];

/// Reads the first game of a PGN document: its tag pairs and main line.
/// Comments, NAGs, annotation glyphs and variations are skipped.
pub fn parse_pgn(pgn: &str) -> Result<ChessGame> {
    let mut tags = Vec::new();
    let mut movetext = String::new();

    for line in pgn.lines() {
        if let Some(cap) = TAG_RE.captures(line) {
            if !movetext.trim().is_empty() {
                // The tag section of a second game.
                break;
            }
            tags.push((cap[1].to_string(), cap[2].replace("\\\"", "\"")));
        } else if !line.trim_start().starts_with('%') {
            movetext.push_str(line);
            movetext.push('\n');
        }
    }

    let initial = match tags.iter().find(|(name, _)| name == "FEN") {
        Some((_, fen)) => fen.parse::<GameState>().context("Invalid FEN tag")?,
        None => GameState::initial(),
    };

    let mut game = GameRecord::new(initial);
    game.tags.extend(tags);

    for token in main_line_tokens(&movetext) {
        let token = MOVE_NUMBER_RE.replace(token, "");
        let token = ANNOTATION_RE.replace(&token, "");
        if token.is_empty() || token.starts_with('$') {
            continue;
        }

        if RESULTS.contains(&&*token) {
            break;
        }

        let before = game
            .plies
            .last()
            .map(|p| p.after.clone())
            .unwrap_or_else(|| game.initial.clone());

        let action = parse_san(&token, &before)
            .with_context(|| format!("Move {} ({})", game.len() + 1, token))?;

        game.push(action, |state, action| state.play(action));
    }

    debug!("Parsed PGN with {} plies", game.len());

    Ok(game)
}

fn parse_san(token: &str, game_state: &GameState) -> Result<Action> {
    let san = token
        .parse::<SanPlus>()
        .map_err(|e| anyhow!("Invalid SAN: {}", e))?;

    let mv = san
        .san
        .to_move(game_state.position())
        .map_err(|e| anyhow!("Illegal move in {}: {}", game_state, e))?;

    Ok(Action::new(mv))
}

/// Splits movetext into whitespace separated tokens, dropping `{}` and `;`
/// comments and any parenthesised variations.
fn main_line_tokens(movetext: &str) -> Vec<&str> {
    let mut tokens = Vec::new();
    let mut depth = 0usize;
    let mut in_brace_comment = false;
    let mut in_line_comment = false;
    let mut token_start: Option<usize> = None;

    for (i, c) in movetext.char_indices() {
        let in_main_line = depth == 0 && !in_brace_comment && !in_line_comment;
        let is_separator = c.is_whitespace() || matches!(c, '{' | '}' | '(' | ')' | ';');

        if in_main_line && !is_separator {
            token_start.get_or_insert(i);
            continue;
        }

        if let Some(start) = token_start.take() {
            tokens.push(&movetext[start..i]);
        }

        match c {
            '\n' if in_line_comment => in_line_comment = false,
            '}' if in_brace_comment => in_brace_comment = false,
            _ if in_brace_comment || in_line_comment => {}
            '{' => in_brace_comment = true,
            ';' => in_line_comment = true,
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            _ => {}
        }
    }

    if let Some(start) = token_start {
        tokens.push(&movetext[start..]);
    }

    tokens
}
