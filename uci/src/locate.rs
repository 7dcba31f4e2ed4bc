use std::env;
use std::ffi::OsStr;
use std::path::PathBuf;

use anyhow::{anyhow, ensure, Result};
use common::FsExt;
use log::info;

pub const ENGINE_PATH_ENV: &str = "STOCKFISH_PATH";

const ENGINE_BINARY: &str = "stockfish";

const KNOWN_PATHS: [&str; 6] = [
    "/usr/games/stockfish",
    "/usr/bin/stockfish",
    "/usr/local/bin/stockfish",
    "/opt/homebrew/bin/stockfish",
    "/app/.apt/usr/games/stockfish",
    "/home/appuser/venv/bin/stockfish",
];

/// Finds the engine binary: the configured path first, then the
/// `STOCKFISH_PATH` environment variable, the usual install locations and
/// finally `PATH`.
pub fn locate_engine(configured: Option<&str>) -> Result<PathBuf> {
    if let Some(path) = configured {
        return existing(path);
    }

    if let Ok(path) = env::var(ENGINE_PATH_ENV) {
        return existing(&path);
    }

    let found = KNOWN_PATHS
        .iter()
        .map(PathBuf::from)
        .find(|p| p.is_file())
        .or_else(|| env::var_os("PATH").and_then(|paths| search_paths(&paths, ENGINE_BINARY)));

    match found {
        Some(path) => {
            info!("Using engine at {:?}", path);
            Ok(path)
        }
        None => Err(anyhow!(
            "No UCI engine found. Set engine_path in the config or {}",
            ENGINE_PATH_ENV
        )),
    }
}

fn existing(path: &str) -> Result<PathBuf> {
    let path = path.relative_to_cwd()?;
    ensure!(path.is_file(), "Engine binary {:?} does not exist", path);

    Ok(path)
}

fn search_paths(paths: &OsStr, binary: &str) -> Option<PathBuf> {
    env::split_paths(paths)
        .map(|dir| dir.join(binary))
        .find(|candidate| candidate.is_file())
}
