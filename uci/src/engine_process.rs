use std::collections::BTreeMap;
use std::path::Path;
use std::process::Stdio;

use anyhow::{anyhow, Context, Result};
use log::{debug, info};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};

use super::{parse_engine_line, EngineOutput, SearchInfo, UciOptions};

/// One running UCI engine. The process is killed when this is dropped.
pub struct EngineProcess {
    _child: Child,
    stdin: ChildStdin,
    stdout: Lines<BufReader<ChildStdout>>,
    multipv: usize,
    in_flight: bool,
}

impl EngineProcess {
    /// Starts the engine, completes the `uci` handshake and applies the
    /// configured options.
    pub async fn spawn(path: &Path, options: &UciOptions) -> Result<Self> {
        let mut child = Command::new(path)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .with_context(|| format!("Failed to start engine {:?}", path))?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| anyhow!("Engine stdin was not captured"))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| anyhow!("Engine stdout was not captured"))?;

        let mut process = Self {
            _child: child,
            stdin,
            stdout: BufReader::new(stdout).lines(),
            multipv: 1,
            in_flight: false,
        };

        tokio::time::timeout(options.handshake_timeout(), process.handshake(options))
            .await
            .map_err(|_| anyhow!("Engine {:?} did not answer the uci handshake", path))??;

        info!("Started engine {:?}", path);

        Ok(process)
    }

    async fn handshake(&mut self, options: &UciOptions) -> Result<()> {
        self.send("uci").await?;
        self.read_until(|output| matches!(output, EngineOutput::UciOk))
            .await?;

        self.send(&format!("setoption name Threads value {}", options.threads))
            .await?;
        self.send(&format!("setoption name Hash value {}", options.hash_mb))
            .await?;
        self.send("ucinewgame").await?;

        self.sync().await
    }

    /// Brings the engine back to an idle state, discarding any output of an
    /// abandoned search.
    pub async fn sync(&mut self) -> Result<()> {
        self.send("stop").await?;
        self.send("isready").await?;
        self.read_until(|output| matches!(output, EngineOutput::ReadyOk))
            .await
    }

    /// True when a search was abandoned before it finished, for instance at
    /// a deadline. The engine may hold half a command on its input and can
    /// no longer be trusted.
    pub fn is_interrupted(&self) -> bool {
        self.in_flight
    }

    /// Searches `fen` to `depth` reporting `multipv` lines, returned best
    /// first. Each line holds the deepest report the engine gave for it.
    pub async fn search(&mut self, fen: &str, depth: usize, multipv: usize) -> Result<Vec<SearchInfo>> {
        self.in_flight = true;
        let lines = self.run_search(fen, depth, multipv).await?;
        self.in_flight = false;

        Ok(lines)
    }

    async fn run_search(&mut self, fen: &str, depth: usize, multipv: usize) -> Result<Vec<SearchInfo>> {
        self.sync().await?;

        let multipv = multipv.max(1);
        if multipv != self.multipv {
            self.send(&format!("setoption name MultiPV value {}", multipv))
                .await?;
            self.multipv = multipv;
        }

        self.send(&format!("position fen {}", fen)).await?;
        self.send(&format!("go depth {}", depth)).await?;

        let mut lines = BTreeMap::new();
        loop {
            match parse_engine_line(&self.read_line().await?) {
                EngineOutput::Info(info) if info.score.is_some() && !info.bound => {
                    lines.insert(info.multipv, info);
                }
                EngineOutput::BestMove(_) => break,
                _ => {}
            }
        }

        Ok(lines.into_values().collect())
    }

    async fn send(&mut self, command: &str) -> Result<()> {
        debug!("> {}", command);

        self.stdin
            .write_all(format!("{}\n", command).as_bytes())
            .await
            .context("Failed to write to engine")?;
        self.stdin.flush().await.context("Failed to flush engine input")
    }

    async fn read_line(&mut self) -> Result<String> {
        let line = self
            .stdout
            .next_line()
            .await
            .context("Failed to read from engine")?
            .ok_or_else(|| anyhow!("Engine closed its output"))?;

        debug!("< {}", line);

        Ok(line)
    }

    async fn read_until<F>(&mut self, is_done: F) -> Result<()>
    where
        F: Fn(&EngineOutput) -> bool,
    {
        loop {
            if is_done(&parse_engine_line(&self.read_line().await?)) {
                return Ok(());
            }
        }
    }
}
