//! Engine sessions over the Universal Chess Interface.
//!
//! [`UciSession`] speaks the line protocol over any reader/writer pair;
//! [`UciEngine`] owns a spawned engine process and its pipes.

use std::{
    io::{BufRead, BufReader, Write},
    path::{Path, PathBuf},
    process::{Child, ChildStdin, ChildStdout, Command, ExitStatus, Stdio},
    thread,
    time::{Duration, Instant},
};

use log::{debug, trace, warn};
use shakmaty::{Chess, Color, EnPassantMode, Position, fen::Fen};

use crate::{
    engine::{EngineOptions, Evaluator, Score},
    error::AnalyzerError,
};

/// How long a quitting engine may take to exit before it is killed.
const QUIT_GRACE: Duration = Duration::from_secs(2);

/// Score as printed by the engine, relative to the side to move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RelativeScore {
    Cp(i32),
    Mate(i32),
}

impl RelativeScore {
    fn to_white(self, turn: Color) -> Score {
        match self {
            RelativeScore::Cp(cp) => Score::Cp(turn.fold_wb(cp, -cp)),
            RelativeScore::Mate(n) => Score::Mate {
                winner: if n > 0 { turn } else { !turn },
                moves: n.unsigned_abs(),
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct InfoScore {
    score: RelativeScore,
    bound: bool,
}

/// Extract the score from an `info` line, if it carries one.
fn parse_info_score(line: &str) -> Option<InfoScore> {
    let mut tokens = line.split_whitespace().peekable();
    if tokens.next()? != "info" || tokens.peek() == Some(&"string") {
        return None;
    }

    tokens.by_ref().find(|&t| t == "score")?;
    let kind = tokens.next()?;
    let value: i32 = tokens.next()?.parse().ok()?;
    let score = match kind {
        "cp" => RelativeScore::Cp(value),
        "mate" => RelativeScore::Mate(value),
        _ => return None,
    };
    let bound = matches!(tokens.next(), Some("lowerbound" | "upperbound"));

    Some(InfoScore { score, bound })
}

pub struct UciSession<R, W> {
    reader: R,
    writer: W,
    name: Option<String>,
    quit_sent: bool,
}

impl<R: BufRead, W: Write> UciSession<R, W> {
    /// Wrap a reader/writer pair without talking to the engine.
    pub fn new(reader: R, writer: W) -> Self {
        Self {
            reader,
            writer,
            name: None,
            quit_sent: false,
        }
    }

    /// Wrap a reader/writer pair and perform the opening handshake.
    pub fn start(reader: R, writer: W) -> Result<Self, AnalyzerError> {
        let mut session = Self::new(reader, writer);
        session.handshake()?;
        Ok(session)
    }

    /// Engine name announced during the handshake.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    #[cfg(test)]
    fn writer(&self) -> &W {
        &self.writer
    }

    fn send(&mut self, line: &str) -> Result<(), AnalyzerError> {
        trace!(">> {line}");
        self.writer.write_all(line.as_bytes())?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()?;
        Ok(())
    }

    fn recv(&mut self) -> Result<String, AnalyzerError> {
        let mut line = String::new();
        if self.reader.read_line(&mut line)? == 0 {
            return Err(AnalyzerError::EngineExited);
        }
        let line = line.trim_end().to_string();
        trace!("<< {line}");
        Ok(line)
    }

    fn wait_for(&mut self, token: &str) -> Result<(), AnalyzerError> {
        loop {
            let line = self.recv()?;
            if let Some(name) = line.strip_prefix("id name ") {
                self.name = Some(name.trim().to_string());
            }
            if line.trim() == token {
                return Ok(());
            }
        }
    }

    fn sync(&mut self) -> Result<(), AnalyzerError> {
        self.send("isready")?;
        self.wait_for("readyok")
    }

    fn handshake(&mut self) -> Result<(), AnalyzerError> {
        self.send("uci")?;
        self.wait_for("uciok")?;
        self.sync()?;
        self.send("ucinewgame")?;
        self.sync()?;
        debug!("engine ready: {}", self.name().unwrap_or("unknown"));
        Ok(())
    }
}

impl<R: BufRead, W: Write> Evaluator for UciSession<R, W> {
    fn configure(&mut self, options: &EngineOptions) -> Result<(), AnalyzerError> {
        for (name, value) in options.to_uci_options() {
            debug!("setoption {name} = {value}");
            self.send(&format!("setoption name {name} value {value}"))?;
        }
        self.sync()
    }

    fn analyse(&mut self, pos: &Chess, depth: u32) -> Result<Score, AnalyzerError> {
        let fen = Fen::from_position(pos, EnPassantMode::Legal);
        self.send(&format!("position fen {fen}"))?;
        self.send(&format!("go depth {depth}"))?;

        let mut exact = None;
        let mut bounded = None;
        loop {
            let line = self.recv()?;
            if line.split_whitespace().next() == Some("bestmove") {
                break;
            }
            match parse_info_score(&line) {
                Some(InfoScore { score, bound: false }) => exact = Some(score),
                Some(InfoScore { score, bound: true }) => bounded = Some(score),
                None => {}
            }
        }

        exact
            .or(bounded)
            .map(|score| score.to_white(pos.turn()))
            .ok_or_else(|| AnalyzerError::EngineProtocol(format!("no score reported for {fen}")))
    }

    fn quit(&mut self) -> Result<(), AnalyzerError> {
        if self.quit_sent {
            return Ok(());
        }
        self.quit_sent = true;
        self.send("quit")
    }
}

/// A spawned engine process.
pub struct UciEngine {
    path: PathBuf,
    child: Child,
    session: UciSession<BufReader<ChildStdout>, ChildStdin>,
    reaped: bool,
}

impl UciEngine {
    /// Launch the engine binary at `path` and complete the handshake.
    pub fn spawn(path: &Path) -> Result<Self, AnalyzerError> {
        let mut child = Command::new(path)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|source| AnalyzerError::EngineSpawn {
                path: path.to_path_buf(),
                source,
            })?;

        let (Some(stdin), Some(stdout)) = (child.stdin.take(), child.stdout.take()) else {
            let _ = child.kill();
            let _ = child.wait();
            return Err(AnalyzerError::EngineProtocol(
                "engine pipes unavailable".to_string(),
            ));
        };

        let session = match UciSession::start(BufReader::new(stdout), stdin) {
            Ok(session) => session,
            Err(err) => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(err);
            }
        };

        debug!("spawned {} (pid {})", path.display(), child.id());
        Ok(Self {
            path: path.to_path_buf(),
            child,
            session,
            reaped: false,
        })
    }

    /// Engine name announced during the handshake.
    pub fn name(&self) -> Option<&str> {
        self.session.name()
    }

    /// Reap the child, killing it if it has not exited within
    /// [`QUIT_GRACE`].
    fn reap(&mut self) -> Result<ExitStatus, AnalyzerError> {
        let deadline = Instant::now() + QUIT_GRACE;
        while Instant::now() < deadline {
            if let Some(status) = self.child.try_wait()? {
                return Ok(status);
            }
            thread::sleep(Duration::from_millis(20));
        }
        warn!("{} ignored quit, killing it", self.path.display());
        self.child.kill()?;
        Ok(self.child.wait()?)
    }
}

impl Evaluator for UciEngine {
    fn configure(&mut self, options: &EngineOptions) -> Result<(), AnalyzerError> {
        self.session.configure(options)
    }

    fn analyse(&mut self, pos: &Chess, depth: u32) -> Result<Score, AnalyzerError> {
        self.session.analyse(pos, depth)
    }

    fn quit(&mut self) -> Result<(), AnalyzerError> {
        if self.reaped {
            return Ok(());
        }
        self.reaped = true;

        let sent = self.session.quit();
        if sent.is_err() {
            let _ = self.child.kill();
        }
        let status = self.reap()?;
        debug!("{} exited with {status}", self.path.display());
        sent
    }
}

impl Drop for UciEngine {
    fn drop(&mut self) {
        if !self.reaped {
            let _ = self.quit();
        }
    }
}
