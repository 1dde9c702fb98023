//! Endgame tablebase access.
//!
//! [`TableProbe`] is the capability the position evaluator needs; the
//! production implementation is [`SyzygyTables`], backed by
//! `shakmaty-syzygy`. Probe failures are reported as [`ProbeError`] and
//! are always recoverable.

use std::{
    fmt,
    path::{Path, PathBuf},
};

use log::{debug, info};
use shakmaty::Chess;
use shakmaty_syzygy::{SyzygyError, Tablebase, Wdl};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProbeError {
    #[error("tablebase probe failed: {0}")]
    Syzygy(#[from] SyzygyError),
}

/// Read-only lookup into a set of endgame tables.
///
/// Classifications are relative to the side to move in `pos`:
/// -2 loss, -1 blessed loss, 0 draw, 1 cursed win, 2 win. `Ok(None)`
/// means the position is not covered.
pub trait TableProbe {
    fn probe_wdl(&self, pos: &Chess) -> Result<Option<i32>, ProbeError>;

    fn probe_dtz(&self, pos: &Chess) -> Result<Option<i32>, ProbeError>;

    /// Release the handle. Called once when the owning session ends.
    fn close(&mut self) {}
}

fn covered<T>(result: Result<T, SyzygyError>) -> Result<Option<T>, ProbeError> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(
            SyzygyError::Castling | SyzygyError::TooManyPieces | SyzygyError::MissingTable { .. },
        ) => Ok(None),
        Err(err) => Err(err.into()),
    }
}

pub struct SyzygyTables {
    tables: Tablebase<Chess>,
    path: PathBuf,
}

impl SyzygyTables {
    /// Open every table file in `dir`.
    ///
    /// Returns `Ok(None)` when the directory is missing or holds no tables.
    pub fn open(dir: &Path) -> Result<Option<Self>, crate::AnalyzerError> {
        if !dir.is_dir() {
            info!("no tablebase directory at {}", dir.display());
            return Ok(None);
        }

        let mut tables = Tablebase::new();
        let files = tables
            .add_directory(dir)
            .map_err(|source| crate::AnalyzerError::Tablebase {
                path: dir.to_path_buf(),
                source,
            })?;

        if files == 0 {
            info!("no tablebase files in {}", dir.display());
            return Ok(None);
        }

        info!("loaded {files} tablebase files from {}", dir.display());
        Ok(Some(Self {
            tables,
            path: dir.to_path_buf(),
        }))
    }
}

impl TableProbe for SyzygyTables {
    fn probe_wdl(&self, pos: &Chess) -> Result<Option<i32>, ProbeError> {
        let wdl = covered(self.tables.probe_wdl_after_zeroing(pos))?;
        Ok(wdl.map(|wdl| match wdl {
            Wdl::Loss => -2,
            Wdl::BlessedLoss => -1,
            Wdl::Draw => 0,
            Wdl::CursedWin => 1,
            Wdl::Win => 2,
        }))
    }

    fn probe_dtz(&self, pos: &Chess) -> Result<Option<i32>, ProbeError> {
        let dtz = covered(self.tables.probe_dtz(pos))?;
        Ok(dtz.map(|dtz| dtz.ignore_rounding().0))
    }

    fn close(&mut self) {
        debug!("closing tablebases at {}", self.path.display());
    }
}

/// Tablebase verdict for the position about to be played from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TablebaseSummary {
    pub wdl: i32,
    pub dtz: Option<u32>,
}

impl TablebaseSummary {
    pub fn outcome(&self) -> &'static str {
        match self.wdl {
            0 => "Draw",
            w if w > 0 => "Win",
            _ => "Loss",
        }
    }
}

impl fmt::Display for TablebaseSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Tablebase: {} (DTZ: ", self.outcome())?;
        match self.dtz {
            Some(dtz) => write!(f, "{dtz})"),
            None => write!(f, "N/A)"),
        }
    }
}

/// Probe `pos` for display, swallowing every probe failure.
pub fn summarize(tables: &dyn TableProbe, pos: &Chess) -> Option<TablebaseSummary> {
    let wdl = tables.probe_wdl(pos).ok().flatten()?;
    let dtz = tables
        .probe_dtz(pos)
        .ok()
        .flatten()
        .map(i32::unsigned_abs);
    Some(TablebaseSummary { wdl, dtz })
}
