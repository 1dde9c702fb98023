use std::time::{Duration, Instant};

use log::{info, warn};
use shakmaty::{CastlingMode, Chess, Position, fen::Fen};

use crate::{
    config::Config,
    depth::DepthPolicy,
    engine::Evaluator,
    error::AnalyzerError,
    evaluator::{ProgressSink, evaluate_all},
    ranking::rank,
    tablebase::{SyzygyTables, TableProbe, TablebaseSummary, summarize},
    types::Ranking,
    uci::UciEngine,
};

/// Result of one analysis pass over a position.
#[derive(Debug, Clone)]
pub struct Analysis {
    pub ranking: Ranking,
    /// Engine search depth used for fallback evaluations.
    pub depth: u32,
    pub elapsed: Duration,
}

/// Ranks every legal move of a position, tablebase first, engine second.
///
/// The analyzer owns its engine and tablebase for the whole session and
/// releases both exactly once, through [`Analyzer::close`] or on drop.
pub struct Analyzer<E: Evaluator> {
    engine: E,
    tables: Option<Box<dyn TableProbe>>,
    depth: DepthPolicy,
    closed: bool,
}

impl Analyzer<UciEngine> {
    /// Start the configured engine and open the configured tablebases.
    ///
    /// Tablebase trouble of any kind is not an error; the analyzer then
    /// relies on the engine alone.
    pub fn from_config(config: &Config) -> Result<Self, AnalyzerError> {
        let mut engine = UciEngine::spawn(&config.engine_path)?;
        engine.configure(&config.engine_options())?;

        let tables = usable_tables(SyzygyTables::open(&config.syzygy_path));
        Ok(Self::new(engine, tables, config.depth_policy()))
    }
}

fn usable_tables<T: TableProbe + 'static>(
    opened: Result<Option<T>, AnalyzerError>,
) -> Option<Box<dyn TableProbe>> {
    match opened {
        Ok(Some(tables)) => Some(Box::new(tables)),
        Ok(None) => {
            info!("running without tablebases");
            None
        }
        Err(err) => {
            warn!("{err}, running without tablebases");
            None
        }
    }
}

/// Parse a FEN string into a legal standard-chess position.
pub fn position_from_fen(fen: &str) -> Result<Chess, AnalyzerError> {
    let fen: Fen = fen.trim().parse()?;
    Ok(fen.into_position(CastlingMode::Standard)?)
}

impl<E: Evaluator> Analyzer<E> {
    pub fn new(engine: E, tables: Option<Box<dyn TableProbe>>, depth: DepthPolicy) -> Self {
        Self {
            engine,
            tables,
            depth,
            closed: false,
        }
    }

    pub fn has_tablebase(&self) -> bool {
        self.tables.is_some()
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Tablebase verdict for `pos` itself, if tables are loaded and cover it.
    pub fn tablebase_summary(&self, pos: &Chess) -> Option<TablebaseSummary> {
        summarize(self.tables.as_deref()?, pos)
    }

    /// Evaluate and rank every legal move of `pos`.
    pub fn analyse(
        &mut self,
        pos: &Chess,
        progress: &mut dyn ProgressSink,
    ) -> Result<Analysis, AnalyzerError> {
        let start = Instant::now();
        let depth = self.depth.depth_for(pos);

        let evaluations = evaluate_all(
            pos,
            &mut self.engine,
            depth,
            self.tables.as_deref(),
            progress,
        )?;
        let ranking = rank(evaluations, pos.turn().is_white());

        Ok(Analysis {
            ranking,
            depth,
            elapsed: start.elapsed(),
        })
    }

    /// Quit the engine and close the tablebases.
    pub fn close(mut self) -> Result<(), AnalyzerError> {
        self.release()
    }

    fn release(&mut self) -> Result<(), AnalyzerError> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;

        if let Some(tables) = self.tables.as_mut() {
            tables.close();
        }
        self.engine.quit()
    }
}

impl<E: Evaluator> Drop for Analyzer<E> {
    fn drop(&mut self) {
        let _ = self.release();
    }
}
