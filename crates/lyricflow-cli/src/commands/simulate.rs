use std::path::Path;

use anyhow::{bail, Result};
use serde::Serialize;

use lyricflow_core::{
    AllVisible, AppConfig, LyricsEngine, ManualWallClock, RecordingSurface, SurfaceCommand,
    TextMetrics, TickReport, Timeline,
};

/// Clock positions to tick through
#[derive(Debug, Clone, Copy)]
pub struct Plan {
    pub from: i64,
    pub to: i64,
    pub step: i64,
    pub seek_to: Option<i64>,
}

impl Plan {
    fn positions(&self) -> Result<Vec<i64>> {
        if self.step <= 0 {
            bail!("--step must be positive, got {}", self.step);
        }
        if self.to < self.from {
            bail!("--to ({}) is before --from ({})", self.to, self.from);
        }
        let mut positions: Vec<i64> = (self.from..=self.to).step_by(self.step as usize).collect();
        positions.extend(self.seek_to);
        Ok(positions)
    }
}

/// One simulated tick as printed on stdout
#[derive(Debug, Serialize)]
pub struct TickRecord {
    pub clock_ms: i64,
    #[serde(flatten)]
    pub report: TickReport,
    pub commands: Vec<SurfaceCommand>,
}

pub async fn run(config: &AppConfig, path: &Path, plan: Plan) -> Result<()> {
    let timeline = super::read_timeline(path, &config.timing).await?;
    for record in simulate(config, timeline, plan)? {
        println!("{}", serde_json::to_string(&record)?);
    }
    Ok(())
}

/// Drive the engine through `plan` against a recording surface.
///
/// The wall clock advances by one step between ticks so idle and debounce
/// timers run even across seeks.
pub fn simulate(config: &AppConfig, timeline: Timeline, plan: Plan) -> Result<Vec<TickRecord>> {
    let positions = plan.positions()?;

    let wall = ManualWallClock::new();
    let mut engine = LyricsEngine::new(config, TextMetrics::cell(&config.font), wall.clone());
    let mut surface = RecordingSurface::new(1.0, config.ui.scroll_padding_rows as f32);

    engine.render(timeline, &mut surface);
    if let Some(cache) = engine.cache() {
        surface.set_layout(cache.lines().iter().map(|l| l.id).collect::<Vec<_>>());
    }
    // Render output precedes the first tick
    let mut records = Vec::with_capacity(positions.len());
    let mut pending = surface.drain();

    let mut first = true;
    for clock_ms in positions {
        if !first {
            wall.advance_ms(plan.step as u64);
        }
        first = false;

        let report = engine.tick(clock_ms, false, &mut surface, &AllVisible);
        let mut commands = std::mem::take(&mut pending);
        commands.extend(surface.drain());
        records.push(TickRecord {
            clock_ms,
            report,
            commands,
        });
    }
    Ok(records)
}
