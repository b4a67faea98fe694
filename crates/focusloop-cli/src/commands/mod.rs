pub mod config;
pub mod timer;

use std::io::Write;

use focusloop_core::timer::ListenerResult;
use focusloop_core::{
    Database, FileStore, KeyValueStore, SessionType, SettingsStore, SystemClock, TimerEngine,
    TimerState,
};

const ENGINE_KEY: &str = "timer_state";

/// Settings file plus state database, both under the data directory.
pub struct Workspace {
    pub settings: SettingsStore<FileStore>,
    pub db: Database,
}

impl Workspace {
    pub fn open() -> Result<Self, Box<dyn std::error::Error>> {
        Ok(Self {
            settings: SettingsStore::new(FileStore::open()?),
            db: Database::open()?,
        })
    }

    /// Rebuild the engine left behind by the previous invocation.
    pub fn load_engine(&self) -> TimerEngine<SystemClock> {
        let settings = self.settings.load();
        let state = self.db.load(ENGINE_KEY, TimerState::initial(&settings));
        let mut engine = TimerEngine::restore(settings, state, SystemClock);
        engine.add_completion_listener(Box::new(ring_bell));
        engine
    }

    pub fn save_engine(
        &self,
        engine: &TimerEngine<SystemClock>,
    ) -> Result<(), Box<dyn std::error::Error>> {
        self.db.save(ENGINE_KEY, engine.state())?;
        Ok(())
    }
}

/// Audible completion cue: the terminal bell.
fn ring_bell(_completed: SessionType, _next: SessionType) -> ListenerResult {
    let mut err = std::io::stderr();
    err.write_all(b"\x07")?;
    err.flush()?;
    Ok(())
}
