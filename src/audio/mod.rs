//! Sound cues for eating and dying.
//!
//! Both the sound files and the output device are optional. When either is
//! missing the corresponding cue is skipped, and the game never fails
//! because of it.

mod output;

use std::path::Path;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::game::GameEvent;

use output::Output;

pub const EAT_SOUND_FILE: &str = "eat.wav";
pub const GAME_OVER_SOUND_FILE: &str = "game_over.wav";

/// Raw bytes of the sound files that could be read
#[derive(Debug, Clone, Default)]
pub struct SoundBank {
    eat: Option<Arc<[u8]>>,
    game_over: Option<Arc<[u8]>>,
}

impl SoundBank {
    /// Read `eat.wav` and `game_over.wav` from `dir`. Unreadable files are skipped.
    pub fn load(dir: &Path) -> Self {
        Self {
            eat: read_optional(&dir.join(EAT_SOUND_FILE)),
            game_over: read_optional(&dir.join(GAME_OVER_SOUND_FILE)),
        }
    }

    pub fn cue(&self, event: GameEvent) -> Option<&Arc<[u8]>> {
        match event {
            GameEvent::FoodEaten => self.eat.as_ref(),
            GameEvent::GameOver => self.game_over.as_ref(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.eat.is_none() && self.game_over.is_none()
    }
}

fn read_optional(path: &Path) -> Option<Arc<[u8]>> {
    match std::fs::read(path) {
        Ok(bytes) => {
            debug!(?path, size = bytes.len(), "loaded sound");
            Some(bytes.into())
        }
        Err(err) => {
            warn!(?path, %err, "sound not available, continuing without it");
            None
        }
    }
}

/// Plays [`GameEvent`] cues on the default output device, if there is one
pub struct Audio {
    output: Option<Output>,
    bank: SoundBank,
}

impl Audio {
    /// Open the default output device and load sounds from `dir`
    pub fn open(dir: &Path) -> Self {
        let bank = SoundBank::load(dir);
        let output = if bank.is_empty() {
            None
        } else {
            Output::open()
        };

        Self { output, bank }
    }

    /// An audio handle that never makes a sound
    pub fn muted() -> Self {
        Self {
            output: None,
            bank: SoundBank::default(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.output.is_some() && !self.bank.is_empty()
    }

    pub fn play(&self, event: GameEvent) {
        if let (Some(output), Some(bytes)) = (&self.output, self.bank.cue(event)) {
            output.play(Arc::clone(bytes));
        }
    }
}
