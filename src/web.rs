//! Browser bridge
//!
//! The page owns the canvas, the keyboard listeners and the
//! requestAnimationFrame loop. Once per frame it pushes the held keys and
//! the elapsed time into a `WebSession`, then reads positions back to draw.

use wasm_bindgen::prelude::*;

use crate::persistence;
use crate::settings::Settings;
use crate::sim::{Entity, EntityId, InputSnapshot, LevelData, Session, SessionPhase, SimEvent};

/// Bits returned by `WebSession::frame` for sound/UI cues
pub const CUE_SWITCH: u32 = 1 << 0;
pub const CUE_DOOR: u32 = 1 << 1;
pub const CUE_LASER: u32 = 1 << 2;
pub const CUE_GHOST_EXPIRED: u32 = 1 << 3;
pub const CUE_LOOP_ENDED: u32 = 1 << 4;
pub const CUE_LEVEL_COMPLETE: u32 = 1 << 5;

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    if console_log::init_with_level(log::Level::Info).is_err() {
        // Logger already installed by an earlier module instance
    }
    log::info!("Echo Loop starting...");
}

#[wasm_bindgen]
pub struct WebSession {
    session: Session,
    keys: InputSnapshot,
}

#[wasm_bindgen]
impl WebSession {
    /// Load a level from its JSON text, restoring saved recordings
    #[wasm_bindgen(constructor)]
    pub fn new(level_json: &str) -> Result<WebSession, JsValue> {
        let level = LevelData::from_json(level_json).map_err(|e| JsValue::from_str(&e.to_string()))?;
        let mut session = Session::new(level, Settings::load());

        let saved = persistence::load_recordings(&session.level().name);
        if !saved.is_empty() {
            session.import_recordings(saved);
        }

        Ok(Self {
            session,
            keys: InputSnapshot::IDLE,
        })
    }

    /// Currently held intents, bit-encoded (bit 0 left .. bit 4 action)
    pub fn set_keys(&mut self, bits: u8) {
        self.keys = InputSnapshot::from_bits(bits);
    }

    /// Advance by `dt_seconds` of real time. Returns `CUE_*` bits for
    /// whatever happened during the ticks that ran.
    pub fn frame(&mut self, dt_seconds: f64) -> u32 {
        let events = self.session.advance(dt_seconds, &mut self.keys);
        let mut cues = 0;
        for event in &events {
            cues |= match event {
                SimEvent::SwitchChanged { .. } => CUE_SWITCH,
                SimEvent::DoorChanged { .. } => CUE_DOOR,
                SimEvent::LaserChanged { .. } => CUE_LASER,
                SimEvent::GhostExpired { .. } => CUE_GHOST_EXPIRED,
                SimEvent::AttemptEnded { .. } => CUE_LOOP_ENDED,
                SimEvent::LevelComplete { .. } => CUE_LEVEL_COMPLETE,
            };
        }
        if cues & (CUE_LOOP_ENDED | CUE_LEVEL_COMPLETE) != 0 {
            self.save();
        }
        cues
    }

    fn save(&self) {
        persistence::save_recordings(
            &self.session.level().name,
            self.session.recordings().iter().map(|r| r.as_ref()),
        );
    }

    pub fn toggle_pause(&mut self) {
        self.session.toggle_pause();
    }

    pub fn pause(&mut self) {
        self.session.pause();
    }

    pub fn resume(&mut self) {
        self.session.resume();
    }

    pub fn is_paused(&self) -> bool {
        self.session.phase() == SessionPhase::Paused
    }

    pub fn is_complete(&self) -> bool {
        self.session.is_complete()
    }

    pub fn restart_level(&mut self) {
        self.session.restart_level();
        self.save();
    }

    pub fn abandon_attempt(&mut self) -> u32 {
        let ended = !self.session.abandon_attempt().is_empty();
        if ended {
            self.save();
        }
        self.session.loop_index()
    }

    pub fn export_recordings(&self) -> String {
        self.session.export_recordings()
    }

    /// Returns the number of recordings loaded (0 for unreadable text)
    pub fn import_recordings(&mut self, json: &str) -> usize {
        let count = self.session.import_recordings_json(json);
        self.save();
        count
    }

    pub fn loop_index(&self) -> u32 {
        self.session.loop_index()
    }

    pub fn ticks_remaining(&self) -> u32 {
        self.session.view().ticks_remaining
    }

    pub fn alpha(&self) -> f32 {
        self.session.view().alpha
    }

    pub fn player_x(&self) -> f32 {
        let view = self.session.view();
        view.player.interpolated_pos(view.alpha).x
    }

    pub fn player_y(&self) -> f32 {
        let view = self.session.view();
        view.player.interpolated_pos(view.alpha).y
    }

    pub fn player_facing_right(&self) -> bool {
        self.session.view().player.facing_right
    }

    pub fn ghost_count(&self) -> usize {
        self.session.view().ghosts.len()
    }

    pub fn ghost_x(&self, index: usize) -> f32 {
        let view = self.session.view();
        view.ghosts
            .get(index)
            .map_or(0.0, |g| g.body.interpolated_pos(view.alpha).x)
    }

    pub fn ghost_y(&self, index: usize) -> f32 {
        let view = self.session.view();
        view.ghosts
            .get(index)
            .map_or(0.0, |g| g.body.interpolated_pos(view.alpha).y)
    }

    pub fn ghost_active(&self, index: usize) -> bool {
        self.session
            .view()
            .ghosts
            .get(index)
            .is_some_and(|g| g.body.active)
    }

    /// Switch pressed / door open / laser blocked / goal reached, by level index
    pub fn entity_state(&self, index: u32) -> bool {
        let world = &self.session.attempt().world;
        match world.get(EntityId(index)) {
            Some(Entity::Switch(s)) => s.pressed,
            Some(Entity::Door(d)) => d.open,
            Some(Entity::Laser(l)) => l.blocked,
            Some(Entity::Goal(g)) => g.reached,
            Some(Entity::Wall(_)) | None => false,
        }
    }
}
