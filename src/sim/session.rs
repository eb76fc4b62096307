//! Level session: the attempt lifecycle around the tick function
//!
//! A session owns everything mutable: the current attempt, the live
//! recording, the finalized recordings (oldest first, which is also the ghost
//! order) and the fixed timestep accumulator. Presentation gets a read-only
//! `FrameView`; input arrives through an `InputSource` sampled once per tick.

use std::rc::Rc;

use super::level::LevelData;
use super::recording::{InputSnapshot, Recording};
use super::state::{AttemptState, Body, Entity, Ghost, SimEvent};
use super::tick::{TickOutcome, tick};
use super::timestep::FixedTimestep;
use crate::input::InputSource;
use crate::settings::Settings;

/// Session-level phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// Attempts are being simulated
    Running,
    /// No ticks are produced
    Paused,
    /// An attempt reached the goal (terminal)
    LevelComplete,
}

/// Read-only state for rendering one frame
#[derive(Debug, Clone, Copy)]
pub struct FrameView<'a> {
    pub phase: SessionPhase,
    pub loop_index: u32,
    pub local_tick: u32,
    pub ticks_remaining: u32,
    /// Fraction of a tick left in the accumulator
    pub alpha: f32,
    pub player: &'a Body,
    pub ghosts: &'a [Ghost],
    pub entities: &'a [Entity],
}

/// One level being played, attempt after attempt
#[derive(Debug)]
pub struct Session {
    settings: Settings,
    level: LevelData,
    phase: SessionPhase,
    timestep: FixedTimestep,
    attempt: AttemptState,
    live: Recording,
    recordings: Vec<Rc<Recording>>,
    /// 1-based, increments on every failed attempt
    loop_index: u32,
    /// Ticks simulated in this session across all attempts
    global_tick: u64,
    next_recording_id: u64,
}

impl Session {
    pub fn new(level: LevelData, settings: Settings) -> Self {
        let attempt = AttemptState::spawn(&level, &[], &settings.physics);
        let timestep = FixedTimestep::new(settings.tick_duration());
        log::info!("Level '{}' loaded ({} entities)", level.name, attempt.world.entities.len());

        Self {
            settings,
            level,
            phase: SessionPhase::Running,
            timestep,
            attempt,
            live: Recording::new(1, 1),
            recordings: Vec::new(),
            loop_index: 1,
            global_tick: 0,
            next_recording_id: 2,
        }
    }

    /// Ticks per attempt for this level
    pub fn loop_ticks(&self) -> u32 {
        self.level.loop_ticks.unwrap_or(self.settings.loop_ticks).max(1)
    }

    /// Drive loop: feed real elapsed time, run every tick that fits.
    ///
    /// Returns the events of all ticks run this frame.
    pub fn advance(&mut self, frame_dt: f64, input: &mut dyn InputSource) -> Vec<SimEvent> {
        let mut events = Vec::new();
        if self.phase != SessionPhase::Running {
            return events;
        }

        self.timestep.accumulate(frame_dt);
        while self.phase == SessionPhase::Running && self.timestep.try_consume() {
            let snapshot = input.sample();
            self.run_tick(snapshot, &mut events);
        }
        if self.phase == SessionPhase::LevelComplete {
            self.timestep.discard();
        }
        events
    }

    /// Run exactly one tick with the given input, ignoring the accumulator
    pub fn step(&mut self, input: InputSnapshot) -> Vec<SimEvent> {
        let mut events = Vec::new();
        if self.phase == SessionPhase::Running {
            self.run_tick(input, &mut events);
        }
        events
    }

    fn run_tick(&mut self, input: InputSnapshot, events: &mut Vec<SimEvent>) {
        let loop_ticks = self.loop_ticks();
        let outcome = tick(
            &mut self.attempt,
            &mut self.live,
            input,
            loop_ticks,
            &self.settings.physics,
            events,
        );
        self.global_tick += 1;

        if let TickOutcome::Ended { reached_goal } = outcome {
            self.end_attempt(reached_goal, events);
        }
    }

    fn end_attempt(&mut self, reached_goal: bool, events: &mut Vec<SimEvent>) {
        let next_live = Recording::new(self.take_recording_id(), self.loop_index + 1);
        let live = std::mem::replace(&mut self.live, next_live);
        let recording = live.finalize(self.attempt.local_tick, reached_goal);
        log::info!(
            "Loop {} ended after {} ticks ({})",
            self.loop_index,
            recording.end_tick,
            if reached_goal { "goal reached" } else { "failed" }
        );
        self.recordings.push(Rc::new(recording));

        if reached_goal {
            self.phase = SessionPhase::LevelComplete;
            log::info!("Level '{}' complete on loop {}", self.level.name, self.loop_index);
            events.push(SimEvent::LevelComplete {
                loop_index: self.loop_index,
            });
            return;
        }

        events.push(SimEvent::AttemptEnded {
            loop_index: self.loop_index,
            reached_goal,
        });
        self.loop_index += 1;
        self.respawn();
    }

    fn take_recording_id(&mut self) -> u64 {
        let id = self.next_recording_id;
        self.next_recording_id = self.next_recording_id.saturating_add(1);
        id
    }

    /// New attempt with one ghost per recording
    fn respawn(&mut self) {
        self.attempt = AttemptState::spawn(&self.level, &self.recordings, &self.settings.physics);
        log::debug!(
            "Loop {} started with {} ghosts",
            self.loop_index,
            self.attempt.ghosts.len()
        );
    }

    /// Give up on the running attempt; what was recorded so far becomes a ghost
    pub fn abandon_attempt(&mut self) -> Vec<SimEvent> {
        let mut events = Vec::new();
        if self.phase != SessionPhase::LevelComplete {
            self.end_attempt(false, &mut events);
        }
        events
    }

    /// Forget every recording and start over from loop 1
    pub fn restart_level(&mut self) {
        self.recordings.clear();
        self.loop_index = 1;
        self.live = Recording::new(self.take_recording_id(), 1);
        self.phase = SessionPhase::Running;
        self.timestep.discard();
        self.respawn();
        log::info!("Level '{}' restarted", self.level.name);
    }

    /// Replace the recordings list (e.g. from an import) and restart the
    /// attempt with those ghosts
    pub fn import_recordings(&mut self, recordings: Vec<Recording>) {
        let mut recordings: Vec<Recording> =
            recordings.into_iter().map(Recording::normalized).collect();
        let max_id = recordings.iter().map(|r| r.id).max().unwrap_or(0);
        let next_id = match max_id.checked_add(1) {
            Some(next_id) => next_id,
            None => {
                log::warn!("Imported recording ids exhaust the id space, renumbering");
                for (index, recording) in recordings.iter_mut().enumerate() {
                    recording.id = index as u64 + 1;
                }
                recordings.len() as u64 + 1
            }
        };
        self.recordings = recordings.into_iter().map(Rc::new).collect();
        self.loop_index = self.recordings.len() as u32 + 1;
        self.next_recording_id = self.next_recording_id.max(next_id);
        self.live = Recording::new(self.take_recording_id(), self.loop_index);
        self.phase = SessionPhase::Running;
        self.timestep.discard();
        self.respawn();
        log::info!("Imported {} recordings", self.recordings.len());
    }

    /// Recordings list as structured text
    pub fn export_recordings(&self) -> String {
        crate::persistence::encode_recordings(self.recordings.iter().map(|r| r.as_ref()))
    }

    /// Best-effort import from `export_recordings` text; returns how many
    /// recordings were loaded. Unreadable text loads an empty list.
    pub fn import_recordings_json(&mut self, json: &str) -> usize {
        let recordings = crate::persistence::decode_recordings(json);
        let count = recordings.len();
        self.import_recordings(recordings);
        count
    }

    pub fn pause(&mut self) {
        if self.phase == SessionPhase::Running {
            self.phase = SessionPhase::Paused;
        }
    }

    /// Resume without catching up on the time spent paused
    pub fn resume(&mut self) {
        if self.phase == SessionPhase::Paused {
            self.timestep.discard();
            self.phase = SessionPhase::Running;
        }
    }

    pub fn toggle_pause(&mut self) {
        match self.phase {
            SessionPhase::Running => self.pause(),
            SessionPhase::Paused => self.resume(),
            SessionPhase::LevelComplete => {}
        }
    }

    pub fn view(&self) -> FrameView<'_> {
        FrameView {
            phase: self.phase,
            loop_index: self.loop_index,
            local_tick: self.attempt.local_tick,
            ticks_remaining: self.loop_ticks().saturating_sub(self.attempt.local_tick),
            alpha: self.timestep.alpha(),
            player: &self.attempt.player,
            ghosts: &self.attempt.ghosts,
            entities: &self.attempt.world.entities,
        }
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn is_complete(&self) -> bool {
        self.phase == SessionPhase::LevelComplete
    }

    pub fn loop_index(&self) -> u32 {
        self.loop_index
    }

    pub fn global_tick(&self) -> u64 {
        self.global_tick
    }

    pub fn attempt(&self) -> &AttemptState {
        &self.attempt
    }

    pub fn live_recording(&self) -> &Recording {
        &self.live
    }

    /// Finalized recordings, oldest first
    pub fn recordings(&self) -> &[Rc<Recording>] {
        &self.recordings
    }

    pub fn level(&self) -> &LevelData {
        &self.level
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::ScriptedInput;
    use crate::sim::geom::Rect;
    use crate::sim::level::EntityDescriptor;
    use crate::sim::state::DoorRequirement;
    use glam::Vec2;

    const RIGHT: InputSnapshot = InputSnapshot {
        left: false,
        right: true,
        up: false,
        down: false,
        action: false,
    };

    /// Switch near spawn, a closed door between it and the goal
    fn door_level(loop_ticks: u32) -> LevelData {
        LevelData {
            name: "door".into(),
            spawn: Vec2::new(40.0, 528.0),
            loop_ticks: Some(loop_ticks),
            entities: vec![
                EntityDescriptor::wall(Rect::new(0.0, 560.0, 800.0, 40.0)),
                EntityDescriptor::switch(Rect::new(140.0, 550.0, 40.0, 10.0), vec![2]),
                EntityDescriptor::door(Rect::new(300.0, 380.0, 20.0, 180.0), false, DoorRequirement::Any),
                EntityDescriptor::goal(Rect::new(400.0, 500.0, 40.0, 60.0)),
            ],
        }
    }

    fn session(loop_ticks: u32) -> Session {
        Session::new(door_level(loop_ticks), Settings::default())
    }

    #[test]
    fn test_timeout_starts_next_loop_with_ghost() {
        let mut session = session(30);
        let mut events = Vec::new();
        for _ in 0..30 {
            events.extend(session.step(RIGHT));
        }

        assert_eq!(session.loop_index(), 2);
        assert_eq!(session.global_tick(), 30);
        assert_eq!(session.recordings().len(), 1);
        assert_eq!(session.recordings()[0].end_tick, 30);
        assert_eq!(session.recordings()[0].len(), 30);
        assert_eq!(session.attempt().local_tick, 0);
        assert_eq!(session.attempt().ghosts.len(), 1);
        assert_eq!(session.attempt().player.pos, Vec2::new(40.0, 528.0));
        assert!(events.contains(&SimEvent::AttemptEnded {
            loop_index: 1,
            reached_goal: false
        }));
        // World is rebuilt with default derived state
        assert!(session.attempt().world.switches().all(|s| !s.pressed));
    }

    #[test]
    fn test_ghost_holds_door_for_player() {
        let mut session = session(120);

        // Loop 1: walk onto the switch and wait there
        for tick in 0..120 {
            session.step(if tick < 25 { RIGHT } else { InputSnapshot::IDLE });
        }
        assert_eq!(session.loop_index(), 2);

        // Loop 2: the ghost holds the switch while the player runs for the goal
        let mut completed_at = None;
        for tick in 0..120 {
            let events = session.step(RIGHT);
            if events.contains(&SimEvent::LevelComplete { loop_index: 2 }) {
                completed_at = Some(tick);
                break;
            }
        }

        // x = 380 after the 85th step is the first position overlapping the goal
        assert_eq!(completed_at, Some(84));
        assert!(session.is_complete());
        let last = session.recordings().last().unwrap();
        assert!(last.reached_goal);
        assert_eq!(last.end_tick, 85);

        // Terminal: no more ticks
        let before = session.global_tick();
        assert!(session.step(RIGHT).is_empty());
        let mut idle = InputSnapshot::IDLE;
        assert!(session.advance(1.0, &mut idle).is_empty());
        assert_eq!(session.global_tick(), before);
    }

    #[test]
    fn test_closed_door_blocks_without_ghost() {
        let mut session = session(120);
        for _ in 0..119 {
            session.step(RIGHT);
        }
        assert_eq!(session.loop_index(), 1);
        // Flush against the door
        assert_eq!(session.attempt().player.pos.x, 276.0);
    }

    #[test]
    fn test_advance_runs_whole_ticks() {
        let mut session = session(600);
        let mut input = ScriptedInput::new(vec![RIGHT; 10]);

        session.advance(0.5 / 60.0, &mut input);
        assert_eq!(session.global_tick(), 0);
        assert!(session.view().alpha > 0.4);

        session.advance(3.0 / 60.0, &mut input);
        assert_eq!(session.global_tick(), 3);
        assert_eq!(session.live_recording().len(), 3);
    }

    #[test]
    fn test_advance_ignores_non_finite_frames() {
        let mut session = session(600);
        let mut input = InputSnapshot::IDLE;
        assert!(session.advance(f64::INFINITY, &mut input).is_empty());
        assert!(session.advance(f64::NAN, &mut input).is_empty());
        assert_eq!(session.global_tick(), 0);

        session.advance(1.5 / 60.0, &mut input);
        assert_eq!(session.global_tick(), 1);
    }

    #[test]
    fn test_pause_discards_leftover_time() {
        let mut session = session(600);
        let mut input = InputSnapshot::IDLE;

        session.advance(1.5 / 60.0, &mut input);
        assert_eq!(session.global_tick(), 1);

        session.pause();
        assert!(session.advance(10.0, &mut input).is_empty());
        assert_eq!(session.global_tick(), 1);

        session.resume();
        assert_eq!(session.view().alpha, 0.0);
        session.advance(0.75 / 60.0, &mut input);
        assert_eq!(session.global_tick(), 1);

        session.toggle_pause();
        assert_eq!(session.phase(), SessionPhase::Paused);
        session.toggle_pause();
        assert_eq!(session.phase(), SessionPhase::Running);
    }

    #[test]
    fn test_abandon_keeps_partial_recording() {
        let mut session = session(600);
        for _ in 0..12 {
            session.step(RIGHT);
        }
        let events = session.abandon_attempt();

        assert_eq!(events, vec![SimEvent::AttemptEnded { loop_index: 1, reached_goal: false }]);
        assert_eq!(session.recordings()[0].end_tick, 12);
        assert_eq!(session.loop_index(), 2);
        assert_eq!(session.attempt().ghosts.len(), 1);
    }

    #[test]
    fn test_restart_clears_recordings() {
        let mut session = session(10);
        for _ in 0..25 {
            session.step(RIGHT);
        }
        assert_eq!(session.recordings().len(), 2);

        session.restart_level();
        assert_eq!(session.loop_index(), 1);
        assert!(session.recordings().is_empty());
        assert!(session.attempt().ghosts.is_empty());
        assert!(session.live_recording().is_empty());
    }

    #[test]
    fn test_recording_ids_are_unique() {
        let mut session = session(5);
        for _ in 0..20 {
            session.step(InputSnapshot::IDLE);
        }
        let mut ids: Vec<u64> = session.recordings().iter().map(|r| r.id).collect();
        let loops: Vec<u32> = session.recordings().iter().map(|r| r.loop_index).collect();
        assert_eq!(loops, vec![1, 2, 3, 4]);
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), 4);
        assert!(!ids.contains(&session.live_recording().id));
    }

    #[test]
    fn test_import_spawns_ghosts() {
        let mut source = session(40);
        for _ in 0..80 {
            source.step(RIGHT);
        }
        let exported: Vec<Recording> = source.recordings().iter().map(|r| (**r).clone()).collect();

        let mut session = session(40);
        session.import_recordings(exported);
        assert_eq!(session.loop_index(), 3);
        assert_eq!(session.attempt().ghosts.len(), 2);
        assert!(session.live_recording().id > 2);
    }

    #[test]
    fn test_json_round_trip_through_session() {
        let mut source = session(20);
        for tick in 0..40 {
            source.step(if tick % 3 == 0 { RIGHT } else { InputSnapshot::IDLE });
        }
        let json = source.export_recordings();

        let mut session = session(20);
        assert_eq!(session.import_recordings_json(&json), 2);
        let imported: Vec<&Recording> = session.recordings().iter().map(|r| r.as_ref()).collect();
        let original: Vec<&Recording> = source.recordings().iter().map(|r| r.as_ref()).collect();
        assert_eq!(imported, original);

        // Garbage clears the ghosts instead of failing
        assert_eq!(session.import_recordings_json("{oops"), 0);
        assert!(session.attempt().ghosts.is_empty());
        assert_eq!(session.loop_index(), 1);
    }

    #[test]
    fn test_import_with_largest_id_renumbers() {
        let json = format!(
            r#"{{"version":1,"recordings":[
                {{"id":7,"loop_index":1,"reached_goal":false,"end_tick":2,"inputs":[2,2]}},
                {{"id":{},"loop_index":2,"reached_goal":false,"end_tick":1,"inputs":[0]}}
            ]}}"#,
            u64::MAX
        );

        let mut session = session(30);
        assert_eq!(session.import_recordings_json(&json), 2);
        let ids: Vec<u64> = session.recordings().iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![1, 2]);
        assert_eq!(session.attempt().ghosts.len(), 2);
        assert_eq!(session.loop_index(), 3);

        // Later attempts still get fresh ids
        for _ in 0..30 {
            session.step(InputSnapshot::IDLE);
        }
        let mut ids: Vec<u64> = session.recordings().iter().map(|r| r.id).collect();
        ids.push(session.live_recording().id);
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), 4);
    }

    #[test]
    fn test_view_reports_remaining_ticks() {
        let mut session = session(50);
        for _ in 0..20 {
            session.step(InputSnapshot::IDLE);
        }
        let view = session.view();
        assert_eq!(view.local_tick, 20);
        assert_eq!(view.ticks_remaining, 30);
        assert_eq!(view.entities.len(), 4);
        assert_eq!(view.phase, SessionPhase::Running);
    }
}
