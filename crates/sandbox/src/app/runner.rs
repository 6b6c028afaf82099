use std::collections::VecDeque;
use std::process::ExitCode;

use tilemove::{CharacterSheets, MapSession, Mover, MoverId, SessionError, TileCoord, TriggerKind};
use tracing::{debug, error, info, warn};

use super::bootstrap::AppWiring;
use super::scenario::{load_scenario, FrameScript, ScriptAction};

const ACTION_BUTTON_TRIGGERS: [TriggerKind; 3] = [
    TriggerKind::ActionButton,
    TriggerKind::PlayerTouch,
    TriggerKind::EventTouch,
];
const SETTLE_FRAME_LIMIT: u32 = 600;

pub(crate) fn run(app: AppWiring) -> ExitCode {
    let mut loaded = match load_scenario(&app.scenario_path, app.options) {
        Ok(loaded) => loaded,
        Err(err) => {
            error!(error = %err, "scenario_load_failed");
            return ExitCode::FAILURE;
        }
    };

    match run_scenario(&mut loaded.session, &loaded.sheets, &loaded.frames) {
        Ok(summary) => {
            info!(
                frames = summary.frames,
                tile_moves = summary.tile_moves,
                blocked_moves = summary.blocked_moves,
                events_started = summary.started.len(),
                sprite_updates = summary.sprite_updates,
                culled = summary.culled,
                player_x = summary.player.x,
                player_y = summary.player.y,
                settled = summary.settled,
                "scenario_finished"
            );
            if summary.index_violations > 0 {
                error!(violations = summary.index_violations, "tile_index_drifted");
                return ExitCode::FAILURE;
            }
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!(error = %err, "scenario_failed");
            ExitCode::FAILURE
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct RunSummary {
    pub(crate) frames: u32,
    pub(crate) tile_moves: usize,
    pub(crate) blocked_moves: usize,
    /// `(frame, mover)` for every event start request drained.
    pub(crate) started: Vec<(u32, MoverId)>,
    pub(crate) sprite_updates: usize,
    pub(crate) culled: usize,
    pub(crate) index_violations: usize,
    pub(crate) player: TileCoord,
    pub(crate) settled: bool,
}

/// Plays the frame script, then keeps stepping until queued actions drain
/// and every mover stands still.
pub(crate) fn run_scenario(
    session: &mut MapSession,
    sheets: &dyn CharacterSheets,
    frames: &[FrameScript],
) -> Result<RunSummary, SessionError> {
    let mut runner = FrameRunner::default();

    for script in frames {
        runner.queue(script);
        for _ in 0..script.repeat {
            runner.frame(session, sheets)?;
        }
    }

    let mut settle_frames = 0;
    while !runner.idle(session) {
        if settle_frames == SETTLE_FRAME_LIMIT {
            warn!(
                pending = runner.pending.len(),
                frames = runner.summary.frames,
                "scenario_unsettled"
            );
            break;
        }
        runner.frame(session, sheets)?;
        settle_frames += 1;
    }

    runner.summary.settled = runner.idle(session);
    runner.summary.player = session.player().coord();
    Ok(runner.summary)
}

#[derive(Default)]
struct FrameRunner {
    pending: VecDeque<ScriptAction>,
    summary: RunSummary,
}

impl FrameRunner {
    fn queue(&mut self, script: &FrameScript) {
        self.pending.extend(script.actions.iter().cloned());
    }

    fn idle(&self, session: &MapSession) -> bool {
        self.pending.is_empty() && session.movers().iter().all(|mover| !busy(mover))
    }

    fn frame(
        &mut self,
        session: &mut MapSession,
        sheets: &dyn CharacterSheets,
    ) -> Result<(), SessionError> {
        self.summary.frames += 1;
        let frame = self.summary.frames;
        self.apply_ready(session)?;

        let tile_moves = session.step_frame();
        if session.verify_index().is_err() {
            self.summary.index_violations += 1;
        }
        let sync = session.sync_sprites(sheets);
        for id in session.take_start_requests() {
            info!(frame, mover = id.0, "event_started");
            self.summary.started.push((frame, id));
        }

        self.summary.tile_moves += tile_moves.len();
        self.summary.sprite_updates += sync.updates.len();
        self.summary.culled += sync.stats.culled;
        debug!(
            frame,
            tile_moves = tile_moves.len(),
            synced = sync.stats.synced,
            clean = sync.stats.clean,
            culled = sync.stats.culled,
            "frame_completed"
        );
        Ok(())
    }

    /// Applies queued actions in order, stopping at the first one whose
    /// mover is still mid-step.
    fn apply_ready(&mut self, session: &mut MapSession) -> Result<(), SessionError> {
        let player = session.movers().player_id();
        while let Some(action) = self.pending.front() {
            let blocked = action
                .waits_for(player)
                .and_then(|id| session.mover(id))
                .is_some_and(busy);
            if blocked {
                break;
            }
            let Some(action) = self.pending.pop_front() else {
                break;
            };
            self.apply(session, action)?;
        }
        Ok(())
    }

    fn apply(
        &mut self,
        session: &mut MapSession,
        action: ScriptAction,
    ) -> Result<(), SessionError> {
        match action {
            ScriptAction::Move { mover, direction } => {
                if !session.move_straight(mover, direction)? {
                    self.summary.blocked_moves += 1;
                    debug!(mover = mover.0, ?direction, "move_blocked");
                }
            }
            ScriptAction::Jump { mover, dx, dy } => {
                if !session.jump(mover, dx, dy)? {
                    self.summary.blocked_moves += 1;
                    debug!(mover = mover.0, dx, dy, "jump_blocked");
                }
            }
            ScriptAction::Turn { mover, direction } => session.turn(mover, direction)?,
            ScriptAction::Moveto { mover, x, y } => {
                session.moveto(mover, TileCoord::new(x, y))?;
            }
            ScriptAction::ActionButton => {
                session.check_here(&[TriggerKind::ActionButton]);
                session.check_there(&ACTION_BUTTON_TRIGGERS);
            }
            ScriptAction::Interpreter { running } => session.set_interpreter_running(running),
            ScriptAction::Display { x, y } => session.set_display(x, y),
        }
        Ok(())
    }
}

fn busy(mover: &Mover) -> bool {
    mover.moving() || mover.jumping()
}
