use std::f64::consts::TAU;
use std::time::{Duration, Instant};

use rand::Rng;
use thiserror::Error;

use super::geometry::{ease_out_quad, selected_index};

pub const SPIN_DURATION: Duration = Duration::from_millis(5000);

#[derive(Error, Debug, PartialEq, Eq)]
pub enum SpinError {
    #[error("The wheel is already spinning")]
    Busy,
    #[error("There are no tasks on the wheel")]
    NoTasks,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SpinPhase {
    Idle,
    Spinning { started: Instant, target: f64 },
}

/// The task a spin landed on. The label is copied at landing time so later
/// edits to the list do not rename it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub index: usize,
    pub label: String,
}

#[derive(Debug)]
pub struct SpinEngine {
    phase: SpinPhase,
    angle: f64,
    selection: Option<Selection>,
}

impl Default for SpinEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl SpinEngine {
    pub fn new() -> Self {
        Self {
            phase: SpinPhase::Idle,
            angle: 0.0,
            selection: None,
        }
    }

    pub fn angle(&self) -> f64 {
        self.angle
    }

    pub fn is_spinning(&self) -> bool {
        matches!(self.phase, SpinPhase::Spinning { .. })
    }

    pub fn selection(&self) -> Option<&Selection> {
        self.selection.as_ref()
    }

    pub fn clear_selection(&mut self) {
        self.selection = None;
    }

    /// Starts a spin of 4 to 6 whole turns plus a random part turn.
    pub fn request<R: Rng>(
        &mut self,
        task_count: usize,
        rng: &mut R,
        now: Instant,
    ) -> Result<f64, SpinError> {
        let turns = rng.gen_range(4..=6) as f64;
        let offset = rng.gen_range(0.0..TAU);
        let target = turns * TAU + offset;
        self.start(task_count, target, now)?;
        Ok(target)
    }

    pub fn start(&mut self, task_count: usize, target: f64, now: Instant) -> Result<(), SpinError> {
        if self.is_spinning() {
            return Err(SpinError::Busy);
        }
        if task_count == 0 {
            return Err(SpinError::NoTasks);
        }
        self.selection = None;
        self.phase = SpinPhase::Spinning {
            started: now,
            target,
        };
        tracing::info!(rotation = target, "spin started");
        Ok(())
    }

    /// Moves the animation to `now`. Returns the selection once the spin settles.
    pub fn update(&mut self, now: Instant, tasks: &[String]) -> Option<Selection> {
        let SpinPhase::Spinning { started, target } = self.phase else {
            return None;
        };
        let elapsed = now.saturating_duration_since(started);
        let progress = (elapsed.as_secs_f64() / SPIN_DURATION.as_secs_f64()).min(1.0);
        self.angle = ease_out_quad(progress) * target;
        if progress < 1.0 {
            return None;
        }

        self.phase = SpinPhase::Idle;
        let index = selected_index(self.angle, tasks.len())?;
        let selection = Selection {
            index,
            label: tasks[index].clone(),
        };
        tracing::info!(index, label = %selection.label, "spin settled");
        self.selection = Some(selection.clone());
        Some(selection)
    }
}
