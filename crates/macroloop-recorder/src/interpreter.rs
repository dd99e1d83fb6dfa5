//! Turns an EventLog into an executable program

use crate::events::Step;
use crate::log::EventLog;
use macroloop_core::{Error, ErrorCode, Result};
use tracing::{debug, warn};

/// Ordered steps plus the loop period and checkpoint count.
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    steps: Vec<Step>,
    period: f64,
    checkpoint_total: usize,
}

impl Program {
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn into_steps(self) -> Vec<Step> {
        self.steps
    }

    /// Loop period: the offset of the final action.
    pub fn period(&self) -> f64 {
        self.period
    }

    /// Screenshot checkpoints per period.
    pub fn checkpoint_total(&self) -> usize {
        self.checkpoint_total
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

pub struct Interpreter;

impl Interpreter {
    /// Parse every record. No partial result: the first bad line fails the
    /// whole program.
    pub fn parse(log: &EventLog) -> Result<Program> {
        let steps = log.steps()?;
        let Some(last) = steps.last() else {
            return Err(Error::new(ErrorCode::InvalidFormat, "Macro has no recorded actions")
                .with_suggestions(vec!["Record the macro again".to_string()]));
        };

        let period = last.offset;
        if period <= 0.0 {
            return Err(Error::new(
                ErrorCode::InvalidFormat,
                "Macro period is zero: the last action must happen after the recording starts",
            ));
        }

        for (i, pair) in steps.windows(2).enumerate() {
            if pair[1].offset < pair[0].offset {
                warn!(
                    line = i + 2,
                    offset = pair[1].offset,
                    previous = pair[0].offset,
                    "offsets go backwards; replay order follows the file"
                );
            }
        }

        let checkpoint_total = steps.iter().filter(|s| s.action.is_screenshot()).count();
        debug!(steps = steps.len(), period, checkpoint_total, "macro interpreted");

        Ok(Program {
            steps,
            period,
            checkpoint_total,
        })
    }
}
