//! Pipelines module (install stages)

mod cleanup;
mod finish;
mod gather;
mod prepare;
mod run;

use crate::error::Result;

use super::types::{InstallStage, Interpreter};

impl Interpreter {
    /// Gather files, run the directives and record the game. On failure
    /// the install is reverted before the error is returned.
    pub fn install(&mut self) -> Result<()> {
        let result = self
            .gather_files()
            .and_then(|_| self.run_commands())
            .and_then(|_| self.finish_install());

        match result {
            Ok(()) => {
                self.stage = InstallStage::Done;
                self.cleanup();
                Ok(())
            }
            Err(e) => {
                tracing::error!("Installation of {} failed during {}: {}", self.game_name, self.stage, e);
                self.revert();
                self.cleanup();
                Err(e)
            }
        }
    }
}
