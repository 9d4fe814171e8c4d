//! Pure helpers of the interpreter (no I/O)

pub mod command;
pub mod shell;
pub mod substitute;
