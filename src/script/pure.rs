pub mod dependencies;
pub mod launcher;
pub mod url;
pub mod validation;
pub mod value;
