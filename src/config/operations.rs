mod io;
mod logging;

pub use io::{load_cfg, load_cfg_from, save_cfg, save_cfg_to};
pub use logging::init_logging;
