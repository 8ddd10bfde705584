use log::LevelFilter;
use simplelog::{Config, WriteLogger};
use std::fs::File;

pub fn init_logging() {
    // No log file is not fatal; the engine keeps running without logging.
    if let Ok(file) = File::create("basalt.log") {
        let _ = WriteLogger::init(LevelFilter::Info, Config::default(), file);
        log::info!("Logger initialized.");
    }
}
