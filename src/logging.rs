use std::fs::{self, File};
use std::io::Write;
use std::path::PathBuf;

/// Route the `log` facade to a file: the terminal belongs to the TUI, so
/// nothing may print to stdout/stderr while it runs. Returns the log path,
/// or `None` when no writable data directory exists (logging is then off,
/// which is fine).
pub fn init_file_logger() -> Option<PathBuf> {
    let dir = dirs::data_dir()?.join("chatterdle");
    fs::create_dir_all(&dir).ok()?;
    let path = dir.join("chatterdle.log");
    let file = File::create(&path).ok()?;

    env_logger::Builder::from_default_env()
        .target(env_logger::Target::Pipe(Box::new(file)))
        .format(|buf, record| {
            writeln!(
                buf,
                "{} [{}] {}",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f"),
                record.level(),
                record.args()
            )
        })
        .try_init()
        .ok()?;
    Some(path)
}

// Conditional logging macros - only active in debug builds

#[cfg(debug_assertions)]
#[macro_export]
macro_rules! debug_log {
    ($($arg:tt)*) => {
        log::debug!($($arg)*);
    };
}

#[cfg(not(debug_assertions))]
#[macro_export]
macro_rules! debug_log {
    ($($arg:tt)*) => {{}};
}

#[cfg(debug_assertions)]
#[macro_export]
macro_rules! info_log {
    ($($arg:tt)*) => {
        log::info!($($arg)*);
    };
}

#[cfg(not(debug_assertions))]
#[macro_export]
macro_rules! info_log {
    ($($arg:tt)*) => {{}};
}
