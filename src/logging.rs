//! Routes the crate's `log` records to stderr or to a host-supplied callback.
//!
//! The level lives in `log::max_level()` so disabled records are dropped at
//! the macro call site; the logger itself only chooses where records go.

use core::ffi::{c_char, c_void};
use std::sync::{OnceLock, RwLock};

use log::{Level, LevelFilter, Log, Metadata, Record};

use crate::common::types::{RedirectLogLevel, RedirectLogRecord, RedirectStatus, RedirectStringView};

/// Invoked synchronously on the logging thread. The record's views are only
/// valid for the duration of the call.
pub type RedirectLogCallback = Option<extern "C" fn(record: *const RedirectLogRecord, user_data: *mut c_void)>;

type RawCallback = extern "C" fn(record: *const RedirectLogRecord, user_data: *mut c_void);

#[derive(Clone, Copy)]
enum Sink {
    Discard,
    Stderr,
    Host { callback: RawCallback, user_data: usize },
}

struct RedirectLogger {
    sink: RwLock<Sink>,
}

static LOGGER: RedirectLogger = RedirectLogger {
    sink: RwLock::new(Sink::Discard),
};

/// Whether our logger owns the `log` facade. `false` when the host process
/// registered its own logger first; records then go to that one.
static OWNS_FACADE: OnceLock<bool> = OnceLock::new();

fn owns_facade() -> bool {
    *OWNS_FACADE.get_or_init(|| {
        let installed = log::set_logger(&LOGGER).is_ok();
        if installed {
            log::set_max_level(LevelFilter::Off);
        }
        installed
    })
}

impl RedirectLogger {
    fn current_sink(&self) -> Sink {
        self.sink.read().map(|sink| *sink).unwrap_or(Sink::Discard)
    }

    fn route(&self, sink: Sink, level: RedirectLogLevel) {
        if let Ok(mut current) = self.sink.write() {
            *current = sink;
        }
        log::set_max_level(level.into());
    }
}

impl Log for RedirectLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        // Copied out so a callback may reconfigure logging without deadlocking.
        match self.current_sink() {
            Sink::Discard => {}
            Sink::Stderr => eprintln!(
                "psf-redirect {:<5} {}: {}",
                record.level(),
                record.target(),
                record.args()
            ),
            Sink::Host { callback, user_data } => {
                let message = record.args().to_string();
                let host_record = RedirectLogRecord {
                    level: record.level().into(),
                    target: borrowed_view(record.target()),
                    message: borrowed_view(&message),
                    file: borrowed_view(record.file().unwrap_or("")),
                    line: record.line().unwrap_or(0),
                };
                callback(&host_record, user_data as *mut c_void);
            }
        }
    }

    fn flush(&self) {}
}

impl From<RedirectLogLevel> for LevelFilter {
    fn from(level: RedirectLogLevel) -> Self {
        match level {
            RedirectLogLevel::Off => LevelFilter::Off,
            RedirectLogLevel::Error => LevelFilter::Error,
            RedirectLogLevel::Warn => LevelFilter::Warn,
            RedirectLogLevel::Info => LevelFilter::Info,
            RedirectLogLevel::Debug => LevelFilter::Debug,
            RedirectLogLevel::Trace => LevelFilter::Trace,
        }
    }
}

impl From<Level> for RedirectLogLevel {
    fn from(level: Level) -> Self {
        match level {
            Level::Error => RedirectLogLevel::Error,
            Level::Warn => RedirectLogLevel::Warn,
            Level::Info => RedirectLogLevel::Info,
            Level::Debug => RedirectLogLevel::Debug,
            Level::Trace => RedirectLogLevel::Trace,
        }
    }
}

fn borrowed_view(value: &str) -> RedirectStringView {
    RedirectStringView {
        ptr: value.as_ptr() as *const c_char,
        len: value.len(),
    }
}

pub fn log_set_stderr(level: RedirectLogLevel) -> RedirectStatus {
    if !owns_facade() {
        return RedirectStatus::IoError;
    }
    LOGGER.route(Sink::Stderr, level);
    RedirectStatus::Ok
}

/// A `None` callback turns logging off.
pub fn log_set_callback(callback: RedirectLogCallback, user_data: *mut c_void, level: RedirectLogLevel) -> RedirectStatus {
    let Some(callback) = callback else {
        return log_disable();
    };
    if !owns_facade() {
        return RedirectStatus::IoError;
    }
    LOGGER.route(
        Sink::Host {
            callback,
            user_data: user_data as usize,
        },
        level,
    );
    RedirectStatus::Ok
}

/// Also applies when the host owns the facade: the level is global.
pub fn log_set_level(level: RedirectLogLevel) -> RedirectStatus {
    owns_facade();
    log::set_max_level(level.into());
    RedirectStatus::Ok
}

pub fn log_disable() -> RedirectStatus {
    if owns_facade() {
        LOGGER.route(Sink::Discard, RedirectLogLevel::Off);
    } else {
        log::set_max_level(LevelFilter::Off);
    }
    RedirectStatus::Ok
}
