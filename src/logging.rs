// logging.rs — `log` backend setup for the replay harness.
//
// Library code only talks to the `log` facade. Binaries call `init` once
// with the harness verbosity, which installs `env_logger` with the line
// format
//
//   2026-10-18T09:14:03.512Z  [WRN]: message
//
// The harness verbosity scale is Fatal < Error < Warning < Debug < Info <
// Verbose. It maps onto `log` levels by rank, so harness Debug is
// `log::info!` (tagged DBG), harness Info is `log::debug!` (tagged INF) and
// Verbose is `log::trace!`.

use std::fmt;
use std::io::Write;
use std::str::FromStr;

use env_logger::{Builder, Target};
use log::{Level, LevelFilter};

/// Log target that marks a record as fatal.
pub const FATAL_TARGET: &str = "fatal";

/// Harness verbosity, lowest to highest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Verbosity {
    Fatal = 0,
    Error = 1,
    Warning = 2,
    Debug = 3,
    Info = 4,
    Verbose = 5,
}

impl Verbosity {
    pub const ALL: [Verbosity; 6] = [
        Verbosity::Fatal,
        Verbosity::Error,
        Verbosity::Warning,
        Verbosity::Debug,
        Verbosity::Info,
        Verbosity::Verbose,
    ];

    /// Default for the build: Debug in debug builds, Warning in release.
    pub fn build_default() -> Self {
        if cfg!(debug_assertions) {
            Verbosity::Debug
        } else {
            Verbosity::Warning
        }
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn level_filter(self) -> LevelFilter {
        match self {
            Verbosity::Fatal | Verbosity::Error => LevelFilter::Error,
            Verbosity::Warning => LevelFilter::Warn,
            Verbosity::Debug => LevelFilter::Info,
            Verbosity::Info => LevelFilter::Debug,
            Verbosity::Verbose => LevelFilter::Trace,
        }
    }
}

impl fmt::Display for Verbosity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Verbosity::Fatal => "Fatal",
            Verbosity::Error => "Error",
            Verbosity::Warning => "Warning",
            Verbosity::Debug => "Debug",
            Verbosity::Info => "Info",
            Verbosity::Verbose => "Verbose",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid log level `{0}`: expected Fatal, Error, Warning, Debug, Info, Verbose or 0..=5")]
pub struct ParseVerbosityError(String);

impl FromStr for Verbosity {
    type Err = ParseVerbosityError;

    /// Accepts a level name in any case, or its index.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Ok(index) = s.parse::<usize>() {
            return Verbosity::from_index(index).ok_or_else(|| ParseVerbosityError(s.to_string()));
        }
        Verbosity::ALL
            .iter()
            .copied()
            .find(|v| v.to_string().eq_ignore_ascii_case(s))
            .ok_or_else(|| ParseVerbosityError(s.to_string()))
    }
}

/// Three-letter tag for a record.
pub fn level_tag(level: Level, target: &str) -> &'static str {
    if target == FATAL_TARGET {
        return "FTL";
    }
    match level {
        Level::Error => "ERR",
        Level::Warn => "WRN",
        Level::Info => "DBG",
        Level::Debug => "INF",
        Level::Trace => "VRB",
    }
}

/// Install the global logger. With `console` off, records are formatted
/// and discarded.
pub fn init(verbosity: Verbosity, console: bool) -> Result<(), log::SetLoggerError> {
    let target = if console {
        Target::Stderr
    } else {
        Target::Pipe(Box::new(std::io::sink()))
    };

    Builder::new()
        .filter_level(verbosity.level_filter())
        .format(|buf, record| {
            writeln!(
                buf,
                "{}  [{}]: {}",
                buf.timestamp_millis(),
                level_tag(record.level(), record.target()),
                record.args()
            )
        })
        .target(target)
        .try_init()
}

/// Log `msg` as fatal and exit the process with status -1.
pub fn fatal(msg: impl fmt::Display) -> ! {
    log::error!(target: FATAL_TARGET, "{msg}");
    log::logger().flush();
    std::process::exit(-1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_names_any_case() {
        assert_eq!("fatal".parse::<Verbosity>(), Ok(Verbosity::Fatal));
        assert_eq!("WARNING".parse::<Verbosity>(), Ok(Verbosity::Warning));
        assert_eq!("Verbose".parse::<Verbosity>(), Ok(Verbosity::Verbose));
        assert!("warn".parse::<Verbosity>().is_err());
    }

    #[test]
    fn test_parse_indices() {
        for (i, v) in Verbosity::ALL.iter().enumerate() {
            assert_eq!(i.to_string().parse::<Verbosity>().as_ref(), Ok(v));
            assert_eq!(*v as usize, i);
        }
        assert!("6".parse::<Verbosity>().is_err());
        assert!("-1".parse::<Verbosity>().is_err());
    }

    #[test]
    fn test_filters_are_monotonic() {
        for pair in Verbosity::ALL.windows(2) {
            assert!(pair[0].level_filter() <= pair[1].level_filter());
        }
        assert_eq!(Verbosity::Verbose.level_filter(), LevelFilter::Trace);
    }

    #[test]
    fn test_tags() {
        assert_eq!(level_tag(Level::Error, FATAL_TARGET), "FTL");
        assert_eq!(level_tag(Level::Error, "replay_features"), "ERR");
        assert_eq!(level_tag(Level::Warn, "x"), "WRN");
        assert_eq!(level_tag(Level::Trace, "x"), "VRB");
    }
}
