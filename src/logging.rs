//! Log setup: `env_logger` records go to the console and, optionally, a log
//! file.

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;

/// Writes every byte to two sinks. A failing secondary sink is ignored so
/// a full disk never silences console output.
pub struct Tee<A, B> {
    primary: A,
    secondary: Option<B>,
}

impl<A: Write, B: Write> Tee<A, B> {
    pub fn new(primary: A, secondary: Option<B>) -> Self {
        Self { primary, secondary }
    }
}

impl<A: Write, B: Write> Write for Tee<A, B> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.primary.write_all(buf)?;
        if let Some(secondary) = self.secondary.as_mut() {
            let _ = secondary.write_all(buf);
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        if let Some(secondary) = self.secondary.as_mut() {
            let _ = secondary.flush();
        }
        self.primary.flush()
    }
}

/// Console stream log records are written to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Console {
    Stdout,
    /// For commands whose own output goes to stdout
    Stderr,
}

impl Console {
    fn writer(self) -> Box<dyn Write + Send> {
        match self {
            Self::Stdout => Box::new(io::stdout()),
            Self::Stderr => Box::new(io::stderr()),
        }
    }
}

/// Initialise the global logger.
///
/// The level comes from `LOG_LEVEL` when set, otherwise `debug` or `info`.
/// With `log_file`, records are appended there as well.
pub fn init(debug: bool, console: Console, log_file: Option<&Path>) -> io::Result<()> {
    let log_level = match debug {
        true => "debug",
        false => "info",
    };

    let file: Option<File> = log_file
        .map(|path| OpenOptions::new().create(true).append(true).open(path))
        .transpose()?;

    let env = env_logger::Env::default().filter_or("LOG_LEVEL", log_level);
    env_logger::Builder::from_env(env)
        .format_timestamp_millis()
        .target(env_logger::Target::Pipe(Box::new(Tee::new(console.writer(), file))))
        .init();

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Broken;

    impl Write for Broken {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::other("broken"))
        }
        fn flush(&mut self) -> io::Result<()> {
            Err(io::Error::other("broken"))
        }
    }

    #[test]
    fn test_tee_writes_both() {
        let mut tee = Tee::new(Vec::new(), Some(Vec::new()));
        writeln!(tee, "hello").unwrap();
        tee.flush().unwrap();

        assert_eq!(tee.primary, b"hello\n");
        assert_eq!(tee.secondary.unwrap(), b"hello\n");
    }

    #[test]
    fn test_tee_without_file() {
        let mut tee: Tee<Vec<u8>, Vec<u8>> = Tee::new(Vec::new(), None);
        write!(tee, "only stdout").unwrap();
        assert_eq!(tee.primary, b"only stdout");
    }

    #[test]
    fn test_broken_file_does_not_stop_console() {
        let mut tee = Tee::new(Vec::new(), Some(Broken));
        write!(tee, "still here").unwrap();
        tee.flush().unwrap();
        assert_eq!(tee.primary, b"still here");
    }
}
