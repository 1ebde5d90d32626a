// src/stream.rs
//! Path-or-`-` handling for both tools.
//!
//! A `-` argument selects the process's standard stream. Standard streams are
//! borrowed, never closed; files are opened on demand and closed when the
//! returned handle is dropped.

use std::{
    convert::Infallible,
    fmt,
    fs::File,
    io::{self, BufReader, BufWriter, Read, Write},
    path::{Path, PathBuf},
    str::FromStr,
};

const STD_STREAM: &str = "-";

/// Where CSV data is read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    Stdin,
    File(PathBuf),
}

/// Where CSV data is written to.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Sink {
    #[default]
    Stdout,
    File(PathBuf),
}

impl Source {
    pub fn open(&self) -> io::Result<Box<dyn Read>> {
        match self {
            Source::Stdin => Ok(Box::new(io::stdin().lock())),
            Source::File(path) => Ok(Box::new(BufReader::new(File::open(path)?))),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        match self {
            Source::Stdin => None,
            Source::File(path) => Some(path),
        }
    }
}

impl Sink {
    /// Opens the sink for writing, truncating a file sink.
    pub fn create(&self) -> io::Result<Box<dyn Write>> {
        match self {
            Sink::Stdout => Ok(Box::new(io::stdout().lock())),
            Sink::File(path) => Ok(Box::new(BufWriter::new(File::create(path)?))),
        }
    }
}

impl FromStr for Source {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == STD_STREAM {
            Ok(Source::Stdin)
        } else {
            Ok(Source::File(PathBuf::from(s)))
        }
    }
}

impl FromStr for Sink {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == STD_STREAM {
            Ok(Sink::Stdout)
        } else {
            Ok(Sink::File(PathBuf::from(s)))
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::Stdin => f.write_str("<stdin>"),
            Source::File(path) => write!(f, "{}", path.display()),
        }
    }
}

impl fmt::Display for Sink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sink::Stdout => f.write_str("<stdout>"),
            Sink::File(path) => write!(f, "{}", path.display()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn dash_selects_standard_streams() {
        assert_eq!("-".parse::<Source>().unwrap(), Source::Stdin);
        assert_eq!("-".parse::<Sink>().unwrap(), Sink::Stdout);
        assert_eq!(
            "data/in.csv".parse::<Source>().unwrap(),
            Source::File(PathBuf::from("data/in.csv"))
        );
        assert_eq!(Sink::default(), Sink::Stdout);
    }

    #[test]
    fn file_sink_and_source_round_trip() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("out.csv");

        let sink: Sink = path.to_str().unwrap().parse()?;
        {
            let mut w = sink.create()?;
            w.write_all(b"a,b\n")?;
            w.flush()?;
        }
        assert_eq!(fs::read_to_string(&path)?, "a,b\n");

        let source = Source::File(path.clone());
        let mut text = String::new();
        source.open()?.read_to_string(&mut text)?;
        assert_eq!(text, "a,b\n");
        assert_eq!(source.path(), Some(path.as_path()));
        Ok(())
    }

    #[test]
    fn missing_source_file_is_an_error() {
        let source = Source::File(PathBuf::from("/definitely/not/here.csv"));
        assert!(source.open().is_err());
    }
}
