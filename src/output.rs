use anyhow::{Context, Result};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::info;

/// Fans every write out to stdout and, when configured, an output file.
pub struct Output<'a> {
    writers: Vec<Box<dyn Write + 'a>>,
    file_path: Option<PathBuf>,
}

impl<'a> Output<'a> {
    pub fn new(stdout: impl Write + 'a) -> Self {
        Self {
            writers: vec![Box::new(stdout)],
            file_path: None,
        }
    }

    /// Creates (truncating) `path` and mirrors all further writes into it.
    pub fn with_file(mut self, path: &Path) -> Result<Self> {
        let file = File::create(path)
            .with_context(|| format!("Could not create output file {}", path.display()))?;
        info!(action = "create", component = "output", file_path = ?path, "Mirroring results to file");
        self.writers.push(Box::new(BufWriter::new(file)));
        self.file_path = Some(path.to_path_buf());
        Ok(self)
    }

    pub fn file_path(&self) -> Option<&Path> {
        self.file_path.as_deref()
    }

    pub fn write_line(&mut self, line: &str) -> io::Result<()> {
        for writer in &mut self.writers {
            writer.write_all(line.as_bytes())?;
            writer.write_all(b"\n")?;
        }
        Ok(())
    }

    pub fn write_raw(&mut self, bytes: &[u8]) -> io::Result<()> {
        for writer in &mut self.writers {
            writer.write_all(bytes)?;
        }
        Ok(())
    }

    /// Writes a payload untouched, adding a newline only if it lacks one.
    pub fn write_record(&mut self, payload: &[u8]) -> io::Result<()> {
        self.write_raw(payload)?;
        if !payload.ends_with(b"\n") {
            self.write_raw(b"\n")?;
        }
        Ok(())
    }

    pub fn flush(&mut self) -> io::Result<()> {
        for writer in &mut self.writers {
            writer.flush()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn mirrors_lines_into_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.txt");
        let mut stdout = Vec::new();

        {
            let mut output = Output::new(&mut stdout).with_file(&path).unwrap();
            assert_eq!(output.file_path(), Some(path.as_path()));
            output.write_line("www.example.com").unwrap();
            output.write_raw(b"{}").unwrap();
            output.flush().unwrap();
        }

        assert_eq!(stdout, b"www.example.com\n{}");
        assert_eq!(fs::read_to_string(&path).unwrap(), "www.example.com\n{}");
    }

    #[test]
    fn records_end_with_exactly_one_newline() {
        let mut stdout = Vec::new();
        {
            let mut output = Output::new(&mut stdout);
            output.write_record(br#"{"a":1}"#).unwrap();
            output.write_record(b"{\"a\":2}\n").unwrap();
        }
        assert_eq!(stdout, b"{\"a\":1}\n{\"a\":2}\n");
    }

    #[test]
    fn create_failure_names_the_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("out.txt");

        let err = Output::new(io::sink()).with_file(&path).err().unwrap();
        assert!(format!("{err:#}").contains("out.txt"));
    }
}
