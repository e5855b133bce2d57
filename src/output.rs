use parking_lot::Mutex;
use std::collections::HashMap;
use std::fmt::Debug;
use std::fs::File;
use std::io;
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::sync::Arc;

/// Where result files land. The engine writes one file per location key
/// ("summary", "series"); implementations decide what a key maps onto.
pub trait Output: Debug {
    fn writer_for_location_key(&self, location_key: &str) -> anyhow::Result<impl Write>;
    /// Whether this output can be considered a no-op and therefore that any code that only writes to the output can be skipped.
    fn is_noop(&self) -> bool {
        false
    }
}

/// Writes each location key to `<directory>/<prefix>_<key>.csv`.
#[derive(Debug)]
pub struct FileOutput {
    directory_path: PathBuf,
    file_prefix: String,
}

impl FileOutput {
    pub fn new(directory_path: PathBuf, file_prefix: String) -> Self {
        Self {
            directory_path,
            file_prefix,
        }
    }
}

impl Output for FileOutput {
    fn writer_for_location_key(&self, location_key: &str) -> anyhow::Result<impl Write> {
        Ok(BufWriter::new(File::create(self.directory_path.join(
            format!("{}_{location_key}.csv", self.file_prefix),
        ))?))
    }
}

impl Output for &FileOutput {
    fn writer_for_location_key(&self, location_key: &str) -> anyhow::Result<impl Write> {
        <FileOutput as Output>::writer_for_location_key(self, location_key)
    }
}

/// An output that goes to nowhere/ a "sink"/ /dev/null.
#[derive(Debug, Default)]
pub struct SinkOutput;

impl Output for SinkOutput {
    fn writer_for_location_key(&self, _location_key: &str) -> anyhow::Result<impl Write> {
        Ok(io::sink())
    }

    fn is_noop(&self) -> bool {
        true
    }
}

/// Captures written bytes in memory, keyed by location, so tests can assert
/// on what the engine wrote.
#[derive(Clone, Debug, Default)]
pub struct StringOutput {
    captured: Arc<Mutex<HashMap<String, Vec<u8>>>>,
}

impl StringOutput {
    pub fn contents_for_location_key(&self, location_key: &str) -> String {
        String::from_utf8_lossy(
            self.captured
                .lock()
                .get(location_key)
                .map(Vec::as_slice)
                .unwrap_or_default(),
        )
        .into_owned()
    }
}

impl Output for StringOutput {
    fn writer_for_location_key(&self, location_key: &str) -> anyhow::Result<impl Write> {
        Ok(StringOutputWriter {
            location_key: location_key.to_string(),
            captured: self.captured.clone(),
        })
    }
}

impl Output for &StringOutput {
    fn writer_for_location_key(&self, location_key: &str) -> anyhow::Result<impl Write> {
        <StringOutput as Output>::writer_for_location_key(self, location_key)
    }
}

#[derive(Debug)]
pub struct StringOutputWriter {
    location_key: String,
    captured: Arc<Mutex<HashMap<String, Vec<u8>>>>,
}

impl Write for StringOutputWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.captured
            .lock()
            .entry(self.location_key.clone())
            .or_default()
            .extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::*;

    #[rstest]
    fn test_string_output_captures_writes_per_key() {
        let output = StringOutput::default();
        {
            let mut writer = output.writer_for_location_key("summary").unwrap();
            writer.write_all(b"a,b\n1,2\n").unwrap();
        }
        assert_eq!(output.contents_for_location_key("summary"), "a,b\n1,2\n");
        assert_eq!(output.contents_for_location_key("series"), "");
    }

    #[rstest]
    fn test_sink_output_is_noop() {
        assert!(SinkOutput.is_noop());
        assert!(!StringOutput::default().is_noop());
    }
}
