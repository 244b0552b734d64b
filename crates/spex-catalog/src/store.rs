use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use fs_err as fs;

use crate::error::StoreError;
use crate::model::AttributeRecord;

/// Append-only record streams, one per brand.
pub trait Store {
    type Sink: RecordSink;

    /// All records previously written for `brand`, or `None` when the brand
    /// has no stream yet.
    fn read(&self, brand: &str) -> Result<Option<Vec<AttributeRecord>>, StoreError>;

    /// Opens the brand's stream for appending, creating it if needed.
    fn appender(&self, brand: &str) -> Result<Self::Sink, StoreError>;
}

pub trait RecordSink {
    /// Appends one record; it is durable once this returns.
    fn append(&mut self, record: &AttributeRecord) -> Result<(), StoreError>;
}

/// Stores each brand as `<dir>/<brand>_models.json`, one JSON record per line.
#[derive(Debug, Clone)]
pub struct JsonLinesStore {
    dir: PathBuf,
}

impl JsonLinesStore {
    pub fn new<P: Into<PathBuf>>(dir: P) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path(&self, brand: &str) -> PathBuf {
        self.dir.join(format!("{}_models.json", file_stem(brand)))
    }
}

impl Store for JsonLinesStore {
    type Sink = JsonLinesWriter;

    fn read(&self, brand: &str) -> Result<Option<Vec<AttributeRecord>>, StoreError> {
        let path = self.path(brand);
        let file = match fs::File::open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let mut records = vec![];
        for (n, line) in BufReader::new(file).lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str(&line) {
                Ok(record) => records.push(record),
                Err(e) => log::warn!("Skipping line {} of {}: {e}", n + 1, path.display()),
            }
        }

        Ok(Some(records))
    }

    fn appender(&self, brand: &str) -> Result<JsonLinesWriter, StoreError> {
        fs::create_dir_all(&self.dir)?;
        JsonLinesWriter::open(self.path(brand))
    }
}

#[derive(Debug)]
pub struct JsonLinesWriter {
    file: fs::File,
}

impl JsonLinesWriter {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path.as_ref())?;
        Ok(Self { file })
    }
}

impl RecordSink for JsonLinesWriter {
    fn append(&mut self, record: &AttributeRecord) -> Result<(), StoreError> {
        let mut line = serde_json::to_vec(record).map_err(|source| StoreError::Json {
            model_name: record.model_name.clone(),
            source,
        })?;
        line.push(b'\n');
        self.file.write_all(&line)?;
        self.file.flush()?;
        self.file.sync_data()?;
        Ok(())
    }
}

fn file_stem(brand: &str) -> String {
    brand
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect()
}
