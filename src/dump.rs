use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};

use flate2::read::MultiGzDecoder;
use tracing::debug;

use crate::domain::{Rank, TaxonId};
use crate::error::TaxaError;

const FIELD_SEPARATOR: &str = "\t|\t";
const LINE_TERMINATOR: &str = "\t|";
const NODE_FIELDS: usize = 3;
const NAME_FIELDS: usize = 4;
const SCIENTIFIC_NAME: &str = "scientific name";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeRecord {
    pub id: TaxonId,
    pub parent_id: Option<TaxonId>,
    pub rank: Rank,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameRecord {
    pub id: TaxonId,
    pub name: String,
}

pub type DumpReader = Box<dyn BufRead + Send>;

pub struct DumpParser;

impl DumpParser {
    pub fn open(path: &Path) -> Result<DumpReader, TaxaError> {
        let file = File::open(path).map_err(|err| io_error(path, err))?;
        let is_gzip = path
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case("gz"))
            .unwrap_or(false);
        debug!(path = %path.display(), gzip = is_gzip, "opening taxonomy dump");
        if is_gzip {
            Ok(Box::new(BufReader::new(MultiGzDecoder::new(file))))
        } else {
            Ok(Box::new(BufReader::new(file)))
        }
    }

    pub fn node_records<R: BufRead>(reader: R, source_name: &str) -> NodeRecords<R> {
        NodeRecords {
            lines: DumpLines::new(reader, source_name),
        }
    }

    pub fn name_records<R: BufRead>(reader: R, source_name: &str) -> NameRecords<R> {
        NameRecords {
            lines: DumpLines::new(reader, source_name),
        }
    }
}

pub struct NodeRecords<R> {
    lines: DumpLines<R>,
}

impl<R: BufRead> Iterator for NodeRecords<R> {
    type Item = Result<NodeRecord, TaxaError>;

    fn next(&mut self) -> Option<Self::Item> {
        let (line_no, line) = match self.lines.next()? {
            Ok(entry) => entry,
            Err(err) => return Some(Err(err)),
        };
        Some(self.lines.parse_node(line_no, &line))
    }
}

pub struct NameRecords<R> {
    lines: DumpLines<R>,
}

impl<R: BufRead> Iterator for NameRecords<R> {
    type Item = Result<NameRecord, TaxaError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let (line_no, line) = match self.lines.next()? {
                Ok(entry) => entry,
                Err(err) => return Some(Err(err)),
            };
            match self.lines.parse_name(line_no, &line) {
                Ok(Some(record)) => return Some(Ok(record)),
                Ok(None) => continue,
                Err(err) => return Some(Err(err)),
            }
        }
    }
}

struct DumpLines<R> {
    reader: R,
    buf: Vec<u8>,
    line_no: usize,
    finished: bool,
    source_name: String,
}

impl<R: BufRead> DumpLines<R> {
    fn new(reader: R, source_name: &str) -> Self {
        Self {
            reader,
            buf: Vec::new(),
            line_no: 0,
            finished: false,
            source_name: source_name.to_string(),
        }
    }

    fn next(&mut self) -> Option<Result<(usize, String), TaxaError>> {
        while !self.finished {
            self.buf.clear();
            match self.reader.read_until(b'\n', &mut self.buf) {
                Ok(0) => self.finished = true,
                Ok(_) => {
                    self.line_no += 1;
                    let raw = self.buf.strip_suffix(b"\n").unwrap_or(&self.buf);
                    let raw = raw.strip_suffix(b"\r").unwrap_or(raw);
                    let line = match std::str::from_utf8(raw) {
                        Ok(line) => line,
                        Err(_) => {
                            let content = String::from_utf8_lossy(raw);
                            return Some(Err(self.malformed(self.line_no, &content)));
                        }
                    };
                    if line.trim().is_empty() {
                        continue;
                    }
                    return Some(Ok((self.line_no, line.to_string())));
                }
                Err(err) => {
                    self.finished = true;
                    return Some(Err(io_error(Path::new(&self.source_name), err)));
                }
            }
        }
        None
    }

    fn parse_node(&self, line_no: usize, line: &str) -> Result<NodeRecord, TaxaError> {
        let fields = split_fields(line);
        if fields.len() < NODE_FIELDS {
            return Err(self.malformed(line_no, line));
        }
        let id = self.parse_id(line_no, line, fields[0])?;
        let parent = self.parse_id(line_no, line, fields[1])?;
        Ok(NodeRecord {
            id,
            parent_id: (parent != id).then_some(parent),
            rank: Rank::parse_label(fields[2]),
        })
    }

    fn parse_name(&self, line_no: usize, line: &str) -> Result<Option<NameRecord>, TaxaError> {
        let fields = split_fields(line);
        if fields.len() < NAME_FIELDS {
            return Err(self.malformed(line_no, line));
        }
        let id = self.parse_id(line_no, line, fields[0])?;
        if fields[3] != SCIENTIFIC_NAME {
            return Ok(None);
        }
        Ok(Some(NameRecord {
            id,
            name: fields[1].to_string(),
        }))
    }

    fn parse_id(&self, line_no: usize, line: &str, field: &str) -> Result<TaxonId, TaxaError> {
        field.parse().map_err(|_| self.malformed(line_no, line))
    }

    fn malformed(&self, line_no: usize, line: &str) -> TaxaError {
        TaxaError::MalformedRecord {
            source_name: self.source_name.clone(),
            line: line_no,
            content: line.to_string(),
        }
    }
}

fn split_fields(line: &str) -> Vec<&str> {
    let line = line.trim_end_matches(['\r', '\n']);
    let line = line.strip_suffix(LINE_TERMINATOR).unwrap_or(line);
    line.split(FIELD_SEPARATOR).map(str::trim).collect()
}

fn io_error(path: &Path, err: io::Error) -> TaxaError {
    TaxaError::Io {
        path: PathBuf::from(path),
        message: err.to_string(),
    }
}
