use crate::error::{Error, Result};
use bzip2::read::BzDecoder;
use serde_json::{Map, Value};
use std::fs::File;
use std::io::{self, BufRead, BufReader, Lines, Read};
use std::path::{Path, PathBuf};

/// Streams the lines of a dump file, decompressing `.bz2` inputs on the fly.
pub struct DumpReader {
    path: PathBuf,
    lines: Lines<BufReader<Box<dyn Read + Send>>>,
    line_no: u64,
}

impl DumpReader {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = File::open(&path).map_err(|source| Error::FileAccess {
            path: path.clone(),
            source,
        })?;

        let inner: Box<dyn Read + Send> = if path.extension().is_some_and(|ext| ext == "bz2") {
            Box::new(BzDecoder::new(file))
        } else {
            Box::new(file)
        };

        Ok(Self {
            path,
            lines: BufReader::with_capacity(128 * 1024, inner).lines(),
            line_no: 0,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn lines_read(&self) -> u64 {
        self.line_no
    }
}

impl Iterator for DumpReader {
    /// 1-based line number and the raw line.
    type Item = (u64, io::Result<String>);

    fn next(&mut self) -> Option<Self::Item> {
        let line = self.lines.next()?;
        self.line_no += 1;
        Some((self.line_no, line))
    }
}

/// Parses the JSON object embedded in a dump line.
///
/// Dump lines look like `/type/author\t/authors/OL1A\t3\t2008-04-01\t{...}`;
/// everything before the first `{` is ignored.
pub fn extract_json(line: &str) -> Result<Map<String, Value>> {
    let start = memchr::memchr(b'{', line.as_bytes())
        .ok_or_else(|| Error::MalformedLine("no JSON object on line".to_string()))?;

    match serde_json::from_str::<Value>(&line[start..]) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(Error::MalformedLine("JSON value is not an object".to_string())),
        Err(e) => Err(Error::MalformedLine(e.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn extract_skips_prefix() {
        let line = "/type/author\t/authors/OL1A\t1\t2008-04-01T03:28:50.625462\t{\"key\": \"/authors/OL1A\", \"name\": \"Jane\"}";
        let map = extract_json(line).unwrap();
        assert_eq!(map["key"], "/authors/OL1A");
        assert_eq!(map["name"], "Jane");
    }

    #[test]
    fn extract_without_prefix() {
        let map = extract_json(r#"{"a": [1, {"b": null}]}"#).unwrap();
        assert_eq!(map["a"][1]["b"], Value::Null);
    }

    #[test]
    fn extract_no_brace() {
        let err = extract_json("just some text").unwrap_err();
        assert!(matches!(err, Error::MalformedLine(_)));
    }

    #[test]
    fn extract_empty_line() {
        assert!(matches!(extract_json(""), Err(Error::MalformedLine(_))));
    }

    #[test]
    fn extract_invalid_json() {
        let err = extract_json("garbage{not-json").unwrap_err();
        assert!(matches!(err, Error::MalformedLine(_)));
    }

    #[test]
    fn extract_trailing_garbage() {
        assert!(extract_json(r#"x {"a": 1} trailing"#).is_err());
    }

    #[test]
    fn reader_numbers_lines() {
        let mut tmp = NamedTempFile::new().unwrap();
        writeln!(tmp, "first").unwrap();
        writeln!(tmp, "second").unwrap();
        tmp.flush().unwrap();

        let lines: Vec<(u64, String)> = DumpReader::open(tmp.path())
            .unwrap()
            .map(|(n, l)| (n, l.unwrap()))
            .collect();
        assert_eq!(lines, vec![(1, "first".to_string()), (2, "second".to_string())]);
    }

    #[test]
    fn reader_missing_file() {
        let err = DumpReader::open("/definitely/not/here.txt").err().unwrap();
        assert!(matches!(err, Error::FileAccess { .. }));
    }
}
