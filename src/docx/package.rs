//! Zip container handling for `.docx` packages.

use crate::error::Result;
use std::io::{Cursor, Read, Write};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

/// One file inside the package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Part {
    pub name: String,
    pub data: Vec<u8>,
}

impl Part {
    pub fn new(name: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            data: data.into(),
        }
    }
}

/// Upper bound on the buffer reserved up front for one entry.
const MAX_PREALLOC: u64 = 16 * 1024 * 1024;

/// Buffer capacity for an entry whose header claims `declared` bytes.
///
/// The header is untrusted; larger entries still read fully, growing as they go.
fn preallocation(declared: u64) -> usize {
    declared.min(MAX_PREALLOC) as usize
}

/// Read every file entry of the package, keeping archive order.
pub fn read_parts(bytes: &[u8]) -> Result<Vec<Part>> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))?;
    let mut parts = Vec::with_capacity(archive.len());

    for i in 0..archive.len() {
        let mut file = archive.by_index(i)?;
        if file.is_dir() {
            continue;
        }
        let mut data = Vec::with_capacity(preallocation(file.size()));
        file.read_to_end(&mut data)?;
        parts.push(Part::new(file.name(), data));
    }

    Ok(parts)
}

/// Write the parts into a fresh deflate-compressed archive.
pub fn write_parts(parts: &[Part]) -> Result<Vec<u8>> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));

    for part in parts {
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
        writer.start_file(part.name.as_str(), options)?;
        writer.write_all(&part.data)?;
    }

    Ok(writer.finish()?.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parts_keep_order_and_content() {
        let parts = vec![
            Part::new("[Content_Types].xml", "<Types/>"),
            Part::new("word/document.xml", "<w:document/>"),
            Part::new("word/media/image1.png", vec![0u8, 159, 146, 150]),
        ];
        let bytes = write_parts(&parts).unwrap();
        assert_eq!(read_parts(&bytes).unwrap(), parts);
    }

    #[test]
    fn test_declared_size_does_not_drive_allocation() {
        assert_eq!(preallocation(0), 0);
        assert_eq!(preallocation(4096), 4096);
        assert_eq!(preallocation(u64::MAX), MAX_PREALLOC as usize);
    }

    #[test]
    fn test_entry_larger_than_preallocation_reads_fully() {
        let big = vec![b'x'; MAX_PREALLOC as usize + 10];
        let parts = vec![Part::new("word/media/big.bin", big)];
        let bytes = write_parts(&parts).unwrap();
        let read = read_parts(&bytes).unwrap();
        assert_eq!(read[0].data.len(), MAX_PREALLOC as usize + 10);
    }

    #[test]
    fn test_read_rejects_non_zip() {
        assert!(read_parts(b"plain text").is_err());
    }
}
