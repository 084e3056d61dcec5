//! Schema bundle extraction
//!
//! Service schema bundles are archives of `.proto` sources. Publishers upload
//! plain tar; zip and gzip-compressed tar are accepted as well. The format is
//! sniffed from the magic bytes.

use std::collections::BTreeMap;
use std::io::{Cursor, Read};

use flate2::read::GzDecoder;

use crate::error::{Error, Result};

const ZIP_MAGIC: &[u8] = b"PK\x03\x04";
const ZIP_EMPTY_MAGIC: &[u8] = b"PK\x05\x06";
const GZIP_MAGIC: &[u8] = &[0x1f, 0x8b];
/// `ustar` at offset 257 of the first header (POSIX and GNU tar).
const TAR_MAGIC: &[u8] = b"ustar";
const TAR_MAGIC_OFFSET: usize = 257;

fn is_tar(data: &[u8]) -> bool {
    data.get(TAR_MAGIC_OFFSET..TAR_MAGIC_OFFSET + TAR_MAGIC.len()) == Some(TAR_MAGIC)
}

/// Extract a bundle into `file name -> content`.
pub fn extract(data: &[u8]) -> Result<BTreeMap<String, Vec<u8>>> {
    if data.is_empty() {
        return Err(Error::Bundle("empty bundle".to_string()));
    }
    if data.starts_with(ZIP_MAGIC) || data.starts_with(ZIP_EMPTY_MAGIC) {
        extract_zip(data)
    } else if data.starts_with(GZIP_MAGIC) {
        extract_tar(GzDecoder::new(Cursor::new(data)))
    } else if is_tar(data) {
        extract_tar(Cursor::new(data))
    } else {
        Err(Error::Bundle("unrecognised archive format".to_string()))
    }
}

/// Remove leading `/` and `./` so entries are keyed by their relative path.
fn normalize_name(name: &str) -> String {
    let mut name = name;
    loop {
        if let Some(rest) = name.strip_prefix("./") {
            name = rest;
        } else if let Some(rest) = name.strip_prefix('/') {
            name = rest;
        } else {
            return name.to_string();
        }
    }
}

fn extract_zip(data: &[u8]) -> Result<BTreeMap<String, Vec<u8>>> {
    let mut archive =
        zip::ZipArchive::new(Cursor::new(data)).map_err(|e| Error::Bundle(e.to_string()))?;
    let mut files = BTreeMap::new();

    for i in 0..archive.len() {
        let mut file = archive.by_index(i).map_err(|e| Error::Bundle(e.to_string()))?;
        if !file.is_file() {
            continue;
        }
        let name = normalize_name(file.name());
        if name.is_empty() {
            continue;
        }
        let mut contents = Vec::new();
        file.read_to_end(&mut contents)?;
        files.insert(name, contents);
    }

    Ok(files)
}

fn extract_tar<R: Read>(reader: R) -> Result<BTreeMap<String, Vec<u8>>> {
    let mut archive = tar::Archive::new(reader);
    let mut files = BTreeMap::new();

    let entries = archive.entries().map_err(|e| Error::Bundle(e.to_string()))?;
    for entry in entries {
        let mut entry = entry.map_err(|e| Error::Bundle(e.to_string()))?;
        if !entry.header().entry_type().is_file() {
            continue;
        }
        let name = {
            let path = entry.path().map_err(|e| Error::Bundle(e.to_string()))?;
            normalize_name(&path.to_string_lossy())
        };
        if name.is_empty() {
            continue;
        }
        let mut contents = Vec::new();
        entry
            .read_to_end(&mut contents)
            .map_err(|e| Error::Bundle(e.to_string()))?;
        files.insert(name, contents);
    }

    Ok(files)
}
