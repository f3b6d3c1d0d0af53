//! Shared fixtures for installation tests

#![allow(dead_code)]

use bpdeps_install::{Error, Result, Transport};
use bpdeps_resolver::{Algorithm, Checksum, DependencyRecord};
use flate2::Compression;
use flate2::write::GzEncoder;
use std::collections::HashMap;
use std::io::{self, Cursor, Read};
use std::path::Path;
use std::sync::Mutex;

/// One entry of a fixture archive.
pub enum Fixture<'a> {
    File(&'a str, &'a [u8], u32),
    Dir(&'a str, u32),
    Symlink(&'a str, &'a str),
    HardLink(&'a str, &'a str),
}

/// Build a `.tar.gz` in memory.
pub fn tarball(entries: &[Fixture<'_>]) -> Vec<u8> {
    let mut builder = tar::Builder::new(GzEncoder::new(Vec::new(), Compression::default()));
    for entry in entries {
        let mut header = tar::Header::new_gnu();
        match entry {
            Fixture::File(path, content, mode) => {
                header.set_entry_type(tar::EntryType::Regular);
                header.set_size(content.len() as u64);
                header.set_mode(*mode);
                header.set_cksum();
                builder.append_data(&mut header, path, &content[..]).unwrap();
            }
            Fixture::Dir(path, mode) => {
                header.set_entry_type(tar::EntryType::Directory);
                header.set_size(0);
                header.set_mode(*mode);
                header.set_cksum();
                builder.append_data(&mut header, path, io::empty()).unwrap();
            }
            Fixture::Symlink(path, target) => {
                header.set_entry_type(tar::EntryType::Symlink);
                header.set_size(0);
                header.set_mode(0o777);
                // Written raw so absolute and climbing targets survive.
                header.as_old_mut().linkname[..target.len()].copy_from_slice(target.as_bytes());
                header.set_cksum();
                builder.append_data(&mut header, path, io::empty()).unwrap();
            }
            Fixture::HardLink(path, original) => {
                header.set_entry_type(tar::EntryType::Link);
                header.set_size(0);
                header.set_mode(0o644);
                header.set_link_name(original).unwrap();
                builder.append_data(&mut header, path, io::empty()).unwrap();
            }
        }
    }
    builder.into_inner().unwrap().finish().unwrap()
}

/// A record pointing at `uri` whose checksum matches `content`.
pub fn record_for(uri: &str, content: &[u8]) -> DependencyRecord {
    record_with_checksum(uri, &Checksum::compute(Algorithm::Sha256, content).to_string())
}

/// A record pointing at `uri` with an explicit checksum.
pub fn record_with_checksum(uri: &str, checksum: &str) -> DependencyRecord {
    DependencyRecord {
        id: "tool".to_string(),
        name: Some("Tool".to_string()),
        version: "1.2.3".to_string(),
        checksum: checksum.to_string(),
        uri: uri.to_string(),
        stacks: vec!["*".to_string()],
        strip_components: 0,
        licenses: Vec::new(),
        cpes: Vec::new(),
        purl: None,
        deprecation_date: None,
        source: None,
        source_checksum: None,
    }
}

/// Hands out at most one byte per `read`.
pub struct OneByteReader<R>(pub R);

impl<R: Read> Read for OneByteReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match buf.first_mut() {
            Some(first) => self.0.read(std::slice::from_mut(first)),
            None => Ok(0),
        }
    }
}

/// Serves artifacts from memory and remembers what was requested.
#[derive(Default)]
pub struct MemoryTransport {
    artifacts: HashMap<String, Vec<u8>>,
    requested: Mutex<Vec<String>>,
    one_byte_reads: bool,
}

impl MemoryTransport {
    pub fn with(mut self, uri: &str, content: Vec<u8>) -> Self {
        self.artifacts.insert(uri.to_string(), content);
        self
    }

    /// Serve every artifact one byte per `read`.
    pub fn one_byte_reads(mut self) -> Self {
        self.one_byte_reads = true;
        self
    }

    pub fn requested(&self) -> Vec<String> {
        self.requested.lock().unwrap().clone()
    }
}

impl Transport for MemoryTransport {
    fn drop(&self, _root: &Path, uri: &str) -> Result<Box<dyn Read + Send>> {
        self.requested.lock().unwrap().push(uri.to_string());
        match self.artifacts.get(uri) {
            Some(content) if self.one_byte_reads => {
                Ok(Box::new(OneByteReader(Cursor::new(content.clone()))))
            }
            Some(content) => Ok(Box::new(Cursor::new(content.clone()))),
            None => Err(Error::HttpStatus {
                uri: uri.to_string(),
                status: 404,
            }),
        }
    }
}
