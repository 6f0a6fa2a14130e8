//! Fixtures shared by the integration tests.

#![allow(dead_code)]

use assert_fs::prelude::*;
use assert_fs::TempDir;
use media_sorter::core::metadata::{EmbeddedExif, FileTimes, ResolverChain};
use media_sorter::core::pipeline::PipelineBuilder;
use media_sorter::core::Pipeline;
use std::path::Path;
use walkdir::WalkDir;

/// JPEG with an EXIF `DateTime` of `date` ("YYYY:MM:DD HH:MM:SS") followed
/// by `payload`, so different payloads give different content
pub fn jpeg(date: &str, payload: &[u8]) -> Vec<u8> {
    assert_eq!(date.len(), 19);

    // Little-endian TIFF header, one IFD0 entry, value right after the IFD
    let mut tiff = Vec::new();
    tiff.extend_from_slice(b"II*\0");
    tiff.extend_from_slice(&8u32.to_le_bytes());
    tiff.extend_from_slice(&1u16.to_le_bytes());
    tiff.extend_from_slice(&0x0132u16.to_le_bytes());
    tiff.extend_from_slice(&2u16.to_le_bytes());
    tiff.extend_from_slice(&20u32.to_le_bytes());
    tiff.extend_from_slice(&26u32.to_le_bytes());
    tiff.extend_from_slice(&0u32.to_le_bytes());
    tiff.extend_from_slice(date.as_bytes());
    tiff.push(0);

    let mut app1 = b"Exif\0\0".to_vec();
    app1.extend_from_slice(&tiff);

    let mut out = vec![0xFF, 0xD8, 0xFF, 0xE1];
    out.extend_from_slice(&((app1.len() + 2) as u16).to_be_bytes());
    out.extend_from_slice(&app1);
    out.extend_from_slice(payload);
    out.extend_from_slice(&[0xFF, 0xD9]);
    out
}

/// Source and destination roots that clean up after themselves
pub struct Fixture {
    pub source: TempDir,
    pub destination: TempDir,
}

impl Fixture {
    pub fn new() -> Self {
        Self {
            source: TempDir::new().unwrap(),
            destination: TempDir::new().unwrap(),
        }
    }

    /// Write a file under the source root
    pub fn source_file(&self, relative: &str, content: &[u8]) {
        self.source.child(relative).write_binary(content).unwrap();
    }

    /// Write a file under the destination root
    pub fn destination_file(&self, relative: &str, content: &[u8]) {
        self.destination.child(relative).write_binary(content).unwrap();
    }

    /// Builder wired to both roots, dating files from embedded EXIF only
    pub fn builder(&self) -> PipelineBuilder {
        Pipeline::builder()
            .source(self.source.path())
            .destination(self.destination.path())
            .workers(8)
            .resolver(ResolverChain::new(vec![Box::new(EmbeddedExif)]))
    }

    /// Builder that also falls back to filesystem timestamps
    pub fn builder_with_file_times(&self) -> PipelineBuilder {
        self.builder().resolver(ResolverChain::new(vec![
            Box::new(EmbeddedExif),
            Box::new(FileTimes),
        ]))
    }

    pub fn destination_file_count(&self) -> usize {
        count_files(self.destination.path())
    }
}

pub fn count_files(root: &Path) -> usize {
    WalkDir::new(root)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .count()
}
