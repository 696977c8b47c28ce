// Copyright 2025 Eric Jingryd (tidynest@proton.me)
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::fs;
use std::path::Path;
use std::time::Duration;
use tempfile::TempDir;

use super::QueueSource;
use crate::pipeline::source::read_raw_frame;
use crate::pipeline::*;

const SHORT: Duration = Duration::from_millis(50);

fn write_u16(path: &Path, samples: &[u16]) {
    let bytes: Vec<u8> = samples.iter().flat_map(|s| s.to_le_bytes()).collect();
    fs::write(path, bytes).unwrap();
}

fn write_f32(path: &Path, samples: &[f32]) {
    let bytes: Vec<u8> = samples.iter().flat_map(|s| s.to_le_bytes()).collect();
    fs::write(path, bytes).unwrap();
}

// ============================================================================
// Channel source
// ============================================================================

#[test]
fn test_channel_delivers_frames() {
    let (tx, mut source) = channel_source((2, 3));
    tx.send(Frame::filled(2, 3, 7.0)).unwrap();

    let frame = source.next_frame(SHORT).unwrap();
    assert_eq!(frame.shape(), (2, 3));
    assert_eq!(source.shape(), (2, 3));
}

#[test]
fn test_channel_timeout() {
    let (_tx, mut source) = channel_source((2, 2));
    assert!(matches!(source.next_frame(SHORT), Err(SourceError::Timeout(d)) if d == SHORT));
}

#[test]
fn test_channel_disconnected() {
    let (tx, mut source) = channel_source((2, 2));
    drop(tx);
    assert!(matches!(source.next_frame(SHORT), Err(SourceError::Disconnected(_))));
}

#[test]
fn test_channel_rejects_wrong_shape() {
    let (tx, mut source) = channel_source((2, 2));
    tx.send(Frame::filled(3, 3, 0.0)).unwrap();

    assert!(matches!(
        source.next_frame(SHORT),
        Err(SourceError::ShapeMismatch { expected: (2, 2), found: (3, 3) })
    ));
}

// ============================================================================
// Raw files
// ============================================================================

#[test]
fn test_read_u16_frame() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("frame.raw");
    write_u16(&path, &[0, 1, 2, 65535]);

    let frame = read_raw_frame(&path, (2, 2), SampleFormat::U16).unwrap();
    assert_eq!(frame.data(), &[0.0, 1.0, 2.0, 65535.0]);
    assert_eq!(frame.get(1, 0), Some(2.0));
}

#[test]
fn test_read_f32_frame() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("frame.raw");
    write_f32(&path, &[-1.5, 0.25, 3.0, 1e6, 0.0, 2.0]);

    let frame = read_raw_frame(&path, (2, 3), SampleFormat::F32).unwrap();
    assert_eq!(frame.get(0, 0), Some(-1.5));
    assert_eq!(frame.get(1, 0), Some(1e6));
}

#[test]
fn test_read_truncated_frame() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("frame.raw");
    write_u16(&path, &[1, 2, 3]);

    assert!(matches!(
        read_raw_frame(&path, (2, 2), SampleFormat::U16),
        Err(SourceError::Truncated { expected: 8, found: 6 })
    ));
}

#[test]
fn test_read_missing_file() {
    let dir = TempDir::new().unwrap();
    let result = read_raw_frame(&dir.path().join("absent.raw"), (2, 2), SampleFormat::F32);
    assert!(matches!(result, Err(SourceError::Io(_))));
}

#[test]
fn test_sample_format_parse() {
    assert_eq!("U16".parse::<SampleFormat>(), Ok(SampleFormat::U16));
    assert_eq!("f32".parse::<SampleFormat>(), Ok(SampleFormat::F32));
    assert!("u8".parse::<SampleFormat>().is_err());
    assert_eq!(SampleFormat::U16.bytes_per_sample(), 2);
}

// ============================================================================
// Watched file source
// ============================================================================

#[test]
fn test_file_source_first_read_is_immediate() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("frame.raw");
    write_f32(&path, &[1.0, 2.0, 3.0, 4.0]);

    let mut source = FileFrameSource::new(path, (2, 2), SampleFormat::F32).unwrap();
    let frame = source.next_frame(SHORT).unwrap();
    assert_eq!(frame.data(), &[1.0, 2.0, 3.0, 4.0]);

    // Nothing changed since
    assert!(matches!(source.next_frame(SHORT), Err(SourceError::Timeout(_))));
}

#[test]
fn test_file_source_picks_up_replaced_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("frame.raw");
    write_f32(&path, &[0.0; 4]);

    let mut source = FileFrameSource::new(path.clone(), (2, 2), SampleFormat::F32).unwrap();
    source.next_frame(SHORT).unwrap();

    // Atomic replace, the way camera writers publish frames
    let staging = dir.path().join("frame.raw.tmp");
    write_f32(&staging, &[9.0; 4]);
    fs::rename(&staging, &path).unwrap();

    let frame = source.next_frame(Duration::from_secs(5)).unwrap();
    assert_eq!(frame.data(), &[9.0; 4]);
}

// ============================================================================
// Averaging helper
// ============================================================================

#[test]
fn test_average_frames_mean() {
    let mut source = QueueSource::new(
        (2, 2),
        vec![Frame::filled(2, 2, 1.0), Frame::filled(2, 2, 2.0), Frame::filled(2, 2, 6.0)],
    );

    let mean = average_frames(&mut source, 3, SHORT).unwrap();
    assert!(mean.data().iter().all(|v| *v == 3.0));
}

#[test]
fn test_average_frames_stops_early_on_timeout() {
    let mut source = QueueSource::new((2, 2), vec![Frame::filled(2, 2, 2.0), Frame::filled(2, 2, 4.0)]);

    let mean = average_frames(&mut source, 10, SHORT).unwrap();
    assert!(mean.data().iter().all(|v| *v == 3.0));
}

#[test]
fn test_average_frames_needs_one_frame() {
    let mut source = QueueSource::new((2, 2), vec![]);
    assert!(matches!(
        average_frames(&mut source, 5, SHORT),
        Err(SourceError::Timeout(_))
    ));
}
