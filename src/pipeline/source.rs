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

//! Frame sources
//!
//! A frame source hands out fixed-shape frames, blocking up to a caller-given
//! timeout for the next one. Two implementations are provided:
//! - `ChannelSource`: frames pushed by a producer thread over an mpsc channel
//! - `FileFrameSource`: a raw sample file re-read whenever it is modified,
//!   using OS-level file watching (Linux inotify) via the notify crate

use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
    str::FromStr,
    sync::mpsc::{channel, Receiver, RecvTimeoutError, Sender},
    time::{Duration, Instant},
};

use crate::pipeline::error::SourceError;
use crate::pipeline::frame::Frame;

/// Producer of camera frames
pub trait FrameSource {
    /// (rows, cols) of every frame this source delivers
    fn shape(&self) -> (usize, usize);

    /// Blocks until the next frame or until `timeout` expires.
    ///
    /// A timeout is reported as `SourceError::Timeout` and is recoverable.
    fn next_frame(&mut self, timeout: Duration) -> Result<Frame, SourceError>;
}

/// Sending half of a `ChannelSource`
pub type FrameSender = Sender<Frame>;

/// Frames delivered over an in-process channel
pub struct ChannelSource {
    shape: (usize, usize),
    rx: Receiver<Frame>,
}

/// Creates a connected sender / source pair for frames of `shape`
pub fn channel_source(shape: (usize, usize)) -> (FrameSender, ChannelSource) {
    let (tx, rx) = channel();
    (tx, ChannelSource { shape, rx })
}

impl FrameSource for ChannelSource {
    fn shape(&self) -> (usize, usize) {
        self.shape
    }

    fn next_frame(&mut self, timeout: Duration) -> Result<Frame, SourceError> {
        let frame = self.rx.recv_timeout(timeout).map_err(|e| match e {
            RecvTimeoutError::Timeout => SourceError::Timeout(timeout),
            RecvTimeoutError::Disconnected => SourceError::Disconnected("producer dropped".to_string()),
        })?;

        if frame.shape() != self.shape {
            return Err(SourceError::ShapeMismatch {
                expected: self.shape,
                found: frame.shape(),
            });
        }

        Ok(frame)
    }
}

/// On-disk sample encoding, little-endian, row major
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SampleFormat {
    U16,
    #[default]
    F32,
}

impl SampleFormat {
    pub fn bytes_per_sample(self) -> usize {
        match self {
            SampleFormat::U16 => 2,
            SampleFormat::F32 => 4,
        }
    }

    /// Decodes raw bytes into `f32` samples
    pub fn decode(self, bytes: &[u8]) -> Vec<f32> {
        match self {
            SampleFormat::U16 => bytes
                .chunks_exact(2)
                .map(|b| u16::from_le_bytes([b[0], b[1]]) as f32)
                .collect(),
            SampleFormat::F32 => bytes
                .chunks_exact(4)
                .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
                .collect(),
        }
    }
}

impl FromStr for SampleFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "u16" => Ok(SampleFormat::U16),
            "f32" => Ok(SampleFormat::F32),
            other => Err(format!("unknown sample format '{}'", other)),
        }
    }
}

/// Reads one frame from a raw sample file
pub fn read_raw_frame(path: &Path, shape: (usize, usize), format: SampleFormat) -> Result<Frame, SourceError> {
    let bytes = fs::read(path)?;
    let expected = shape.0 * shape.1 * format.bytes_per_sample();
    if bytes.len() != expected {
        return Err(SourceError::Truncated {
            expected,
            found: bytes.len(),
        });
    }

    Frame::from_vec(shape.0, shape.1, format.decode(&bytes)).ok_or(SourceError::Truncated {
        expected,
        found: bytes.len(),
    })
}

/// Raw sample file that is re-read every time it changes
///
/// The parent directory is watched rather than the file itself, so writers
/// that replace the file with a rename are picked up too.
pub struct FileFrameSource {
    path: PathBuf,
    shape: (usize, usize),
    format: SampleFormat,
    _watcher: RecommendedWatcher,
    rx: Receiver<notify::Result<Event>>,
    delivered_initial: bool,
}

impl FileFrameSource {
    pub fn new(path: PathBuf, shape: (usize, usize), format: SampleFormat) -> Result<Self, SourceError> {
        let (tx, rx) = channel();

        let mut watcher = RecommendedWatcher::new(
            move |res| {
                let _ = tx.send(res);
            },
            Config::default(),
        )?;

        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        watcher.watch(&dir, RecursiveMode::NonRecursive)?;

        Ok(Self {
            path,
            shape,
            format,
            _watcher: watcher,
            rx,
            delivered_initial: false,
        })
    }

    fn concerns_frame(&self, event: &Event) -> bool {
        matches!(event.kind, EventKind::Modify(_) | EventKind::Create(_))
            && event
                .paths
                .iter()
                .any(|p| p.file_name() == self.path.file_name())
    }

    /// Discards queued events (a single write often produces several)
    fn drain_events(&self) {
        while self.rx.try_recv().is_ok() {}
    }
}

impl FrameSource for FileFrameSource {
    fn shape(&self) -> (usize, usize) {
        self.shape
    }

    fn next_frame(&mut self, timeout: Duration) -> Result<Frame, SourceError> {
        if !self.delivered_initial {
            self.delivered_initial = true;
            self.drain_events();
            return read_raw_frame(&self.path, self.shape, self.format);
        }

        let deadline = Instant::now() + timeout;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.rx.recv_timeout(remaining) {
                Ok(Ok(event)) if self.concerns_frame(&event) => {
                    self.drain_events();
                    match read_raw_frame(&self.path, self.shape, self.format) {
                        // Writer is mid-write; the next event completes it
                        Err(SourceError::Truncated { found, .. }) => {
                            tracing::debug!(found, "partial frame file, waiting");
                            continue;
                        }
                        result => return result,
                    }
                }
                Ok(Ok(_)) => continue,
                Ok(Err(e)) => tracing::warn!(error = %e, "file watch error"),
                Err(RecvTimeoutError::Timeout) => return Err(SourceError::Timeout(timeout)),
                Err(RecvTimeoutError::Disconnected) => {
                    return Err(SourceError::Disconnected("file watcher stopped".to_string()))
                }
            }
        }
    }
}

/// Averages up to `count` consecutive frames.
///
/// Stops early if the source times out after at least one frame has been
/// collected; a timeout before the first frame is returned as an error.
pub fn average_frames(
    source: &mut dyn FrameSource,
    count: usize,
    timeout: Duration,
) -> Result<Frame, SourceError> {
    let mut sum: Option<Frame> = None;
    let mut collected = 0usize;

    while collected < count.max(1) {
        let frame = match source.next_frame(timeout) {
            Ok(frame) => frame,
            Err(SourceError::Timeout(_)) if collected > 0 => break,
            Err(e) => return Err(e),
        };

        match sum.as_mut() {
            None => sum = Some(frame),
            Some(acc) => {
                for (a, v) in acc.data_mut().iter_mut().zip(frame.data()) {
                    *a += v;
                }
            }
        }
        collected += 1;
    }

    let mut mean = sum.ok_or(SourceError::Timeout(timeout))?;
    let n = collected as f32;
    mean.map_in_place(|v| v / n);
    Ok(mean)
}
