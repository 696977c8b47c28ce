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

use image::Rgb;

use super::QueueSource;
use crate::pipeline::*;

/// Helper: pipeline over the given queued frames, gray + inferno palettes
fn pipeline_with(shape: (usize, usize), frames: Vec<Frame>) -> FramePipeline {
    FramePipeline::builder(Box::new(QueueSource::new(shape, frames)))
        .palettes(vec![Box::new(Colormap::Gray), Box::new(Colormap::Inferno)])
        .build()
        .unwrap()
}

fn ramp(shape: (usize, usize)) -> Frame {
    Frame::from_fn(shape.0, shape.1, |r, c| (r + c) as f32)
}

// ============================================================================
// Stage order and outputs
// ============================================================================

#[test]
fn test_single_pass_renders() {
    let mut pipeline = pipeline_with((8, 8), vec![ramp((8, 8))]);
    assert!(!pipeline.is_initialized());

    assert_eq!(pipeline.advance().unwrap(), TickOutcome::Rendered);
    assert!(pipeline.is_initialized());
    assert_eq!(pipeline.frames_rendered(), 1);

    let rgb = pipeline.rgb().unwrap();
    assert_eq!(rgb.dimensions(), (8, 8));
    assert_eq!(rgb.get_pixel(1, 1), &Rgb([0, 0, 0]));
    assert_eq!(rgb.get_pixel(7, 7), &Rgb([255, 255, 255]));
}

#[test]
fn test_stats_exclude_first_row_and_column() {
    let mut frame = ramp((8, 8));
    frame.data_mut()[0] = 1e6;
    frame.data_mut()[3] = -1e6;

    let mut pipeline = pipeline_with((8, 8), vec![frame]);
    pipeline.advance().unwrap();

    let stats = pipeline.stats();
    assert_eq!(stats.raw.min, 2.0);
    assert_eq!(stats.raw.max, 14.0);
    assert_eq!(stats.raw.mean, 8.0);
}

#[test]
fn test_crop_window_drives_output_shape() {
    let mut pipeline = pipeline_with((256, 256), vec![ramp((256, 256))]);
    pipeline.set_zoom(Some(4)).unwrap();
    pipeline.advance().unwrap();

    assert_eq!(pipeline.cropped().unwrap().shape(), (16, 16));
    assert_eq!(pipeline.rgb().unwrap().dimensions(), (16, 16));
    assert_eq!(pipeline.cropped().unwrap().get(0, 0), Some(240.0));
}

// ============================================================================
// Recoverable conditions
// ============================================================================

#[test]
fn test_flat_frame_renders_uniform_gray() {
    let mut pipeline = pipeline_with((128, 128), vec![Frame::filled(128, 128, 100.0)]);

    assert_eq!(pipeline.advance().unwrap(), TickOutcome::Degenerate);

    let zmapped = pipeline.zmapped().unwrap();
    assert!(zmapped.data().iter().all(|v| *v == DEGENERATE_FILL));

    let rgb = pipeline.rgb().unwrap();
    assert!(rgb.pixels().all(|p| *p == Rgb([128, 128, 128])));
}

#[test]
fn test_timeout_skips_tick_and_keeps_output() {
    let mut pipeline = pipeline_with((8, 8), vec![ramp((8, 8))]);
    pipeline.advance().unwrap();
    let before = pipeline.rgb().cloned();

    assert_eq!(pipeline.advance().unwrap(), TickOutcome::Skipped);
    assert_eq!(pipeline.rgb().cloned(), before);
    assert_eq!(pipeline.frames_rendered(), 1);
}

#[test]
fn test_disconnected_source_is_an_error() {
    let (tx, source) = channel_source((4, 4));
    drop(tx);

    let mut pipeline = FramePipeline::builder(Box::new(source)).build().unwrap();
    assert!(matches!(
        pipeline.advance(),
        Err(PipelineError::Source(SourceError::Disconnected(_)))
    ));
}

#[test]
fn test_wrongly_shaped_frame_is_rejected() {
    let frames = vec![ramp((4, 4)), Frame::filled(8, 8, 1.0), Frame::filled(2, 4, 1.0)];
    let mut pipeline = pipeline_with((4, 4), frames);
    pipeline.advance().unwrap();
    pipeline.toggle_averaging();

    for found in [(8, 8), (2, 4)] {
        match pipeline.advance() {
            Err(PipelineError::Source(SourceError::ShapeMismatch { expected, found: got })) => {
                assert_eq!(expected, (4, 4));
                assert_eq!(got, found);
            }
            other => panic!("expected shape mismatch, got {:?}", other),
        }
    }

    assert_eq!(pipeline.raw(), &ramp((4, 4)));
    assert_eq!(pipeline.averaging().count(), 0);
}

// ============================================================================
// Averaging
// ============================================================================

#[test]
fn test_averaging_identical_frames_is_exact() {
    let mut frames = vec![ramp((16, 16))];
    frames.extend((0..10).map(|_| Frame::filled(16, 16, 42.5)));

    let mut pipeline = pipeline_with((16, 16), frames);
    pipeline.advance().unwrap();
    pipeline.toggle_averaging();

    for _ in 0..10 {
        pipeline.advance().unwrap();
    }

    assert_eq!(pipeline.averaging().count(), 10);
    assert!(pipeline.raw().data().iter().all(|v| (v - 42.5).abs() < 1e-4));
}

#[test]
fn test_averaging_is_running_mean() {
    let frames = vec![
        Frame::filled(4, 4, 1000.0),
        Frame::filled(4, 4, 2.0),
        Frame::filled(4, 4, 4.0),
        Frame::filled(4, 4, 6.0),
    ];

    let mut pipeline = pipeline_with((4, 4), frames);
    pipeline.advance().unwrap();
    pipeline.toggle_averaging();
    for _ in 0..3 {
        pipeline.advance().unwrap();
    }

    // The pre-toggle frame is weighted out entirely by the first blend
    assert!(pipeline.raw().data().iter().all(|v| (v - 4.0).abs() < 1e-5));
}

#[test]
fn test_averaging_counter_resets_only_when_switched_on() {
    let frames = (0..4).map(|_| Frame::filled(4, 4, 1.0)).collect();
    let mut pipeline = pipeline_with((4, 4), frames);
    pipeline.advance().unwrap();

    pipeline.toggle_averaging();
    pipeline.advance().unwrap();
    pipeline.advance().unwrap();
    assert_eq!(pipeline.averaging().count(), 2);

    pipeline.toggle_averaging();
    assert!(!pipeline.averaging().enabled());
    assert_eq!(pipeline.averaging().count(), 2);

    pipeline.toggle_averaging();
    assert_eq!(pipeline.averaging().count(), 0);
}

#[test]
fn test_averaging_before_first_frame_replaces() {
    let frames = vec![Frame::filled(4, 4, 3.0), Frame::filled(4, 4, 5.0)];
    let mut pipeline = pipeline_with((4, 4), frames);

    pipeline.toggle_averaging();
    pipeline.advance().unwrap();
    assert_eq!(pipeline.averaging().count(), 0);
    assert!(pipeline.raw().data().iter().all(|v| *v == 3.0));

    pipeline.advance().unwrap();
    assert!(pipeline.raw().data().iter().all(|v| *v == 5.0));
}

// ============================================================================
// Mode toggles
// ============================================================================

#[test]
fn test_colormap_cycles_and_validates() {
    let mut pipeline = pipeline_with((4, 4), vec![]);
    assert_eq!(pipeline.colormap_name(), "gray");

    pipeline.set_colormap(None).unwrap();
    assert_eq!(pipeline.colormap_name(), "inferno");
    pipeline.set_colormap(None).unwrap();
    assert_eq!(pipeline.colormap(), 0);

    assert!(matches!(
        pipeline.set_colormap(Some(2)),
        Err(PipelineError::InvalidColormap { index: 2, count: 2 })
    ));
    pipeline.set_colormap(Some(1)).unwrap();
    assert_eq!(pipeline.colormap(), 1);
    assert_eq!(pipeline.palette_count(), 2);
}

#[test]
fn test_redraw_applies_toggles_to_held_frame() {
    let mut pipeline = pipeline_with((256, 256), vec![ramp((256, 256))]);
    assert_eq!(pipeline.redraw(), TickOutcome::Skipped);
    assert!(pipeline.rgb().is_none());

    pipeline.advance().unwrap();
    let gray = pipeline.rgb().cloned().unwrap();

    pipeline.set_zoom(Some(4)).unwrap();
    assert_eq!(pipeline.redraw(), TickOutcome::Rendered);
    assert_eq!(pipeline.rgb().unwrap().dimensions(), (16, 16));

    pipeline.set_zoom(Some(0)).unwrap();
    pipeline.set_colormap(Some(1)).unwrap();
    pipeline.redraw();
    assert_ne!(pipeline.rgb().unwrap(), &gray);
    assert_eq!(pipeline.rgb().unwrap().dimensions(), (256, 256));
    assert_eq!(pipeline.frames_rendered(), 1);
}

#[test]
fn test_scale_mode_and_clip_toggles() {
    let mut pipeline = pipeline_with((8, 8), vec![ramp((8, 8))]);

    pipeline.set_scale_mode(None);
    assert_eq!(pipeline.scale_mode(), ScaleMode::Root);
    pipeline.set_scale_mode(Some(ScaleMode::Linear));
    assert_eq!(pipeline.scale_mode(), ScaleMode::Linear);

    pipeline.set_clip(Some(4.0), Some(10.0));
    pipeline.advance().unwrap();
    assert_eq!(pipeline.stats().low, 4.0);
    assert_eq!(pipeline.stats().high, 10.0);

    pipeline.set_clip(None, None);
    assert!(!pipeline.clip().is_set());
}

#[test]
fn test_reference_correction_applied() {
    let bias = Frame::filled(4, 4, 1.0);
    let reference = DarkReference::new((4, 4), Some(bias), None).unwrap();

    let mut pipeline = FramePipeline::builder(Box::new(QueueSource::new((4, 4), vec![ramp((4, 4))])))
        .reference(Box::new(reference))
        .build()
        .unwrap();
    pipeline.advance().unwrap();

    // Stats are taken on the raw frame, the cropped data is corrected
    assert_eq!(pipeline.stats().raw.min, 2.0);
    assert_eq!(pipeline.cropped().unwrap().get(1, 1), Some(1.0));
}

#[test]
fn test_builder_rejects_bad_palette_setup() {
    let empty = FramePipeline::builder(Box::new(QueueSource::new((4, 4), vec![])))
        .palettes(vec![])
        .build();
    assert!(matches!(empty, Err(PipelineError::NoPalettes)));

    let out_of_range = FramePipeline::builder(Box::new(QueueSource::new((4, 4), vec![])))
        .colormap(3)
        .build();
    assert!(matches!(out_of_range, Err(PipelineError::InvalidColormap { index: 3, count: 1 })));
}
