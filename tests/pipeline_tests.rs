//! End-to-end ingest tests: encoded image -> height grid -> spans -> OBJ

use image::{ImageFormat, Rgba, RgbaImage};
use massing_engine::{
    DEFAULT_MERGE_THRESHOLD, HeightGrid, IngestParams, SampleMode, Studio, StudioConfig, mesh_rows,
    sample_image,
};
use std::io::Cursor;

fn encode(img: &RgbaImage, format: ImageFormat) -> Vec<u8> {
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, format).unwrap();
    buf.into_inner()
}

/// Helper: floor plan with an outer wall ring and one interior wall
fn floor_plan(size: u32) -> RgbaImage {
    RgbaImage::from_fn(size, size, |x, y| {
        let edge = x < 2 || y < 2 || x >= size - 2 || y >= size - 2;
        let interior = x == size / 2 && y > size / 4;
        if edge || interior { Rgba([20, 20, 20, 255]) } else { Rgba([240, 240, 240, 255]) }
    })
}

/// Helper: diagonal gradient for heightmap sampling
fn gradient(size: u32) -> RgbaImage {
    RgbaImage::from_fn(size, size, |x, y| {
        let v = ((x + y) * 255 / (2 * (size - 1))) as u8;
        Rgba([v, v, v, 255])
    })
}

fn assert_partition(grid: &HeightGrid, spans: &[massing_engine::Span]) {
    for y in 0..grid.rows() {
        let mut covered = vec![0u8; grid.columns()];
        for s in spans.iter().filter(|s| s.row == y) {
            assert!(s.width >= 1);
            for x in s.start_column..s.end_column() {
                assert_eq!(grid.get(x, y), s.height, "span height must match cell ({}, {})", x, y);
                covered[x] += 1;
            }
        }
        for x in 0..grid.columns() {
            let occupied = grid.get(x, y) > DEFAULT_MERGE_THRESHOLD;
            assert_eq!(covered[x], u8::from(occupied), "cell ({}, {}) coverage", x, y);
        }
    }
}

#[test]
fn test_resolution_for_complexities() {
    let bytes = encode(&floor_plan(64), ImageFormat::Png);
    for (complexity, expected) in [(1, 10), (4, 40), (12, 120), (25, 250), (26, 256), (60, 256)] {
        let params = IngestParams { complexity, ..Default::default() };
        let grid = sample_image(&bytes, &params).unwrap();
        assert_eq!(grid.rows(), expected, "complexity {}", complexity);
        assert_eq!(grid.columns(), expected, "complexity {}", complexity);
    }
}

#[test]
fn test_floor_plan_spans_partition_rows() {
    let bytes = encode(&floor_plan(80), ImageFormat::Png);
    let params = IngestParams { complexity: 8, ..Default::default() };
    let grid = sample_image(&bytes, &params).unwrap();
    let spans = mesh_rows(&grid, DEFAULT_MERGE_THRESHOLD);

    assert!(!spans.is_empty());
    assert!(spans.iter().all(|s| s.height == 1.0), "Floorplan heights are binary");
    assert_partition(&grid, &spans);

    // Ordered by row, then column
    for pair in spans.windows(2) {
        let (a, b) = (&pair[0], &pair[1]);
        assert!(a.row < b.row || (a.row == b.row && a.end_column() <= b.start_column));
    }
}

#[test]
fn test_heightmap_spans_partition_rows() {
    let bytes = encode(&gradient(50), ImageFormat::Png);
    let params = IngestParams {
        complexity: 5,
        threshold: 200,
        mode: SampleMode::Heightmap,
        ..Default::default()
    };
    let grid = sample_image(&bytes, &params).unwrap();
    assert!(grid.as_array().iter().all(|h| (0.0..=1.0).contains(h)));

    let spans = mesh_rows(&grid, DEFAULT_MERGE_THRESHOLD);
    assert_partition(&grid, &spans);
    let distinct: std::collections::BTreeSet<u32> = spans.iter().map(|s| s.height.to_bits()).collect();
    assert!(distinct.len() > 2, "Heightmap mode keeps graded heights");
}

#[test]
fn test_identical_inputs_identical_spans() {
    let bytes = encode(&floor_plan(73), ImageFormat::Png);
    let params = IngestParams { complexity: 7, threshold: 100, ..Default::default() };
    let a = mesh_rows(&sample_image(&bytes, &params).unwrap(), DEFAULT_MERGE_THRESHOLD);
    let b = mesh_rows(&sample_image(&bytes, &params).unwrap(), DEFAULT_MERGE_THRESHOLD);
    assert_eq!(a, b);
}

#[test]
fn test_invert_flips_uniform_mid_grey() {
    let bytes = encode(&RgbaImage::from_pixel(30, 30, Rgba([128, 128, 128, 255])), ImageFormat::Png);
    let plain = IngestParams { complexity: 3, threshold: 128, invert: false, mode: SampleMode::Floorplan };
    let flipped = IngestParams { invert: true, ..plain };

    let a = sample_image(&bytes, &plain).unwrap();
    let b = sample_image(&bytes, &flipped).unwrap();
    assert_eq!(a.occupied_count(0.0), 0);
    assert_eq!(b.occupied_count(0.0), 30 * 30);
}

#[test]
fn test_jpeg_input() {
    let rgb = image::DynamicImage::ImageRgba8(floor_plan(40)).to_rgb8();
    let mut buf = Cursor::new(Vec::new());
    rgb.write_to(&mut buf, ImageFormat::Jpeg).unwrap();
    let grid = sample_image(&buf.into_inner(), &IngestParams { complexity: 4, ..Default::default() }).unwrap();
    assert_eq!(grid.resolution(), 40);
    assert!(grid.occupied_count(DEFAULT_MERGE_THRESHOLD) > 0);
}

#[test]
fn test_studio_end_to_end() {
    let mut config = StudioConfig::default();
    config.ingest.complexity = 6;
    let mut studio = Studio::new(config).unwrap();

    let span_count = studio.ingest(&encode(&floor_plan(60), ImageFormat::Png)).unwrap().len();
    let doc = studio.export().unwrap();

    assert_eq!(doc.vertex_count, span_count * 8);
    assert_eq!(doc.face_count, span_count * 12);
    assert_eq!(doc.text.lines().filter(|l| l.starts_with("v ")).count(), span_count * 8);

    let metrics = studio.metrics();
    assert_eq!(metrics.span_count, span_count);
    assert!((metrics.max_height - 5.0).abs() < 1e-6);
}
