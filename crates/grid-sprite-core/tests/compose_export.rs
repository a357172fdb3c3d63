use grid_sprite_core::export::{records, to_css_lines, to_json_lines};
use grid_sprite_core::finalize::finalize;
use grid_sprite_core::prelude::*;
use image::{DynamicImage, Rgba, RgbaImage};

fn solid(w: u32, h: u32, px: [u8; 4]) -> DynamicImage {
    DynamicImage::ImageRgba8(RgbaImage::from_pixel(w, h, Rgba(px)))
}

/// `w`x`h` transparent image with an opaque block starting at (`ox`, `oy`).
fn padded(w: u32, h: u32, ox: u32, oy: u32, bw: u32, bh: u32) -> DynamicImage {
    let mut img = RgbaImage::new(w, h);
    for y in oy..oy + bh {
        for x in ox..ox + bw {
            img.put_pixel(x, y, Rgba([0, 128, 255, 255]));
        }
    }
    DynamicImage::ImageRgba8(img)
}

fn input(key: &str, image: DynamicImage) -> InputImage {
    InputImage {
        key: key.to_string(),
        image,
    }
}

#[test]
fn json_lists_topmost_layer_first() {
    let cfg = LayoutConfig::builder().output_format(OutputFormat::Json).build();
    let out = pack_images(
        vec![
            input("a", solid(10, 10, [255, 0, 0, 255])),
            input("b", solid(10, 10, [0, 255, 0, 255])),
        ],
        cfg,
    )
    .expect("pack");
    assert_eq!(
        out.lines(),
        vec![
            "[".to_string(),
            r#"{"layer": "b", "x": "0", "y": "-50"},"#.to_string(),
            r#"{"layer": "a", "x": "0", "y": "-0"}"#.to_string(),
            "]".to_string(),
        ]
    );
    let doc: serde_json::Value = serde_json::from_str(&out.lines().join("\n")).expect("json");
    let arr = doc.as_array().expect("array");
    assert_eq!(arr[0]["layer"], "b");
    assert_eq!(arr[0]["y"], "-50");
    assert_eq!(arr[1]["x"], "0");
}

#[test]
fn css_rules_negate_both_offsets() {
    let cfg = LayoutConfig::builder().limit(2).build();
    let out = pack_images(
        vec![
            input("left", solid(20, 20, [1, 2, 3, 255])),
            input("right", solid(20, 20, [4, 5, 6, 255])),
            input("under", solid(20, 20, [7, 8, 9, 255])),
        ],
        cfg,
    )
    .expect("pack");
    assert_eq!(
        out.lines(),
        vec![
            ".under { background-position: -0 -50; }",
            ".right { background-position: -100 -0; }",
            ".left { background-position: -0 -0; }",
        ]
    );
    // 2 columns at pitch 100 and 2 rows at pitch 50, each image 20px.
    assert_eq!(out.image.dimensions(), (120, 70));
}

#[test]
fn visible_corner_lands_on_anchor_regardless_of_padding() {
    let cfg = LayoutConfig::default();
    let out = pack_images(
        vec![
            input("pad", padded(32, 32, 5, 7, 10, 10)),
            input("flush", padded(16, 16, 0, 0, 16, 16)),
        ],
        cfg,
    )
    .expect("pack");
    let rec: Vec<(String, u32, u32)> = out
        .records
        .iter()
        .map(|r| (r.name.clone(), r.x, r.y))
        .collect();
    assert_eq!(
        rec,
        vec![("flush".to_string(), 0, 50), ("pad".to_string(), 0, 0)]
    );
    // Trim keeps only visible content: widest is 16, tallest reaches 50 + 16.
    assert_eq!(out.image.dimensions(), (16, 66));
    assert_eq!(out.image.get_pixel(0, 0)[3], 255);
    assert_eq!(out.image.get_pixel(12, 5)[3], 0);
    assert_eq!(*out.image.get_pixel(0, 50), Rgba([0, 128, 255, 255]));
}

#[test]
fn content_past_the_nominal_canvas_is_revealed() {
    let cfg = LayoutConfig::builder()
        .canvas_size(64, 64)
        .row_spacing(100)
        .build();
    let out = pack_images(
        vec![
            input("top", solid(8, 8, [9, 9, 9, 255])),
            input("far", solid(8, 8, [9, 9, 9, 255])),
        ],
        cfg,
    )
    .expect("pack");
    assert_eq!(out.image.dimensions(), (8, 108));
    assert_eq!(out.records[0].y, 100);
}

#[test]
fn builder_is_lazy_and_keeps_acceptance_order() {
    let builder = SpriteBuilder::new(LayoutConfig::default()).expect("builder");
    assert!(builder.into_canvas().is_none());

    let mut builder = SpriteBuilder::new(LayoutConfig::default()).expect("builder");
    for key in ["one", "two", "three"] {
        builder.place_image(input(key, solid(4, 4, [1, 1, 1, 255])));
    }
    let keys: Vec<&str> = builder.placements().iter().map(|p| p.key.as_str()).collect();
    assert_eq!(keys, vec!["one", "two", "three"]);
    assert_eq!(builder.anchor_extent(), (0, 100));

    let mut canvas = builder.into_canvas().expect("canvas");
    // placeholder + three image layers
    assert_eq!(canvas.layer_count(), 4);
    let placeholder = canvas.placeholder();
    finalize(&mut canvas, placeholder);
    assert_eq!(canvas.layer_count(), 3);
    let names: Vec<String> = records(&canvas).into_iter().map(|r| r.name).collect();
    assert_eq!(names, vec!["three", "two", "one"]);
}

#[test]
fn empty_input_is_no_valid_images() {
    let err = pack_images(Vec::new(), LayoutConfig::default()).unwrap_err();
    assert!(matches!(err, SpriteError::NoValidImages { .. }));
}

#[test]
fn transparent_image_reports_its_anchor() {
    let out = pack_images(
        vec![
            input("solid", solid(6, 6, [1, 1, 1, 255])),
            input("ghost", DynamicImage::ImageRgba8(RgbaImage::new(6, 6))),
        ],
        LayoutConfig::default(),
    )
    .expect("pack");
    assert_eq!(out.records[0].name, "ghost");
    assert_eq!((out.records[0].x, out.records[0].y), (0, 50));
    assert_eq!(out.image.dimensions(), (6, 6));
}

#[test]
fn transparent_anchor_above_the_sheet_clamps_to_its_edge() {
    // The ghost anchors at (0, 0); trimming to the solid at (0, 50) moves it to y = -50.
    let out = pack_images(
        vec![
            input("ghost", DynamicImage::ImageRgba8(RgbaImage::new(6, 6))),
            input("solid", solid(6, 6, [1, 1, 1, 255])),
        ],
        LayoutConfig::default(),
    )
    .expect("pack");
    assert_eq!(out.image.dimensions(), (6, 6));
    assert_eq!(out.records[0].name, "solid");
    assert_eq!((out.records[0].x, out.records[0].y), (0, 0));
    assert_eq!(out.records[1].name, "ghost");
    assert_eq!((out.records[1].x, out.records[1].y), (0, 0));
}

#[test]
fn non_rgba_sources_are_normalized() {
    let gray = DynamicImage::ImageLuma8(image::GrayImage::from_pixel(3, 3, image::Luma([200])));
    let out = pack_images(vec![input("gray", gray)], LayoutConfig::default()).expect("pack");
    assert_eq!(*out.image.get_pixel(1, 1), Rgba([200, 200, 200, 255]));
}

#[test]
fn stats_report_sheet_and_content_area() {
    let out = pack_images(
        vec![
            input("a", solid(10, 10, [1, 1, 1, 255])),
            input("b", solid(10, 10, [1, 1, 1, 255])),
        ],
        LayoutConfig::default(),
    )
    .expect("pack");
    let stats = out.stats();
    assert_eq!(stats.num_layers, 2);
    assert_eq!((stats.width, stats.height), (10, 60));
    assert_eq!(stats.total_area, 600);
    assert_eq!(stats.used_area, 200);
    assert_eq!(stats.wasted_area(), 400);
    assert!(stats.summary().contains("Layers: 2"));
}

#[test]
fn encoders_escape_and_handle_empty() {
    let recs = vec![ExportRecord {
        name: "say \"hi\"".into(),
        x: 3,
        y: 4,
    }];
    assert_eq!(
        to_json_lines(&recs)[1],
        r#"{"layer": "say \"hi\"", "x": "3", "y": "-4"}"#
    );
    assert_eq!(to_json_lines(&[]), vec!["[", "]"]);
    assert!(to_css_lines(&[]).is_empty());
}
