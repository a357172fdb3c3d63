use grid_sprite_core::prelude::*;
use grid_sprite_core::{pack_paths_with_progress, scan_folder, valid_paths};
use image::{Rgba, RgbaImage};
use std::fs;
use std::path::Path;

fn write_icon(dir: &Path, name: &str, size: u32) {
    RgbaImage::from_pixel(size, size, Rgba([10, 20, 30, 255]))
        .save(dir.join(name))
        .expect("write icon");
}

#[test]
fn end_to_end_two_icons_and_a_readme() {
    let dir = tempfile::tempdir().expect("tempdir");
    write_icon(dir.path(), "icon1.png", 16);
    write_icon(dir.path(), "icon2.png", 16);
    fs::write(dir.path().join("readme.txt"), "not an image").expect("write");

    let out = pack_folder(dir.path(), LayoutConfig::default()).expect("pack");
    assert_eq!(out.records.len(), 2);
    assert_eq!(
        out.lines(),
        vec![
            ".icon2 { background-position: -0 -50; }",
            ".icon1 { background-position: -0 -0; }",
        ]
    );
    assert_eq!(out.image.dimensions(), (16, 66));

    let png = dir.path().join("out").join("sprite.png");
    fs::create_dir_all(png.parent().unwrap()).expect("mkdir");
    out.save(&png).expect("save");
    let reread = image::open(&png).expect("reopen").to_rgba8();
    assert_eq!(reread.dimensions(), (16, 66));
}

#[test]
fn sources_are_left_untouched() {
    let dir = tempfile::tempdir().expect("tempdir");
    write_icon(dir.path(), "keep.png", 8);
    let before = fs::read(dir.path().join("keep.png")).expect("read");
    pack_folder(dir.path(), LayoutConfig::default()).expect("pack");
    let after = fs::read(dir.path().join("keep.png")).expect("read");
    assert_eq!(before, after);
}

#[test]
fn folder_without_images_is_no_valid_images() {
    let dir = tempfile::tempdir().expect("tempdir");
    fs::write(dir.path().join("notes.txt"), "nothing").expect("write");
    fs::create_dir(dir.path().join("sub")).expect("mkdir");
    write_icon(&dir.path().join("sub"), "hidden.png", 4);

    match pack_folder(dir.path(), LayoutConfig::default()) {
        Err(SpriteError::NoValidImages { dir: d }) => assert_eq!(d, dir.path()),
        Err(e) => panic!("unexpected error: {e}"),
        Ok(_) => panic!("expected NoValidImages"),
    }
}

#[test]
fn broken_image_aborts_by_default() {
    let dir = tempfile::tempdir().expect("tempdir");
    write_icon(dir.path(), "a.png", 4);
    fs::write(dir.path().join("b.png"), b"definitely not png").expect("write");
    write_icon(dir.path(), "c.png", 4);

    match pack_folder(dir.path(), LayoutConfig::default()) {
        Err(SpriteError::ImageOpen { path, .. }) => {
            assert_eq!(path.file_name().unwrap(), "b.png")
        }
        Err(e) => panic!("unexpected error: {e}"),
        Ok(_) => panic!("expected ImageOpen"),
    }
}

#[test]
fn broken_image_is_skipped_without_leaving_a_gap() {
    let dir = tempfile::tempdir().expect("tempdir");
    write_icon(dir.path(), "a.png", 4);
    fs::write(dir.path().join("b.png"), b"definitely not png").expect("write");
    write_icon(dir.path(), "c.png", 4);

    let cfg = LayoutConfig::builder()
        .on_open_error(OpenErrorPolicy::Skip)
        .build();
    let out = pack_folder(dir.path(), cfg).expect("pack");
    let rec: Vec<(String, u32)> = out.records.iter().map(|r| (r.name.clone(), r.y)).collect();
    assert_eq!(rec, vec![("c".to_string(), 50), ("a".to_string(), 0)]);
}

#[test]
fn only_broken_images_with_skip_is_no_valid_images() {
    let dir = tempfile::tempdir().expect("tempdir");
    fs::write(dir.path().join("x.png"), b"garbage").expect("write");
    let cfg = LayoutConfig::builder()
        .on_open_error(OpenErrorPolicy::Skip)
        .build();
    assert!(matches!(
        pack_folder(dir.path(), cfg),
        Err(SpriteError::NoValidImages { .. })
    ));
}

#[test]
fn progress_sees_every_path_in_order() {
    let dir = tempfile::tempdir().expect("tempdir");
    for name in ["c.png", "a.gif", "b.jpg"] {
        let img = RgbaImage::from_pixel(4, 4, Rgba([1, 2, 3, 255]));
        let path = dir.path().join(name);
        if name.ends_with(".jpg") {
            image::DynamicImage::ImageRgba8(img)
                .to_rgb8()
                .save(&path)
                .expect("write jpg");
        } else {
            img.save(&path).expect("write");
        }
    }
    let paths = valid_paths(&scan_folder(dir.path()).expect("scan"));
    let mut seen = Vec::new();
    let out = pack_paths_with_progress(&paths, LayoutConfig::default(), |p| {
        seen.push(p.file_name().unwrap().to_string_lossy().into_owned())
    })
    .expect("pack");
    assert_eq!(seen, vec!["a.gif", "b.jpg", "c.png"]);
    let names: Vec<&str> = out.records.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["c", "b", "a"]);
}

#[test]
fn zero_limit_fails_before_reading_anything() {
    let cfg = LayoutConfig::builder().limit(0).build();
    let err = pack_paths(&[Path::new("missing.png").to_path_buf()], cfg).unwrap_err();
    assert!(matches!(err, SpriteError::Configuration(_)));
}

#[test]
fn builder_places_from_disk_with_stripped_name() {
    let dir = tempfile::tempdir().expect("tempdir");
    write_icon(dir.path(), "logo.dark.png", 6);
    let mut builder = SpriteBuilder::new(LayoutConfig::default()).expect("builder");
    let placed = builder
        .place_path(&dir.path().join("logo.dark.png"))
        .expect("place");
    assert_eq!(placed.key, "logo.dark");
    assert_eq!(placed.coordinate, PlacementCoordinate::new(0, 0));

    let err = builder
        .place_path(&dir.path().join("missing.png"))
        .unwrap_err();
    assert!(matches!(err, SpriteError::ImageOpen { .. }));
    // A failed open does not consume a grid cell.
    assert_eq!(builder.placements().len(), 1);
}

#[test]
fn all_transparent_folder_keeps_records_but_refuses_to_save() {
    let dir = tempfile::tempdir().expect("tempdir");
    RgbaImage::new(6, 6)
        .save(dir.path().join("ghost.png"))
        .expect("write");

    let out = pack_folder(dir.path(), LayoutConfig::default()).expect("pack");
    assert!(out.is_empty());
    assert_eq!(out.image.dimensions(), (0, 0));
    assert_eq!(out.lines(), vec![".ghost { background-position: -0 -0; }"]);

    let target = dir.path().join("sheet.png");
    let err = out.save(&target).unwrap_err();
    assert!(matches!(err, SpriteError::Encode(_)));
    assert!(!target.exists());
}
