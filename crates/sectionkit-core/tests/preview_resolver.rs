mod support;

use std::fs;

use sectionkit_core::error::SectionError;
use sectionkit_core::library::preview::placeholder_svg;
use sectionkit_core::library::{PreviewRef, PreviewUpload};

use support::LibraryFixture;

#[test]
fn section_preview_beats_cache() {
    let library = LibraryFixture::new(1);
    let dir = library.write_section(0, "hero", &[("section.liquid", "x"), ("preview.gif", "gif")]);
    let cache = library.cache_dir().join("hero");
    fs::create_dir_all(&cache).unwrap();
    fs::write(cache.join("preview.png"), "png").unwrap();

    let resolved = library.previews().resolve("hero").unwrap();
    assert_eq!(
        resolved,
        PreviewRef::File {
            path: dir.join("preview.gif")
        }
    );
}

#[test]
fn extension_priority_within_a_directory() {
    let library = LibraryFixture::new(1);
    let dir = library.write_section(
        0,
        "hero",
        &[
            ("section.liquid", "x"),
            ("preview.svg", "<svg/>"),
            ("preview.jpeg", "jpeg"),
        ],
    );

    let image = library.previews().load("hero").unwrap();
    assert_eq!(image.content_type, "image/jpeg");
    assert_eq!(image.bytes, b"jpeg");
    assert!(dir.join("preview.svg").is_file());
}

#[test]
fn cache_is_used_when_section_has_none() {
    let library = LibraryFixture::new(1);
    library.write_section(0, "hero", &[("section.liquid", "x")]);
    let cache = library.cache_dir().join("hero");
    fs::create_dir_all(&cache).unwrap();
    fs::write(cache.join("preview.png"), [7, 7]).unwrap();

    let previews = library.previews();
    assert_eq!(
        previews.resolve("hero").unwrap(),
        PreviewRef::Cached {
            path: cache.join("preview.png")
        }
    );
    let image = previews.load("hero").unwrap();
    assert_eq!(image.content_type, "image/png");
    assert_eq!(image.bytes, vec![7, 7]);
}

#[test]
fn placeholder_is_deterministic() {
    let library = LibraryFixture::new(1);
    let previews = library.previews();

    let first = previews.load("hero-banner").unwrap();
    let second = previews.load("hero-banner").unwrap();

    assert_eq!(first.content_type, "image/svg+xml");
    assert_eq!(first.bytes, second.bytes);
    assert_eq!(first.bytes, placeholder_svg("hero-banner").into_bytes());

    let svg = String::from_utf8(first.bytes).unwrap();
    assert!(svg.contains("width=\"800\""));
    assert!(svg.contains("height=\"600\""));
    assert!(svg.contains(">Hero Banner<"));
    assert!(svg.contains("Preview coming soon"));
}

#[test]
fn placeholder_escapes_markup() {
    let svg = placeholder_svg("a<b&c");
    assert!(svg.contains("A&lt;b&amp;c"));
    assert!(!svg.contains("a<b"));
}

#[test]
fn save_replaces_previous_preview() {
    let library = LibraryFixture::new(1);
    let dir = library.write_section(0, "hero", &[("section.liquid", "x"), ("preview.png", "old")]);
    let previews = library.previews();

    let path = previews
        .save("hero", &PreviewUpload::new("jpg", b"new".to_vec()))
        .unwrap();

    assert_eq!(path, dir.join("preview.jpg"));
    assert!(!dir.join("preview.png").exists());
    assert_eq!(previews.load("hero").unwrap().bytes, b"new");
}

#[test]
fn save_accepts_data_urls() {
    let library = LibraryFixture::new(1);
    let dir = library.write_section(0, "hero", &[("section.liquid", "x")]);

    // "<svg/>" in base64
    let path = library
        .previews()
        .save_data_url("hero", "data:image/svg+xml;base64,PHN2Zy8+")
        .unwrap();

    assert_eq!(path, dir.join("preview.svg"));
    assert_eq!(fs::read(&path).unwrap(), b"<svg/>");
}

#[test]
fn save_rejects_unknown_types_and_missing_sections() {
    let library = LibraryFixture::new(1);
    library.write_section(0, "hero", &[("section.liquid", "x")]);
    let previews = library.previews();

    assert!(matches!(
        previews.save("hero", &PreviewUpload::new("bmp", vec![1])),
        Err(SectionError::InvalidRequest(_))
    ));
    assert!(matches!(
        previews.save_data_url("hero", "data:text/plain;base64,aGk="),
        Err(SectionError::InvalidRequest(_))
    ));
    assert!(matches!(
        previews.save("ghost", &PreviewUpload::new("png", vec![1])),
        Err(SectionError::SectionNotFound { .. })
    ));
}

#[test]
fn generate_placeholder_only_when_missing() {
    let library = LibraryFixture::new(1);
    let dir = library.write_section(0, "hero", &[("section.liquid", "x")]);
    let previews = library.previews();

    assert!(previews.generate_placeholder("hero").unwrap());
    assert_eq!(
        fs::read_to_string(dir.join("preview.svg")).unwrap(),
        placeholder_svg("hero")
    );
    assert!(!previews.generate_placeholder("hero").unwrap());
}
