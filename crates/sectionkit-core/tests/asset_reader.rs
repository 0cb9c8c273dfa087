mod support;

use sectionkit_core::error::SectionError;
use sectionkit_core::library::OptionalFile;

use support::LibraryFixture;

#[test]
fn section_only_in_second_root_is_found() {
    let library = LibraryFixture::new(3);
    library.write_section(1, "banner", &[("section.liquid", "second"), ("script.js", "go()")]);

    let files = library.reader().read("banner").unwrap();

    assert_eq!(files.template, "second");
    assert_eq!(files.dir, library.root(1).join("banner"));
    assert_eq!(files.script, OptionalFile::Present("go()".to_string()));
    assert_eq!(files.style, OptionalFile::Absent);
    assert_eq!(files.schema, OptionalFile::Absent);
}

#[test]
fn earlier_root_shadows_later_ones() {
    let library = LibraryFixture::new(2);
    library.write_section(0, "banner", &[("section.liquid", "first")]);
    library.write_section(1, "banner", &[("section.liquid", "second")]);

    assert_eq!(library.reader().read("banner").unwrap().template, "first");
}

#[test]
fn directory_without_template_is_skipped() {
    let library = LibraryFixture::new(2);
    library.write_section(0, "banner", &[("style.css", ".orphan{}")]);
    library.write_section(1, "banner", &[("section.liquid", "second")]);

    let files = library.reader().read("banner").unwrap();
    assert_eq!(files.template, "second");
    assert_eq!(files.style, OptionalFile::Absent);
}

#[test]
fn absent_section_lists_attempts_in_order() {
    let library = LibraryFixture::new(3);

    let err = library.reader().read("ghost").unwrap_err();

    let expected: Vec<_> = (0..3)
        .map(|i| library.root(i).join("ghost").join("section.liquid"))
        .collect();
    match &err {
        SectionError::SectionNotFound {
            section_id,
            attempted,
        } => {
            assert_eq!(section_id, "ghost");
            assert_eq!(attempted, &expected);
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(err.status_code(), 404);
}

#[test]
fn preview_is_reported_from_section_dir() {
    let library = LibraryFixture::new(1);
    let dir = library.write_section(0, "hero", &[("section.liquid", "x"), ("preview.jpg", "jpg")]);

    let files = library.reader().read("hero").unwrap();
    assert_eq!(files.preview, Some(dir.join("preview.jpg")));
}
