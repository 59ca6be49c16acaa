use std::fs;

use super::*;

fn touch(root: &Path, rel: &str) {
    let p = root.join(rel);
    fs::create_dir_all(p.parent().unwrap()).unwrap();
    fs::write(p, b"not really a png").unwrap();
}

fn fixture() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    for rel in [
        "face/Yummy.png",
        "face/Angry.png",
        "top/Red.png",
        "top/readme.txt",
        "top/Shout.PNG",
        "bottom/Blue.png",
        "bottom/Green.png",
        "bottom/Tan.png",
        "extra/Ignored.png",
    ] {
        touch(dir.path(), rel);
    }
    fs::create_dir_all(dir.path().join("bottom/nested.png")).unwrap();
    dir
}

#[test]
fn scan_collects_png_files_per_category() {
    let dir = fixture();
    let catalog = TraitCatalog::scan(dir.path(), CatalogOrder::Sorted).unwrap();

    assert_eq!(
        catalog.face,
        vec![
            TraitVariant::from("face/Angry.png"),
            TraitVariant::from("face/Yummy.png")
        ]
    );
    assert_eq!(catalog.top, vec![TraitVariant::from("top/Red.png")]);
    assert_eq!(
        catalog.bottom,
        vec![
            TraitVariant::from("bottom/Blue.png"),
            TraitVariant::from("bottom/Green.png"),
            TraitVariant::from("bottom/Tan.png"),
        ]
    );
    assert_eq!(catalog.combination_count(), 6);
    assert_eq!(catalog.variants(TraitCategory::Top), catalog.top.as_slice());
}

#[test]
fn filesystem_order_holds_the_same_variants() {
    let dir = fixture();
    let sorted = TraitCatalog::scan(dir.path(), CatalogOrder::Sorted).unwrap();
    let mut raw = TraitCatalog::scan(dir.path(), CatalogOrder::FileSystem).unwrap();
    raw.face.sort();
    raw.top.sort();
    raw.bottom.sort();
    assert_eq!(raw, sorted);
}

#[test]
fn missing_root_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let err = TraitCatalog::scan(dir.path().join("nope"), CatalogOrder::Sorted).unwrap_err();
    assert!(matches!(err, MintError::NotFound(_)), "{err}");
}

#[test]
fn missing_category_dir_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    touch(dir.path(), "face/A.png");
    touch(dir.path(), "top/B.png");
    let err = TraitCatalog::scan(dir.path(), CatalogOrder::Sorted).unwrap_err();
    assert!(matches!(err, MintError::NotFound(_)));
    assert!(err.to_string().contains("bottom"));
}

#[test]
fn empty_category_collapses_product() {
    let dir = tempfile::tempdir().unwrap();
    touch(dir.path(), "face/A.png");
    touch(dir.path(), "bottom/D.png");
    fs::create_dir_all(dir.path().join("top")).unwrap();

    let catalog = TraitCatalog::scan(dir.path(), CatalogOrder::Sorted).unwrap();
    assert!(catalog.top.is_empty());
    assert_eq!(catalog.combination_count(), 0);
}

#[test]
fn trait_value_strips_directory_and_extension() {
    assert_eq!(TraitVariant::from("face/Yummy.png").trait_value(), "Yummy");
    assert_eq!(TraitVariant::from("top/Red Hat.png").trait_value(), "Red Hat");
    assert_eq!(TraitVariant::from("top/v1.2.png").trait_value(), "v1");
    assert_eq!(TraitVariant::from("face/.x.png").trait_value(), "");
    assert_eq!(TraitVariant::from("bottom/NoExt").trait_value(), "NoExt");
    assert_eq!(
        TraitVariant::new(TraitCategory::Bottom, "Blue.png").as_str(),
        "bottom/Blue.png"
    );
}

#[test]
fn resolve_joins_each_segment() {
    let root = Path::new("images");
    assert_eq!(
        TraitVariant::from("face/Yummy.png").resolve(root),
        root.join("face").join("Yummy.png")
    );
}

#[test]
fn stack_order_and_labels() {
    let labels: Vec<_> = TraitCategory::STACK.iter().map(|c| c.label()).collect();
    assert_eq!(labels, ["Face", "Top", "Bottom"]);
    assert_eq!(TraitCategory::Top.to_string(), "top");
}
