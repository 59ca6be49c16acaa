use std::path::Path;

use image::{Rgba, RgbaImage};

use super::*;
use crate::config::Layout;

fn png(root: &Path, rel: &str, px: Rgba<u8>) {
    let path = root.join(rel);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    RgbaImage::from_pixel(2, 2, px).save(path).unwrap();
}

fn config(dir: &Path) -> MintConfig {
    let images = dir.join("images");
    png(&images, "face/Yummy.png", Rgba([255, 0, 0, 255]));
    png(&images, "face/Sleepy.png", Rgba([255, 255, 0, 255]));
    png(&images, "top/Red.png", Rgba([0, 0, 0, 0]));
    png(&images, "bottom/Blue.png", Rgba([0, 0, 0, 0]));
    png(&images, "bottom/Jeans.png", Rgba([0, 0, 0, 0]));
    MintConfig {
        layout: Layout {
            images_root: images,
            output_root: dir.join("output"),
        },
        pacing: crate::config::PacingConfig {
            image_delay_ms: 0,
            metadata_delay_ms: 0,
        },
        ..MintConfig::default()
    }
}

fn seeded(seed: u64) -> GenerateOpts {
    GenerateOpts {
        force: false,
        seed: Some(seed),
    }
}

#[test]
fn generate_writes_a_full_shuffled_manifest() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = config(dir.path());

    let summary = generate(&cfg, &GenerateOpts::default()).unwrap();
    assert_eq!(summary.category_sizes, (2, 1, 2));
    assert_eq!(summary.records, 4);
    assert_eq!(summary.manifest_path, cfg.layout.manifest_path());

    let manifest = Manifest::read(&summary.manifest_path).unwrap();
    assert_eq!(manifest.fingerprint().unwrap(), summary.fingerprint);
    assert_eq!(manifest_fingerprint(&cfg).unwrap(), summary.fingerprint);

    let catalog = TraitCatalog::scan(&cfg.layout.images_root, cfg.catalog_order).unwrap();
    let mut expected = combinations(&catalog);
    let mut got = manifest.records.clone();
    expected.sort_by(|a, b| a.face.cmp(&b.face).then(a.bottom.cmp(&b.bottom)));
    got.sort_by(|a, b| a.face.cmp(&b.face).then(a.bottom.cmp(&b.bottom)));
    assert_eq!(got, expected);
}

#[test]
fn seeded_generation_is_reproducible() {
    let a = tempfile::tempdir().unwrap();
    let b = tempfile::tempdir().unwrap();
    let fa = generate(&config(a.path()), &seeded(11)).unwrap().fingerprint;
    let fb = generate(&config(b.path()), &seeded(11)).unwrap().fingerprint;
    assert_eq!(fa, fb);
}

#[test]
fn existing_manifest_is_not_reshuffled_without_force() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = config(dir.path());
    let first = generate(&cfg, &seeded(1)).unwrap();

    let err = generate(&cfg, &seeded(2)).unwrap_err();
    assert!(matches!(err, MintError::Validation(_)));
    assert_eq!(manifest_fingerprint(&cfg).unwrap(), first.fingerprint);

    let opts = GenerateOpts {
        force: true,
        seed: Some(2),
    };
    generate(&cfg, &opts).unwrap();
}

#[test]
fn consumers_run_against_the_frozen_order() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = config(dir.path());
    let summary = generate(&cfg, &seeded(3)).unwrap();

    let images = render_images(&cfg, &ConsumeOpts::default()).unwrap();
    assert!(images.is_clean());
    assert_eq!(images.len(), 4);
    assert!(cfg.layout.images_out_dir().join("4.png").is_file());

    let meta = emit_metadata(&cfg, &ConsumeOpts::default()).unwrap();
    assert!(meta.is_clean());

    let manifest = Manifest::read(&summary.manifest_path).unwrap();
    let doc: crate::metadata::MetadataDocument = serde_json::from_slice(
        &std::fs::read(cfg.layout.metadata_out_dir().join("1")).unwrap(),
    )
    .unwrap();
    assert_eq!(doc.attributes[0].value, manifest.records[0].face.trait_value());

    // Re-running against the same manifest is allowed.
    emit_metadata(&cfg, &ConsumeOpts::default()).unwrap();
}

#[test]
fn regenerated_manifest_is_refused_by_stamped_outputs() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = config(dir.path());
    generate(&cfg, &seeded(4)).unwrap();
    emit_metadata(&cfg, &ConsumeOpts::default()).unwrap();

    let forced = GenerateOpts {
        force: true,
        seed: Some(5),
    };
    let regenerated = generate(&cfg, &forced).unwrap();

    let err = emit_metadata(&cfg, &ConsumeOpts::default()).unwrap_err();
    assert!(matches!(err, MintError::Stale(_)), "{err}");

    let opts = ConsumeOpts {
        expect_fingerprint: Some(regenerated.fingerprint),
        force: true,
        pacing: Some(Pacing::NONE),
    };
    assert!(emit_metadata(&cfg, &opts).unwrap().is_clean());
}

#[test]
fn stamps_stay_out_of_published_directories() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = config(dir.path());
    generate(&cfg, &seeded(7)).unwrap();
    render_images(&cfg, &ConsumeOpts::default()).unwrap();
    emit_metadata(&cfg, &ConsumeOpts::default()).unwrap();

    assert!(cfg.layout.images_stamp_path().is_file());
    assert!(cfg.layout.metadata_stamp_path().is_file());
    for out_dir in [cfg.layout.images_out_dir(), cfg.layout.metadata_out_dir()] {
        let mut names: Vec<String> = std::fs::read_dir(&out_dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        names.sort();
        assert_eq!(names.len(), 4, "{names:?}");
        assert!(names.iter().all(|n| !n.starts_with('.')), "{names:?}");
    }
}

#[test]
fn forced_consume_after_shrinking_removes_items_past_the_end() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = config(dir.path());
    generate(&cfg, &seeded(8)).unwrap();
    render_images(&cfg, &ConsumeOpts::default()).unwrap();
    emit_metadata(&cfg, &ConsumeOpts::default()).unwrap();
    let unrelated = cfg.layout.images_out_dir().join("notes.txt");
    std::fs::write(&unrelated, "keep").unwrap();

    std::fs::remove_file(cfg.layout.images_root.join("face/Sleepy.png")).unwrap();
    let forced = GenerateOpts {
        force: true,
        seed: Some(9),
    };
    assert_eq!(generate(&cfg, &forced).unwrap().records, 2);

    let opts = ConsumeOpts {
        force: true,
        ..ConsumeOpts::default()
    };
    assert_eq!(render_images(&cfg, &opts).unwrap().len(), 2);
    assert_eq!(emit_metadata(&cfg, &opts).unwrap().len(), 2);

    let images = cfg.layout.images_out_dir();
    let metadata = cfg.layout.metadata_out_dir();
    for n in 1..=2 {
        assert!(images.join(format!("{n}.png")).is_file());
        assert!(metadata.join(n.to_string()).is_file());
    }
    for n in 3..=4 {
        assert!(!images.join(format!("{n}.png")).exists());
        assert!(!metadata.join(n.to_string()).exists());
    }
    assert!(unrelated.is_file());
}

#[test]
fn leftovers_are_kept_when_the_stamp_is_not_replaced() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = config(dir.path());
    generate(&cfg, &seeded(10)).unwrap();
    let stray = cfg.layout.metadata_out_dir().join("9");
    std::fs::create_dir_all(cfg.layout.metadata_out_dir()).unwrap();
    std::fs::write(&stray, "{}").unwrap();

    assert!(emit_metadata(&cfg, &ConsumeOpts::default()).unwrap().is_clean());
    assert!(stray.is_file());
}

#[test]
fn expected_fingerprint_mismatch_is_stale() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = config(dir.path());
    generate(&cfg, &seeded(6)).unwrap();

    let opts = ConsumeOpts {
        expect_fingerprint: Some(Fingerprint::of_bytes(b"something else")),
        ..ConsumeOpts::default()
    };
    assert!(matches!(
        render_images(&cfg, &opts),
        Err(MintError::Stale(_))
    ));
    assert!(!cfg.layout.images_out_dir().exists());
}

#[test]
fn empty_category_produces_empty_manifest_and_no_work() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = config(dir.path());
    std::fs::remove_file(cfg.layout.images_root.join("top/Red.png")).unwrap();

    let summary = generate(&cfg, &GenerateOpts::default()).unwrap();
    assert_eq!(summary.records, 0);
    assert_eq!(
        std::fs::read_to_string(&summary.manifest_path).unwrap(),
        "[]"
    );

    assert!(render_images(&cfg, &ConsumeOpts::default()).unwrap().is_empty());
    assert!(emit_metadata(&cfg, &ConsumeOpts::default()).unwrap().is_empty());
    assert!(!cfg.layout.images_out_dir().exists());
    assert!(!cfg.layout.metadata_out_dir().exists());
    assert!(cfg.layout.images_stamp_path().is_file());
}

#[test]
fn consumers_need_a_manifest() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = config(dir.path());
    assert!(matches!(
        render_images(&cfg, &ConsumeOpts::default()),
        Err(MintError::NotFound(_))
    ));
    assert!(matches!(
        emit_metadata(&cfg, &ConsumeOpts::default()),
        Err(MintError::NotFound(_))
    ));
}

#[test]
fn missing_catalog_root_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = MintConfig {
        layout: Layout {
            images_root: dir.path().join("nope"),
            output_root: dir.path().join("output"),
        },
        ..MintConfig::default()
    };
    assert!(matches!(
        generate(&cfg, &GenerateOpts::default()),
        Err(MintError::NotFound(_))
    ));
    assert!(!cfg.layout.manifest_path().exists());
}
