//! Unit coverage for the directory catalog and score file.
#![forbid(unsafe_code)]

use camino::{Utf8Path, Utf8PathBuf};
use pairwise_core::{Catalog, DEFAULT_SCORE, Item, ItemCatalog, RatingTable};
use rstest::{fixture, rstest};
use tempfile::TempDir;

use crate::{
    CatalogError, DirectoryCatalog, LineError, ParseMode, ScoreFile, StoreError, check_key,
    parse_scores, render_scores,
};

#[fixture]
fn temp_dir() -> TempDir {
    match TempDir::new() {
        Ok(dir) => dir,
        Err(err) => panic!("create temporary directory: {err}"),
    }
}

#[expect(clippy::expect_used, reason = "tests fail fast on non-UTF-8 temp paths")]
fn utf8_root(dir: &TempDir) -> Utf8PathBuf {
    Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf8 temp path")
}

#[expect(clippy::expect_used, reason = "test setup should fail fast")]
fn touch(root: &Utf8Path, name: &str) {
    std::fs::write(root.join(name), b"").expect("create file");
}

#[expect(clippy::expect_used, reason = "test setup should fail fast")]
fn dir_listing(root: &Utf8Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(root)
        .expect("list directory")
        .map(|entry| {
            entry
                .expect("directory entry")
                .file_name()
                .to_string_lossy()
                .into_owned()
        })
        .collect();
    names.sort();
    names
}

fn table(entries: &[(&str, f64)]) -> RatingTable {
    entries
        .iter()
        .map(|(key, score)| (Item::new(*key), *score))
        .collect()
}

#[rstest]
#[expect(clippy::expect_used, reason = "test asserts on successful scans")]
fn catalog_lists_images_sorted(temp_dir: TempDir) {
    let root = utf8_root(&temp_dir);
    for name in ["b.JPG", "a.png", "c.jpeg", "notes.txt", "d.gif", ".hidden.png"] {
        touch(&root, name);
    }
    std::fs::create_dir(root.join("folder.png")).expect("create sub-directory");

    let catalog = DirectoryCatalog::new(root).list_items().expect("scan");
    let names: Vec<&str> = catalog.iter().map(Item::as_str).collect();
    assert_eq!(names, [".hidden.png", "a.png", "b.JPG", "c.jpeg"]);
}

#[rstest]
#[expect(clippy::expect_used, reason = "test asserts on successful scans")]
fn catalog_scans_are_stable(temp_dir: TempDir) {
    let root = utf8_root(&temp_dir);
    for name in ["z.png", "m.jpg", "a.jpeg"] {
        touch(&root, name);
    }
    let catalog = DirectoryCatalog::new(root);
    assert_eq!(catalog.list_items().expect("scan"), catalog.list_items().expect("rescan"));
}

#[rstest]
#[expect(clippy::expect_used, reason = "test asserts on successful scans")]
fn empty_directory_yields_empty_catalog(temp_dir: TempDir) {
    let catalog = DirectoryCatalog::new(utf8_root(&temp_dir))
        .list_items()
        .expect("scan");
    assert!(catalog.is_empty());
}

#[rstest]
fn missing_directory_is_an_error(temp_dir: TempDir) {
    let missing = utf8_root(&temp_dir).join("nope");
    match DirectoryCatalog::new(missing.clone()).list_items() {
        Err(CatalogError::OpenDirectory { path, .. }) => assert_eq!(path, missing),
        other => panic!("expected OpenDirectory error, got {other:?}"),
    }
}

#[rstest]
#[expect(clippy::expect_used, reason = "test asserts on successful scans")]
fn custom_extensions_replace_defaults(temp_dir: TempDir) {
    let root = utf8_root(&temp_dir);
    for name in ["a.png", "b.WEBP", "c.gif"] {
        touch(&root, name);
    }
    let catalog = DirectoryCatalog::new(root)
        .with_extensions([".webp", "GIF"])
        .list_items()
        .expect("scan");
    assert_eq!(catalog, Catalog::from_items(["b.WEBP", "c.gif"]));
}

#[rstest]
#[case("a.png:1016", "a.png", 1016.0)]
#[case("a.png: 984.5 \r", "a.png", 984.5)]
#[case(" lead.png :7", " lead.png ", 7.0)]
#[case("weird:name.png:1.5e3", "weird:name.png", 1500.0)]
#[case("neg.jpg:-12", "neg.jpg", -12.0)]
fn parses_valid_lines(#[case] line: &str, #[case] key: &str, #[case] score: f64) {
    let parsed = match parse_scores(line, ParseMode::Strict) {
        Ok(parsed) => parsed,
        Err(err) => panic!("line should parse: {err:?}"),
    };
    assert_eq!(parsed.entries, vec![(Item::new(key), score)]);
}

#[rstest]
#[case("no separator", LineError::MissingSeparator)]
#[case(":1000", LineError::EmptyKey)]
#[case("a.png:inf", LineError::NonFiniteScore { raw: "inf".to_owned() })]
#[case("a.png:NaN", LineError::NonFiniteScore { raw: "NaN".to_owned() })]
fn rejects_malformed_lines(#[case] line: &str, #[case] expected: LineError) {
    match parse_scores(line, ParseMode::Strict) {
        Err(malformed) => {
            assert_eq!(malformed.line, 1);
            assert_eq!(malformed.reason, expected);
        }
        Ok(parsed) => panic!("line should be rejected, got {parsed:?}"),
    }
}

#[rstest]
fn rejects_non_numeric_scores() {
    match parse_scores("a.png:lots", ParseMode::Strict) {
        Err(malformed) => assert!(matches!(
            malformed.reason,
            LineError::InvalidScore { ref raw, .. } if raw == "lots"
        )),
        Ok(parsed) => panic!("line should be rejected, got {parsed:?}"),
    }
}

#[rstest]
fn lenient_parsing_collects_skipped_lines() {
    let contents = "a.png:1016\n\nbroken\nb.png:nope\nc.png:984\n";
    let parsed = match parse_scores(contents, ParseMode::Lenient) {
        Ok(parsed) => parsed,
        Err(err) => panic!("lenient parsing should not fail: {err:?}"),
    };
    assert_eq!(
        parsed.entries,
        vec![(Item::new("a.png"), 1016.0), (Item::new("c.png"), 984.0)]
    );
    let lines: Vec<usize> = parsed.skipped.iter().map(|skipped| skipped.line).collect();
    assert_eq!(lines, [3, 4]);
}

#[rstest]
fn lenient_parsing_skips_invalid_utf8_lines() {
    let contents = b"a.png:1100\n\xff\xfe.png:900\nb.png:950\n";
    let parsed = match parse_scores(contents, ParseMode::Lenient) {
        Ok(parsed) => parsed,
        Err(err) => panic!("lenient parsing should not fail: {err:?}"),
    };
    assert_eq!(
        parsed.entries,
        vec![(Item::new("a.png"), 1100.0), (Item::new("b.png"), 950.0)]
    );
    let [skipped] = parsed.skipped.as_slice() else {
        panic!("expected one skipped line, got {:?}", parsed.skipped);
    };
    assert_eq!(skipped.line, 2);
    assert!(matches!(skipped.reason, LineError::InvalidUtf8 { .. }));
    assert_eq!(skipped.text, "\u{fffd}\u{fffd}.png:900");
}

#[rstest]
fn strict_parsing_rejects_invalid_utf8_lines() {
    match parse_scores(b"a.png:1100\n\xff.png:900\n", ParseMode::Strict) {
        Err(malformed) => {
            assert_eq!(malformed.line, 2);
            assert!(matches!(malformed.reason, LineError::InvalidUtf8 { .. }));
        }
        Ok(parsed) => panic!("line should be rejected, got {parsed:?}"),
    }
}

#[rstest]
#[case("", LineError::EmptyKey)]
#[case("two\nlines.png", LineError::LineBreakInKey)]
#[case("carriage\r.png", LineError::LineBreakInKey)]
fn unstorable_keys_are_rejected(#[case] key: &str, #[case] expected: LineError) {
    assert_eq!(check_key(key), Err(expected));
}

#[rstest]
#[case(" lead.png")]
#[case("trail.png ")]
#[case("a:b.png")]
fn unusual_keys_are_storable(#[case] key: &str) {
    assert_eq!(check_key(key), Ok(()));
}

#[rstest]
#[case("lenient", ParseMode::Lenient)]
#[case("STRICT", ParseMode::Strict)]
#[case(" strict ", ParseMode::Strict)]
fn parse_mode_from_str(#[case] raw: &str, #[case] expected: ParseMode) {
    assert_eq!(raw.parse::<ParseMode>(), Ok(expected));
}

#[rstest]
fn unknown_parse_mode_is_rejected() {
    assert!("sloppy".parse::<ParseMode>().is_err());
}

#[rstest]
fn render_orders_by_score_then_key() {
    let rendered = render_scores(&table(&[
        ("c.png", 983.5),
        ("b.png", 1000.0),
        ("a.png", 1000.0),
        ("d.png", 1031.25),
    ]));
    assert_eq!(
        rendered.as_deref(),
        Ok("d.png:1031.25\na.png:1000\nb.png:1000\nc.png:983.5\n")
    );
}

#[rstest]
#[expect(clippy::expect_used, reason = "test asserts on successful loads")]
fn missing_file_is_a_first_run(temp_dir: TempDir) {
    let store = ScoreFile::new(utf8_root(&temp_dir).join("rankings.txt"));
    let catalog = Catalog::from_items(["a.png", "b.png"]);

    let loaded = store.load(&catalog, DEFAULT_SCORE).expect("load");

    assert!(!loaded.report.file_found);
    assert_eq!(loaded.report.reconcile.created, 2);
    assert_eq!(loaded.table, RatingTable::with_defaults(&catalog, DEFAULT_SCORE));
}

#[rstest]
#[expect(clippy::expect_used, reason = "test asserts on successful loads")]
fn load_reconciles_against_catalog(temp_dir: TempDir) {
    let path = utf8_root(&temp_dir).join("rankings.txt");
    std::fs::write(&path, "a.png:1100\ngone.png:900\na.png:1200\n").expect("seed scores");
    let catalog = Catalog::from_items(["a.png", "new.png"]);

    let loaded = ScoreFile::new(path).load(&catalog, DEFAULT_SCORE).expect("load");

    assert!(loaded.report.file_found);
    assert_eq!(loaded.table.get("a.png"), Some(1200.0));
    assert_eq!(loaded.table.get("new.png"), Some(DEFAULT_SCORE));
    assert_eq!(loaded.table.get("gone.png"), None);
    assert_eq!(loaded.report.reconcile.restored, 1);
    assert_eq!(loaded.report.reconcile.created, 1);
    assert_eq!(loaded.report.reconcile.pruned, 1);
}

#[rstest]
#[expect(clippy::expect_used, reason = "test setup should fail fast")]
fn strict_load_reports_line(temp_dir: TempDir) {
    let path = utf8_root(&temp_dir).join("rankings.txt");
    std::fs::write(&path, "a.png:1100\n\nb.png\n").expect("seed scores");
    let store = ScoreFile::new(path.clone()).with_mode(ParseMode::Strict);

    match store.load(&Catalog::from_items(["a.png", "b.png"]), DEFAULT_SCORE) {
        Err(StoreError::Parse {
            path: reported,
            line,
            source,
        }) => {
            assert_eq!(reported, path);
            assert_eq!(line, 3);
            assert_eq!(source, LineError::MissingSeparator);
        }
        other => panic!("expected a parse error, got {other:?}"),
    }
}

#[rstest]
#[expect(clippy::expect_used, reason = "test asserts on successful saves")]
fn save_round_trips_exactly(temp_dir: TempDir) {
    let store = ScoreFile::new(utf8_root(&temp_dir).join("nested/dir/rankings.txt"));
    let original = table(&[
        ("a.png", 1031.263_693_206_478),
        ("b.png", 0.1 + 0.2),
        ("c.png", 1e-7),
        ("d.png", 123_456_789.123_456_78),
    ]);
    let catalog: Catalog = original.items().cloned().collect();

    store.save(&original).expect("save");
    let loaded = store.load(&catalog, DEFAULT_SCORE).expect("load");

    assert_eq!(loaded.table, original);
    assert!(loaded.report.skipped.is_empty());
}

#[rstest]
#[expect(clippy::expect_used, reason = "test setup should fail fast")]
fn failed_save_leaves_no_temp_file(temp_dir: TempDir) {
    let root = utf8_root(&temp_dir);
    let blocked = root.join("rankings.txt");
    std::fs::create_dir(&blocked).expect("directory in the way");
    std::fs::write(blocked.join("keep"), b"x").expect("populate directory");

    match ScoreFile::new(blocked.clone()).save(&table(&[("a.png", 1000.0)])) {
        Err(StoreError::Persist { path, .. }) => assert_eq!(path, blocked),
        other => panic!("expected a persist error, got {other:?}"),
    }
    assert_eq!(dir_listing(&root), ["rankings.txt"]);
    assert!(blocked.is_dir());
}

#[rstest]
#[expect(clippy::expect_used, reason = "test asserts on successful saves")]
fn keys_with_surrounding_spaces_survive_a_save(temp_dir: TempDir) {
    let store = ScoreFile::new(utf8_root(&temp_dir).join("rankings.txt"));
    let original = table(&[(" lead.png", 1016.0), ("b.png", 984.0), ("tail.png ", 1000.0)]);
    let catalog: Catalog = original.items().cloned().collect();

    store.save(&original).expect("save");
    let loaded = store.load(&catalog, DEFAULT_SCORE).expect("load");

    assert_eq!(loaded.table, original);
    assert_eq!(loaded.report.reconcile.restored, 3);
    assert_eq!(loaded.report.reconcile.pruned, 0);
}

#[rstest]
#[expect(clippy::expect_used, reason = "test setup should fail fast")]
fn lenient_load_keeps_lines_around_invalid_utf8(temp_dir: TempDir) {
    let path = utf8_root(&temp_dir).join("rankings.txt");
    std::fs::write(&path, b"a.png:1100\n\xff\xfe.png:900\nb.png:950\n").expect("seed scores");

    let loaded = ScoreFile::new(path)
        .load(&Catalog::from_items(["a.png", "b.png"]), DEFAULT_SCORE)
        .expect("lenient load");

    assert_eq!(loaded.table.get("a.png"), Some(1100.0));
    assert_eq!(loaded.table.get("b.png"), Some(950.0));
    assert_eq!(loaded.report.skipped.len(), 1);
}

#[rstest]
#[expect(clippy::expect_used, reason = "test setup should fail fast")]
fn unstorable_keys_leave_the_previous_file(temp_dir: TempDir) {
    let path = utf8_root(&temp_dir).join("rankings.txt");
    std::fs::write(&path, "a.png:1100\n").expect("seed scores");

    let scores = table(&[("a.png", 1000.0), ("two\nlines.png", 990.0)]);

    match ScoreFile::new(path.clone()).save(&scores) {
        Err(StoreError::Unstorable { source, .. }) => {
            assert_eq!(source.item, Item::new("two\nlines.png"));
            assert_eq!(source.reason, LineError::LineBreakInKey);
        }
        other => panic!("expected an unstorable key error, got {other:?}"),
    }
    assert_eq!(std::fs::read_to_string(&path).expect("read scores"), "a.png:1100\n");
}

#[rstest]
#[expect(clippy::expect_used, reason = "test asserts on successful scans")]
fn catalog_skips_names_with_line_breaks(temp_dir: TempDir) {
    let root = utf8_root(&temp_dir);
    for name in ["a.png", "two\nlines.png", " lead.png"] {
        touch(&root, name);
    }

    let catalog = DirectoryCatalog::new(root).list_items().expect("scan");

    assert_eq!(catalog, Catalog::from_items([" lead.png", "a.png"]));
}
