//! Test helpers for building image libraries and scripted terminals.

use super::*;
use std::fs;
use std::io::Cursor;
use tempfile::TempDir;

use crate::rank::{RankArgs, RankConfig, RankOutcome, run_rank_with};

/// A temporary image directory plus score file location.
#[derive(Debug)]
pub(super) struct Workspace {
    _dir: TempDir,
    root: Utf8PathBuf,
}

impl Workspace {
    pub(super) fn with_images(names: &[&str]) -> Self {
        let dir = TempDir::new().expect("tempdir");
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf-8 workspace");
        fs::create_dir(root.join("images")).expect("create image directory");
        for name in names {
            write_utf8(&root.join("images").join(name), b"image bytes");
        }
        Self { _dir: dir, root }
    }

    pub(super) fn library(&self) -> Library {
        Library::resolve(
            Some(self.root.join("images")),
            Some(self.root.join("rankings.txt")),
            None,
        )
    }

    pub(super) fn scores_path(&self) -> Utf8PathBuf {
        self.root.join("rankings.txt")
    }

    pub(super) fn saved_scores(&self) -> String {
        fs::read_to_string(self.scores_path()).expect("read score file")
    }

    pub(super) fn rank_config(&self) -> RankConfig {
        let mut config = RankConfig::try_from(RankArgs::default()).expect("default config");
        config.library = self.library();
        config.seed = Some(17);
        config
    }
}

pub(super) fn write_utf8(path: &Utf8Path, contents: &[u8]) {
    fs::write(path, contents).expect("write file");
}

/// Run a rank session fed with `script`, returning the outcome and the output.
pub(super) fn rank_scripted(
    config: &RankConfig,
    script: &str,
) -> (Result<RankOutcome, CliError>, String) {
    let mut input = Cursor::new(script.as_bytes().to_vec());
    let mut output = Vec::new();
    let outcome = run_rank_with(config, &mut input, &mut output);
    (
        outcome,
        String::from_utf8(output).expect("utf-8 terminal output"),
    )
}

/// Parse the `name: score` lines printed at the end of a session.
pub(super) fn printed_ranking(output: &str) -> Vec<(String, f64)> {
    output
        .lines()
        .filter_map(|line| {
            let (name, score) = line.rsplit_once(": ")?;
            Some((name.to_owned(), score.parse().ok()?))
        })
        .collect()
}
