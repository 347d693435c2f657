// Shared helpers for integration tests

#![allow(dead_code, clippy::unwrap_used, clippy::expect_used)]

use flate2::write::GzEncoder;
use flate2::Compression;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub const TABLE_ROWS: &str = "Q01465\tK03569\nP15639\tK00602\nP15639\tK00604\nP0A6Y8\tK04043\n";

pub fn fixture_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../../tests/fixtures/prokka")
}

/// Temp workspace with `gbk/` (fixtures copied in), `db/idmapping_KO.tab.gz`
/// and an output path `ko/` that does not exist yet
pub struct Workspace {
    pub root: TempDir,
}

impl Workspace {
    pub fn new() -> Self {
        let root = TempDir::new().unwrap();
        std::fs::create_dir(root.path().join("gbk")).unwrap();
        std::fs::create_dir(root.path().join("db")).unwrap();

        for name in ["AMLFNMKI.gbk", "BKPQZ.gbk"] {
            std::fs::copy(fixture_dir().join(name), root.path().join("gbk").join(name)).unwrap();
        }

        let ws = Self { root };
        ws.write_table(TABLE_ROWS);
        ws
    }

    pub fn input_dir(&self) -> PathBuf {
        self.root.path().join("gbk")
    }

    pub fn output_dir(&self) -> PathBuf {
        self.root.path().join("ko")
    }

    pub fn table(&self) -> PathBuf {
        self.root.path().join("db").join("idmapping_KO.tab.gz")
    }

    pub fn snapshot(&self) -> PathBuf {
        self.root.path().join("db").join("idmapping_KO.tab.gz.json")
    }

    pub fn write_table(&self, rows: &str) {
        let file = std::fs::File::create(self.table()).unwrap();
        let mut encoder = GzEncoder::new(file, Compression::default());
        encoder.write_all(rows.as_bytes()).unwrap();
        encoder.finish().unwrap();
    }

    pub fn add_input(&self, name: &str, content: &str) {
        std::fs::write(self.input_dir().join(name), content).unwrap();
    }

    pub fn read_output(&self, input_name: &str) -> String {
        std::fs::read_to_string(self.output_dir().join(format!("{input_name}.ko.out"))).unwrap()
    }
}
