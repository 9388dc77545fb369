use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use tempfile::TempDir;

/// Scratch directory holding a task store at `tasks.csv`.
pub struct TestDir {
    dir: TempDir,
}

impl TestDir {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("failed to create tempdir");
        Self { dir }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn store_path(&self) -> PathBuf {
        self.dir.path().join("tasks.csv")
    }

    pub fn write_store(&self, contents: &str) -> std::io::Result<PathBuf> {
        let path = self.store_path();
        fs::write(&path, contents)?;
        Ok(path)
    }

    pub fn read_store(&self) -> std::io::Result<String> {
        fs::read_to_string(self.store_path())
    }

    pub fn write_file(&self, rel_path: &str, contents: &str) -> std::io::Result<PathBuf> {
        let path = self.dir.path().join(rel_path);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, contents)?;
        Ok(path)
    }
}

#[allow(dead_code)]
pub fn tasksched_cmd() -> Command {
    let mut cmd = Command::cargo_bin("tasksched").expect("binary");
    cmd.env_remove("TASKSCHED_FILE");
    cmd.env_remove("RUST_LOG");
    cmd
}

/// Command running inside `dir` against its `tasks.csv` store.
#[allow(dead_code)]
pub fn cmd_in(dir: &TestDir) -> Command {
    let mut cmd = tasksched_cmd();
    cmd.current_dir(dir.path());
    cmd.args(["--file", "tasks.csv"]);
    cmd
}
