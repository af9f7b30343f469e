#![expect(clippy::expect_used)]

use std::fs;
use std::path::Path;
use std::path::PathBuf;

use anttask_core::AntConfig;
use anttask_core::ToolLocator;
use anttask_core::locator::JAVA_EXECUTABLE;
use anttask_core::locator::LAUNCHER_ARTIFACT;
use tempfile::TempDir;

/// A throwaway `JAVA_HOME` / `ANT_HOME` pair laid out the way the locator
/// expects. The directories are removed when the value is dropped.
pub struct FakeAntInstall {
    _root: TempDir,
    pub java_home: PathBuf,
    pub ant_home: PathBuf,
    pub work_dir: PathBuf,
}

impl FakeAntInstall {
    /// Empty `java` executable and launcher jar.
    pub fn new() -> Self {
        let install = Self::bare();
        write_file(&install.java_path(), "");
        write_file(&install.launcher_path(), "");
        install
    }

    /// `java` present, `ant-launcher.jar` missing.
    pub fn without_launcher() -> Self {
        let install = Self::bare();
        write_file(&install.java_path(), "");
        install
    }

    /// Replaces `java` with an executable shell script running `body`.
    #[cfg(unix)]
    pub fn with_java_script(body: &str) -> Self {
        use std::os::unix::fs::PermissionsExt;

        let install = Self::new();
        let java = install.java_path();
        write_file(&java, &format!("#!/bin/sh\n{body}\n"));
        fs::set_permissions(&java, fs::Permissions::from_mode(0o755))
            .expect("make fake java executable");
        install
    }

    fn bare() -> Self {
        let root = TempDir::new().expect("create temp dir");
        let java_home = root.path().join("jdk");
        let ant_home = root.path().join("ant");
        let work_dir = root.path().join("work");
        fs::create_dir_all(&java_home).expect("create java home");
        fs::create_dir_all(&ant_home).expect("create ant home");
        fs::create_dir_all(&work_dir).expect("create work dir");
        Self {
            _root: root,
            java_home,
            ant_home,
            work_dir,
        }
    }

    pub fn java_path(&self) -> PathBuf {
        self.java_home.join("bin").join(JAVA_EXECUTABLE)
    }

    pub fn launcher_path(&self) -> PathBuf {
        self.ant_home.join("lib").join(LAUNCHER_ARTIFACT)
    }

    /// Default config pointing at this install.
    pub fn config(&self) -> AntConfig {
        AntConfig {
            java_home: Some(self.java_home.clone()),
            ant_home: Some(self.ant_home.clone()),
            cwd: Some(self.work_dir.clone()),
            ..AntConfig::default()
        }
    }

    /// Locator that ignores the process environment.
    pub fn locator(&self) -> ToolLocator {
        ToolLocator::new(Some(self.java_home.clone()), Some(self.ant_home.clone()))
    }
}

impl Default for FakeAntInstall {
    fn default() -> Self {
        Self::new()
    }
}

fn write_file(path: &Path, contents: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create parent dirs");
    }
    fs::write(path, contents).expect("write file");
}
