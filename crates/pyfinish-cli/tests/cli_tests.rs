//! Integration tests for the pyfinish CLI binary.

use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

/// Test context with a minimal source tree and an IDE-style build tree.
struct TestContext {
    temp_dir: TempDir,
}

impl TestContext {
    fn new() -> Self {
        let temp_dir = TempDir::new().expect("failed to create temp dir");
        let ctx = Self { temp_dir };
        ctx.write(
            &ctx.src().join("examples/synthetic/libcxx.py"),
            "# libcxx\n",
        );
        ctx
    }

    fn src(&self) -> PathBuf {
        self.temp_dir.path().join("lldb")
    }

    fn build(&self) -> PathBuf {
        self.temp_dir.path().join("build")
    }

    fn package_dir(&self) -> PathBuf {
        self.build().join("LLDB.framework/Resources/Python/lldb")
    }

    fn write(&self, path: &Path, content: &str) {
        std::fs::create_dir_all(path.parent().expect("path has a parent"))
            .expect("failed to create parent");
        std::fs::write(path, content).expect("failed to write file");
    }

    fn pyfinish_cmd(&self) -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_pyfinish"));
        cmd.env_remove("RUST_LOG");
        cmd
    }
}

#[test]
fn test_help_command() {
    let ctx = TestContext::new();
    let output = ctx
        .pyfinish_cmd()
        .arg("--help")
        .output()
        .expect("failed to run pyfinish");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Usage:"));
    assert!(stdout.contains("--srcRoot"));
}

#[test]
fn test_version_command() {
    let ctx = TestContext::new();
    let output = ctx
        .pyfinish_cmd()
        .arg("--version")
        .output()
        .expect("failed to run pyfinish");
    assert!(output.status.success());
}

#[test]
fn test_missing_framework_reports_program_failure() {
    let ctx = TestContext::new();
    let output = ctx
        .pyfinish_cmd()
        .args(["--platform", "unix", "--srcRoot"])
        .arg(ctx.src())
        .arg("--targetDir")
        .arg(ctx.build())
        .output()
        .expect("failed to run pyfinish");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("Program failure: Unable to find the LLDB.framework directory"),
        "unexpected stderr: {stderr}"
    );
}

#[test]
fn test_ide_build_succeeds() {
    let ctx = TestContext::new();
    ctx.write(&ctx.package_dir().join("lldb.py"), "import _lldb\n");

    let output = ctx
        .pyfinish_cmd()
        .args(["--platform", "unix", "--srcRoot"])
        .arg(ctx.src())
        .arg("--targetDir")
        .arg(ctx.build())
        .output()
        .expect("failed to run pyfinish");

    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let pkg = ctx.package_dir();
    assert_eq!(
        std::fs::read_to_string(pkg.join("__init__.py")).unwrap(),
        "import _lldb\n"
    );
    assert!(pkg.join("formatters/cpp/libcxx.py").is_file());
    assert!(pkg.join("runtime/__init__.py").is_file());
}

#[test]
fn test_options_from_config_file() {
    let ctx = TestContext::new();
    ctx.write(&ctx.package_dir().join("lldb.py"), "import _lldb\n");
    let file = ctx.temp_dir.path().join("pyfinish.toml");
    ctx.write(
        &file,
        &format!(
            "srcRoot = {:?}\ntargetDir = {:?}\n",
            ctx.src().display().to_string(),
            ctx.build().display().to_string()
        ),
    );

    let output = ctx
        .pyfinish_cmd()
        .args(["--platform", "darwin", "--config"])
        .arg(&file)
        .output()
        .expect("failed to run pyfinish");

    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert!(ctx.package_dir().join("macosx/__init__.py").is_file());
}

#[test]
fn test_unknown_config_key_is_rejected() {
    let ctx = TestContext::new();
    let file = ctx.temp_dir.path().join("pyfinish.toml");
    ctx.write(&file, "sourceRoot = \"/s\"\ntargetDir = \"/t\"\ncolour = \"blue\"\n");

    let output = ctx
        .pyfinish_cmd()
        .arg("--config")
        .arg(&file)
        .output()
        .expect("failed to run pyfinish");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("colour"), "unexpected stderr: {stderr}");
}

#[test]
fn test_verbose_in_config_file_enables_debug_logging() {
    let ctx = TestContext::new();
    ctx.write(&ctx.package_dir().join("lldb.py"), "import _lldb\n");
    let options = format!(
        "srcRoot = {:?}\ntargetDir = {:?}\n",
        ctx.src().display().to_string(),
        ctx.build().display().to_string()
    );
    let quiet = ctx.temp_dir.path().join("quiet.toml");
    let verbose = ctx.temp_dir.path().join("verbose.toml");
    ctx.write(&quiet, &options);
    ctx.write(&verbose, &format!("{options}verbose = true\n"));

    let run = |file: &Path| {
        let output = ctx
            .pyfinish_cmd()
            .args(["--platform", "unix", "--config"])
            .arg(file)
            .output()
            .expect("failed to run pyfinish");
        assert!(output.status.success());
        String::from_utf8_lossy(&output.stderr).into_owned()
    };

    assert!(run(&verbose).contains("Resolved options"));
    assert!(!run(&quiet).contains("Resolved options"));
}
