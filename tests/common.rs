//! Common test helpers for integration tests

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

pub fn pkgcheck_binary() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_pkgcheck"))
}

/// Write each `(name, content)` pair into `dir`.
pub fn write_manifests(dir: &Path, manifests: &[(&str, &str)]) {
    fs::create_dir_all(dir).expect("Failed to create manifest dir");
    for (name, content) in manifests {
        fs::write(dir.join(name), content).expect("Failed to write manifest");
    }
}

/// Run pkgcheck in `cwd` with `args`, feeding `stdin` when given.
pub fn run_pkgcheck(cwd: &Path, args: &[&str], stdin: Option<&str>) -> Output {
    let mut child = Command::new(pkgcheck_binary())
        .args(args)
        .current_dir(cwd)
        .env_remove("PKGCHECK_QUIET")
        .env_remove("RUST_LOG")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("Failed to spawn pkgcheck");

    {
        let mut pipe = child.stdin.take().expect("stdin is piped");
        if let Some(input) = stdin {
            pipe.write_all(input.as_bytes())
                .expect("Failed to write stdin");
        }
    }

    child.wait_with_output().expect("Failed to wait for pkgcheck")
}

pub fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

pub fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}
