//! Common test utilities and helpers
//!
//! This module provides shared utilities for integration tests: a scratch
//! directory, a fake sysroot and stand-ins for the external tools.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

/// Initrd generator stand-in, run with `--python sh`
///
/// Writes the target triple into the requested output file.
pub const STUB_GEN_INITRD: &str = r#"#!/bin/sh
while [ $# -gt 0 ]; do
    case "$1" in
        --triple=*) triple="${1#--triple=}" ;;
        -o) shift; out="$1" ;;
    esac
    shift
done
printf 'initrd for %s\n' "$triple" > "$out"
"#;

/// `mkimage` stand-in
///
/// Requires the ramdisk next to the descriptor and copies the descriptor to
/// the image path.
pub const STUB_MKIMAGE: &str = r#"#!/bin/sh
[ "$1" = "--fit" ] || exit 2
[ -f "$(dirname "$2")/initrd.cpio" ] || { echo "initrd.cpio missing" >&2; exit 3; }
cp "$2" "$3"
"#;

/// `mkimage` stand-in that writes a partial image and fails
pub const FAILING_MKIMAGE: &str = r#"#!/bin/sh
echo partial > "$3"
echo "FIT description contains errors" >&2
exit 1
"#;

/// Test project context
///
/// Creates a temporary directory for test projects and provides
/// utilities for setting up test scenarios.
pub struct TestProject {
    /// Temporary directory for the test project
    pub dir: TempDir,
}

impl TestProject {
    /// Create a new test project in a temporary directory
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("Failed to create temp directory"),
        }
    }

    /// Get the path to the test project directory
    pub fn path(&self) -> PathBuf {
        self.dir.path().to_path_buf()
    }

    /// Sysroot inside the project
    pub fn sysroot(&self) -> PathBuf {
        self.path().join("sysroot")
    }

    /// Output directory inside the project
    pub fn out(&self) -> PathBuf {
        self.path().join("tftp")
    }

    /// Create a file in the test project
    pub fn create_file(&self, name: &str, content: &str) {
        let path = self.dir.path().join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent directories");
        }
        std::fs::write(path, content).expect("Failed to write file");
    }

    /// Create an executable script in the test project
    #[cfg(unix)]
    pub fn create_script(&self, name: &str, content: &str) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;

        self.create_file(name, content);
        let path = self.dir.path().join(name);
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755))
            .expect("Failed to make script executable");
        path
    }

    /// Check if a file exists in the test project
    pub fn file_exists(&self, name: &str) -> bool {
        self.dir.path().join(name).exists()
    }

    /// Read a file from the test project
    pub fn read_file(&self, name: &str) -> String {
        std::fs::read_to_string(self.dir.path().join(name)).expect("Failed to read file")
    }

    /// Populate the sysroot with everything the built-in profiles read
    pub fn populate_sysroot(&self) {
        for (path, content) in [
            ("usr/managarm/bin/kernel8.img", "kernel8"),
            ("usr/managarm/bin/eir-virt.bin", "eir"),
            ("usr/managarm/devicetree/bcm2711-rpi-4-b.dtb", "rpi4 dtb"),
            ("usr/managarm/devicetree/overlays/highperi.dtbo", "highperi"),
            ("usr/managarm/devicetree/k1-x_deb1.dtb", "k1 dtb"),
            ("usr/lib/raspi-firmware/start4.elf", "start4"),
            ("usr/lib/raspi-firmware/fixup4.dat", "fixup4"),
            ("usr/managarm/bin/gen-initrd.py", STUB_GEN_INITRD),
        ] {
            self.create_file(&format!("sysroot/{path}"), content);
        }
    }

    /// Canonical path of a sysroot file
    pub fn sysroot_file(&self, path: &str) -> PathBuf {
        std::fs::canonicalize(self.sysroot().join(path)).expect("Failed to canonicalize")
    }
}

impl Default for TestProject {
    fn default() -> Self {
        Self::new()
    }
}

/// Run the binary with `args`, without inheriting a log filter
pub fn run(project: &TestProject, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_boot-artifacts"))
        .current_dir(project.path())
        .env_remove("RUST_LOG")
        .env_remove("BOOT_ARTIFACTS_PYTHON")
        .env_remove("BOOT_ARTIFACTS_MKIMAGE")
        .args(args)
        .output()
        .expect("Failed to execute boot-artifacts")
}

/// Run `tftp` for `profile` against the project's sysroot and output directory
pub fn run_tftp(project: &TestProject, profile: &str, mkimage: &Path, extra: &[&str]) -> Output {
    let sysroot = project.sysroot();
    let out = project.out();
    let mut args = vec![
        "tftp",
        "-p",
        profile,
        "--sysroot",
        sysroot.to_str().expect("utf-8 path"),
        "-o",
        out.to_str().expect("utf-8 path"),
        "--python",
        "sh",
        "--mkimage",
        mkimage.to_str().expect("utf-8 path"),
    ];
    args.extend_from_slice(extra);
    run(project, &args)
}

/// Assert that a command succeeded, showing its stderr otherwise
pub fn assert_success(output: &Output) {
    assert!(
        output.status.success(),
        "Command failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
}

/// Profile table with a FIT profile for an architecture without a FIT tag
pub const UNSUPPORTED_ARCH_PROFILES: &str = r#"
[[profile]]
name = "mystery"
arch = "mips64"

[[profile.actions]]
type = "write_text"
dest = "cmdline.txt"
data = "serial"

[[profile.actions]]
type = "fit_image"
dest = "mystery.itb"
prekernel = "usr/managarm/bin/eir-virt.bin"
dtb = "usr/managarm/devicetree/k1-x_deb1.dtb"
load_address = 0x80000000
"#;
