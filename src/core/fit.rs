//! FIT image descriptor assembly
//!
//! Builds the image tree source (`.its`) that `mkimage --fit` turns into a
//! Flattened Image Tree: one kernel, one ramdisk and one device tree blob,
//! bound together by a single default configuration named after the board.
//!
//! Assembly happens in two phases. [`FitSources::assemble`] resolves the
//! architecture tag and the blob paths (the only step that touches the
//! filesystem) and validates the resulting [`FitDescriptor`].
//! [`FitDescriptor::render`] is then a pure function producing the text, so
//! identical inputs always give byte-identical descriptors.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use regex::Regex;

use super::dts::{CellFormat, DtsBuilder};
use crate::config::defaults::{FIT_COMPRESSION, FIT_OS_TAG, OS_NAME, RAMDISK_NAME};
use crate::error::{ConfigError, FilesystemError, FitError, Result};

/// Profile architecture to FIT `arch` tag
const FIT_ARCHES: &[(&str, &str)] = &[("riscv64", "riscv"), ("aarch64", "arm64")];

/// Number of cells used for addresses at the root node
const ADDRESS_CELLS: u64 = 1;

/// Characters accepted in device tree node names
const NODE_NAME_PATTERN: &str = r"^[A-Za-z0-9,._+@-]+$";

/// Look up the FIT architecture tag for a profile architecture
pub fn fit_arch(arch: &str) -> Result<&'static str, ConfigError> {
    FIT_ARCHES
        .iter()
        .find(|(name, _)| *name == arch)
        .map(|(_, tag)| *tag)
        .ok_or_else(|| ConfigError::UnsupportedArch {
            arch: arch.to_string(),
            supported: FIT_ARCHES.iter().map(|(name, _)| (*name).to_string()).collect(),
        })
}

/// Check that a name can be used as a device tree node name
pub fn is_valid_node_name(name: &str) -> bool {
    static NODE_NAME: OnceLock<Regex> = OnceLock::new();
    NODE_NAME
        .get_or_init(|| Regex::new(NODE_NAME_PATTERN).expect("node name pattern is valid"))
        .is_match(name)
}

/// Role of an image inside the FIT
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageRole {
    Kernel,
    Ramdisk,
    FlatDt,
}

impl ImageRole {
    /// Value of the image's `type` property
    pub fn type_tag(self) -> &'static str {
        match self {
            Self::Kernel => "kernel",
            Self::Ramdisk => "ramdisk",
            Self::FlatDt => "flat_dt",
        }
    }

    /// Property naming this role inside a configuration node
    pub fn config_key(self) -> &'static str {
        match self {
            Self::Kernel => "kernel",
            Self::Ramdisk => "ramdisk",
            Self::FlatDt => "fdt",
        }
    }

    /// Device trees are not executable and carry no `os` property
    fn has_os(self) -> bool {
        !matches!(self, Self::FlatDt)
    }
}

/// Where `mkimage` finds an image's contents
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageData {
    /// Canonical absolute path
    Absolute(PathBuf),
    /// File name relative to the descriptor's directory
    Relative(String),
}

impl ImageData {
    fn incbin_path(&self) -> String {
        match self {
            Self::Absolute(path) => path.display().to_string(),
            Self::Relative(name) => name.clone(),
        }
    }
}

/// One blob embedded in the FIT
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageEntry {
    /// Node name, doubles as the key configurations refer to
    pub name: String,
    pub description: String,
    pub role: ImageRole,
    pub data: ImageData,
    pub arch: String,
    /// Load address; the entry point is the same address
    pub load_address: Option<u64>,
}

impl ImageEntry {
    fn emit(&self, dts: &mut DtsBuilder<'_>) {
        let mut node = dts.node(&self.name);
        node.string_prop("description", &self.description);
        node.incbin_prop("data", &self.data.incbin_path());
        node.string_prop("type", self.role.type_tag());
        node.string_prop("arch", &self.arch);
        if self.role.has_os() {
            node.string_prop("os", FIT_OS_TAG);
        }
        node.string_prop("compression", FIT_COMPRESSION);
        if let Some(address) = self.load_address {
            node.cells_prop("load", &[address], CellFormat::Hex);
            node.cells_prop("entry", &[address], CellFormat::Hex);
        }
    }
}

/// Binding of one image per role, the default bootable set
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootConfiguration {
    pub name: String,
    pub description: String,
    pub kernel: String,
    pub ramdisk: String,
    pub fdt: String,
}

impl BootConfiguration {
    /// Referenced image names keyed by role, in emission order
    pub fn references(&self) -> [(ImageRole, &str); 3] {
        [
            (ImageRole::Kernel, self.kernel.as_str()),
            (ImageRole::Ramdisk, self.ramdisk.as_str()),
            (ImageRole::FlatDt, self.fdt.as_str()),
        ]
    }

    fn emit(&self, dts: &mut DtsBuilder<'_>) {
        let mut node = dts.node(&self.name);
        node.string_prop("description", &self.description);
        for (role, name) in self.references() {
            node.string_prop(role.config_key(), name);
        }
    }
}

/// A validated FIT descriptor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FitDescriptor {
    description: String,
    images: Vec<ImageEntry>,
    config: BootConfiguration,
}

impl FitDescriptor {
    /// Build a descriptor from already-resolved inputs
    ///
    /// `prekernel` and `dtb` are referenced as given and should be absolute;
    /// the ramdisk is always referenced as [`RAMDISK_NAME`] next to the
    /// descriptor.
    pub fn new(
        board: &str,
        fit_arch: &str,
        prekernel: &Path,
        dtb: &Path,
        load_address: u64,
    ) -> Result<Self, FitError> {
        Self::with_names(
            board,
            fit_arch,
            (image_name(prekernel)?, prekernel),
            (image_name(dtb)?, dtb),
            load_address,
        )
    }

    /// Build a descriptor whose image names are chosen independently of the
    /// referenced paths
    fn with_names(
        board: &str,
        fit_arch: &str,
        (prekernel_name, prekernel): (String, &Path),
        (dtb_name, dtb): (String, &Path),
        load_address: u64,
    ) -> Result<Self, FitError> {
        let images = vec![
            ImageEntry {
                name: prekernel_name.clone(),
                description: format!("{OS_NAME} prekernel"),
                role: ImageRole::Kernel,
                data: ImageData::Absolute(prekernel.to_path_buf()),
                arch: fit_arch.to_string(),
                load_address: Some(load_address),
            },
            ImageEntry {
                name: RAMDISK_NAME.to_string(),
                description: format!("{OS_NAME} initrd"),
                role: ImageRole::Ramdisk,
                data: ImageData::Relative(RAMDISK_NAME.to_string()),
                arch: fit_arch.to_string(),
                load_address: None,
            },
            ImageEntry {
                name: dtb_name.clone(),
                description: "FDT".to_string(),
                role: ImageRole::FlatDt,
                data: ImageData::Absolute(dtb.to_path_buf()),
                arch: fit_arch.to_string(),
                load_address: None,
            },
        ];

        let config = BootConfiguration {
            name: board.to_string(),
            description: format!("{OS_NAME} on {board}"),
            kernel: prekernel_name,
            ramdisk: RAMDISK_NAME.to_string(),
            fdt: dtb_name,
        };

        let descriptor = Self {
            description: format!("{OS_NAME} FIT image for {board}"),
            images,
            config,
        };
        descriptor.validate()?;
        Ok(descriptor)
    }

    /// Declared images, in emission order
    pub fn images(&self) -> &[ImageEntry] {
        &self.images
    }

    /// The default configuration
    pub fn configuration(&self) -> &BootConfiguration {
        &self.config
    }

    /// Check node names and cross-references
    pub fn validate(&self) -> Result<(), FitError> {
        let mut declared: Vec<&ImageEntry> = Vec::with_capacity(self.images.len());
        for image in &self.images {
            if !is_valid_node_name(&image.name) {
                return Err(FitError::InvalidNodeName {
                    name: image.name.clone(),
                });
            }
            if declared.iter().any(|d| d.name == image.name) {
                return Err(FitError::DuplicateImage {
                    name: image.name.clone(),
                });
            }
            declared.push(image);
        }

        if !is_valid_node_name(&self.config.name) {
            return Err(FitError::InvalidNodeName {
                name: self.config.name.clone(),
            });
        }

        for (role, name) in self.config.references() {
            if !declared.iter().any(|d| d.name == name && d.role == role) {
                return Err(FitError::UndeclaredImage {
                    config: self.config.name.clone(),
                    role: role.config_key().to_string(),
                    name: name.to_string(),
                });
            }
        }

        Ok(())
    }

    /// Render the image tree source
    pub fn render(&self) -> String {
        let mut out = String::new();
        let mut its = DtsBuilder::new(&mut out);
        its.header();
        {
            let mut root = its.node("/");
            root.string_prop("description", &self.description);
            root.cells_prop("#address-cells", &[ADDRESS_CELLS], CellFormat::Decimal);

            {
                let mut images = root.node("images");
                for image in &self.images {
                    image.emit(&mut images);
                }
            }

            let mut configurations = root.node("configurations");
            configurations.string_prop("default", &self.config.name);
            self.config.emit(&mut configurations);
        }
        out
    }
}

/// Inputs of a FIT image for one board
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FitSources {
    /// Board name, used for the configuration node
    pub board: String,
    /// Profile architecture (e.g. "riscv64")
    pub arch: String,
    /// Kernel-role binary
    pub prekernel: PathBuf,
    /// Device tree blob
    pub dtb: PathBuf,
    /// Kernel load and entry address
    pub load_address: u64,
}

impl FitSources {
    /// Resolve the architecture and blob paths, then build the descriptor
    ///
    /// The architecture is checked first so an unsupported board fails before
    /// the filesystem is consulted. Image names come from the paths as given;
    /// only the `/incbin/` references are canonical, so a symlinked blob keeps
    /// the link's name.
    pub fn assemble(&self) -> Result<FitDescriptor> {
        let arch = fit_arch(&self.arch)?;
        let prekernel = canonical(&self.prekernel)?;
        let dtb = canonical(&self.dtb)?;
        Ok(FitDescriptor::with_names(
            &self.board,
            arch,
            (image_name(&self.prekernel)?, &prekernel),
            (image_name(&self.dtb)?, &dtb),
            self.load_address,
        )?)
    }
}

fn canonical(path: &Path) -> Result<PathBuf, FilesystemError> {
    path.canonicalize()
        .map_err(|e| FilesystemError::Canonicalize {
            path: path.to_path_buf(),
            error: e.to_string(),
        })
}

fn image_name(path: &Path) -> Result<String, FitError> {
    path.file_name()
        .and_then(|name| name.to_str())
        .map(str::to_string)
        .ok_or_else(|| FitError::NoFileName {
            path: path.to_path_buf(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const BPI_F3_ITS: &str = r#"/dts-v1/;
/ {
    description = "Managarm FIT image for bpi-f3";
    #address-cells = <1>;
    images {
        eir-virt.bin {
            description = "Managarm prekernel";
            data = /incbin/("/sysroot/usr/managarm/bin/eir-virt.bin");
            type = "kernel";
            arch = "riscv";
            os = "linux";
            compression = "none";
            load = <0x11000000>;
            entry = <0x11000000>;
        };
        initrd.cpio {
            description = "Managarm initrd";
            data = /incbin/("initrd.cpio");
            type = "ramdisk";
            arch = "riscv";
            os = "linux";
            compression = "none";
        };
        k1-x_deb1.dtb {
            description = "FDT";
            data = /incbin/("/sysroot/usr/managarm/devicetree/k1-x_deb1.dtb");
            type = "flat_dt";
            arch = "riscv";
            compression = "none";
        };
    };
    configurations {
        default = "bpi-f3";
        bpi-f3 {
            description = "Managarm on bpi-f3";
            kernel = "eir-virt.bin";
            ramdisk = "initrd.cpio";
            fdt = "k1-x_deb1.dtb";
        };
    };
};
"#;

    fn bpi_f3() -> FitDescriptor {
        FitDescriptor::new(
            "bpi-f3",
            "riscv",
            Path::new("/sysroot/usr/managarm/bin/eir-virt.bin"),
            Path::new("/sysroot/usr/managarm/devicetree/k1-x_deb1.dtb"),
            0x1100_0000,
        )
        .expect("valid descriptor")
    }

    // ============================================
    // Unit Tests - architecture table
    // ============================================

    #[test]
    fn test_fit_arch_known() {
        assert_eq!(fit_arch("riscv64").unwrap(), "riscv");
        assert_eq!(fit_arch("aarch64").unwrap(), "arm64");
    }

    #[test]
    fn test_fit_arch_unknown() {
        let err = fit_arch("mips").unwrap_err();
        assert!(matches!(err, ConfigError::UnsupportedArch { ref arch, .. } if arch == "mips"));
        assert!(err.to_string().contains("riscv64"));
    }

    // ============================================
    // Unit Tests - rendering
    // ============================================

    #[test]
    fn test_bpi_f3_descriptor() {
        assert_eq!(bpi_f3().render(), BPI_F3_ITS);
    }

    #[test]
    fn test_render_is_deterministic() {
        let first = bpi_f3().render();
        for _ in 0..10 {
            assert_eq!(bpi_f3().render(), first);
        }
    }

    #[test]
    fn test_configuration_references_input_names() {
        let descriptor = bpi_f3();
        let config = descriptor.configuration();
        assert_eq!(config.name, "bpi-f3");
        assert_eq!(config.kernel, "eir-virt.bin");
        assert_eq!(config.ramdisk, "initrd.cpio");
        assert_eq!(config.fdt, "k1-x_deb1.dtb");

        let names: Vec<&str> = descriptor.images().iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["eir-virt.bin", "initrd.cpio", "k1-x_deb1.dtb"]);
    }

    #[test]
    fn test_board_name_with_quote_is_rejected() {
        let result = FitDescriptor::new(
            "bad\"board",
            "riscv",
            Path::new("/k/kernel.bin"),
            Path::new("/d/board.dtb"),
            0x8000_0000,
        );
        assert_eq!(
            result.unwrap_err(),
            FitError::InvalidNodeName {
                name: "bad\"board".to_string()
            }
        );
    }

    #[test]
    fn test_path_with_quote_is_escaped() {
        let descriptor = FitDescriptor::new(
            "board",
            "riscv",
            Path::new("/odd\"dir/kernel.bin"),
            Path::new("/d/board.dtb"),
            0x8000_0000,
        )
        .unwrap();
        assert!(descriptor
            .render()
            .contains(r#"data = /incbin/("/odd\"dir/kernel.bin");"#));
    }

    // ============================================
    // Unit Tests - cross-reference integrity
    // ============================================

    #[test]
    fn test_duplicate_image_name_rejected() {
        let result = FitDescriptor::new(
            "board",
            "riscv",
            Path::new("/boot/initrd.cpio"),
            Path::new("/d/board.dtb"),
            0x8000_0000,
        );
        assert_eq!(
            result.unwrap_err(),
            FitError::DuplicateImage {
                name: "initrd.cpio".to_string()
            }
        );
    }

    #[test]
    fn test_undeclared_reference_rejected() {
        let mut descriptor = bpi_f3();
        descriptor.config.fdt = "missing.dtb".to_string();
        assert_eq!(
            descriptor.validate().unwrap_err(),
            FitError::UndeclaredImage {
                config: "bpi-f3".to_string(),
                role: "fdt".to_string(),
                name: "missing.dtb".to_string(),
            }
        );
    }

    #[test]
    fn test_reference_with_wrong_role_rejected() {
        let mut descriptor = bpi_f3();
        descriptor.config.kernel = "k1-x_deb1.dtb".to_string();
        assert!(matches!(
            descriptor.validate(),
            Err(FitError::UndeclaredImage { ref role, .. }) if role == "kernel"
        ));
    }

    #[test]
    fn test_path_without_file_name_rejected() {
        let result = FitDescriptor::new(
            "board",
            "riscv",
            Path::new("/"),
            Path::new("/d/board.dtb"),
            0,
        );
        assert!(matches!(result, Err(FitError::NoFileName { .. })));
    }

    #[test]
    fn test_node_names() {
        assert!(is_valid_node_name("k1-x_deb1.dtb"));
        assert!(is_valid_node_name("memory@80000000"));
        assert!(!is_valid_node_name(""));
        assert!(!is_valid_node_name("has space"));
        assert!(!is_valid_node_name("brace{"));
        // The compiled pattern is reused across calls
        assert!(is_valid_node_name("k1-x_deb1.dtb"));
    }

    // ============================================
    // Unit Tests - path resolution
    // ============================================

    #[test]
    fn test_assemble_canonicalizes_paths() {
        let temp = TempDir::new().unwrap();
        std::fs::create_dir_all(temp.path().join("bin")).unwrap();
        std::fs::write(temp.path().join("bin/eir-virt.bin"), b"kernel").unwrap();
        std::fs::write(temp.path().join("board.dtb"), b"dtb").unwrap();

        let sources = FitSources {
            board: "bpi-f3".to_string(),
            arch: "riscv64".to_string(),
            prekernel: temp.path().join("bin/../bin/eir-virt.bin"),
            dtb: temp.path().join("board.dtb"),
            load_address: 0x1100_0000,
        };
        let descriptor = sources.assemble().unwrap();

        let kernel = &descriptor.images()[0];
        let expected = temp.path().join("bin/eir-virt.bin").canonicalize().unwrap();
        assert_eq!(kernel.data, ImageData::Absolute(expected));
    }

    #[cfg(unix)]
    #[test]
    fn test_assemble_keeps_symlink_names() {
        let temp = TempDir::new().unwrap();
        let bin = temp.path().join("bin");
        std::fs::create_dir_all(&bin).unwrap();
        std::fs::write(bin.join("eir-virt-1.2.bin"), b"kernel").unwrap();
        std::fs::write(bin.join("k1-x_v2.dtb"), b"dtb").unwrap();
        std::os::unix::fs::symlink("eir-virt-1.2.bin", bin.join("eir-virt.bin")).unwrap();
        std::os::unix::fs::symlink("k1-x_v2.dtb", bin.join("k1-x_deb1.dtb")).unwrap();

        let sources = FitSources {
            board: "bpi-f3".to_string(),
            arch: "riscv64".to_string(),
            prekernel: bin.join("eir-virt.bin"),
            dtb: bin.join("k1-x_deb1.dtb"),
            load_address: 0x1100_0000,
        };
        let descriptor = sources.assemble().unwrap();

        let kernel = &descriptor.images()[0];
        assert_eq!(kernel.name, "eir-virt.bin");
        assert_eq!(
            kernel.data,
            ImageData::Absolute(bin.join("eir-virt-1.2.bin").canonicalize().unwrap())
        );
        let fdt = &descriptor.images()[2];
        assert_eq!(fdt.name, "k1-x_deb1.dtb");
        assert_eq!(
            fdt.data,
            ImageData::Absolute(bin.join("k1-x_v2.dtb").canonicalize().unwrap())
        );

        let config = descriptor.configuration();
        assert_eq!(config.kernel, "eir-virt.bin");
        assert_eq!(config.fdt, "k1-x_deb1.dtb");
    }

    #[test]
    fn test_assemble_checks_arch_before_paths() {
        let sources = FitSources {
            board: "board".to_string(),
            arch: "sparc".to_string(),
            prekernel: PathBuf::from("/does/not/exist"),
            dtb: PathBuf::from("/does/not/exist.dtb"),
            load_address: 0,
        };
        assert!(matches!(
            sources.assemble(),
            Err(crate::error::BootError::Config(ConfigError::UnsupportedArch { .. }))
        ));
    }

    #[test]
    fn test_assemble_missing_blob() {
        let temp = TempDir::new().unwrap();
        let sources = FitSources {
            board: "board".to_string(),
            arch: "riscv64".to_string(),
            prekernel: temp.path().join("missing.bin"),
            dtb: temp.path().join("missing.dtb"),
            load_address: 0,
        };
        assert!(matches!(
            sources.assemble(),
            Err(crate::error::BootError::Filesystem(FilesystemError::Canonicalize { .. }))
        ));
    }
}
