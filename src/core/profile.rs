//! Board profiles
//!
//! A profile names a board, its architecture and the ordered actions that
//! produce its boot artifacts. Profiles are collected in an immutable
//! [`ProfileTable`], either the built-in one or one loaded from a TOML file:
//!
//! ```toml
//! [[profile]]
//! name = "bpi-f3"
//! arch = "riscv64"
//!
//! [[profile.actions]]
//! type = "fit_image"
//! dest = "bpi-f3.itb"
//! prekernel = "usr/managarm/bin/eir-virt.bin"
//! dtb = "usr/managarm/devicetree/k1-x_deb1.dtb"
//! load_address = 0x11000000
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::action::Action;
use super::fit::fit_arch;
use crate::error::ConfigError;
use crate::infra::filesystem;

/// Raspberry Pi 4 firmware configuration
const RPI4_CONFIG_TXT: &str = "\
enable_uart=1
uart_2ndstage=1

# Uncomment for JTAG debugging:
# gpio=22-27=np
# enable_jtag_gpio=1

initramfs initrd.cpio followkernel
";

/// Raspberry Pi 4 kernel command line
const RPI4_CMDLINE_TXT: &str = "serial";

/// A board and the actions producing its artifacts
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Profile {
    /// Board name
    pub name: String,

    /// Target architecture (e.g. "riscv64")
    pub arch: String,

    /// Actions, executed in order
    #[serde(default)]
    pub actions: Vec<Action>,
}

impl Profile {
    /// Check the profile against everything known before running it
    ///
    /// FIT image actions need an architecture with a FIT tag.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.actions.iter().any(Action::needs_mkimage) {
            fit_arch(&self.arch)?;
        }
        Ok(())
    }

    /// First FIT image action of the profile
    pub fn fit_action(&self) -> Option<&Action> {
        self.actions.iter().find(|a| matches!(a, Action::FitImage { .. }))
    }
}

/// On-disk form of a profile table
#[derive(Debug, Serialize, Deserialize)]
struct ProfileFile {
    #[serde(default)]
    profile: Vec<Profile>,
}

/// Immutable set of profiles with unique names
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileTable {
    profiles: Vec<Profile>,
}

impl ProfileTable {
    /// Build a table, rejecting duplicate names
    pub fn new(profiles: Vec<Profile>) -> Result<Self, ConfigError> {
        for (i, profile) in profiles.iter().enumerate() {
            if profiles[..i].iter().any(|p| p.name == profile.name) {
                return Err(ConfigError::DuplicateProfile {
                    name: profile.name.clone(),
                });
            }
        }
        Ok(Self { profiles })
    }

    /// The profiles shipped with the tool
    pub fn builtin() -> Self {
        let profiles = vec![
            Profile {
                name: "raspi4".to_string(),
                arch: "aarch64".to_string(),
                actions: vec![
                    copy("usr/managarm/bin/kernel8.img", None),
                    copy("usr/managarm/devicetree/bcm2711-rpi-4-b.dtb", None),
                    copy(
                        "usr/managarm/devicetree/overlays/highperi.dtbo",
                        Some("overlays"),
                    ),
                    copy("usr/lib/raspi-firmware/start4.elf", None),
                    copy("usr/lib/raspi-firmware/fixup4.dat", None),
                    Action::GenerateInitrd {
                        dest: "initrd.cpio".to_string(),
                    },
                    Action::WriteText {
                        dest: "config.txt".to_string(),
                        data: RPI4_CONFIG_TXT.to_string(),
                    },
                    Action::WriteText {
                        dest: "cmdline.txt".to_string(),
                        data: RPI4_CMDLINE_TXT.to_string(),
                    },
                ],
            },
            Profile {
                name: "bpi-f3".to_string(),
                arch: "riscv64".to_string(),
                actions: vec![Action::FitImage {
                    dest: "bpi-f3.itb".to_string(),
                    prekernel: "usr/managarm/bin/eir-virt.bin".to_string(),
                    dtb: "usr/managarm/devicetree/k1-x_deb1.dtb".to_string(),
                    load_address: 0x1100_0000,
                }],
            },
        ];
        Self { profiles }
    }

    /// Parse a table from TOML
    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        let file: ProfileFile = toml::from_str(content)?;
        Self::new(file.profile).map_err(|e| serde::de::Error::custom(e.to_string()))
    }

    /// Serialize the table to TOML
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(&ProfileFile {
            profile: self.profiles.clone(),
        })
    }

    /// Load a table from a TOML file
    pub fn load(path: &Path) -> Result<Self, crate::error::BootError> {
        let content = filesystem::read_file(path)?;
        Self::from_toml(&content).map_err(|e| {
            ConfigError::ParseError {
                path: path.to_path_buf(),
                error: e.to_string(),
            }
            .into()
        })
    }

    /// Look up a profile by name
    pub fn get(&self, name: &str) -> Result<&Profile, ConfigError> {
        self.profiles
            .iter()
            .find(|p| p.name == name)
            .ok_or_else(|| ConfigError::UnknownProfile {
                name: name.to_string(),
                available: self.names().map(str::to_string).collect(),
            })
    }

    /// Profile names in table order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.profiles.iter().map(|p| p.name.as_str())
    }

    /// Profiles in table order
    pub fn iter(&self) -> impl Iterator<Item = &Profile> {
        self.profiles.iter()
    }
}

fn copy(src: &str, subdir: Option<&str>) -> Action {
    Action::Copy {
        src: src.to_string(),
        subdir: subdir.map(str::to_string),
    }
}
