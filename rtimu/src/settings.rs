use log::{info, warn};
use std::fmt::Write as _;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const SETTINGS_EXTENSION: &str = "ini";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImuType {
    /// Probe the bus for a supported chip, fall back to `Null`.
    AutoDiscover,
    /// No hardware; samples are pushed in by the application.
    Null,
    Bno055,
}

impl ImuType {
    pub fn code(self) -> u32 {
        match self {
            ImuType::AutoDiscover => 0,
            ImuType::Null => 1,
            ImuType::Bno055 => 10,
        }
    }

    pub fn from_code(code: u32) -> Option<Self> {
        match code {
            0 => Some(ImuType::AutoDiscover),
            1 => Some(ImuType::Null),
            10 => Some(ImuType::Bno055),
            _ => None,
        }
    }
}

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to access settings file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("line {line}: expected Key=Value, got {text:?}")]
    Malformed { line: usize, text: String },
    #[error("line {line}: invalid value {value:?} for {key}")]
    InvalidValue {
        line: usize,
        key: String,
        value: String,
    },
}

/// Contents of an `RTIMULib`-style settings file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub imu_type: ImuType,
    /// `N` in `/dev/i2c-N`
    pub i2c_bus: u8,
    /// 7-bit address
    pub i2c_slave_address: u16,
    /// Milliseconds between BNO055 samples
    pub bno055_poll_interval: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            imu_type: ImuType::AutoDiscover,
            i2c_bus: 1,
            i2c_slave_address: linux_bno055::DEFAULT_I2C_ADDR,
            bno055_poll_interval: 10,
        }
    }
}

fn parse_number(value: &str) -> Option<u32> {
    match value.strip_prefix("0x").or_else(|| value.strip_prefix("0X")) {
        Some(hex) => u32::from_str_radix(hex, 16).ok(),
        None => value.parse().ok(),
    }
}

impl Settings {
    /// File backing the settings called `name`.
    pub fn path_for(name: &str) -> PathBuf {
        PathBuf::from(format!("{}.{}", name, SETTINGS_EXTENSION))
    }

    /// Loads `<name>.ini` from the working directory, creating it with
    /// defaults if it does not exist.
    pub fn load(name: &str) -> Result<Self, SettingsError> {
        Self::load_from(&Self::path_for(name))
    }

    pub fn load_from(path: &Path) -> Result<Self, SettingsError> {
        match fs::read_to_string(path) {
            Ok(text) => {
                info!("Using settings file {}", path.display());
                Self::parse(&text)
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                info!(
                    "Settings file {} not found, creating with defaults",
                    path.display()
                );
                let settings = Settings::default();
                settings.save(path)?;
                Ok(settings)
            }
            Err(source) => Err(SettingsError::Io {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    /// Strict parse: the first bad line is an error.
    pub fn parse(text: &str) -> Result<Self, SettingsError> {
        let mut settings = Settings::default();
        for (index, raw) in text.lines().enumerate() {
            settings.apply_line(index + 1, raw)?;
        }
        Ok(settings)
    }

    /// Parse that skips bad lines with a warning, keeping the default for
    /// whatever they would have set.
    pub fn parse_lenient(text: &str) -> Self {
        let mut settings = Settings::default();
        for (index, raw) in text.lines().enumerate() {
            if let Err(e) = settings.apply_line(index + 1, raw) {
                warn!("Skipping setting: {}", e);
            }
        }
        settings
    }

    /// Like [`Settings::load`] but never fails: an unreadable file or one
    /// that cannot be created yields defaults, and bad lines are skipped.
    pub fn load_or_default(name: &str) -> Self {
        Self::load_or_default_from(&Self::path_for(name))
    }

    pub fn load_or_default_from(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(text) => {
                info!("Using settings file {}", path.display());
                Self::parse_lenient(&text)
            }
            Err(err) => {
                let settings = Settings::default();
                if err.kind() == io::ErrorKind::NotFound {
                    info!(
                        "Settings file {} not found, creating with defaults",
                        path.display()
                    );
                    if let Err(e) = settings.save(path) {
                        warn!("{}, continuing with defaults", e);
                    }
                } else {
                    warn!(
                        "Cannot read settings file {}: {}, continuing with defaults",
                        path.display(),
                        err
                    );
                }
                settings
            }
        }
    }

    fn apply_line(&mut self, line: usize, raw: &str) -> Result<(), SettingsError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            return Ok(());
        }

        let (key, value) = trimmed.split_once('=').ok_or_else(|| SettingsError::Malformed {
            line,
            text: trimmed.to_string(),
        })?;
        let key = key.trim();
        let value = value.trim();
        let invalid = || SettingsError::InvalidValue {
            line,
            key: key.to_string(),
            value: value.to_string(),
        };

        match key {
            "IMUType" => {
                self.imu_type = parse_number(value)
                    .and_then(ImuType::from_code)
                    .ok_or_else(invalid)?;
            }
            "I2CBus" => {
                self.i2c_bus = parse_number(value)
                    .and_then(|n| u8::try_from(n).ok())
                    .ok_or_else(invalid)?;
            }
            "I2CSlaveAddress" => {
                self.i2c_slave_address = parse_number(value)
                    .filter(|&n| n <= 0x7F)
                    .map(|n| n as u16)
                    .ok_or_else(invalid)?;
            }
            "BNO055PollInterval" => {
                self.bno055_poll_interval = parse_number(value)
                    .filter(|&n| n > 0)
                    .ok_or_else(invalid)?;
            }
            _ => warn!("Ignoring unknown setting {} on line {}", key, line),
        }
        Ok(())
    }

    pub fn to_ini(&self) -> String {
        let mut out = String::new();
        // Writing into a String cannot fail.
        let _ = writeln!(out, "# IMU type: 0 = auto-discover, 1 = null, 10 = BNO055");
        let _ = writeln!(out, "IMUType={}", self.imu_type.code());
        let _ = writeln!(out);
        let _ = writeln!(out, "# I2C bus number (/dev/i2c-N)");
        let _ = writeln!(out, "I2CBus={}", self.i2c_bus);
        let _ = writeln!(out);
        let _ = writeln!(out, "# 7-bit I2C address of the IMU");
        let _ = writeln!(out, "I2CSlaveAddress={:#04x}", self.i2c_slave_address);
        let _ = writeln!(out);
        let _ = writeln!(out, "# BNO055 sample period in milliseconds");
        let _ = writeln!(out, "BNO055PollInterval={}", self.bno055_poll_interval);
        out
    }

    pub fn save(&self, path: &Path) -> Result<(), SettingsError> {
        fs::write(path, self.to_ini()).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}
