//! Settings-driven construction of fusion IMUs.
//!
//! A [`Settings`] file names the IMU type and bus location; [`create_imu`]
//! turns it into a boxed [`FusionImu`] ready for `imu_init`.

mod bno055;
mod null;
mod settings;

pub use bno055::{fusion_mode, Bno055Imu, Opener};
pub use imu_traits::{Float, FusionImu, ImuData, ImuError, Quaternion, Vector3};
pub use null::{NullImu, NULL_POLL_INTERVAL_MS};
pub use settings::{ImuType, Settings, SettingsError, SETTINGS_EXTENSION};

use log::{debug, info, warn};

/// Builds the IMU described by `settings`. The device is not touched until
/// `imu_init`, except during auto-discovery which probes the bus.
pub fn create_imu(settings: &Settings) -> Result<Box<dyn FusionImu>, ImuError> {
    match settings.imu_type {
        ImuType::Null => Ok(Box::new(NullImu::new())),
        ImuType::Bno055 => bno055_at(settings, settings.i2c_slave_address),
        ImuType::AutoDiscover => discover(settings),
    }
}

#[cfg(target_os = "linux")]
fn bno055_at(settings: &Settings, address: u16) -> Result<Box<dyn FusionImu>, ImuError> {
    Ok(Box::new(Bno055Imu::linux(
        settings.i2c_bus,
        address,
        settings.bno055_poll_interval,
    )))
}

#[cfg(not(target_os = "linux"))]
fn bno055_at(_settings: &Settings, _address: u16) -> Result<Box<dyn FusionImu>, ImuError> {
    Err(ImuError::NotSupported(
        "BNO055 requires Linux I2C device nodes".to_string(),
    ))
}

/// Addresses to probe, configured one first.
fn discovery_addresses(configured: u16) -> Vec<u16> {
    let mut addresses = vec![configured];
    for candidate in [linux_bno055::DEFAULT_I2C_ADDR, linux_bno055::ALTERNATE_I2C_ADDR] {
        if !addresses.contains(&candidate) {
            addresses.push(candidate);
        }
    }
    addresses
}

#[cfg(target_os = "linux")]
fn discover(settings: &Settings) -> Result<Box<dyn FusionImu>, ImuError> {
    for address in discovery_addresses(settings.i2c_slave_address) {
        match linux_bno055::open_linux(settings.i2c_bus, address) {
            Ok(mut device) => {
                if linux_bno055::is_present(&mut device) {
                    info!(
                        "Detected BNO055 on /dev/i2c-{} at {:#04x}",
                        settings.i2c_bus, address
                    );
                    return bno055_at(settings, address);
                }
            }
            Err(e) => debug!("Probe of {:#04x} failed: {}", address, e),
        }
    }
    warn!(
        "No IMU detected on /dev/i2c-{}, using null IMU",
        settings.i2c_bus
    );
    Ok(Box::new(NullImu::new()))
}

#[cfg(not(target_os = "linux"))]
fn discover(_settings: &Settings) -> Result<Box<dyn FusionImu>, ImuError> {
    warn!("IMU discovery is only available on Linux, using null IMU");
    Ok(Box::new(NullImu::new()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_type_builds_null_imu() {
        let settings = Settings {
            imu_type: ImuType::Null,
            ..Default::default()
        };
        let imu = create_imu(&settings).unwrap();
        assert_eq!(imu.poll_interval(), NULL_POLL_INTERVAL_MS);
    }

    #[test]
    fn configured_address_is_probed_first() {
        assert_eq!(discovery_addresses(0x29), vec![0x29, 0x28]);
        assert_eq!(discovery_addresses(0x28), vec![0x28, 0x29]);
        assert_eq!(discovery_addresses(0x30), vec![0x30, 0x28, 0x29]);
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn bno055_construction_defers_device_access() {
        let settings = Settings {
            imu_type: ImuType::Bno055,
            i2c_bus: 250,
            bno055_poll_interval: 15,
            ..Default::default()
        };
        let mut imu = create_imu(&settings).unwrap();
        assert_eq!(imu.poll_interval(), 15);
        // no such bus
        assert!(imu.imu_init().is_err());
    }
}
