#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

use alloc::boxed::Box;
use alloc::string::String;
use core::fmt;

#[cfg(feature = "high_precision")]
pub type Float = f64;
#[cfg(not(feature = "high_precision"))]
pub type Float = f32;

// --- Basic Types ---
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Vector3 {
    pub x: Float,
    pub y: Float,
    pub z: Float,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Quaternion {
    pub w: Float,
    pub x: Float,
    pub y: Float,
    pub z: Float,
}

// --- Fusion snapshot ---
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ImuData {
    /// Microseconds since the IMU was initialized
    pub timestamp_us: u64,
    /// Fused orientation in radians, ordered `[pitch, roll, yaw]`
    pub fusion_pose: [Float; 3],
    /// Fused orientation as a unit quaternion (WXYZ order)
    pub fusion_q_pose: Option<Quaternion>,
    /// Angular velocity (deg/s)
    pub gyroscope: Option<Vector3>,
    /// Acceleration including gravity (m/s²)
    pub accelerometer: Option<Vector3>,
    /// Magnetic field vector (micro Tesla, µT)
    pub magnetometer: Option<Vector3>,
    /// Temperature (°C)
    pub temperature: Option<f32>,
    /// Calibration status
    pub calibration_status: Option<u8>,
}

// --- Standard Error Type ---
#[derive(Debug, Clone, PartialEq)]
pub enum ImuError {
    /// Error originating from the underlying device communication (I2C, Serial, CAN)
    DeviceError(String),
    /// Error reading data from the device
    ReadError(String),
    /// A read was attempted before `imu_init` succeeded
    NotInitialized,
    /// Functionality not supported by this IMU or platform
    NotSupported(String),
}

impl fmt::Display for ImuError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImuError::DeviceError(s) => write!(f, "Device error: {}", s),
            ImuError::ReadError(s) => write!(f, "Read error: {}", s),
            ImuError::NotInitialized => write!(f, "IMU not initialized"),
            ImuError::NotSupported(s) => write!(f, "Not supported: {}", s),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ImuError {}

/// A sensor-fusion IMU as seen by a polling consumer.
///
/// The expected call order is `imu_init`, then any of the setters, then
/// `poll_interval`, then repeated `imu_read`/`imu_data` pairs.
pub trait FusionImu {
    /// Brings up the device. An error means the IMU is unusable.
    fn imu_init(&mut self) -> Result<(), ImuError>;

    /// Smoothing coefficient of the fusion filter.
    fn set_slerp_power(&mut self, power: Float);

    fn set_gyro_enable(&mut self, enable: bool);

    fn set_accel_enable(&mut self, enable: bool);

    fn set_compass_enable(&mut self, enable: bool);

    /// Native sampling period in milliseconds.
    fn poll_interval(&self) -> u32;

    /// Non-blocking check for a new sample. Returns `Ok(true)` when
    /// `imu_data` holds a fresh snapshot.
    fn imu_read(&mut self) -> Result<bool, ImuError>;

    /// Snapshot captured by the last successful `imu_read`.
    fn imu_data(&self) -> ImuData;
}

impl<T: FusionImu + ?Sized> FusionImu for Box<T> {
    fn imu_init(&mut self) -> Result<(), ImuError> {
        (**self).imu_init()
    }

    fn set_slerp_power(&mut self, power: Float) {
        (**self).set_slerp_power(power)
    }

    fn set_gyro_enable(&mut self, enable: bool) {
        (**self).set_gyro_enable(enable)
    }

    fn set_accel_enable(&mut self, enable: bool) {
        (**self).set_accel_enable(enable)
    }

    fn set_compass_enable(&mut self, enable: bool) {
        (**self).set_compass_enable(enable)
    }

    fn poll_interval(&self) -> u32 {
        (**self).poll_interval()
    }

    fn imu_read(&mut self) -> Result<bool, ImuError> {
        (**self).imu_read()
    }

    fn imu_data(&self) -> ImuData {
        (**self).imu_data()
    }
}
