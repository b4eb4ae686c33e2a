//! Polls a sensor-fusion IMU and prints roll, pitch and yaw in degrees.

pub mod interrupt;
pub mod orientation;
pub mod poller;

pub use imu_traits::*;
pub use interrupt::Interrupt;
pub use orientation::{degrees, Orientation, PITCH_OFFSET_DEG};
pub use poller::{
    OrientationPoller, PollerConfig, PollerError, INIT_FAILED_MESSAGE, SETTINGS_NAME,
};
pub use rtimu::{create_imu, ImuType, NullImu, Settings, SettingsError};
