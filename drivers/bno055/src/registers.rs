use imu_traits::Float;
use num_derive::{FromPrimitive, ToPrimitive};

/// Page 0 registers used by the driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Register {
    ChipId = 0x00,
    PageId = 0x07,
    /// First of six bytes: X, Y, Z little-endian
    AccelData = 0x08,
    MagData = 0x0E,
    GyroData = 0x14,
    /// Heading, roll, pitch
    EulerData = 0x1A,
    /// W, X, Y, Z
    QuaternionData = 0x20,
    Temperature = 0x34,
    CalibStat = 0x35,
    OprMode = 0x3D,
    SysTrigger = 0x3F,
}

impl Register {
    pub fn addr(self) -> u8 {
        self as u8
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, FromPrimitive, ToPrimitive)]
pub enum OperationMode {
    Config = 0x00,
    AccOnly = 0x01,
    MagOnly = 0x02,
    GyrOnly = 0x03,
    AccMag = 0x04,
    AccGyro = 0x05,
    MagGyro = 0x06,
    Amg = 0x07,
    Imu = 0x08,
    Compass = 0x09,
    M4g = 0x0A,
    NdofFmcOff = 0x0B,
    Ndof = 0x0C,
}

impl OperationMode {
    /// True for the modes where the chip runs its fusion engine and the
    /// Euler/quaternion registers carry orientation.
    pub fn is_fusion(self) -> bool {
        matches!(
            self,
            OperationMode::Imu
                | OperationMode::Compass
                | OperationMode::M4g
                | OperationMode::NdofFmcOff
                | OperationMode::Ndof
        )
    }
}

pub const CHIP_ID: u8 = 0xA0;
pub const DEFAULT_I2C_ADDR: u16 = 0x28;
pub const ALTERNATE_I2C_ADDR: u16 = 0x29;
pub const SYS_TRIGGER_RST_SYS: u8 = 0x20;
pub const PAGE_0: u8 = 0x00;

/// LSB per unit with the power-on unit selection.
pub const EULER_LSB_PER_DEG: Float = 16.0;
pub const QUATERNION_LSB: Float = (1 << 14) as Float;
pub const ACCEL_LSB_PER_MS2: Float = 100.0;
pub const GYRO_LSB_PER_DPS: Float = 16.0;
pub const MAG_LSB_PER_UT: Float = 16.0;
