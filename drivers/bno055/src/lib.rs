mod registers;
use byteorder::{ByteOrder, LittleEndian};
use i2cdev::core::I2CDevice;
pub use imu_traits::{Float, ImuError, Quaternion, Vector3};
use log::{debug, error};
use num_traits::FromPrimitive;
use registers::{
    Register, ACCEL_LSB_PER_MS2, EULER_LSB_PER_DEG, GYRO_LSB_PER_DPS, MAG_LSB_PER_UT, PAGE_0,
    QUATERNION_LSB, SYS_TRIGGER_RST_SYS,
};
pub use registers::{OperationMode, ALTERNATE_I2C_ADDR, CHIP_ID, DEFAULT_I2C_ADDR};
use std::thread;
use std::time::Duration;

#[cfg(target_os = "linux")]
pub use i2cdev::linux::LinuxI2CDevice;

const RESET_SETTLE: Duration = Duration::from_millis(650);
const MODE_SWITCH_SETTLE: Duration = Duration::from_millis(20);

fn bus_error<E: std::error::Error>(err: E) -> ImuError {
    ImuError::DeviceError(err.to_string())
}

/// Orientation from the fusion engine, in degrees.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct EulerAngles {
    pub heading: Float,
    pub roll: Float,
    pub pitch: Float,
}

/// Opens `/dev/i2c-<bus>` at `address`.
#[cfg(target_os = "linux")]
pub fn open_linux(bus: u8, address: u16) -> Result<LinuxI2CDevice, ImuError> {
    let path = format!("/dev/i2c-{}", bus);
    LinuxI2CDevice::new(&path, address).map_err(bus_error)
}

/// Reads the chip id register without touching any other state.
pub fn is_present<D: I2CDevice>(i2c: &mut D) -> bool {
    matches!(
        i2c.smbus_read_byte_data(Register::ChipId.addr()),
        Ok(CHIP_ID)
    )
}

pub struct Bno055<D> {
    i2c: D,
    mode: OperationMode,
}

impl<D: I2CDevice> Bno055<D> {
    /// Takes ownership of an I2C device already bound to the BNO055 address,
    /// verifies the chip, resets it and leaves it in CONFIG mode.
    pub fn new(i2c: D) -> Result<Self, ImuError> {
        let mut bno = Bno055 {
            i2c,
            mode: OperationMode::Config,
        };

        bno.write(Register::PageId, PAGE_0)?;
        bno.verify_chip_id()?;
        bno.reset()?;
        bno.write(Register::OprMode, OperationMode::Config as u8)?;
        thread::sleep(MODE_SWITCH_SETTLE);

        debug!("BNO055 ready in CONFIG mode");
        Ok(bno)
    }

    fn read(&mut self, register: Register) -> Result<u8, ImuError> {
        self.i2c
            .smbus_read_byte_data(register.addr())
            .map_err(bus_error)
    }

    fn write(&mut self, register: Register, value: u8) -> Result<(), ImuError> {
        self.i2c
            .smbus_write_byte_data(register.addr(), value)
            .map_err(bus_error)
    }

    /// Reads `N` consecutive registers starting at `register`.
    fn read_block<const N: usize>(&mut self, register: Register) -> Result<[u8; N], ImuError> {
        let mut buf = [0u8; N];
        for (offset, byte) in buf.iter_mut().enumerate() {
            *byte = self
                .i2c
                .smbus_read_byte_data(register.addr() + offset as u8)
                .map_err(bus_error)?;
        }
        Ok(buf)
    }

    fn read_vector(&mut self, register: Register, lsb_per_unit: Float) -> Result<Vector3, ImuError> {
        let buf: [u8; 6] = self.read_block(register)?;
        Ok(Vector3 {
            x: LittleEndian::read_i16(&buf[0..2]) as Float / lsb_per_unit,
            y: LittleEndian::read_i16(&buf[2..4]) as Float / lsb_per_unit,
            z: LittleEndian::read_i16(&buf[4..6]) as Float / lsb_per_unit,
        })
    }

    fn verify_chip_id(&mut self) -> Result<(), ImuError> {
        let chip_id = self.read(Register::ChipId)?;
        if chip_id != CHIP_ID {
            error!("Invalid chip ID. Expected {:#x}, got {:#x}", CHIP_ID, chip_id);
            return Err(ImuError::DeviceError("Invalid chip ID".to_string()));
        }
        Ok(())
    }

    pub fn reset(&mut self) -> Result<(), ImuError> {
        self.write(Register::SysTrigger, SYS_TRIGGER_RST_SYS)?;
        thread::sleep(RESET_SETTLE);
        self.mode = OperationMode::Config;
        Ok(())
    }

    /// Mode last written by this driver.
    pub fn mode(&self) -> OperationMode {
        self.mode
    }

    /// Mode as reported by the chip.
    pub fn operation_mode(&mut self) -> Result<OperationMode, ImuError> {
        let raw = self.read(Register::OprMode)? & 0x0F;
        OperationMode::from_u8(raw)
            .ok_or_else(|| ImuError::ReadError(format!("unknown operation mode {:#x}", raw)))
    }

    /// Switches operation mode. Changing between two non-CONFIG modes passes
    /// through CONFIG as the chip requires.
    pub fn set_mode(&mut self, mode: OperationMode) -> Result<(), ImuError> {
        if self.mode != OperationMode::Config && mode != OperationMode::Config {
            self.write(Register::OprMode, OperationMode::Config as u8)?;
            thread::sleep(MODE_SWITCH_SETTLE);
        }
        self.write(Register::OprMode, mode as u8)?;
        thread::sleep(MODE_SWITCH_SETTLE);
        debug!("BNO055 mode {:?} -> {:?}", self.mode, mode);
        self.mode = mode;
        Ok(())
    }

    /// Fused orientation. Only meaningful in a fusion mode.
    pub fn euler_angles(&mut self) -> Result<EulerAngles, ImuError> {
        let v = self.read_vector(Register::EulerData, EULER_LSB_PER_DEG)?;
        Ok(EulerAngles {
            heading: v.x,
            roll: v.y,
            pitch: v.z,
        })
    }

    /// Fused orientation as a unit quaternion.
    pub fn quaternion(&mut self) -> Result<Quaternion, ImuError> {
        let buf: [u8; 8] = self.read_block(Register::QuaternionData)?;
        Ok(Quaternion {
            w: LittleEndian::read_i16(&buf[0..2]) as Float / QUATERNION_LSB,
            x: LittleEndian::read_i16(&buf[2..4]) as Float / QUATERNION_LSB,
            y: LittleEndian::read_i16(&buf[4..6]) as Float / QUATERNION_LSB,
            z: LittleEndian::read_i16(&buf[6..8]) as Float / QUATERNION_LSB,
        })
    }

    /// m/s², gravity included.
    pub fn accelerometer(&mut self) -> Result<Vector3, ImuError> {
        self.read_vector(Register::AccelData, ACCEL_LSB_PER_MS2)
    }

    /// °/s
    pub fn gyroscope(&mut self) -> Result<Vector3, ImuError> {
        self.read_vector(Register::GyroData, GYRO_LSB_PER_DPS)
    }

    /// µT
    pub fn magnetometer(&mut self) -> Result<Vector3, ImuError> {
        self.read_vector(Register::MagData, MAG_LSB_PER_UT)
    }

    /// °C
    pub fn temperature(&mut self) -> Result<i8, ImuError> {
        Ok(self.read(Register::Temperature)? as i8)
    }

    /// Bits 7-6 system, 5-4 gyroscope, 3-2 accelerometer, 1-0 magnetometer.
    /// For each, 0 = uncalibrated and 3 = fully calibrated.
    pub fn calibration_status(&mut self) -> Result<u8, ImuError> {
        self.read(Register::CalibStat)
    }

    pub fn release(self) -> D {
        self.i2c
    }
}
