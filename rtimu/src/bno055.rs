use i2cdev::core::I2CDevice;
use imu_traits::{Float, FusionImu, ImuData, ImuError};
use linux_bno055::{Bno055, OperationMode};
use log::{debug, info, warn};
use std::time::{Duration, Instant};

/// Produces a bus device bound to the chip. Called once per `imu_init`.
pub type Opener<D> = Box<dyn FnMut() -> Result<D, ImuError>>;

/// Operation mode for a set of enabled sensors.
pub fn fusion_mode(gyro: bool, accel: bool, compass: bool) -> OperationMode {
    match (gyro, accel, compass) {
        (true, true, true) => OperationMode::Ndof,
        (true, true, false) => OperationMode::Imu,
        (false, true, true) => OperationMode::Compass,
        (true, false, true) => OperationMode::MagGyro,
        (true, false, false) => OperationMode::GyrOnly,
        (false, true, false) => OperationMode::AccOnly,
        (false, false, true) => OperationMode::MagOnly,
        (false, false, false) => OperationMode::Config,
    }
}

/// BNO055 behind the `FusionImu` interface. The chip fuses on-board, so
/// the fused pose comes straight from its Euler registers.
pub struct Bno055Imu<D> {
    opener: Opener<D>,
    bno: Option<Bno055<D>>,
    poll_interval_ms: u32,
    slerp_power: Float,
    gyro_enable: bool,
    accel_enable: bool,
    compass_enable: bool,
    mode_dirty: bool,
    started: Option<Instant>,
    last_sample: Option<Instant>,
    data: ImuData,
}

#[cfg(target_os = "linux")]
impl Bno055Imu<linux_bno055::LinuxI2CDevice> {
    pub fn linux(bus: u8, address: u16, poll_interval_ms: u32) -> Self {
        Self::new(
            Box::new(move || linux_bno055::open_linux(bus, address)),
            poll_interval_ms,
        )
    }
}

impl<D: I2CDevice> Bno055Imu<D> {
    pub fn new(opener: Opener<D>, poll_interval_ms: u32) -> Self {
        Bno055Imu {
            opener,
            bno: None,
            poll_interval_ms,
            slerp_power: 0.02,
            gyro_enable: true,
            accel_enable: true,
            compass_enable: true,
            mode_dirty: true,
            started: None,
            last_sample: None,
            data: ImuData::default(),
        }
    }

    pub fn slerp_power(&self) -> Float {
        self.slerp_power
    }

    /// Mode the chip is running in, `None` before `imu_init`.
    pub fn operation_mode(&self) -> Option<OperationMode> {
        self.bno.as_ref().map(|bno| bno.mode())
    }

    fn update_flag(current: &mut bool, enable: bool, dirty: &mut bool) {
        if *current != enable {
            *current = enable;
            *dirty = true;
        }
    }

    fn apply_mode(&mut self) -> Result<(), ImuError> {
        let mode = fusion_mode(self.gyro_enable, self.accel_enable, self.compass_enable);
        if mode == OperationMode::Config {
            warn!("All BNO055 sensors disabled, no samples will be produced");
        }
        let bno = self.bno.as_mut().ok_or(ImuError::NotInitialized)?;
        if bno.mode() != mode {
            bno.set_mode(mode)?;
        }
        self.mode_dirty = false;
        Ok(())
    }

    fn sample(&mut self, started: Instant) -> Result<ImuData, ImuError> {
        let (gyro, accel, compass) = (self.gyro_enable, self.accel_enable, self.compass_enable);
        let bno = self.bno.as_mut().ok_or(ImuError::NotInitialized)?;

        let mut data = ImuData {
            timestamp_us: started.elapsed().as_micros() as u64,
            ..Default::default()
        };

        if bno.mode().is_fusion() {
            let euler = bno.euler_angles()?;
            data.fusion_pose = [
                euler.pitch.to_radians(),
                euler.roll.to_radians(),
                euler.heading.to_radians(),
            ];
            data.fusion_q_pose = Some(bno.quaternion()?);
        }
        if gyro {
            data.gyroscope = Some(bno.gyroscope()?);
        }
        if accel {
            data.accelerometer = Some(bno.accelerometer()?);
        }
        if compass {
            data.magnetometer = Some(bno.magnetometer()?);
        }

        match bno.temperature() {
            Ok(temp) => data.temperature = Some(temp as f32),
            Err(e) => warn!("Failed to get temperature: {}", e),
        }
        match bno.calibration_status() {
            Ok(status) => data.calibration_status = Some(status),
            Err(e) => warn!("Failed to get calibration status: {}", e),
        }

        Ok(data)
    }
}

impl<D: I2CDevice> FusionImu for Bno055Imu<D> {
    fn imu_init(&mut self) -> Result<(), ImuError> {
        let device = (self.opener)()?;
        let bno = Bno055::new(device)?;
        info!("BNO055 initialized, poll interval {} ms", self.poll_interval_ms);

        self.bno = Some(bno);
        self.started = Some(Instant::now());
        self.last_sample = None;
        self.mode_dirty = true;
        Ok(())
    }

    fn set_slerp_power(&mut self, power: Float) {
        debug!(
            "Slerp power {} recorded; BNO055 fusion runs on-chip and does not use it",
            power
        );
        self.slerp_power = power;
    }

    fn set_gyro_enable(&mut self, enable: bool) {
        Self::update_flag(&mut self.gyro_enable, enable, &mut self.mode_dirty);
    }

    fn set_accel_enable(&mut self, enable: bool) {
        Self::update_flag(&mut self.accel_enable, enable, &mut self.mode_dirty);
    }

    fn set_compass_enable(&mut self, enable: bool) {
        Self::update_flag(&mut self.compass_enable, enable, &mut self.mode_dirty);
    }

    fn poll_interval(&self) -> u32 {
        self.poll_interval_ms
    }

    fn imu_read(&mut self) -> Result<bool, ImuError> {
        let started = self.started.ok_or(ImuError::NotInitialized)?;
        let now = Instant::now();

        if let Some(last) = self.last_sample {
            if now.duration_since(last) < Duration::from_millis(self.poll_interval_ms as u64) {
                return Ok(false);
            }
        }

        if self.mode_dirty {
            self.apply_mode()?;
        }
        // Outside a fusion mode the chip has no pose to report.
        if !self.operation_mode().map_or(false, OperationMode::is_fusion) {
            return Ok(false);
        }

        self.data = self.sample(started)?;
        self.last_sample = Some(now);
        Ok(true)
    }

    fn imu_data(&self) -> ImuData {
        self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use i2cdev::mock::MockI2CDevice;
    use pretty_assertions::assert_eq;

    const CHIP_ID_REG: usize = 0x00;
    const EULER_REG: usize = 0x1A;

    fn mock_chip() -> MockI2CDevice {
        let mut dev = MockI2CDevice::new();
        dev.regmap.write_regs(CHIP_ID_REG, &[linux_bno055::CHIP_ID]);
        // heading 90°, roll -45°, pitch 10°
        dev.regmap
            .write_regs(EULER_REG, &[0xA0, 0x05, 0x30, 0xFD, 0xA0, 0x00]);
        dev
    }

    fn imu(poll_interval_ms: u32) -> Bno055Imu<MockI2CDevice> {
        Bno055Imu::new(Box::new(|| Ok(mock_chip())), poll_interval_ms)
    }

    #[test]
    fn mode_follows_enabled_sensors() {
        assert_eq!(fusion_mode(true, true, false), OperationMode::Imu);
        assert_eq!(fusion_mode(true, true, true), OperationMode::Ndof);
        assert_eq!(fusion_mode(false, true, true), OperationMode::Compass);
        assert_eq!(fusion_mode(false, false, false), OperationMode::Config);
    }

    #[test]
    fn init_fails_when_device_cannot_be_opened() {
        let mut imu: Bno055Imu<MockI2CDevice> = Bno055Imu::new(
            Box::new(|| Err(ImuError::DeviceError("No such file or directory".into()))),
            10,
        );
        assert!(imu.imu_init().is_err());
        assert_eq!(imu.imu_read(), Err(ImuError::NotInitialized));
    }

    #[test]
    fn init_fails_on_wrong_chip() {
        let mut imu: Bno055Imu<MockI2CDevice> =
            Bno055Imu::new(Box::new(|| Ok(MockI2CDevice::new())), 10);
        assert!(imu.imu_init().is_err());
        assert_eq!(imu.operation_mode(), None);
    }

    #[test]
    fn read_produces_fused_pose_in_radians() {
        let mut imu = imu(60_000);
        imu.imu_init().unwrap();
        imu.set_slerp_power(0.02);
        imu.set_gyro_enable(true);
        imu.set_accel_enable(true);
        imu.set_compass_enable(false);
        assert_eq!(imu.slerp_power(), 0.02);

        assert_eq!(imu.imu_read(), Ok(true));
        assert_eq!(imu.operation_mode(), Some(OperationMode::Imu));

        let data = imu.imu_data();
        let expected: [Float; 3] = [
            (10.0 as Float).to_radians(),
            (-45.0 as Float).to_radians(),
            (90.0 as Float).to_radians(),
        ];
        for (got, want) in data.fusion_pose.iter().zip(expected.iter()) {
            assert!((got - want).abs() < 1e-6, "{} != {}", got, want);
        }
        assert!(data.gyroscope.is_some());
        assert!(data.accelerometer.is_some());
        assert!(data.magnetometer.is_none());
        assert!(data.fusion_q_pose.is_some());
    }

    #[test]
    fn no_new_sample_within_poll_interval() {
        let mut imu = imu(60_000);
        imu.imu_init().unwrap();
        assert_eq!(imu.imu_read(), Ok(true));
        assert_eq!(imu.imu_read(), Ok(false));
    }

    #[test]
    fn no_sample_without_fusion_mode() {
        let mut imu = imu(0);
        imu.imu_init().unwrap();
        imu.set_gyro_enable(false);
        imu.set_compass_enable(false);

        assert_eq!(imu.imu_read(), Ok(false));
        assert_eq!(imu.operation_mode(), Some(OperationMode::AccOnly));
        assert_eq!(imu.imu_data(), ImuData::default());

        imu.set_gyro_enable(true);
        assert_eq!(imu.imu_read(), Ok(true));
        assert_eq!(imu.operation_mode(), Some(OperationMode::Imu));
    }

    #[test]
    fn flag_change_reapplies_mode() {
        let mut imu = imu(0);
        imu.imu_init().unwrap();
        imu.set_compass_enable(false);
        assert_eq!(imu.imu_read(), Ok(true));
        assert_eq!(imu.operation_mode(), Some(OperationMode::Imu));

        imu.set_compass_enable(true);
        assert_eq!(imu.imu_read(), Ok(true));
        assert_eq!(imu.operation_mode(), Some(OperationMode::Ndof));
    }
}
