use imu_traits::{Float, FusionImu, ImuData, ImuError};
use log::debug;

pub const NULL_POLL_INTERVAL_MS: u32 = 100;

/// IMU without hardware. The application feeds samples with
/// [`NullImu::set_imu_data`] and each one is reported by exactly one
/// `imu_read`.
#[derive(Debug, Default)]
pub struct NullImu {
    initialized: bool,
    pending: Option<ImuData>,
    data: ImuData,
    slerp_power: Float,
}

impl NullImu {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_imu_data(&mut self, data: ImuData) {
        self.pending = Some(data);
    }

    pub fn slerp_power(&self) -> Float {
        self.slerp_power
    }
}

impl FusionImu for NullImu {
    fn imu_init(&mut self) -> Result<(), ImuError> {
        debug!("Null IMU initialized");
        self.initialized = true;
        Ok(())
    }

    fn set_slerp_power(&mut self, power: Float) {
        self.slerp_power = power;
    }

    fn set_gyro_enable(&mut self, _enable: bool) {}

    fn set_accel_enable(&mut self, _enable: bool) {}

    fn set_compass_enable(&mut self, _enable: bool) {}

    fn poll_interval(&self) -> u32 {
        NULL_POLL_INTERVAL_MS
    }

    fn imu_read(&mut self) -> Result<bool, ImuError> {
        if !self.initialized {
            return Err(ImuError::NotInitialized);
        }
        match self.pending.take() {
            Some(data) => {
                self.data = data;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn imu_data(&self) -> ImuData {
        self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_before_init_fails() {
        let mut imu = NullImu::new();
        assert_eq!(imu.imu_read(), Err(ImuError::NotInitialized));
    }

    #[test]
    fn each_pushed_sample_is_read_once() {
        let mut imu = NullImu::new();
        imu.imu_init().unwrap();
        assert_eq!(imu.imu_read(), Ok(false));

        imu.set_imu_data(ImuData {
            fusion_pose: [0.1, 0.2, 0.3],
            ..Default::default()
        });
        assert_eq!(imu.imu_read(), Ok(true));
        assert_eq!(imu.imu_data().fusion_pose, [0.1, 0.2, 0.3]);
        assert_eq!(imu.imu_read(), Ok(false));
        // snapshot stays until the next sample
        assert_eq!(imu.imu_data().fusion_pose, [0.1, 0.2, 0.3]);
    }

    #[test]
    fn records_slerp_power() {
        let mut imu = NullImu::new();
        imu.set_slerp_power(0.02);
        assert_eq!(imu.slerp_power(), 0.02);
        assert_eq!(imu.poll_interval(), NULL_POLL_INTERVAL_MS);
    }
}
