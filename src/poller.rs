use crate::interrupt::Interrupt;
use crate::orientation::{Orientation, PITCH_OFFSET_DEG};
use imu_traits::{Float, FusionImu, ImuError};
use log::{debug, error, info};
use std::io::{self, Write};
use std::thread;
use std::time::Duration;
use thiserror::Error;

/// Name of the IMU settings file, without extension.
pub const SETTINGS_NAME: &str = "RTIMULib";

pub const INIT_FAILED_MESSAGE: &str = "IMU Init Failed";

/// Fusion parameters applied to the IMU before polling starts.
#[derive(Debug, Clone, PartialEq)]
pub struct PollerConfig {
    pub slerp_power: Float,
    pub gyro_enable: bool,
    pub accel_enable: bool,
    pub compass_enable: bool,
    /// Added to the pitch angle, in degrees
    pub pitch_offset: f64,
}

impl Default for PollerConfig {
    fn default() -> Self {
        PollerConfig {
            slerp_power: 0.02,
            gyro_enable: true,
            accel_enable: true,
            compass_enable: false,
            pitch_offset: PITCH_OFFSET_DEG,
        }
    }
}

#[derive(Debug, Error)]
pub enum PollerError {
    #[error("IMU error: {0}")]
    Imu(#[from] ImuError),
    #[error("failed to write output: {0}")]
    Output(#[from] io::Error),
    #[error("IMU reported a poll interval of {0} ms, expected a positive value")]
    InvalidPollInterval(u32),
}

/// Reads fused orientation from an IMU and prints it once per sample.
pub struct OrientationPoller<I> {
    imu: I,
    config: PollerConfig,
    poll_interval: Duration,
}

impl<I: FusionImu> OrientationPoller<I> {
    /// Initializes and configures `imu`, then prints its poll interval.
    ///
    /// Returns `Ok(None)` after printing [`INIT_FAILED_MESSAGE`] when the
    /// IMU fails to initialize; that is a normal outcome, not an error.
    pub fn start<W: Write>(
        mut imu: I,
        config: PollerConfig,
        out: &mut W,
    ) -> Result<Option<Self>, PollerError> {
        if let Err(e) = imu.imu_init() {
            error!("IMU initialization failed: {}", e);
            writeln!(out, "{}", INIT_FAILED_MESSAGE)?;
            out.flush()?;
            return Ok(None);
        }

        imu.set_slerp_power(config.slerp_power);
        imu.set_gyro_enable(config.gyro_enable);
        imu.set_accel_enable(config.accel_enable);
        imu.set_compass_enable(config.compass_enable);
        debug!("IMU configured: {:?}", config);

        let interval_ms = imu.poll_interval();
        if interval_ms == 0 {
            return Err(PollerError::InvalidPollInterval(interval_ms));
        }
        writeln!(out, "Poll Interval: {} ms", interval_ms)?;
        out.flush()?;

        Ok(Some(OrientationPoller {
            imu,
            config,
            poll_interval: Duration::from_millis(interval_ms as u64),
        }))
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    pub fn imu(&self) -> &I {
        &self.imu
    }

    pub fn imu_mut(&mut self) -> &mut I {
        &mut self.imu
    }

    pub fn into_imu(self) -> I {
        self.imu
    }

    /// Prints one line if the IMU has a new sample. Never sleeps.
    pub fn poll_once<W: Write>(&mut self, out: &mut W) -> Result<Option<Orientation>, PollerError> {
        if !self.imu.imu_read()? {
            return Ok(None);
        }
        let data = self.imu.imu_data();
        let orientation = Orientation::from_fusion_pose(data.fusion_pose, self.config.pitch_offset);
        writeln!(out, "{}", orientation)?;
        out.flush()?;
        Ok(Some(orientation))
    }

    /// Polls until `interrupt` is raised and returns the number of lines
    /// printed. After each printed sample the loop waits one poll interval;
    /// when no sample is ready it retries immediately.
    pub fn run<W: Write>(&mut self, out: &mut W, interrupt: &Interrupt) -> Result<u64, PollerError> {
        let mut printed = 0;
        loop {
            if interrupt.is_raised() {
                break;
            }
            match self.poll_once(out)? {
                Some(_) => {
                    printed += 1;
                    if interrupt.wait(self.poll_interval) {
                        break;
                    }
                }
                None => thread::yield_now(),
            }
        }
        info!("Polling stopped after {} samples", printed);
        Ok(printed)
    }
}
