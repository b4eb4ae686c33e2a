use imu_traits::Float;
use std::f64::consts::PI;
use std::fmt;

/// Fixed pitch correction for the sensor's mounting, in degrees.
pub const PITCH_OFFSET_DEG: f64 = -90.0;

pub fn degrees(radians: f64) -> f64 {
    radians * 180.0 / PI
}

/// Roll, pitch and yaw in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Orientation {
    pub roll: f64,
    pub pitch: f64,
    pub yaw: f64,
}

impl Orientation {
    /// `pose` is the fused `[pitch, roll, yaw]` in radians.
    pub fn from_fusion_pose(pose: [Float; 3], pitch_offset: f64) -> Self {
        Orientation {
            roll: degrees(pose[1] as f64),
            pitch: degrees(pose[0] as f64) + pitch_offset,
            yaw: degrees(pose[2] as f64),
        }
    }
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Roll: {:.2} degrees, Pitch: {:.2} degrees, Yaw: {:.2} degrees",
            self.roll, self.pitch, self.yaw
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn radians_to_degrees() {
        for r in [0.0, 1.0, -1.0, PI, -PI / 3.0, 12.345, 1e-6] {
            assert!((degrees(r) - r * 180.0 / PI).abs() < 1e-9);
        }
        assert!((degrees(PI) - 180.0).abs() < 1e-9);
        assert!((degrees(PI / 2.0) - 90.0).abs() < 1e-9);
    }

    #[test]
    fn level_pose_shows_pitch_offset() {
        let o = Orientation::from_fusion_pose([0.0, 0.0, 0.0], PITCH_OFFSET_DEG);
        assert_eq!(
            o.to_string(),
            "Roll: 0.00 degrees, Pitch: -90.00 degrees, Yaw: 0.00 degrees"
        );
    }

    #[test]
    fn axes_map_from_pitch_roll_yaw_order() {
        let half_pi = std::f32::consts::FRAC_PI_2 as Float;
        let pi = std::f32::consts::PI as Float;
        let o = Orientation::from_fusion_pose([half_pi, half_pi, pi], PITCH_OFFSET_DEG);
        assert!((o.roll - 90.0).abs() < 1e-4);
        assert!(o.pitch.abs() < 1e-4);
        assert!((o.yaw - 180.0).abs() < 1e-4);
        assert_eq!(
            o.to_string(),
            "Roll: 90.00 degrees, Pitch: 0.00 degrees, Yaw: 180.00 degrees"
        );
    }

    #[test]
    fn always_two_decimals() {
        let o = Orientation {
            roll: 1234.5,
            pitch: -7.0,
            yaw: 0.126,
        };
        assert_eq!(
            o.to_string(),
            "Roll: 1234.50 degrees, Pitch: -7.00 degrees, Yaw: 0.13 degrees"
        );
    }
}
