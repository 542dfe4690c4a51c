pub mod calibration;
pub mod mapper;
pub mod primitives;
pub mod types;

pub use calibration::{AxisCalibration, ChartCalibration};
pub use mapper::logical_coordinates;
pub use primitives::{TICKS_AT_UNIX_EPOCH, datetime_to_ticks, ticks_to_datetime};
pub use types::{Axis, ChangeSign, Observation, PixelPoint};
