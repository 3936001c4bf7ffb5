//! Sensor readout into the tank document
//!
//! Hardware access is not implemented; [`StubSensorReader`] stands in for the
//! GPIO-backed reader and reports a constant value for every pin.

use tracing::{debug, instrument};

use crate::{config::ConfigStore, error::ConfigError};

/// Sensor name in the `data` section and the pin it is wired to
pub const SENSOR_PINS: [(&str, u8); 8] = [
    ("water-level", 17),
    ("sludge-depth", 18),
    ("temperature", 27),
    ("soil-moisture", 22),
    ("ph", 23),
    ("methane", 24),
    ("hydrogen-sulfide", 25),
    ("ammonia", 4),
];

pub trait SensorReader {
    fn read(&mut self, sensor: &str, pin: u8) -> f64;
}

#[derive(Debug, Clone, Copy)]
pub struct StubSensorReader {
    value: f64,
}

impl StubSensorReader {
    pub fn new(value: f64) -> Self {
        Self { value }
    }
}

impl Default for StubSensorReader {
    fn default() -> Self {
        Self::new(10.0)
    }
}

impl SensorReader for StubSensorReader {
    fn read(&mut self, sensor: &str, pin: u8) -> f64 {
        debug!("reading {sensor} from pin {pin}");
        self.value
    }
}

/// Read every sensor into `data.<sensor>`. The caller decides when to save.
#[instrument(skip_all)]
pub fn sync_readings(
    store: &mut ConfigStore,
    reader: &mut impl SensorReader,
) -> Result<(), ConfigError> {
    for (sensor, pin) in SENSOR_PINS {
        let value = reader.read(sensor, pin);
        store.set_reading(sensor, value)?;
    }
    Ok(())
}
