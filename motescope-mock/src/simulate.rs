use std::f64::consts::TAU;

const DAWN: (f64, f64) = (0.22, 0.28);
const DUSK: (f64, f64) = (0.72, 0.78);

const MOON_LUX: f64 = 2.0;
const SUN_LUX: f64 = 800.0;

/// 0 at night, 1 in full daylight, eased through dawn and dusk
pub fn daylight(day_fraction: f64) -> f64 {
    let rise = smoothstep(DAWN.0, DAWN.1, day_fraction);
    let set = smoothstep(DUSK.0, DUSK.1, day_fraction);

    rise * (1.0 - set)
}

/// Illuminance in lux; brightest at noon
pub fn light_lux(day_fraction: f64) -> f64 {
    let elevation = (TAU * (day_fraction - 0.25)).sin().max(0.0);

    MOON_LUX + daylight(day_fraction) * SUN_LUX * (0.3 + 0.7 * elevation)
}

/// Air temperature in Celsius, peaking mid-afternoon
pub fn temperature_celsius(day_fraction: f64) -> f64 {
    18.0 + 7.0 * (TAU * (day_fraction - 0.625)).cos()
}

/// Relative humidity in percent, falling as the air warms up
pub fn relative_humidity(day_fraction: f64) -> f64 {
    let warmth = temperature_celsius(day_fraction) - 11.0;

    (92.0 - 2.5 * warmth).clamp(20.0, 100.0)
}

fn smoothstep(edge0: f64, edge1: f64, x: f64) -> f64 {
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}
