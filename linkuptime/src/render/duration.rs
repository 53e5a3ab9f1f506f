use std::fmt;
use strum::IntoStaticStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, IntoStaticStr)]
#[strum(serialize_all = "lowercase")]
pub enum DurationUnit {
    Week,
    Day,
    Hour,
    Minute,
}

impl DurationUnit {
    pub fn seconds(self) -> u64 {
        match self {
            Self::Week => 604800,
            Self::Day => 86400,
            Self::Hour => 3600,
            Self::Minute => 60,
        }
    }

    pub fn name(self) -> &'static str {
        self.into()
    }
}

/// Reduce a number of seconds to the coarsest whole unit, rounding down.
/// Anything under an hour is expressed in minutes, including zero.
pub fn simplify(secs: u64) -> (u64, DurationUnit) {
    let unit = [DurationUnit::Week, DurationUnit::Day, DurationUnit::Hour]
        .into_iter()
        .find(|unit| secs >= unit.seconds())
        .unwrap_or(DurationUnit::Minute);

    (secs / unit.seconds(), unit)
}

/// Formats as e.g. `1 hour` or `3 weeks`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayDuration(pub u64);

impl fmt::Display for DisplayDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (amount, unit) = simplify(self.0);
        let plural = if amount == 1 { "" } else { "s" };
        write!(f, "{} {}{}", amount, unit.name(), plural)
    }
}

/// Hue for a link that has been up for `secs` seconds: 0 (red) for a brand
/// new link, tending towards 0.3 (green) as it ages.
pub fn hue(secs: u64) -> f64 {
    0.3 - 0.3 * 0.999998_f64.powf(secs as f64)
}

/// A hue as written into a colour attribute. Whole numbers keep their decimal
/// point, so a new link reads `0.0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplayHue(pub f64);

impl fmt::Display for DisplayHue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.fract() == 0.0 {
            write!(f, "{:.1}", self.0)
        } else {
            write!(f, "{}", self.0)
        }
    }
}
