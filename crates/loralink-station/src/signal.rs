use std::fmt;

/// Coarse received-signal quality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SignalBand {
    Excellent,
    Good,
    Fair,
    Weak,
}

impl SignalBand {
    /// Band for a reading in dBm: above -65 excellent, above -75 good,
    /// above -85 fair, otherwise weak.
    pub fn from_dbm(dbm: i32) -> Self {
        if dbm > -65 {
            SignalBand::Excellent
        } else if dbm > -75 {
            SignalBand::Good
        } else if dbm > -85 {
            SignalBand::Fair
        } else {
            SignalBand::Weak
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            SignalBand::Excellent => "Excellent",
            SignalBand::Good => "Good",
            SignalBand::Fair => "Fair",
            SignalBand::Weak => "Weak",
        }
    }
}

impl fmt::Display for SignalBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A signal strength reading and its band.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignalReading {
    pub dbm: i32,
    pub band: SignalBand,
}

impl SignalReading {
    pub fn from_dbm(dbm: i32) -> Self {
        Self {
            dbm,
            band: SignalBand::from_dbm(dbm),
        }
    }
}

impl fmt::Display for SignalReading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} dBm - {}", self.dbm, self.band)
    }
}
