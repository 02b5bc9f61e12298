//! Normalized thickness keys
//!
//! Lookup tables are keyed by thickness written either as inches with two
//! decimals (`"1.50"`) or as whole millimeters (`"15MM"`). A [`ThicknessKey`]
//! keeps the normalized key together with the thickness in inches so a
//! table miss can always fall back to a formula.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::units::{in_to_mm, mm_to_in};

/// Normalized thickness key plus its value in inches
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThicknessKey {
    key: String,
    inches: f64,
}

impl ThicknessKey {
    /// Key for a thickness given in inches, e.g. `1.5` -> `"1.50"`
    pub fn from_inches(inches: f64) -> Self {
        Self {
            key: format!("{:.2}", inches),
            inches,
        }
    }

    /// Key for a thickness given in millimeters, e.g. `15` -> `"15MM"`
    pub fn from_mm(mm: f64) -> Self {
        let key = if (mm - mm.round()).abs() < 1e-9 {
            format!("{}MM", mm.round() as i64)
        } else {
            format!("{:.1}MM", mm)
        };
        Self {
            key,
            inches: mm_to_in(mm),
        }
    }

    /// The normalized table key
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Thickness in inches
    pub fn inches(&self) -> f64 {
        self.inches
    }

    /// Thickness in millimeters
    pub fn mm(&self) -> f64 {
        in_to_mm(self.inches)
    }

    /// Whether the key is written in millimeters
    pub fn is_metric(&self) -> bool {
        self.key.ends_with("MM")
    }
}

impl fmt::Display for ThicknessKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key)
    }
}

impl FromStr for ThicknessKey {
    type Err = String;

    /// Accepts `15MM`, `15mm`, `15 mm`, `1.5`, `1.50`, `1.5in`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let compact: String = s.split_whitespace().collect::<String>().to_uppercase();
        if compact.is_empty() {
            return Err("Empty thickness".to_string());
        }

        let (number, metric) = if let Some(n) = compact.strip_suffix("MM") {
            (n, true)
        } else if let Some(n) = compact.strip_suffix("IN") {
            (n, false)
        } else if let Some(n) = compact.strip_suffix('"') {
            (n, false)
        } else {
            (compact.as_str(), false)
        };

        let value: f64 = number
            .parse()
            .map_err(|_| format!("Invalid thickness: {}", s))?;
        if !value.is_finite() || value <= 0.0 {
            return Err(format!("Thickness must be > 0: {}", s));
        }

        Ok(if metric {
            Self::from_mm(value)
        } else {
            Self::from_inches(value)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_imperial_keys() {
        assert_eq!(ThicknessKey::from_inches(1.5).key(), "1.50");
        assert_eq!("1.5".parse::<ThicknessKey>().unwrap().key(), "1.50");
        assert_eq!("0.75in".parse::<ThicknessKey>().unwrap().key(), "0.75");
        assert!(!ThicknessKey::from_inches(2.0).is_metric());
    }

    #[test]
    fn test_metric_keys() {
        let key: ThicknessKey = "15mm".parse().unwrap();
        assert_eq!(key.key(), "15MM");
        assert!(key.is_metric());
        assert!((key.inches() - 15.0 / 25.4).abs() < 1e-12);
        assert_eq!("12.5 MM".parse::<ThicknessKey>().unwrap().key(), "12.5MM");
    }

    #[test]
    fn test_invalid_keys() {
        assert!("".parse::<ThicknessKey>().is_err());
        assert!("abc".parse::<ThicknessKey>().is_err());
        assert!("0".parse::<ThicknessKey>().is_err());
        assert!("-1.0".parse::<ThicknessKey>().is_err());
    }
}
