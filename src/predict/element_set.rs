use std::collections::HashMap;

use sgp4::{Constants, Elements};

use crate::predict::error::PredictError;

/// One satellite's parsed three-line element block.
pub struct ElementRecord {
    pub name: String,
    pub line1: String,
    pub line2: String,
    pub elements: Elements,
    pub constants: Constants,
}

impl ElementRecord {
    pub fn parse(name: Option<String>, line1: &str, line2: &str) -> Result<Self, PredictError> {
        let label = name.clone().unwrap_or_else(|| line1.to_string());
        let elements = Elements::from_tle(name.clone(), line1.as_bytes(), line2.as_bytes())
            .map_err(|e| PredictError::InvalidTle {
                name: label.clone(),
                message: e.to_string(),
            })?;
        let constants =
            Constants::from_elements(&elements).map_err(|e| PredictError::InvalidTle {
                name: label,
                message: e.to_string(),
            })?;

        let name = name.unwrap_or_else(|| format!("NORAD {}", elements.norad_id));

        Ok(Self {
            name,
            line1: line1.to_string(),
            line2: line2.to_string(),
            elements,
            constants,
        })
    }

    pub fn norad_id(&self) -> u64 {
        self.elements.norad_id
    }
}

/// Element records of one cache load, looked up by exact satellite name.
#[derive(Default)]
pub struct ElementSet {
    records: HashMap<String, ElementRecord>,
}

impl ElementSet {
    /// Parse the raw catalog text. Blocks that sgp4 rejects are skipped.
    pub fn parse(content: &str) -> Self {
        let mut records = HashMap::new();

        for (name, line1, line2) in parse_multi_tle(content) {
            match ElementRecord::parse(name, &line1, &line2) {
                Ok(record) => {
                    records.insert(record.name.clone(), record);
                }
                Err(e) => {
                    log::warn!("Skipping TLE block: {}", e);
                }
            }
        }

        log::debug!("Parsed {} element records", records.len());
        Self { records }
    }

    pub fn get(&self, name: &str) -> Result<&ElementRecord, PredictError> {
        self.records
            .get(name)
            .ok_or_else(|| PredictError::SatelliteNotFound(name.to_string()))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Split multi-satellite TLE text (either line ending) into
/// `(name, line1, line2)` triples.
fn parse_multi_tle(content: &str) -> Vec<(Option<String>, String, String)> {
    let lines: Vec<&str> = content
        .lines()
        .map(|l| l.trim())
        .filter(|l| !l.is_empty())
        .collect();

    let mut result = Vec::new();
    let mut i = 0;

    while i < lines.len() {
        if lines[i].starts_with("1 ") && i + 1 < lines.len() && lines[i + 1].starts_with("2 ") {
            // 2-line TLE (no name)
            result.push((None, lines[i].to_string(), lines[i + 1].to_string()));
            i += 2;
        } else if i + 2 < lines.len()
            && lines[i + 1].starts_with("1 ")
            && lines[i + 2].starts_with("2 ")
        {
            result.push((
                Some(lines[i].to_string()),
                lines[i + 1].to_string(),
                lines[i + 2].to_string(),
            ));
            i += 3;
        } else {
            i += 1;
        }
    }

    result
}


#[cfg(test)]
mod tests {
    use super::fixtures::NOAA_TLE;
    use super::*;

    #[test]
    fn parses_named_blocks_by_exact_name() {
        let set = ElementSet::parse(NOAA_TLE);
        assert_eq!(set.len(), 3);

        let record = set.get("NOAA 18").unwrap();
        assert_eq!(record.name, "NOAA 18");
        assert_eq!(record.norad_id(), 28654);
        assert!(record.line1.starts_with("1 28654U"));
        assert!(record.line2.starts_with("2 28654 "));
    }

    #[test]
    fn lookup_is_not_a_substring_match() {
        let set = ElementSet::parse(NOAA_TLE);
        assert!(matches!(
            set.get("NOAA 1"),
            Err(PredictError::SatelliteNotFound(name)) if name == "NOAA 1"
        ));
        assert!(set.get("noaa 15").is_err());
    }

    #[test]
    fn skips_noise_and_unparseable_blocks() {
        let broken = NOAA_TLE.replace("25338  98.5600", "25338  9X.5600");
        let content = format!("garbage header\n{}\ntrailing", broken);
        let set = ElementSet::parse(&content);
        assert_eq!(set.len(), 2);
        assert!(set.get("NOAA 15").is_err());
        assert!(set.get("NOAA 19").is_ok());
    }

    #[test]
    fn unnamed_blocks_use_norad_id() {
        let content = "1 33591U 09005A   24001.50000000  .00000100  00000+0  60000-4 0  9997\n\
2 33591  99.0500  50.2000 0013500 200.3000 160.0000 14.13200000760008\n";
        let set = ElementSet::parse(content);
        assert!(set.get("NORAD 33591").is_ok());
    }

    #[test]
    fn empty_input_gives_empty_set() {
        assert!(ElementSet::parse("").is_empty());
    }
}
