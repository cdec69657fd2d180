//! Weather data model and display methods

use serde::{Deserialize, Serialize};
use serde_json::Number;
use std::fmt;

/// Current conditions extracted from the weather response
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct CurrentConditions {
    /// Temperature in Celsius, kept exactly as the weather service sent it
    pub temperature: Number,
    /// Human-readable description of weather conditions
    pub description: String,
}

/// One-line weather report for a named city
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct WeatherSummary {
    /// City name as it was asked for
    pub city: String,
    /// Temperature in Celsius
    pub temperature: Number,
    pub description: String,
}

impl WeatherSummary {
    #[must_use]
    pub fn new(city: &str, conditions: CurrentConditions) -> Self {
        Self {
            city: city.to_string(),
            temperature: conditions.temperature,
            description: conditions.description,
        }
    }

    /// Temperature as the service wrote it: `20` stays `20`, `21.0` stays
    /// `21.0`, `21.37` stays `21.37`.
    #[must_use]
    pub fn format_temperature(&self) -> String {
        self.temperature.to_string()
    }
}

impl fmt::Display for WeatherSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "It's {}°C in {} with {}.",
            self.format_temperature(),
            title_case(&self.city),
            self.description
        )
    }
}

/// Upper-case the first letter of every alphabetic run, lower-case the rest
#[must_use]
pub fn title_case(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut previous_is_letter = false;

    for c in text.chars() {
        if c.is_alphabetic() {
            if previous_is_letter {
                result.extend(c.to_lowercase());
            } else {
                result.extend(c.to_uppercase());
            }
            previous_is_letter = true;
        } else {
            result.push(c);
            previous_is_letter = false;
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn summary(city: &str, temperature: &str, description: &str) -> WeatherSummary {
        WeatherSummary::new(
            city,
            CurrentConditions {
                temperature: serde_json::from_str(temperature).unwrap(),
                description: description.to_string(),
            },
        )
    }

    #[test]
    fn test_summary_template() {
        let summary = summary("pune", "27.5", "scattered clouds");
        assert_eq!(
            summary.to_string(),
            "It's 27.5°C in Pune with scattered clouds."
        );
    }

    #[test]
    fn test_whole_temperature_keeps_decimal() {
        let summary = summary("delhi", "31.0", "haze");
        assert_eq!(summary.format_temperature(), "31.0");
        assert_eq!(summary.to_string(), "It's 31.0°C in Delhi with haze.");
    }

    #[test]
    fn test_integer_temperature_has_no_decimal() {
        let summary = summary("pune", "20", "clear sky");
        assert_eq!(summary.format_temperature(), "20");
        assert_eq!(summary.to_string(), "It's 20°C in Pune with clear sky.");
    }

    #[test]
    fn test_negative_temperature() {
        let summary = summary("oslo", "-3.25", "light snow");
        assert_eq!(summary.to_string(), "It's -3.25°C in Oslo with light snow.");
    }

    #[rstest]
    #[case("pune", "Pune")]
    #[case("new york", "New York")]
    #[case("NEW DELHI", "New Delhi")]
    #[case("rio-de-janeiro", "Rio-De-Janeiro")]
    #[case("", "")]
    fn test_title_case(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(title_case(input), expected);
    }
}
