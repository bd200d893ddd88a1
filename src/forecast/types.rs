use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A forecast as returned by the 5 day / 3 hour endpoint.
///
/// `T` is the list item type, so the same envelope carries either the raw
/// points or their daily summaries. Fields this service does not read are
/// kept in `extra` and survive a round trip unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastResponse<T = ForecastPoint> {
    pub cod: Value,
    #[serde(default = "Vec::new")]
    pub list: Vec<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<ForecastCity>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl<T> ForecastResponse<T> {
    pub fn map_list<U, F>(self, f: F) -> ForecastResponse<U>
    where
        F: FnOnce(Vec<T>) -> Vec<U>,
    {
        ForecastResponse {
            cod: self.cod,
            list: f(self.list),
            city: self.city,
            extra: self.extra,
        }
    }
}

/// The embedded status as a number. The API sends `"200"` on success and a
/// bare number such as `401` on errors.
pub fn embedded_status(cod: &Value) -> Option<i64> {
    match cod {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    pub dt: i64,
    pub main: ForecastMain,
    #[serde(default)]
    pub weather: Vec<ForecastWeather>,
    pub dt_txt: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Temperatures are in Kelvin; the request carries no `units` parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastMain {
    pub temp: f64,
    pub temp_min: f64,
    pub temp_max: f64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastWeather {
    pub id: i64,
    pub main: String,
    pub description: String,
    pub icon: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastCity {
    pub id: i64,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coord: Option<ForecastCoord>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastCoord {
    pub lat: f64,
    pub lon: f64,
}

/// Min/max temperature for one calendar day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailySummary {
    pub temp_min: f64,
    pub temp_max: f64,
    pub date: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Value {
        json!({
            "cod": "200",
            "message": 0.0045,
            "cnt": 1,
            "list": [{
                "dt": 1406106000,
                "main": {
                    "temp": 298.77,
                    "temp_min": 298.77,
                    "temp_max": 298.774,
                    "pressure": 1005.93,
                    "humidity": 87
                },
                "weather": [{"id": 804, "main": "Clouds", "description": "overcast clouds", "icon": "04d"}],
                "clouds": {"all": 88},
                "dt_txt": "2014-07-23 09:00:00"
            }],
            "city": {
                "id": 1851632,
                "name": "Shuzenji",
                "coord": {"lat": 34.966671, "lon": 138.933334},
                "country": "JP",
                "population": 0
            }
        })
    }

    #[test]
    fn test_unknown_fields_survive_round_trip() {
        let raw = sample();
        let parsed: ForecastResponse = serde_json::from_value(raw.clone()).unwrap();

        assert_eq!(parsed.list[0].main.temp_min, 298.77);
        assert_eq!(parsed.city.as_ref().unwrap().name, "Shuzenji");
        assert_eq!(serde_json::to_value(&parsed).unwrap(), raw);
    }

    #[test]
    fn test_body_without_list() {
        let parsed: ForecastResponse = serde_json::from_value(json!({
            "cod": 401,
            "message": "Invalid API key."
        }))
        .unwrap();

        assert!(parsed.list.is_empty());
        assert!(parsed.city.is_none());
        assert_eq!(embedded_status(&parsed.cod), Some(401));
        assert_eq!(parsed.extra["message"], json!("Invalid API key."));
    }

    #[test]
    fn test_embedded_status() {
        assert_eq!(embedded_status(&json!("200")), Some(200));
        assert_eq!(embedded_status(&json!(401)), Some(401));
        assert_eq!(embedded_status(&json!("oops")), None);
        assert_eq!(embedded_status(&Value::Null), None);
    }

    #[test]
    fn test_map_list_keeps_envelope() {
        let parsed: ForecastResponse = serde_json::from_value(sample()).unwrap();
        let counted = parsed.map_list(|list| vec![list.len()]);

        assert_eq!(counted.list, vec![1]);
        assert_eq!(embedded_status(&counted.cod), Some(200));
        assert_eq!(counted.extra["cnt"], json!(1));
    }
}
