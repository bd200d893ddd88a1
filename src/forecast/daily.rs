use super::types::{DailySummary, ForecastPoint};

/// Running min/max for the day currently being collected.
#[derive(Debug, Default)]
struct DayAccumulator {
    temp_min: Option<f64>,
    temp_max: Option<f64>,
    date: Option<String>,
}

impl DayAccumulator {
    fn observe(&mut self, point: &ForecastPoint) {
        self.temp_min = Some(match self.temp_min {
            Some(current) if current <= point.main.temp_min => current,
            _ => point.main.temp_min,
        });
        self.temp_max = Some(match self.temp_max {
            Some(current) if current >= point.main.temp_max => current,
            _ => point.main.temp_max,
        });
    }

    fn into_summary(self) -> Option<DailySummary> {
        Some(DailySummary {
            temp_min: self.temp_min?,
            temp_max: self.temp_max?,
            date: self.date.unwrap_or_default(),
        })
    }
}

/// The calendar day of a `dt_txt` value ("2017-10-02 09:00:00" → "2017-10-02").
pub fn date_key(dt_txt: &str) -> &str {
    dt_txt.split(' ').next().unwrap_or(dt_txt)
}

/// Collapses chronologically ordered points into one summary per day, in the
/// order the days first appear.
///
/// Points are grouped by runs of the same date, so the input must already be
/// in time order.
pub fn reduce_daily(points: &[ForecastPoint]) -> Vec<DailySummary> {
    let mut summaries = Vec::new();
    let mut day = DayAccumulator::default();
    let last_index = points.len().saturating_sub(1);

    for (i, point) in points.iter().enumerate() {
        let date = date_key(&point.dt_txt);

        // Compared against the date left by the previous point, before this
        // point overwrites it.
        let day_changed = day.date.as_deref().map_or(false, |previous| previous != date);
        if day_changed {
            summaries.extend(std::mem::take(&mut day).into_summary());
        }

        day.observe(point);
        day.date = Some(date.to_string());

        if i == last_index {
            summaries.extend(std::mem::take(&mut day).into_summary());
        }
    }

    summaries
}
