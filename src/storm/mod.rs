//! Storm analysis
//!
//! Synthesizes a regional summary from per-mountain daily forecasts:
//! storms spanning the region, per-mountain powder scores, powder days and
//! a one-line headline.

pub mod detection;
pub mod powder;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::models::MountainForecast;

pub use detection::{MountainSnowTotal, Storm, StormIntensity, detect_storms};
pub use powder::{DayScore, POWDER_DAY_THRESHOLD_INCHES, PowderRating, powder_score, score_days};

/// A scored day at a specific mountain
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MountainDay {
    pub date: NaiveDate,
    pub mountain_id: String,
    pub mountain_name: String,
    pub fresh_snow_inches: f32,
    pub score: f32,
    pub rating: PowderRating,
}

/// Snowfall and scoring summary for one mountain
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MountainOutlook {
    pub mountain_id: String,
    pub mountain_name: String,
    pub total_snowfall_inches: f32,
    pub next_48h_snowfall_inches: f32,
    pub best_day: Option<NaiveDate>,
    pub best_score: f32,
    pub daily_scores: Vec<DayScore>,
}

/// Regional summary produced from all mountain forecasts
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StormAnalysis {
    pub headline: String,
    pub storms: Vec<Storm>,
    pub powder_days: Vec<MountainDay>,
    pub outlooks: Vec<MountainOutlook>,
    pub best_mountain: Option<MountainSnowTotal>,
    pub best_day: Option<MountainDay>,
    /// Mean 7-day snowfall over mountains with data
    pub average_snowfall_inches: f32,
    pub mountains_with_data: usize,
    pub mountains_total: usize,
}

fn outlook_for(forecast: &MountainForecast) -> MountainOutlook {
    let daily_scores = score_days(&forecast.forecast);
    let best = daily_scores
        .iter()
        .fold(None::<&DayScore>, |best, day| match best {
            Some(b) if b.score >= day.score => Some(b),
            _ => Some(day),
        });

    MountainOutlook {
        mountain_id: forecast.mountain.id.clone(),
        mountain_name: forecast.mountain.name.clone(),
        total_snowfall_inches: forecast.total_snowfall(),
        next_48h_snowfall_inches: forecast.snowfall_over(2),
        best_day: best.map(|d| d.date),
        best_score: best.map_or(0.0, |d| d.score),
        daily_scores,
    }
}

fn mountain_day(outlook: &MountainOutlook, day: &DayScore) -> MountainDay {
    MountainDay {
        date: day.date,
        mountain_id: outlook.mountain_id.clone(),
        mountain_name: outlook.mountain_name.clone(),
        fresh_snow_inches: day.fresh_snow_inches,
        score: day.score,
        rating: day.rating,
    }
}

fn headline(mountains_with_data: usize, storms: &[Storm]) -> String {
    if mountains_with_data == 0 {
        return "No forecast data available".to_string();
    }

    let biggest = storms.iter().fold(None::<&Storm>, |best, storm| match best {
        Some(b) if b.max_total_inches >= storm.max_total_inches => Some(b),
        _ => Some(storm),
    });

    match biggest {
        Some(storm) if storms.len() > 1 => {
            format!("{} ({} storms in the forecast)", storm.description, storms.len())
        }
        Some(storm) => storm.description.clone(),
        None => "Dry stretch ahead: no significant snowfall in the forecast".to_string(),
    }
}

/// Analyze merged mountain forecasts into a regional summary
#[must_use]
pub fn analyze(forecasts: &[MountainForecast]) -> StormAnalysis {
    let outlooks: Vec<MountainOutlook> = forecasts.iter().map(outlook_for).collect();
    let storms = detect_storms(forecasts);

    let mut powder_days: Vec<MountainDay> = outlooks
        .iter()
        .flat_map(|outlook| {
            outlook
                .daily_scores
                .iter()
                .filter(|d| d.fresh_snow_inches >= POWDER_DAY_THRESHOLD_INCHES)
                .map(move |d| mountain_day(outlook, d))
        })
        .collect();
    powder_days.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.date.cmp(&b.date))
    });

    let with_data: Vec<(&MountainForecast, &MountainOutlook)> = forecasts
        .iter()
        .zip(outlooks.iter())
        .filter(|(forecast, _)| forecast.has_data())
        .collect();
    let mountains_with_data = with_data.len();

    let average_snowfall_inches = if with_data.is_empty() {
        0.0
    } else {
        with_data
            .iter()
            .map(|(_, o)| o.total_snowfall_inches)
            .sum::<f32>()
            / mountains_with_data as f32
    };

    let best_mountain = with_data
        .iter()
        .map(|(_, o)| *o)
        .fold(None::<&MountainOutlook>, |best, o| match best {
            Some(b) if b.total_snowfall_inches >= o.total_snowfall_inches => Some(b),
            _ => Some(o),
        })
        .filter(|o| o.total_snowfall_inches > 0.0)
        .map(|o| MountainSnowTotal {
            mountain_id: o.mountain_id.clone(),
            mountain_name: o.mountain_name.clone(),
            inches: o.total_snowfall_inches,
        });

    let best_day = outlooks
        .iter()
        .flat_map(|o| o.daily_scores.iter().map(move |d| (o, d)))
        .fold(None::<(&MountainOutlook, &DayScore)>, |best, (o, d)| match best {
            Some((_, b)) if b.score >= d.score => best,
            _ => Some((o, d)),
        })
        .filter(|(_, d)| d.score > 0.0)
        .map(|(o, d)| mountain_day(o, d));

    let headline = headline(mountains_with_data, &storms);
    debug!(
        "Storm analysis: {} storms, {} powder days, {}/{} mountains with data",
        storms.len(),
        powder_days.len(),
        mountains_with_data,
        forecasts.len()
    );

    StormAnalysis {
        headline,
        storms,
        powder_days,
        outlooks,
        best_mountain,
        best_day,
        average_snowfall_inches,
        mountains_with_data,
        mountains_total: forecasts.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DailyForecast, Elevation, Mountain, Region};
    use chrono::Duration;

    fn start() -> NaiveDate {
        NaiveDate::from_ymd_opt(2027, 2, 1).unwrap()
    }

    fn mountain_forecast(id: &str, snow: &[f32]) -> MountainForecast {
        let mountain = Mountain {
            id: id.to_string(),
            name: format!("Mount {id}"),
            latitude: 40.6,
            longitude: -111.6,
            elevation: Elevation {
                base: 8000,
                summit: 10500,
            },
            region: Region::Utah,
            subregion: Some(Region::Wasatch),
            website: None,
        };
        let days = snow
            .iter()
            .enumerate()
            .map(|(i, &s)| DailyForecast {
                date: start() + Duration::days(i as i64),
                high_temp_f: 26.0,
                low_temp_f: 12.0,
                snowfall_inches: s,
                precipitation_inches: s / 14.0,
                precipitation_probability: if s > 0.0 { 85 } else { 5 },
                wind_speed_mph: 8.0,
                wind_gust_mph: 18.0,
                weather_code: if s > 0.0 { 75 } else { 0 },
                conditions: String::new(),
            })
            .collect();
        MountainForecast::new(mountain, days)
    }

    #[test]
    fn test_all_forecasts_empty() {
        let forecasts = vec![mountain_forecast("a", &[]), mountain_forecast("b", &[])];
        let analysis = analyze(&forecasts);

        assert_eq!(analysis.headline, "No forecast data available");
        assert!(analysis.storms.is_empty());
        assert!(analysis.powder_days.is_empty());
        assert!(analysis.best_mountain.is_none());
        assert!(analysis.best_day.is_none());
        assert_eq!(analysis.mountains_with_data, 0);
        assert_eq!(analysis.mountains_total, 2);
        assert_eq!(analysis.outlooks.len(), 2);
        assert_eq!(analysis.average_snowfall_inches, 0.0);
    }

    #[test]
    fn test_dry_week() {
        let forecasts = vec![mountain_forecast("a", &[0.0; 7])];
        let analysis = analyze(&forecasts);

        assert!(analysis.headline.starts_with("Dry stretch ahead"));
        assert!(analysis.best_mountain.is_none());
        assert_eq!(analysis.mountains_with_data, 1);
    }

    #[test]
    fn test_storm_week() {
        let forecasts = vec![
            mountain_forecast("alta", &[0.0, 8.0, 12.0, 0.0, 0.0, 0.0, 0.0]),
            mountain_forecast("brighton", &[0.0, 5.0, 7.0, 0.0, 0.0, 0.0, 0.0]),
            mountain_forecast("down", &[]),
        ];
        let analysis = analyze(&forecasts);

        assert_eq!(analysis.storms.len(), 1);
        assert_eq!(analysis.storms[0].intensity, StormIntensity::Heavy);
        assert!(analysis.headline.starts_with("Heavy storm"));
        assert!(analysis.headline.contains("Mount alta"));

        let best = analysis.best_mountain.as_ref().unwrap();
        assert_eq!(best.mountain_id, "alta");
        assert_eq!(best.inches, 20.0);

        assert_eq!(analysis.mountains_with_data, 2);
        assert_eq!(analysis.average_snowfall_inches, 16.0);

        // Powder days sorted by score, deepest first
        assert!(!analysis.powder_days.is_empty());
        assert!(
            analysis
                .powder_days
                .windows(2)
                .all(|w| w[0].score >= w[1].score)
        );
        assert_eq!(analysis.powder_days[0].mountain_id, "alta");

        let best_day = analysis.best_day.as_ref().unwrap();
        assert_eq!(best_day.mountain_id, "alta");

        let alta = &analysis.outlooks[0];
        assert_eq!(alta.next_48h_snowfall_inches, 8.0);
        assert_eq!(alta.daily_scores.len(), 7);
        assert!(alta.best_day.is_some());

        let down = &analysis.outlooks[2];
        assert!(down.best_day.is_none());
        assert_eq!(down.total_snowfall_inches, 0.0);
    }

    #[test]
    fn test_multiple_storms_in_headline() {
        let forecasts = vec![mountain_forecast(
            "a",
            &[3.0, 0.0, 0.0, 10.0, 0.0, 0.0, 0.0],
        )];
        let analysis = analyze(&forecasts);
        assert_eq!(analysis.storms.len(), 2);
        assert!(analysis.headline.contains("2 storms"));
        assert!(analysis.headline.starts_with("Moderate storm"));
    }
}
