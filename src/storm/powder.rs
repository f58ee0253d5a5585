//! Powder scoring for individual mountain-days

use serde::{Deserialize, Serialize};

use crate::models::DailyForecast;

/// Fresh snow needed before a day counts as a powder day
pub const POWDER_DAY_THRESHOLD_INCHES: f32 = 6.0;

/// Overall rating for a mountain-day
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PowderRating {
    /// score < 2
    Poor,
    /// score >= 2
    Fair,
    /// score >= 4
    Good,
    /// score >= 6
    Great,
    /// score >= 8
    Epic,
}

impl PowderRating {
    #[must_use]
    pub fn from_score(score: f32) -> Self {
        match score {
            s if s >= 8.0 => PowderRating::Epic,
            s if s >= 6.0 => PowderRating::Great,
            s if s >= 4.0 => PowderRating::Good,
            s if s >= 2.0 => PowderRating::Fair,
            _ => PowderRating::Poor,
        }
    }
}

impl std::fmt::Display for PowderRating {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PowderRating::Epic => write!(f, "Epic"),
            PowderRating::Great => write!(f, "Great"),
            PowderRating::Good => write!(f, "Good"),
            PowderRating::Fair => write!(f, "Fair"),
            PowderRating::Poor => write!(f, "Poor"),
        }
    }
}

/// Score of a single mountain-day
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DayScore {
    pub date: chrono::NaiveDate,
    /// Snowfall of this day plus the previous day
    pub fresh_snow_inches: f32,
    /// 0-10
    pub score: f32,
    pub rating: PowderRating,
}

/// Snow that fell on `day` and the day before it.
///
/// `previous` only counts when it is the calendar day before `day`.
#[must_use]
pub fn fresh_snow(previous: Option<&DailyForecast>, day: &DailyForecast) -> f32 {
    let yesterday = previous
        .filter(|p| p.date.succ_opt() == Some(day.date))
        .map_or(0.0, |p| p.snowfall_inches);
    day.snowfall_inches + yesterday
}

/// Score a day from 0 to 10 given its fresh snow
#[must_use]
pub fn powder_score(fresh_snow_inches: f32, day: &DailyForecast) -> f32 {
    let mut score = (fresh_snow_inches / 2.0).min(7.0);

    // Cold snow stays light; warm days turn it heavy
    if day.high_temp_f <= 28.0 {
        score += 1.5;
    } else if day.high_temp_f <= 32.0 {
        score += 0.5;
    } else if day.high_temp_f > 36.0 {
        score -= 2.0;
    }

    // Strong gusts close upper lifts
    if day.wind_gust_mph >= 50.0 {
        score -= 2.0;
    } else if day.wind_gust_mph >= 35.0 {
        score -= 1.0;
    } else if day.wind_gust_mph < 20.0 {
        score += 0.5;
    }

    if fresh_snow_inches >= POWDER_DAY_THRESHOLD_INCHES && day.is_clear() {
        score += 1.0;
    }

    score.clamp(0.0, 10.0)
}

/// Score every day of a mountain's forecast
#[must_use]
pub fn score_days(forecast: &[DailyForecast]) -> Vec<DayScore> {
    forecast
        .iter()
        .enumerate()
        .map(|(i, day)| {
            let previous = i.checked_sub(1).and_then(|p| forecast.get(p));
            let fresh = fresh_snow(previous, day);
            let score = powder_score(fresh, day);
            DayScore {
                date: day.date,
                fresh_snow_inches: fresh,
                score,
                rating: PowderRating::from_score(score),
            }
        })
        .collect()
}
