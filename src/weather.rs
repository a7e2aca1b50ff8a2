use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Local, NaiveDate};
use serde::Deserialize;
use std::time::{Duration, Instant};
use tracing::warn;

const API_URL: &str = "https://api.open-meteo.com/v1/forecast";
const FETCH_ATTEMPTS: u32 = 3;
const FETCH_TIMEOUT: Duration = Duration::from_secs(5);
const RETRY_BACKOFF: Duration = Duration::from_secs(1);
const FORECAST_DAYS: usize = 7;

#[derive(Clone, Debug)]
pub(crate) struct CurrentConditions {
    pub(crate) temperature: f64,
    pub(crate) feels_like: f64,
    pub(crate) humidity: f64,
    pub(crate) weather_code: i32,
    pub(crate) is_day: bool,
    pub(crate) fetched_at: DateTime<Local>,
}

#[derive(Clone, Debug)]
pub(crate) struct DailyForecast {
    pub(crate) date: NaiveDate,
    pub(crate) weather_code: i32,
    pub(crate) temp_max: f64,
    pub(crate) temp_min: f64,
    pub(crate) precipitation_chance: f64,
}

impl DailyForecast {
    /// "Today" / "Tomorrow" / weekday, by position in the list.
    pub(crate) fn day_label(&self, index: usize) -> String {
        match index {
            0 => "Today".to_string(),
            1 => "Tomorrow".to_string(),
            _ => self.date.format("%a").to_string(),
        }
    }
}

/// Last-fetched snapshot plus the staleness rule. The fetch itself lives
/// in `fetch_current_and_daily`; a failed fetch leaves this untouched so
/// `should_refresh` keeps asking.
pub(crate) struct WeatherCache {
    pub(crate) current: Option<CurrentConditions>,
    pub(crate) forecast: Vec<DailyForecast>,
    last_update: Option<Instant>,
    refresh_interval: Duration,
}

impl WeatherCache {
    pub(crate) fn new(refresh_interval: Duration) -> Self {
        Self {
            current: None,
            forecast: Vec::new(),
            last_update: None,
            refresh_interval,
        }
    }

    pub(crate) fn should_refresh(&self, now: Instant) -> bool {
        match self.last_update {
            None => true,
            Some(at) => now.saturating_duration_since(at) > self.refresh_interval,
        }
    }

    /// Wholesale replace; never a partial merge.
    pub(crate) fn set(
        &mut self,
        current: CurrentConditions,
        mut forecast: Vec<DailyForecast>,
        now: Instant,
    ) {
        forecast.truncate(FORECAST_DAYS);
        self.current = Some(current);
        self.forecast = forecast;
        self.last_update = Some(now);
    }

    /// One-line status text: "{emoji} {description}, {temp}°C".
    pub(crate) fn summarize(&self) -> String {
        let Some(cur) = &self.current else {
            return "🌤️ Loading...".to_string();
        };
        format!(
            "{} {}, {:.0}°C",
            code_emoji(cur.weather_code, cur.is_day),
            code_description(cur.weather_code),
            cur.temperature
        )
    }
}

pub(crate) fn code_emoji(code: i32, is_day: bool) -> &'static str {
    match code {
        0 => {
            if is_day {
                "☀️"
            } else {
                "🌙"
            }
        }
        1 | 2 => "🌤️",
        3 => "☁️",
        45 | 48 => "🌫️",
        51 | 53 | 55 | 61 | 63 | 65 | 80 | 81 | 82 => "🌧️",
        71 | 73 | 75 | 85 | 86 => "❄️",
        95 | 96 | 99 => "⛈️",
        _ => "🌤️",
    }
}

pub(crate) fn code_description(code: i32) -> &'static str {
    match code {
        0 => "Clear",
        1 | 2 => "Partly cloudy",
        3 => "Overcast",
        45 | 48 => "Foggy",
        51 | 53 | 55 => "Drizzle",
        61 | 63 | 65 => "Rain",
        71 | 73 | 75 => "Snow",
        80 | 81 | 82 => "Showers",
        85 | 86 => "Snow showers",
        95 | 96 | 99 => "Thunderstorm",
        _ => "Partly cloudy",
    }
}

/* ----------------------------
   Open-Meteo fetch
---------------------------- */

#[derive(Debug, Deserialize)]
struct OpenMeteoResp {
    #[serde(default)]
    current: Option<OmCurrent>,
    #[serde(default)]
    daily: Option<OmDaily>,
}

#[derive(Debug, Default, Deserialize)]
struct OmCurrent {
    temperature_2m: Option<f64>,
    apparent_temperature: Option<f64>,
    relative_humidity_2m: Option<f64>,
    weather_code: Option<i32>,
    is_day: Option<u8>,
}

#[derive(Debug, Default, Deserialize)]
struct OmDaily {
    #[serde(default)]
    time: Vec<String>,
    #[serde(default)]
    weather_code: Vec<i32>,
    #[serde(default)]
    temperature_2m_max: Vec<f64>,
    #[serde(default)]
    temperature_2m_min: Vec<f64>,
    #[serde(default)]
    precipitation_probability_max: Vec<f64>,
}

/// Current conditions plus up to 7 daily rows, with bounded retries.
/// Retry policy lives here, not in the scheduler: all attempts failing
/// just leaves the cache stale until the next due tick.
pub(crate) async fn fetch_current_and_daily(
    lat: f64,
    lon: f64,
) -> Result<(CurrentConditions, Vec<DailyForecast>)> {
    let url = format!(
        "{API_URL}?latitude={lat}&longitude={lon}\
&current=temperature_2m,relative_humidity_2m,apparent_temperature,weather_code,is_day\
&daily=weather_code,temperature_2m_max,temperature_2m_min,precipitation_probability_max\
&temperature_unit=celsius&timezone=auto&forecast_days=7"
    );

    let client = reqwest::Client::builder()
        .timeout(FETCH_TIMEOUT)
        .build()
        .context("building weather http client")?;

    let mut last_err = None;
    for attempt in 1..=FETCH_ATTEMPTS {
        match try_fetch(&client, &url).await {
            Ok(parsed) => return Ok(parsed),
            Err(e) => {
                warn!("weather fetch failed (attempt {attempt}/{FETCH_ATTEMPTS}): {e:#}");
                last_err = Some(e);
                if attempt < FETCH_ATTEMPTS {
                    tokio::time::sleep(RETRY_BACKOFF).await;
                }
            }
        }
    }
    Err(last_err.unwrap_or_else(|| anyhow!("weather fetch failed")))
}

async fn try_fetch(
    client: &reqwest::Client,
    url: &str,
) -> Result<(CurrentConditions, Vec<DailyForecast>)> {
    let resp = client
        .get(url)
        .send()
        .await
        .context("weather request failed")?;
    if !resp.status().is_success() {
        return Err(anyhow!("weather HTTP {}", resp.status()));
    }
    let om: OpenMeteoResp = resp.json().await.context("weather JSON parse failed")?;
    Ok(parse_response(om))
}

/// Missing fields fall back to documented defaults rather than failing
/// the whole fetch: temp 20, max 25, min 15, precipitation 0, code 0.
fn parse_response(om: OpenMeteoResp) -> (CurrentConditions, Vec<DailyForecast>) {
    let cur = om.current.unwrap_or_default();
    let current = CurrentConditions {
        temperature: cur.temperature_2m.unwrap_or(20.0),
        feels_like: cur.apparent_temperature.unwrap_or(20.0),
        humidity: cur.relative_humidity_2m.unwrap_or(50.0),
        weather_code: cur.weather_code.unwrap_or(0),
        is_day: cur.is_day.map(|d| d != 0).unwrap_or(true),
        fetched_at: Local::now(),
    };

    let daily = om.daily.unwrap_or_default();
    let mut forecast = Vec::new();
    for (i, time) in daily.time.iter().take(FORECAST_DAYS).enumerate() {
        let date = NaiveDate::parse_from_str(time, "%Y-%m-%d")
            .unwrap_or_else(|_| NaiveDate::from_ymd_opt(1970, 1, 1).expect("epoch date"));
        forecast.push(DailyForecast {
            date,
            weather_code: daily.weather_code.get(i).copied().unwrap_or(0),
            temp_max: daily.temperature_2m_max.get(i).copied().unwrap_or(25.0),
            temp_min: daily.temperature_2m_min.get(i).copied().unwrap_or(15.0),
            precipitation_chance: daily
                .precipitation_probability_max
                .get(i)
                .copied()
                .unwrap_or(0.0),
        });
    }
    (current, forecast)
}
