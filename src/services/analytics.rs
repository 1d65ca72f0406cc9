//! Aggregate statistics over the note history
//!
//! Computes the numbers behind the analytics dashboard: emotion
//! distribution, weekday and hour breakdowns, the daily entry trend with
//! a 7-day rolling mean, and text-length statistics per emotion. Chart
//! rendering belongs to the presentation layer.

use crate::database::Note;
use chrono::{Datelike, NaiveDate, Timelike, Weekday};
use serde::Serialize;
use std::collections::BTreeMap;

/// Entries per calendar day plus the trailing 7-day rolling mean
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DailyCount {
    pub date: NaiveDate,
    pub count: usize,
    pub rolling_mean: f64,
}

/// How often one emotion occurred on one weekday
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct WeekdayEmotionCount {
    pub weekday: Weekday,
    pub emotion: String,
    pub count: usize,
}

/// Text-length statistics for a single emotion label
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct EmotionLengthStats {
    pub emotion: String,
    pub min: usize,
    pub max: usize,
    pub mean: f64,
}

/// Everything the analytics page needs, computed in one pass set
#[derive(Debug, Clone, Serialize)]
pub struct NoteAnalytics {
    pub total_entries: usize,
    pub distinct_emotions: usize,
    pub most_common_emotion: Option<String>,
    pub mean_text_len: f64,
    /// Emotion frequencies, most frequent first
    pub emotion_counts: Vec<(String, usize)>,
    pub weekday_emotion_counts: Vec<WeekdayEmotionCount>,
    /// Entry count per hour of day, index = hour
    pub hourly_counts: [usize; 24],
    /// Daily trend in ascending date order; days without entries are absent
    pub daily_counts: Vec<DailyCount>,
    pub text_length_by_emotion: Vec<EmotionLengthStats>,
}

impl NoteAnalytics {
    pub fn from_notes(notes: &[Note]) -> Self {
        let total_entries = notes.len();

        // Emotion frequencies
        let mut by_emotion: BTreeMap<&str, usize> = BTreeMap::new();
        for note in notes {
            *by_emotion.entry(note.emotion.as_str()).or_default() += 1;
        }
        let mut emotion_counts: Vec<(String, usize)> = by_emotion
            .iter()
            .map(|(emotion, &count)| (emotion.to_string(), count))
            .collect();
        // Most frequent first; alphabetical among equals keeps the order stable
        emotion_counts.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

        let distinct_emotions = emotion_counts.len();
        let most_common_emotion = emotion_counts.first().map(|(emotion, _)| emotion.clone());

        // Weekday × emotion breakdown
        let mut by_weekday: BTreeMap<(u8, &str), usize> = BTreeMap::new();
        for note in notes {
            let key = (
                note.created_at.weekday().num_days_from_monday() as u8,
                note.emotion.as_str(),
            );
            *by_weekday.entry(key).or_default() += 1;
        }
        let weekday_emotion_counts = by_weekday
            .into_iter()
            .map(|((day, emotion), count)| WeekdayEmotionCount {
                weekday: weekday_from_monday_offset(day),
                emotion: emotion.to_string(),
                count,
            })
            .collect();

        // Hour-of-day histogram
        let mut hourly_counts = [0usize; 24];
        for note in notes {
            hourly_counts[note.created_at.hour() as usize] += 1;
        }

        // Daily trend with trailing 7-day rolling mean over present days
        let mut by_day: BTreeMap<NaiveDate, usize> = BTreeMap::new();
        for note in notes {
            *by_day.entry(note.created_at.date_naive()).or_default() += 1;
        }
        let days: Vec<(NaiveDate, usize)> = by_day.into_iter().collect();
        let daily_counts = days
            .iter()
            .enumerate()
            .map(|(i, &(date, count))| {
                let window = &days[i.saturating_sub(6)..=i];
                let sum: usize = window.iter().map(|(_, c)| c).sum();
                DailyCount {
                    date,
                    count,
                    rolling_mean: sum as f64 / window.len() as f64,
                }
            })
            .collect();

        // Text length per emotion
        let mut lengths: BTreeMap<&str, Vec<usize>> = BTreeMap::new();
        for note in notes {
            lengths
                .entry(note.emotion.as_str())
                .or_default()
                .push(note.text.chars().count());
        }
        let text_length_by_emotion = lengths
            .into_iter()
            .map(|(emotion, lens)| {
                let sum: usize = lens.iter().sum();
                EmotionLengthStats {
                    emotion: emotion.to_string(),
                    min: *lens.iter().min().unwrap(),
                    max: *lens.iter().max().unwrap(),
                    mean: sum as f64 / lens.len() as f64,
                }
            })
            .collect();

        let mean_text_len = if total_entries == 0 {
            0.0
        } else {
            let sum: usize = notes.iter().map(|n| n.text.chars().count()).sum();
            sum as f64 / total_entries as f64
        };

        Self {
            total_entries,
            distinct_emotions,
            most_common_emotion,
            mean_text_len,
            emotion_counts,
            weekday_emotion_counts,
            hourly_counts,
            daily_counts,
            text_length_by_emotion,
        }
    }
}

fn weekday_from_monday_offset(offset: u8) -> Weekday {
    match offset {
        0 => Weekday::Mon,
        1 => Weekday::Tue,
        2 => Weekday::Wed,
        3 => Weekday::Thu,
        4 => Weekday::Fri,
        5 => Weekday::Sat,
        _ => Weekday::Sun,
    }
}
