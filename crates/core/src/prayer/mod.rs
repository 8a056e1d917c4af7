mod types;

pub use types::{NewPrayer, PrayerRecord, PrayerStatus, StatusParseError};
