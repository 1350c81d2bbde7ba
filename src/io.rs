// Module for loading and validating the data. It reads the csv file, checks the
// header against the declared schema, and maps the "NA" sentinel to null.
use std::fs::File;
use std::path::Path;

use csv::{ReaderBuilder, StringRecord};
use serde::Deserialize;

use crate::error::PipelineError;

mod na_format {
    use serde::{self, Deserialize, Deserializer};

    /// The airline on-time data writes missing numerics as "NA" or an empty field.
    pub fn deserialize<'de, D>(d: D) -> Result<Option<f64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(d)?;
        let s = raw.trim();
        if s.is_empty() || s == "NA" {
            return Ok(None);
        }
        s.parse::<f64>().map(Some).map_err(serde::de::Error::custom)
    }
}

/// The 21 feature columns, in the exact order they are assembled into the
/// feature vector. "0SDelay" is the literal column name in the source data;
/// do not "fix" it.
pub const FEATURE_COLUMNS: [&str; 21] = [
    "Year",
    "Month",
    "DayofMonth",
    "DayOfWeek",
    "DepTime",
    "CRSDepTime",
    "ArrTime",
    "CRSArrTime",
    "FlightNum",
    "ActualElapsedTime",
    "CRSElapsedTime",
    "AirTime",
    "ArrDelay",
    "Distance",
    "TaxiIn",
    "TaxiOut",
    "CarrierDelay",
    "WeatherDelay",
    "SecurityDelay",
    "0SDelay",
    "LateAircraftDelay",
];

/// The label source column, required on top of the feature columns.
pub const LABEL_SOURCE_COLUMN: &str = "DepDelay";

/// Declared schema for one flight record. Matches the 22 required CSV columns;
/// extra columns in the file are ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct FlightRecord {
    #[serde(rename = "Year", deserialize_with = "na_format::deserialize")]
    pub year: Option<f64>,
    #[serde(rename = "Month", deserialize_with = "na_format::deserialize")]
    pub month: Option<f64>,
    #[serde(rename = "DayofMonth", deserialize_with = "na_format::deserialize")]
    pub day_of_month: Option<f64>,
    #[serde(rename = "DayOfWeek", deserialize_with = "na_format::deserialize")]
    pub day_of_week: Option<f64>,
    #[serde(rename = "DepTime", deserialize_with = "na_format::deserialize")]
    pub dep_time: Option<f64>,
    #[serde(rename = "CRSDepTime", deserialize_with = "na_format::deserialize")]
    pub crs_dep_time: Option<f64>,
    #[serde(rename = "ArrTime", deserialize_with = "na_format::deserialize")]
    pub arr_time: Option<f64>,
    #[serde(rename = "CRSArrTime", deserialize_with = "na_format::deserialize")]
    pub crs_arr_time: Option<f64>,
    #[serde(rename = "FlightNum", deserialize_with = "na_format::deserialize")]
    pub flight_num: Option<f64>,
    #[serde(rename = "ActualElapsedTime", deserialize_with = "na_format::deserialize")]
    pub actual_elapsed_time: Option<f64>,
    #[serde(rename = "CRSElapsedTime", deserialize_with = "na_format::deserialize")]
    pub crs_elapsed_time: Option<f64>,
    #[serde(rename = "AirTime", deserialize_with = "na_format::deserialize")]
    pub air_time: Option<f64>,
    #[serde(rename = "DepDelay", deserialize_with = "na_format::deserialize")]
    pub dep_delay: Option<f64>,
    #[serde(rename = "ArrDelay", deserialize_with = "na_format::deserialize")]
    pub arr_delay: Option<f64>,
    #[serde(rename = "Distance", deserialize_with = "na_format::deserialize")]
    pub distance: Option<f64>,
    #[serde(rename = "TaxiIn", deserialize_with = "na_format::deserialize")]
    pub taxi_in: Option<f64>,
    #[serde(rename = "TaxiOut", deserialize_with = "na_format::deserialize")]
    pub taxi_out: Option<f64>,
    #[serde(rename = "CarrierDelay", deserialize_with = "na_format::deserialize")]
    pub carrier_delay: Option<f64>,
    #[serde(rename = "WeatherDelay", deserialize_with = "na_format::deserialize")]
    pub weather_delay: Option<f64>,
    #[serde(rename = "SecurityDelay", deserialize_with = "na_format::deserialize")]
    pub security_delay: Option<f64>,
    #[serde(rename = "0SDelay", deserialize_with = "na_format::deserialize")]
    pub zero_s_delay: Option<f64>,
    #[serde(rename = "LateAircraftDelay", deserialize_with = "na_format::deserialize")]
    pub late_aircraft_delay: Option<f64>,
}

impl FlightRecord {
    /// The feature fields paired with their column names, in the same fixed
    /// order as [`FEATURE_COLUMNS`]. The assembler walks this array; keep the
    /// two in sync.
    pub fn feature_fields(&self) -> [(&'static str, Option<f64>); 21] {
        [
            ("Year", self.year),
            ("Month", self.month),
            ("DayofMonth", self.day_of_month),
            ("DayOfWeek", self.day_of_week),
            ("DepTime", self.dep_time),
            ("CRSDepTime", self.crs_dep_time),
            ("ArrTime", self.arr_time),
            ("CRSArrTime", self.crs_arr_time),
            ("FlightNum", self.flight_num),
            ("ActualElapsedTime", self.actual_elapsed_time),
            ("CRSElapsedTime", self.crs_elapsed_time),
            ("AirTime", self.air_time),
            ("ArrDelay", self.arr_delay),
            ("Distance", self.distance),
            ("TaxiIn", self.taxi_in),
            ("TaxiOut", self.taxi_out),
            ("CarrierDelay", self.carrier_delay),
            ("WeatherDelay", self.weather_delay),
            ("SecurityDelay", self.security_delay),
            ("0SDelay", self.zero_s_delay),
            ("LateAircraftDelay", self.late_aircraft_delay),
        ]
    }
}

/// Load the flight records from `path`.
///
/// The header must contain every required column (fatal otherwise), rows that
/// are entirely empty across all fields are dropped, and any parse error is
/// fatal. There is no retry and no per-row recovery.
pub fn load_csv(path: &Path) -> Result<Vec<FlightRecord>, PipelineError> {
    let file = File::open(path).map_err(|source| PipelineError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let mut rdr = ReaderBuilder::new()
        .delimiter(b',')
        .flexible(true)
        .has_headers(true)
        .from_reader(file);

    // Grab and own the header row, then check it against the declared schema
    // so a missing column fails here rather than somewhere mid-file.
    let headers = rdr.headers()?.clone();
    for required in FEATURE_COLUMNS.iter().chain([&LABEL_SOURCE_COLUMN]) {
        if !headers.iter().any(|h| h == *required) {
            return Err(PipelineError::MissingColumn(*required));
        }
    }

    let mut out = Vec::new();
    for result in rdr.records() {
        let raw: StringRecord = result?;

        // Drop rows that are null across all columns (a no-op on well-formed data).
        if raw.iter().all(|f| f.trim().is_empty()) {
            continue;
        }

        let rec: FlightRecord = raw.deserialize(Some(&headers))?;
        out.push(rec);
    }

    Ok(out)
}
