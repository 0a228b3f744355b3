use std::path::PathBuf;
use std::time::Duration;

use chrono::naive::NaiveDate;


pub const API_BASE: &str = "https://api.coronavirus.data.gov.uk/v1/data";

/// Parameters of the two API requests.
#[derive(Clone,Debug)]
pub struct FetchConfig {
    pub base_url: String,
    pub area_type: String,
    pub timeout: Duration,
    /// Extra attempts after a transient failure.
    pub retries: usize,
    pub backoff: Duration,
}

/// Cutoffs and display scales of the cases/admissions correlation.
#[derive(Clone,Debug)]
pub struct CorrelationConfig {
    /// Mass testing only became available after this date.
    pub first_cut: NaiveDate,
    /// Roughly the start of vaccine impact.
    pub second_cut: NaiveDate,
    /// Historical peak of daily cases.
    pub case_scale: f64,
    /// Historical peak of daily admissions.
    pub admission_scale: f64,
}

/// ONS mid-year population estimates.
#[derive(Clone,Copy,Debug)]
pub struct Population {
    pub total: u64,
    pub under_18: u64,
}

#[derive(Clone,Debug)]
pub struct Config {
    pub graph_path: PathBuf,
    pub fetch: FetchConfig,
    pub correlation: CorrelationConfig,
    pub population: Population,
}


impl Default for FetchConfig {
    fn default() -> Self {
	Self {
	    base_url: API_BASE.to_string(),
	    area_type: "overview".to_string(),
	    timeout: Duration::from_secs(10),
	    retries: 1,
	    backoff: Duration::from_secs(2),
	}
    }
}

impl Default for CorrelationConfig {
    fn default() -> Self {
	Self {
	    first_cut: ymd(2020, 6, 20),
	    second_cut: ymd(2021, 5, 20),
	    case_scale: 61757.0,
	    admission_scale: 4134.0,
	}
    }
}

impl Default for Population {
    fn default() -> Self {
	Self {
	    total: 67081234,
	    under_18: 14191190,
	}
    }
}

impl Default for Config {
    fn default() -> Self {
	Self {
	    graph_path: PathBuf::from("graphs"),
	    fetch: FetchConfig::default(),
	    correlation: CorrelationConfig::default(),
	    population: Population::default(),
	}
    }
}


fn ymd(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day)
	.unwrap_or(NaiveDate::MIN)
}
