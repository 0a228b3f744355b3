//! Client for the UK government coronavirus dashboard API.
//!
//! See https://coronavirus.data.gov.uk/details/developers-guide for the
//! available metrics. A query names the metrics it wants through the
//! `structure` parameter; the API answers with one record per date, most
//! recent first.

use std::thread;

use reqwest::{StatusCode,Url};
use reqwest::blocking::Client;
use serde::Deserialize;
use serde_json::{Map,Value};
use tracing::{debug,info,warn};

use super::config::FetchConfig;
use super::error::{Result,Error};


pub type RawRecord = Map<String,Value>;

#[derive(Deserialize,Debug)]
pub struct Response {
    pub data: Vec<RawRecord>
}

/// Output key in the returned records, and the API metric behind it.
#[derive(Clone,Copy,Debug)]
pub struct Field {
    pub name: &'static str,
    pub metric: &'static str,
}

#[derive(Clone,Copy,Debug)]
pub struct Query {
    pub name: &'static str,
    pub fields: &'static [Field],
}

pub const CASES_AND_ADMISSIONS: Query = Query {
    name: "cases and admissions",
    fields: &[
	Field { name: "date", metric: "date" },
	Field { name: "newCases", metric: "newCasesByPublishDate" },
	Field { name: "newAdmissions", metric: "newAdmissions" },
    ]
};

pub const VACCINATIONS: Query = Query {
    name: "vaccinations",
    fields: &[
	Field { name: "date", metric: "date" },
	Field { name: "cumPeopleVaccinatedCompleteByPublishDate",
		metric: "cumPeopleVaccinatedCompleteByPublishDate" },
	Field { name: "cumPeopleVaccinatedFirstDoseByPublishDate",
		metric: "cumPeopleVaccinatedFirstDoseByPublishDate" },
    ]
};


impl Query {

    pub fn structure(&self) -> String {
	Value::Object(self.fields.iter().map(
	    |f| (f.name.to_string(), Value::String(f.metric.to_string()))
	).collect()).to_string()
    }

}


impl Response {

    /// The most recent record.
    pub fn first(&self) -> Result<&RawRecord> {
	self.data.first().ok_or_else(|| Error::parse("response holds no records"))
    }

}


pub struct Fetcher {
    client: Client,
    config: FetchConfig,
}

impl Fetcher {

    pub fn new(config: FetchConfig) -> Result<Self> {
	let client = Client::builder()
	    .timeout(config.timeout)
	    .build()?;
	Ok(Self { client, config })
    }

    pub fn fetch(&self, query: &Query) -> Result<Response> {

	let url = endpoint(&self.config, query)?;
	info!("Querying {} data...", query.name);
	debug!(%url, "request");

	let mut attempt = 0;
	loop {
	    match self.fetch_once(&url) {
		Ok(res) => {
		    debug!(records = res.data.len(), "{} response parsed", query.name);
		    return Ok(res);
		},
		Err(err) if err.is_transient() && attempt < self.config.retries => {
		    attempt += 1;
		    warn!("{} request failed ({}), retry {} of {}",
			  query.name, err, attempt, self.config.retries);
		    thread::sleep(self.config.backoff);
		},
		Err(err) => return Err(err)
	    }
	}

    }

    fn fetch_once(&self, url: &Url) -> Result<Response> {
	let res = self.client.get(url.clone()).send()?;
	let status = res.status();
	let body = res.text()?;
	check_response(status, &body)?;
	parse_response(&body)
    }

}


pub fn endpoint(config: &FetchConfig, query: &Query) -> Result<Url> {
    Url::parse_with_params(&config.base_url, &[
	("filters", format!("areaType={}", config.area_type)),
	("structure", query.structure()),
    ]).map_err(|err| Error::parse(format!("invalid endpoint {}: {}", config.base_url, err)))
}


pub fn check_response(status: StatusCode, body: &str) -> Result<()> {
    match status.as_u16() >= 400 {
	true => Err(Error::RequestFailed { status, body: body.to_string() }),
	false => Ok(())
    }
}


pub fn parse_response(body: &str) -> Result<Response> {
    serde_json::from_str(body)
	.map_err(|err| Error::parse(format!("unexpected response: {}", err)))
}
