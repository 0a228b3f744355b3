use std::collections::BTreeMap;
use std::path::Path;

use chrono::naive::NaiveDate;
use serde_json::Value;

use super::error::{Result,Error};
use super::ukgov::RawRecord;


pub const DATE_FIELD: &str = "date";

/// Maps a record field onto a table column.
#[derive(Clone,Copy,Debug)]
pub struct Column {
    pub field: &'static str,
    pub name: &'static str,
}

pub const CASE_COLUMNS: &[Column] = &[
    Column { field: "newCases", name: "no_cases" },
    Column { field: "newAdmissions", name: "new_admissions" },
];

/// Date-indexed numeric columns, sorted ascending by date with at most one
/// row per date. Missing values are `None`.
#[derive(Clone,Debug,PartialEq)]
pub struct ObservationTable {
    columns: Vec<String>,
    rows: Vec<(NaiveDate,Vec<Option<f64>>)>,
}

pub type Series = Vec<(NaiveDate,Option<f64>)>;


impl ObservationTable {

    pub fn from_records(records: &[RawRecord], columns: &[Column]) -> Result<Self> {
	let mut rows = BTreeMap::new();
	for record in records {
	    let date = record_date(record)?;
	    let values = columns.iter()
		.map(|c| numeric(record, c.field))
		.collect::<Result<Vec<_>>>()?;
	    if rows.insert(date, values).is_some() {
		return Err(Error::parse(format!("duplicate record for {}", date)));
	    }
	}
	Ok(Self {
	    columns: columns.iter().map(|c| c.name.to_string()).collect(),
	    rows: rows.into_iter().collect()
	})
    }

    pub fn len(&self) -> usize {
	self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
	self.rows.is_empty()
    }

    pub fn column(&self, name: &str) -> Result<Series> {
	let i = self.columns.iter().position(|c| c == name)
	    .ok_or_else(|| Error::parse(format!("no column named {}", name)))?;
	Ok(self.rows.iter().map(|(date,vals)| (*date, vals[i])).collect())
    }

    pub fn write_csv(&self, path: &Path) -> Result<()> {
	let mut out = csv::Writer::from_path(path)?;
	out.write_record(Some(DATE_FIELD).into_iter()
			 .chain(self.columns.iter().map(String::as_str)))?;
	for (date,vals) in &self.rows {
	    out.write_record(Some(date.format("%Y-%m-%d").to_string()).into_iter()
			     .chain(vals.iter().map(|v| v.map_or(String::new(), |v| v.to_string()))))?;
	}
	out.flush()?;
	Ok(())
    }

}


pub fn record_date(record: &RawRecord) -> Result<NaiveDate> {
    let raw = record.get(DATE_FIELD).and_then(Value::as_str)
	.ok_or_else(|| Error::parse("record without date"))?;
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
	.map_err(|err| Error::parse(format!("invalid date '{}': {}", raw, err)))
}


/// A numeric field; `null` is a missing value, an absent key is an error.
pub fn numeric(record: &RawRecord, field: &str) -> Result<Option<f64>> {
    match record.get(field) {
	None => Err(Error::parse(format!("record without {}", field))),
	Some(Value::Null) => Ok(None),
	Some(Value::Number(n)) => Ok(n.as_f64()),
	Some(other) => Err(Error::parse(format!("non-numeric {}: {}", field, other)))
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn records(data: Value) -> Vec<RawRecord> {
	serde_json::from_value(data).unwrap()
    }

    fn date(s: &str) -> NaiveDate {
	NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn rows_sorted_ascending_whatever_the_input_order() {
	let data = records(json!([
	    {"date": "2021-01-03", "newCases": 300, "newAdmissions": 30},
	    {"date": "2021-01-01", "newCases": 100, "newAdmissions": 10},
	    {"date": "2021-01-02", "newCases": 200, "newAdmissions": null},
	]));
	let table = ObservationTable::from_records(&data, CASE_COLUMNS).unwrap();
	assert_eq!(table.len(), data.len());
	let dates: Vec<_> = table.column("no_cases").unwrap().into_iter().map(|(d,_)| d).collect();
	assert!(dates.windows(2).all(|w| w[0] < w[1]));
	assert_eq!(dates[0], date("2021-01-01"));
    }

    #[test]
    fn values_survive_exactly() {
	let data = records(json!([
	    {"date": "2021-01-08", "newCases": 68053, "newAdmissions": 4134},
	    {"date": "2020-03-01", "newCases": null, "newAdmissions": 0},
	    {"date": "2021-11-30", "newCases": 9007199254740991u64, "newAdmissions": null},
	]));
	let table = ObservationTable::from_records(&data, CASE_COLUMNS).unwrap();
	assert_eq!(table.column("no_cases").unwrap(), vec![
	    (date("2020-03-01"), None),
	    (date("2021-01-08"), Some(68053.0)),
	    (date("2021-11-30"), Some(9007199254740991.0)),
	]);
	assert_eq!(table.column("new_admissions").unwrap(), vec![
	    (date("2020-03-01"), Some(0.0)),
	    (date("2021-01-08"), Some(4134.0)),
	    (date("2021-11-30"), None),
	]);
    }

    #[test]
    fn malformed_records_are_parse_failures() {
	let cases = vec![
	    json!([{"date": "2021-01-01", "newCases": 1}]),
	    json!([{"date": "01/01/2021", "newCases": 1, "newAdmissions": 1}]),
	    json!([{"newCases": 1, "newAdmissions": 1}]),
	    json!([{"date": "2021-01-01", "newCases": "many", "newAdmissions": 1}]),
	    json!([
		{"date": "2021-01-01", "newCases": 1, "newAdmissions": 1},
		{"date": "2021-01-01", "newCases": 2, "newAdmissions": 2}
	    ]),
	];
	for data in cases {
	    let res = ObservationTable::from_records(&records(data.clone()), CASE_COLUMNS);
	    assert!(matches!(res, Err(Error::ParseFailed(_))), "accepted {}", data);
	}
    }

    #[test]
    fn csv_export_leaves_missing_cells_empty() {
	let data = records(json!([
	    {"date": "2021-01-02", "newCases": 200, "newAdmissions": null},
	    {"date": "2021-01-01", "newCases": 100, "newAdmissions": 10},
	]));
	let table = ObservationTable::from_records(&data, CASE_COLUMNS).unwrap();
	let tmp = TempDir::new().unwrap();
	let path = tmp.path().join("observations.csv");
	table.write_csv(&path).unwrap();
	let written = std::fs::read_to_string(&path).unwrap();
	assert_eq!(written, "date,no_cases,new_admissions\n\
			     2021-01-01,100,10\n\
			     2021-01-02,200,\n");
    }
}
