use chrono::naive::NaiveDate;
use serde_json::Value;

use super::config::Population;
use super::error::{Result,Error};
use super::table::record_date;
use super::ukgov::{RawRecord,Response};


pub const COMPLETE_FIELD: &str = "cumPeopleVaccinatedCompleteByPublishDate";
pub const FIRST_DOSE_FIELD: &str = "cumPeopleVaccinatedFirstDoseByPublishDate";

#[derive(Clone,Copy,Debug,PartialEq,Eq)]
pub enum Bucket {
    DoubleDose,
    SingleDose,
    Under18,
    Unvaccinated,
}

/// Mutually exclusive population segments; they add up to the population.
#[derive(Clone,Copy,Debug,PartialEq,Eq)]
pub struct CoverageBreakdown {
    pub as_of: NaiveDate,
    pub population: u64,
    pub double_jabbed: u64,
    pub single_only: u64,
    pub under_18: u64,
    pub unvaccinated: u64,
}


impl Bucket {

    pub const ALL: [Bucket; 4] = [
	Self::DoubleDose, Self::SingleDose, Self::Under18, Self::Unvaccinated
    ];

    pub fn label(&self) -> &'static str {
	match self {
	    Self::DoubleDose => "x2 Dose",
	    Self::SingleDose => "x1 Dose",
	    Self::Under18 => "Under 18",
	    Self::Unvaccinated => "Unvaccinated",
	}
    }

    pub fn color(&self) -> &'static str {
	match self {
	    Self::DoubleDose => "forestgreen",
	    Self::SingleDose => "darkseagreen",
	    Self::Under18 => "royalblue",
	    Self::Unvaccinated => "lightcoral",
	}
    }

}


impl CoverageBreakdown {

    pub fn compute(as_of: NaiveDate, population: &Population,
		   complete: u64, first_dose: u64) -> Result<Self> {

	let double_jabbed = complete;
	let single_only = first_dose.checked_sub(complete).ok_or_else(
	    || Error::CoverageInvariantViolated(format!(
		"{} first doses but {} complete courses", first_dose, complete)))?;
	let exceeded = || Error::CoverageInvariantViolated(format!(
	    "{} under 18, {} double and {} single dosed exceed population of {}",
	    population.under_18, double_jabbed, single_only, population.total));
	let unvaccinated = population.under_18.checked_add(double_jabbed)
	    .and_then(|n| n.checked_add(single_only))
	    .and_then(|n| population.total.checked_sub(n))
	    .ok_or_else(exceeded)?;

	let breakdown = Self {
	    as_of,
	    population: population.total,
	    double_jabbed,
	    single_only,
	    under_18: population.under_18,
	    unvaccinated,
	};

	let sum = Bucket::ALL.iter()
	    .try_fold(0u64, |sum, b| sum.checked_add(breakdown.count(*b)));
	match sum == Some(population.total) {
	    true => Ok(breakdown),
	    false => Err(Error::CoverageInvariantViolated(format!(
		"buckets sum to {:?}, population is {}", sum, population.total)))
	}

    }

    /// Breakdown from the most recent record of the vaccination query.
    pub fn from_snapshot(res: &Response, population: &Population) -> Result<Self> {
	let record = res.first()?;
	Self::compute(record_date(record)?, population,
		      count(record, COMPLETE_FIELD)?,
		      count(record, FIRST_DOSE_FIELD)?)
    }

    pub fn count(&self, bucket: Bucket) -> u64 {
	match bucket {
	    Bucket::DoubleDose => self.double_jabbed,
	    Bucket::SingleDose => self.single_only,
	    Bucket::Under18 => self.under_18,
	    Bucket::Unvaccinated => self.unvaccinated,
	}
    }

    pub fn percentage(&self, bucket: Bucket) -> f64 {
	self.count(bucket) as f64 / self.population as f64 * 100.0
    }

}


fn count(record: &RawRecord, field: &str) -> Result<u64> {
    record.get(field).and_then(Value::as_u64)
	.ok_or_else(|| Error::parse(format!("snapshot without integer {}", field)))
}


#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn population() -> Population {
	Population { total: 67081234, under_18: 14191190 }
    }

    fn as_of() -> NaiveDate {
	NaiveDate::from_ymd_opt(2021, 7, 20).unwrap()
    }

    #[test]
    fn buckets_partition_the_population() {
	let cov = CoverageBreakdown::compute(as_of(), &population(), 37000000, 46600000).unwrap();
	assert_eq!(cov.double_jabbed, 37000000);
	assert_eq!(cov.single_only, 9600000);
	assert_eq!(cov.under_18, 14191190);
	assert_eq!(cov.unvaccinated, 6290044);
	assert_eq!(Bucket::ALL.iter().map(|b| cov.count(*b)).sum::<u64>(), 67081234);

	let pct: f64 = Bucket::ALL.iter().map(|b| cov.percentage(*b)).sum();
	assert!((pct - 100.0).abs() < 1e-9);
	assert!((cov.percentage(Bucket::DoubleDose) - 55.157).abs() < 1e-3);
    }

    #[test]
    fn more_complete_courses_than_first_doses_is_refused() {
	let res = CoverageBreakdown::compute(as_of(), &population(), 40000000, 39000000);
	assert!(matches!(res, Err(Error::CoverageInvariantViolated(_))));
    }

    #[test]
    fn vaccinated_beyond_population_is_refused() {
	let res = CoverageBreakdown::compute(as_of(), &population(), 50000000, 60000000);
	assert!(matches!(res, Err(Error::CoverageInvariantViolated(_))));
    }

    #[test]
    fn counts_near_integer_limits_are_refused() {
	let res = CoverageBreakdown::compute(as_of(), &population(), u64::MAX - 10, u64::MAX);
	assert!(matches!(res, Err(Error::CoverageInvariantViolated(_))));
	let res = CoverageBreakdown::compute(as_of(), &population(), u64::MAX, u64::MAX);
	assert!(matches!(res, Err(Error::CoverageInvariantViolated(_))));
    }

    #[test]
    fn snapshot_uses_the_first_record() {
	let res: Response = serde_json::from_value(json!({"data": [
	    {"date": "2021-07-20", COMPLETE_FIELD: 37000000, FIRST_DOSE_FIELD: 46600000},
	    {"date": "2021-07-19", COMPLETE_FIELD: 36800000, FIRST_DOSE_FIELD: 46500000},
	]})).unwrap();
	let cov = CoverageBreakdown::from_snapshot(&res, &population()).unwrap();
	assert_eq!(cov.as_of, as_of());
	assert_eq!(cov.double_jabbed, 37000000);
	assert_eq!(cov.single_only, 9600000);
    }

    #[test]
    fn snapshot_with_missing_counts_is_parse_failure() {
	let res: Response = serde_json::from_value(json!({"data": [
	    {"date": "2021-07-20", COMPLETE_FIELD: null, FIRST_DOSE_FIELD: 46600000},
	]})).unwrap();
	assert!(matches!(CoverageBreakdown::from_snapshot(&res, &population()),
			 Err(Error::ParseFailed(_))));
    }
}
