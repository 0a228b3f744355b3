//! Correlation between daily cases and hospital admissions, before and after
//! the vaccine programme took effect.
//!
//! Both series are scaled by their historical peaks so that one unit on each
//! axis is comparable, and one least-squares line is fitted per regime. A
//! lower slope after the second cutoff means fewer admissions per case.

use chrono::naive::NaiveDate;

use super::config::CorrelationConfig;
use super::error::{Result,Error};
use super::table::ObservationTable;


#[derive(Clone,Copy,Debug,PartialEq)]
pub struct CorrelationPoint {
    pub date: NaiveDate,
    /// NaN when the API had no case count for the date.
    pub no_cases: f64,
    pub new_admissions: f64,
    pub normalized_cases: f64,
    pub normalized_admissions: f64,
}

#[derive(Clone,Debug,Default,PartialEq)]
pub struct CorrelationDataset {
    pub points: Vec<CorrelationPoint>,
}

#[derive(Clone,Copy,Debug,PartialEq)]
pub struct LinearFit {
    pub slope: f64,
    pub intercept: f64,
}

#[derive(Clone,Debug)]
pub struct Regime {
    pub label: String,
    pub data: CorrelationDataset,
    pub fit: LinearFit,
}

#[derive(Clone,Debug)]
pub struct Analysis {
    pub max_cases: Option<f64>,
    pub max_admissions: Option<f64>,
    pub before: Regime,
    pub after: Regime,
}


/// Rows after the first cutoff, with missing admissions counted as zero and
/// both series normalized.
pub fn prepare(table: &ObservationTable, config: &CorrelationConfig) -> Result<CorrelationDataset> {
    let cases = table.column("no_cases")?;
    let admissions = table.column("new_admissions")?;
    Ok(CorrelationDataset {
	points: cases.into_iter().zip(admissions).filter_map(
	    |((date,cases),(_,admissions))| match date > config.first_cut {
		false => None,
		true => {
		    let no_cases = cases.unwrap_or(f64::NAN);
		    let new_admissions = admissions.unwrap_or(0.0);
		    Some(CorrelationPoint {
			date, no_cases, new_admissions,
			normalized_cases: no_cases / config.case_scale,
			normalized_admissions: new_admissions / config.admission_scale,
		    })
		}
	    }).collect()
    })
}


impl CorrelationDataset {

    pub fn max_cases(&self) -> Option<f64> {
	max(self.points.iter().map(|p| p.no_cases))
    }

    pub fn max_admissions(&self) -> Option<f64> {
	max(self.points.iter().map(|p| p.new_admissions))
    }

    /// Points strictly before and strictly after `cut`; a point dated on the
    /// cut itself belongs to neither side.
    pub fn split(&self, cut: NaiveDate) -> (CorrelationDataset, CorrelationDataset) {
	let before = self.points.iter().filter(|p| p.date < cut).cloned().collect();
	let after = self.points.iter().filter(|p| p.date > cut).cloned().collect();
	(CorrelationDataset { points: before }, CorrelationDataset { points: after })
    }

    pub fn normalized(&self) -> Vec<(f64,f64)> {
	self.points.iter()
	    .map(|p| (p.normalized_cases, p.normalized_admissions))
	    .collect()
    }

}


fn max<I: Iterator<Item = f64>>(vals: I) -> Option<f64> {
    vals.filter(|v| !v.is_nan())
	.fold(None, |a: Option<f64>, b| Some(a.map_or(b, |a| a.max(b))))
}


impl LinearFit {

    pub fn at(&self, x: f64) -> f64 {
	self.slope * x + self.intercept
    }

}


/// Ordinary least-squares line through `points`. NaN coordinates propagate
/// into the result.
pub fn fit(regime: &str, points: &[(f64,f64)]) -> Result<LinearFit> {

    let degenerate = || Error::InsufficientDataForFit {
	regime: regime.to_string(),
	points: points.len()
    };

    if points.len() < 2 {
	return Err(degenerate());
    }
    let x0 = points[0].0;
    if points.iter().all(|(x,_)| *x == x0) {
	return Err(degenerate());
    }

    let n = points.len() as f64;
    let mean_x = points.iter().map(|(x,_)| x).sum::<f64>() / n;
    let mean_y = points.iter().map(|(_,y)| y).sum::<f64>() / n;
    let sxy = points.iter().map(|(x,y)| (x - mean_x) * (y - mean_y)).sum::<f64>();
    let sxx = points.iter().map(|(x,_)| (x - mean_x).powi(2)).sum::<f64>();

    let slope = sxy / sxx;
    Ok(LinearFit { slope, intercept: mean_y - slope * mean_x })

}


pub fn analyze(table: &ObservationTable, config: &CorrelationConfig) -> Result<Analysis> {

    let data = prepare(table, config)?;
    let (before, after) = data.split(config.second_cut);

    let regime = |label: String, data: CorrelationDataset| -> Result<Regime> {
	let fit = fit(&label, &data.normalized())?;
	Ok(Regime { label, data, fit })
    };

    Ok(Analysis {
	max_cases: data.max_cases(),
	max_admissions: data.max_admissions(),
	before: regime(format!("Pre {}", config.second_cut), before)?,
	after: regime(format!("Post {}", config.second_cut), after)?,
    })

}
