mod config;
mod correlation;
mod coverage;
mod effectiveness;
mod error;
mod graph;
mod table;
mod ukgov;

use std::fmt::Display;
use std::path::Path;
use std::process;

use tracing::{error,info,warn};
use tracing_subscriber::{layer::SubscriberExt,util::SubscriberInitExt};

use config::Config;
use correlation::Analysis;
use coverage::{Bucket,CoverageBreakdown};
use error::Result;
use table::{ObservationTable,CASE_COLUMNS};
use ukgov::Fetcher;


const SEPARATOR: &str = "----------------------------------------------------------";


fn main() {

    tracing_subscriber::registry()
	.with(tracing_subscriber::EnvFilter::try_from_default_env()
	      .unwrap_or_else(|_| "uk_vaccine_insights=info".into()))
	.with(tracing_subscriber::fmt::layer())
	.init();

    if let Err(err) = run(&Config::default()) {
	error!("{}", err);
	process::exit(1);
    }

}


fn run(config: &Config) -> Result<()> {

    let fetcher = Fetcher::new(config.fetch.clone())?;

    let cases = fetcher.fetch(&ukgov::CASES_AND_ADMISSIONS)
	.map_err(|err| err.in_stage("cases and admissions query"))?;
    println!("Api call successful...");

    let table = ObservationTable::from_records(&cases.data, CASE_COLUMNS)
	.map_err(|err| err.in_stage("cases and admissions table"))?;
    match table.is_empty() {
	true => warn!("cases and admissions query returned no records"),
	false => info!(rows = table.len(), "built observation table"),
    }

    let analysis = correlation::analyze(&table, &config.correlation)
	.map_err(|err| err.in_stage("correlation"))?;
    report_correlation(&analysis);

    let vaccinations = fetcher.fetch(&ukgov::VACCINATIONS)
	.map_err(|err| err.in_stage("vaccinations query"))?;
    println!("Api call successful...");

    let coverage = CoverageBreakdown::from_snapshot(&vaccinations, &config.population)
	.map_err(|err| err.in_stage("vaccination coverage"))?;
    report_coverage(&coverage);

    write_outputs(&config.graph_path, &table, &analysis, &coverage)
	.map_err(|err| err.in_stage("chart output"))

}


/// Charts are only written once every stage has succeeded.
fn write_outputs(graph_path: &Path, table: &ObservationTable,
		 analysis: &Analysis, coverage: &CoverageBreakdown) -> Result<()> {

    std::fs::create_dir_all(graph_path)?;
    table.write_csv(&graph_path.join("observations.csv"))?;

    let mut written = vec![
	graph::trend_graph(graph_path, table)?,
	graph::correlation_graph(graph_path, analysis)?,
	graph::coverage_graph(graph_path, coverage)?,
    ];
    for efficacy in effectiveness::TABLES.iter() {
	written.push(graph::effectiveness_graph(graph_path, efficacy)?);
    }

    for path in written {
	info!("Wrote {}", path.display());
    }
    Ok(())

}


fn section<T: Display>(label: &str, values: &[T]) {
    println!(" ");
    println!("{}", SEPARATOR);
    println!("{}", label);
    for value in values {
	println!("{}", value);
    }
    println!("{}", SEPARATOR);
    println!(" ");
}


fn report_correlation(analysis: &Analysis) {
    let show = |v: Option<f64>| v.map_or("n/a".to_string(), |v| v.to_string());
    section("Max number of cases:", &[show(analysis.max_cases)]);
    section("Max number of admissions:", &[show(analysis.max_admissions)]);
    for regime in &[&analysis.before, &analysis.after] {
	info!(regime = %regime.label, points = regime.data.points.len(),
	      slope = regime.fit.slope, intercept = regime.fit.intercept,
	      "fitted admissions against cases");
    }
}


fn report_coverage(coverage: &CoverageBreakdown) {
    section("UK population", &[coverage.population]);
    for (bucket,label) in Bucket::ALL.iter().zip(&[
	"No. Double Jabbed", "No. Single Jabbed", "No. under 18's", "No. Unvaccinated"]) {
	section(label, &[coverage.count(*bucket).to_string(),
			 format!("{}", coverage.percentage(*bucket))]);
    }
}
