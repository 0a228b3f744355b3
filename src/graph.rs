use std::{io,fs};
use std::fs::File;
use std::io::Write;
use std::path::{Path,PathBuf};

use serde_json::{Value,json};

use super::correlation::{Analysis,Regime};
use super::coverage::{Bucket,CoverageBreakdown};
use super::effectiveness::EffectivenessTable;
use super::error::Result;
use super::table::ObservationTable;


pub const DOSE_2_COLOR: &str = "lightblue";
pub const DOSE_1_COLOR: &str = "royalblue";


/// Cases and admissions over time, each on its own y axis.
pub fn trend_graph(graph_path: &Path, table: &ObservationTable) -> Result<PathBuf> {

    let title = "Daily cases and hospital admissions";
    let cases = table.column("no_cases")?;
    let admissions = table.column("new_admissions")?;

    let line = |field: &str, color: &str, ytitle: &str| json!({
	"mark": {
	    "color": color,
	    "type": "line"
	},
	"encoding": {
	    "y": {
		"field": field,
		"type": "quantitative",
		"scale": {
		    "type": "linear",
		    "domainMin": 0
		},
		"axis": {
		    "titleColor": color,
		    "title": ytitle
		}
	    }
	}
    });

    graph(graph_path, "casesandadmissions.html", title, &json!({
	"$schema": "https://vega.github.io/schema/vega-lite/v4.json",
	"height": "container",
	"width": "container",
	"title": title,
	"data": {
	    "values": cases.iter().zip(admissions.iter()).map(
		|((date,cases),(_,admissions))| json!({
		    "Date": format!("{}", date.format("%Y-%m-%d")),
		    "Cases": cases,
		    "Admissions": admissions
		})).collect::<Vec<_>>()
	},
	"encoding": {
	    "x": {
		"field": "Date",
		"timeUnit": "utcyearmonthdate",
		"title": "Date",
		"type": "temporal"
	    }
	},
	"resolve": {
	    "scale": {
		"y": "independent"
	    }
	},
	"layer": [
	    line("Cases", "blue", "No. Cases"),
	    line("Admissions", "red", "No. Admissions"),
	]
    }))

}


/// Normalized admissions against normalized cases, one colour per regime,
/// with the fitted line of each regime.
pub fn correlation_graph(graph_path: &Path, analysis: &Analysis) -> Result<PathBuf> {

    let title = "Correlation of cases and admissions";
    let regimes = [(&analysis.before, "C1", "red"), (&analysis.after, "C2", "blue")];

    let fit_label = |regime: &Regime, name: &str| format!("{}={:.1}", name, regime.fit.slope);

    let values = regimes.iter().flat_map(|(regime,name,_)| {
	let fit = fit_label(regime, name);
	regime.data.normalized().into_iter()
	    .filter(|(x,y)| x.is_finite() && y.is_finite())
	    .map(move |(x,y)| json!({
		"Regime": regime.label,
		"Fit": fit,
		"Cases": x,
		"Admissions": y,
		"Fitted": regime.fit.at(x)
	    }))
    }).collect::<Vec<_>>();

    let domain = regimes.iter().flat_map(
	|(regime,name,_)| vec![regime.label.clone(), fit_label(regime, name)]
    ).collect::<Vec<_>>();
    let range = regimes.iter().flat_map(
	|(_,_,color)| vec![*color, *color]
    ).collect::<Vec<_>>();
    let color = |field: &str| json!({
	"field": field,
	"type": "nominal",
	"title": null,
	"scale": {"domain": domain, "range": range}
    });

    graph(graph_path, "correlation.html", title, &json!({
	"$schema": "https://vega.github.io/schema/vega-lite/v4.json",
	"height": "container",
	"width": "container",
	"title": title,
	"data": {"values": values},
	"encoding": {
	    "x": {
		"field": "Cases",
		"title": "Normalised Cases",
		"type": "quantitative"
	    }
	},
	"layer": [
	    {
		"mark": {"type": "point", "filled": true},
		"encoding": {
		    "y": {"field": "Admissions", "title": "Normalised Admissions",
			  "type": "quantitative"},
		    "color": color("Regime")
		}
	    },
	    {
		"mark": {"type": "line"},
		"encoding": {
		    "y": {"field": "Fitted", "type": "quantitative"},
		    "color": color("Fit")
		}
	    }
	]
    }))

}


/// Stacked horizontal bar of the population by vaccination status. Labels are
/// computed from the breakdown itself.
pub fn coverage_graph(graph_path: &Path, coverage: &CoverageBreakdown) -> Result<PathBuf> {

    let title = format!("Vaccination status of the UK population ({})",
			coverage.as_of.format("%Y-%m-%d"));

    let mut start = 0.0;
    let values = Bucket::ALL.iter().enumerate().map(|(i,bucket)| {
	let pct = coverage.percentage(*bucket);
	let count = coverage.count(*bucket);
	let mid = start + pct / 2.0;
	start += pct;
	json!({
	    "Bucket": bucket.label(),
	    "Order": i,
	    "Percentage": pct,
	    "Middle": mid,
	    "Count": count,
	    "Share": format!("{:.0}%", pct),
	    "Millions": format!("~{:.1}m", count as f64 / 1e6)
	})
    }).collect::<Vec<_>>();

    let text = |field: &str, dy: i32| json!({
	"mark": {"type": "text", "fontSize": 22, "dy": dy},
	"encoding": {
	    "x": {"field": "Middle", "type": "quantitative"},
	    "text": {"field": field}
	}
    });

    graph(graph_path, "coverage.html", &title, &json!({
	"$schema": "https://vega.github.io/schema/vega-lite/v4.json",
	"height": "container",
	"width": "container",
	"title": title,
	"data": {"values": values},
	"layer": [
	    {
		"mark": "bar",
		"encoding": {
		    "x": {
			"field": "Percentage",
			"type": "quantitative",
			"stack": "zero",
			"title": "% of Population",
			"scale": {"domain": [0, 100]}
		    },
		    "color": {
			"field": "Bucket",
			"type": "nominal",
			"title": null,
			"sort": Bucket::ALL.iter().map(|b| b.label()).collect::<Vec<_>>(),
			"scale": {
			    "domain": Bucket::ALL.iter().map(|b| b.label()).collect::<Vec<_>>(),
			    "range": Bucket::ALL.iter().map(|b| b.color()).collect::<Vec<_>>()
			}
		    },
		    "order": {"field": "Order", "type": "quantitative"},
		    "tooltip": [
			{"field": "Bucket", "type": "nominal"},
			{"field": "Count", "type": "quantitative", "format": ",.0f"},
			{"field": "Percentage", "type": "quantitative", "format": ".1f"}
		    ]
		}
	    },
	    text("Share", -14),
	    text("Millions", 14)
	]
    }))

}


/// First and second dose effectiveness per variant, the second dose bar
/// behind the first.
pub fn effectiveness_graph(graph_path: &Path, table: &EffectivenessTable) -> Result<PathBuf> {

    let values = table.rows.iter().flat_map(|row| vec![
	json!({"Variant": row.variant, "Dose": "x2 Dose", "Effectiveness": row.dose_2,
	       "Label": format!("{}%", row.dose_2)}),
	json!({"Variant": row.variant, "Dose": "x1 Dose", "Effectiveness": row.dose_1,
	       "Label": format!("{}%", row.dose_1)}),
    ]).collect::<Vec<_>>();

    let dose = |name: &str| json!({
	"transform": [{"filter": {"field": "Dose", "equal": name}}],
	"layer": [
	    {"mark": "bar"},
	    {
		"mark": {"type": "text", "fontSize": 22, "dy": 20, "color": "black"},
		"encoding": {"text": {"field": "Label"}}
	    }
	]
    });

    graph(graph_path, &format!("effectiveness-{}.html", table.slug), table.title, &json!({
	"$schema": "https://vega.github.io/schema/vega-lite/v4.json",
	"height": "container",
	"width": "container",
	"title": table.title,
	"data": {"values": values},
	"encoding": {
	    "x": {"field": "Variant", "type": "nominal", "title": null,
		  "axis": {"labelAngle": 0, "labelFontSize": 14}},
	    "y": {"field": "Effectiveness", "type": "quantitative",
		  "title": "% Effectiveness", "scale": {"domain": [0, 100]}},
	    "color": {
		"field": "Dose",
		"type": "nominal",
		"title": null,
		"scale": {"domain": ["x2 Dose", "x1 Dose"],
			  "range": [DOSE_2_COLOR, DOSE_1_COLOR]}
	    }
	},
	"layer": [dose("x2 Dose"), dose("x1 Dose")]
    }))

}


fn graph(graph_path: &Path, path: &str, title: &str, spec: &Value) -> Result<PathBuf> {

    fs::create_dir_all(graph_path)?;
    let path = graph_path.join(path);
    let mut out = io::BufWriter::new(File::create(&path)?);

    write!(out, "<!DOCTYPE html><html><head>")?;
    write!(out, "<meta charset=\"UTF-8\">")?;
    write!(out, "<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">")?;
    write!(out, "<title>{}</title>", title)?;
    write!(out, "<script src=\"https://cdn.jsdelivr.net/npm/vega@5\"></script>")?;
    write!(out, "<script src=\"https://cdn.jsdelivr.net/npm/vega-lite@4\"></script>")?;
    write!(out, "<script src=\"https://cdn.jsdelivr.net/npm/vega-embed\"></script>")?;
    write!(out, "</head>")?;
    write!(out, "<body>")?;
    write!(out, "<div id=\"vis\" style=\"overflow: hidden; position: absolute;top: 0; left: 0; right: 0; bottom: 0;\"></div>")?;
    write!(out, "<script type=\"text/javascript\">")?;
    write!(out, "var spec = ")?;

    serde_json::to_writer_pretty(out.by_ref(), spec)?;

    write!(out, ";vegaEmbed('#vis', spec,{{}}).then(function(result) {{")?;
    write!(out, "}}).catch(console.error);")?;
    write!(out, "</script>")?;
    write!(out, "</body></html>")?;
    out.flush()?;

    Ok(path)

}
