//! Vaccine effectiveness against the Alpha and Delta variants, from the PHE
//! vaccine surveillance report, week 29 (2021):
//! https://assets.publishing.service.gov.uk/government/uploads/system/uploads/attachment_data/file/1005085/Vaccine_surveillance_report_-_week_29.pdf


#[derive(Clone,Copy,Debug,PartialEq,Eq)]
pub struct Efficacy {
    pub variant: &'static str,
    pub dose_1: u32,
    pub dose_2: u32,
}

#[derive(Clone,Copy,Debug)]
pub struct EffectivenessTable {
    pub slug: &'static str,
    pub title: &'static str,
    pub rows: &'static [Efficacy],
}

pub const SYMPTOMATIC: EffectivenessTable = EffectivenessTable {
    slug: "symptomatic",
    title: "Vaccine effectiveness against symptomatic disease",
    rows: &[
	Efficacy { variant: "Alpha", dose_1: 49, dose_2: 89 },
	Efficacy { variant: "Delta", dose_1: 35, dose_2: 79 },
    ]
};

pub const HOSPITALISATION: EffectivenessTable = EffectivenessTable {
    slug: "hospitalisation",
    title: "Vaccine effectiveness against hospitalisation",
    rows: &[
	Efficacy { variant: "Alpha", dose_1: 78, dose_2: 93 },
	Efficacy { variant: "Delta", dose_1: 80, dose_2: 96 },
    ]
};

pub const TABLES: [EffectivenessTable; 2] = [SYMPTOMATIC, HOSPITALISATION];


#[cfg(test)]
mod tests {
    use super::*;

    fn row(table: &EffectivenessTable, variant: &str) -> (u32, u32) {
	let r = table.rows.iter().find(|r| r.variant == variant).unwrap();
	(r.dose_1, r.dose_2)
    }

    #[test]
    fn published_values() {
	assert_eq!(row(&SYMPTOMATIC, "Alpha"), (49, 89));
	assert_eq!(row(&SYMPTOMATIC, "Delta"), (35, 79));
	assert_eq!(row(&HOSPITALISATION, "Alpha"), (78, 93));
	assert_eq!(row(&HOSPITALISATION, "Delta"), (80, 96));
    }

    #[test]
    fn second_dose_never_below_first() {
	for table in TABLES.iter() {
	    assert!(table.rows.iter().all(|r| r.dose_2 >= r.dose_1), "{}", table.title);
	}
    }
}
