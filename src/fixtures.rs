//! Small datasets shared by the unit tests.

use crate::models::{FilterCriteria, RecordTable};
use crate::store;

/// Three rows, no optional columns.
pub const CORE_ONLY_CSV: &str = "\
Title,College,Program/Cluster,Year,PUBLISHED,Scopus or Non-Scopus,Publication Format
A,CAS,Biology,2020,PUBLISHED,Scopus,Journal
B,CAS,Psychology,2021,PUBLISHED,Non-Scopus,Proceeding
C,CCIS,Computer Science,2020,ACCEPTED,Scopus,Journal
";

/// Seven rows with authors and SDG tags, no country.
pub const FULL_CSV: &str = "\
Title,College,Program/Cluster,Year,PUBLISHED,Scopus or Non-Scopus,Publication Format,Authors,SDG Targeted
P1,CAS,Biology,2020,PUBLISHED,Scopus,Journal,Reyes; Cruz,SDG 3; SDG 4
P2,CAS,Psychology,2021,PUBLISHED,Non-Scopus,Proceeding,Santos,SDG 4
P3,CCIS,Computer Science,2020,ACCEPTED,Scopus,Journal,Reyes; Cruz,SDG 9; SDG 4
P4,CAS,Biology,2021,UNDER EVALUATION,Scopus,Proceeding,Lim,SDG 3
P5,MITL,Engineering,2019,TO BE PRESENTED,Non-Scopus,Proceeding,Santos,SDG 9;SDG 11
P6,CCIS,Information Technology,2022,WAITING FOR PUBLICATION,Non-Scopus,Journal,Reyes; Cruz,
P7,CAS,Biology,2022,PUBLISHED,Scopus,Journal,Garcia,SDG 17
";

/// Country variant: four rows, one with a null country.
pub const COUNTRY_CSV: &str = "\
Title,College,Program/Cluster,Year,PUBLISHED,Scopus or Non-Scopus,Publication Format,Country
A,CAS,Biology,2020,PUBLISHED,Scopus,Journal,Philippines
B,CAS,Biology,2021,PUBLISHED,Scopus,Journal,Japan
C,CCIS,Computing,2021,ACCEPTED,Scopus,Journal,Philippines
D,MITL,Engineering,2022,ACCEPTED,Non-Scopus,Proceeding,
";

pub const HEADER_ONLY_CSV: &str = "\
Title,College,Program/Cluster,Year,PUBLISHED,Scopus or Non-Scopus,Publication Format
";

pub fn table(csv: &str) -> RecordTable {
    store::from_reader(csv.as_bytes()).expect("fixture csv parses")
}

pub fn criteria(colleges: &[&str], statuses: &[&str], min: i32, max: i32) -> FilterCriteria {
    FilterCriteria::new(colleges.iter().copied(), statuses.iter().copied(), min, max)
        .expect("fixture criteria are valid")
}
