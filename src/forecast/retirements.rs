// Open seats of the 2026 cycle.

/// A district whose 2025 incumbent is not running in 2026.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Retirement {
    pub district: &'static str,
    pub incumbent: &'static str,
    pub party: &'static str,
    pub reason: &'static str,
}

/// (district, departing incumbent, party, reason) rows, compiled from
/// announcements up to December 2025. Open seats are forecast at the
/// replacement level (WAR 0.0) whatever the departing incumbent scored.
const RETIREMENTS_2026: [(&str, &str, &str, &str); 50] = [
    ("NY-21", "Elise Stefanik", "R", "Retiring"),
    ("WA-04", "Dan Newhouse", "R", "Retiring"),
    ("TX-33", "Marc Veasey", "D", "Retiring"),
    ("TX-37", "Lloyd Doggett", "D", "Retiring"),
    ("TX-22", "Troy Nehls", "R", "Retiring"),
    ("NY-07", "Nydia Velazquez", "D", "Retiring"),
    ("TX-19", "Jodey Arrington", "R", "Retiring"),
    ("NJ-12", "Bonnie Watson Coleman", "D", "Retiring"),
    ("CA-11", "Nancy Pelosi", "D", "Retiring"),
    ("IL-04", "Jesus Garcia", "D", "Retiring"),
    ("ME-02", "Jared Golden", "D", "Retiring"),
    ("TX-10", "Michael McCaul", "R", "Retiring"),
    ("TX-08", "Morgan Luttrell", "R", "Retiring"),
    ("NY-12", "Jerrold Nadler", "D", "Retiring"),
    ("IL-07", "Danny K. Davis", "D", "Retiring"),
    ("NE-02", "Don Bacon", "R", "Retiring"),
    ("PA-03", "Dwight Evans", "D", "Retiring"),
    ("IL-09", "Jan Schakowsky", "D", "Retiring"),
    ("WY-AL", "Harriet Hageman", "R", "Running for Senate"),
    ("TX-30", "Jasmine Crockett", "D", "Running for Senate"),
    ("MA-06", "Seth Moulton", "D", "Running for Senate"),
    ("TX-38", "Wesley Hunt", "R", "Running for Senate"),
    ("IA-02", "Ashley Hinson", "R", "Running for Senate"),
    ("AL-01", "Barry Moore", "R", "Running for Senate"),
    ("GA-10", "Mike Collins", "R", "Running for Senate"),
    ("GA-01", "Buddy Carter", "R", "Running for Senate"),
    ("IL-08", "Raja Krishnamoorthi", "D", "Running for Senate"),
    ("IL-02", "Robin Kelly", "D", "Running for Senate"),
    ("MN-02", "Angie Craig", "D", "Running for Senate"),
    ("KY-06", "Andy Barr", "R", "Running for Senate"),
    ("MI-11", "Haley Stevens", "D", "Running for Senate"),
    ("NH-01", "Chris Pappas", "D", "Running for Senate"),
    ("CA-14", "Eric Swalwell", "D", "Running for Governor"),
    ("AZ-01", "David Schweikert", "R", "Running for Governor"),
    ("WI-07", "Tom Tiffany", "R", "Running for Governor"),
    ("SC-01", "Nancy Mace", "R", "Running for Governor"),
    ("SC-05", "Ralph Norman", "R", "Running for Governor"),
    ("SD-AL", "Dusty Johnson", "R", "Running for Governor"),
    ("IA-04", "Randy Feenstra", "R", "Running for Governor"),
    ("MI-10", "John James", "R", "Running for Governor"),
    ("TN-06", "John Rose", "R", "Running for Governor"),
    ("FL-19", "Byron Donalds", "R", "Running for Governor"),
    ("AZ-05", "Andy Biggs", "R", "Running for Governor"),
    ("TX-21", "Chip Roy", "R", "Running for AG"),
    ("NJ-11", "Mikie Sherrill", "D", "Resigned - Now Governor"),
    ("TN-07", "Mark Green", "R", "Resigned"),
    ("VA-11", "Gerald Connolly", "D", "Deceased"),
    ("AZ-07", "Raul Grijalva", "D", "Deceased"),
    ("TX-18", "Sylvester Turner", "D", "Deceased"),
    ("FL-06", "Michael Waltz", "R", "Resigned - NSA"),
];

/// The open-seat entry of a district, if there is one.
pub fn retirement(district: &str) -> Option<Retirement> {
    RETIREMENTS_2026
        .iter()
        .find(|(d, _, _, _)| *d == district)
        .map(|&(district, incumbent, party, reason)| Retirement {
            district,
            incumbent,
            party,
            reason,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn known_open_seats_are_found() {
        let pelosi = retirement("CA-11").unwrap();
        assert_eq!(pelosi.incumbent, "Nancy Pelosi");
        assert_eq!(pelosi.party, "D");
        assert_eq!(pelosi.reason, "Retiring");

        let waltz = retirement("FL-06").unwrap();
        assert_eq!(waltz.party, "R");
        assert_eq!(waltz.reason, "Resigned - NSA");

        assert!(retirement("CA-12").is_none());
        assert!(retirement("ca-11").is_none());
    }

    #[test]
    fn districts_are_unique() {
        let districts: HashSet<&str> = RETIREMENTS_2026.iter().map(|(d, _, _, _)| *d).collect();
        assert_eq!(districts.len(), RETIREMENTS_2026.len());
    }
}
