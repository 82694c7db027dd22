//! Institute roll numbers encode the admission year and department, e.g.
//! "2021CS10001" is a Computer Science student admitted in 2021. Onboarding
//! uses these to fill in fields the caller left out.

use chrono::{Datelike, Utc};

const DEPARTMENTS: &[(&str, &str)] = &[
    ("CS", "Computer Science"),
    ("ME", "Mechanical Engineering"),
    ("EE", "Electrical Engineering"),
    ("CE", "Civil Engineering"),
    ("CH", "Chemical Engineering"),
    ("BT", "Biotechnology"),
    ("MM", "Metallurgical Engineering"),
    ("PH", "Physics"),
    ("MA", "Mathematics"),
    ("MC", "Mathematics and Computing"),
    ("MS", "Mathematics and Scientific Computing"),
    ("MT", "Mathematics and Statistics"),
];

/// Department encoded in a roll number of the shape `\d{4}<code>\d{5}`,
/// where `<code>` is one of the known two-letter department codes.
pub fn department_from_roll_number(roll_number: &str) -> Option<&'static str> {
    let roll = roll_number.trim().to_uppercase();
    if roll.len() != 11 {
        return None;
    }

    let (year, rest) = roll.split_at(4);
    let (code, serial) = rest.split_at(2);
    if !year.chars().all(|c| c.is_ascii_digit()) || !serial.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }

    DEPARTMENTS
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, name)| *name)
}

/// Study year derived from the leading four admission-year digits, clamped
/// to 1-5 with a fallback of 1. `None` when the prefix is not a year.
pub fn year_from_roll_number(roll_number: &str) -> Option<i32> {
    let roll = roll_number.trim();
    let prefix = roll.get(..4)?;
    if !prefix.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }

    let admission_year: i32 = prefix.parse().ok()?;
    let current_year = Utc::now().year();
    let year = current_year - admission_year + 1;
    if (1..=5).contains(&year) {
        Some(year)
    } else {
        Some(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn department_resolves_known_codes() {
        assert_eq!(
            department_from_roll_number("2021CS10001"),
            Some("Computer Science")
        );
        assert_eq!(
            department_from_roll_number("2022me20002"),
            Some("Mechanical Engineering")
        );
        assert_eq!(department_from_roll_number("2023MC30003"), Some("Mathematics and Computing"));
    }

    #[test]
    fn department_rejects_non_institute_formats() {
        assert_eq!(department_from_roll_number("2021XX10001"), None);
        assert_eq!(department_from_roll_number("21CS10001"), None);
        assert_eq!(department_from_roll_number("2021CS100"), None);
        assert_eq!(department_from_roll_number("ABCDCS10001"), None);
        assert_eq!(department_from_roll_number(""), None);
    }

    #[test]
    fn year_counts_from_admission() {
        let current = Utc::now().year();
        let roll = format!("{}CS10001", current - 1);
        assert_eq!(year_from_roll_number(&roll), Some(2));
    }

    #[test]
    fn year_clamps_out_of_range_to_one() {
        // An admission year a decade back computes outside 1-5.
        let current = Utc::now().year();
        let roll = format!("{}CS10001", current - 10);
        assert_eq!(year_from_roll_number(&roll), Some(1));
    }

    #[test]
    fn year_requires_a_numeric_prefix() {
        assert_eq!(year_from_roll_number("CS2021001"), None);
        assert_eq!(year_from_roll_number("20"), None);
    }
}
