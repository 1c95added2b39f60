//! Reverse-chronological ordering of dated profile entries.
//!
//! Entries are only reordered when every entry's date parses; a single
//! unparseable date keeps the model's source order for the whole list.

use chrono::NaiveDate;

use crate::profile::models::CandidateProfile;

pub fn order_profile(profile: &mut CandidateProfile) {
    order_reverse_chronological(&mut profile.employment_record, |e| e.from.as_str());
    order_reverse_chronological(&mut profile.work_undertaken, |w| w.year.as_str());
}

/// Stable sort, newest first, keyed on the leading date of `date_of(item)`.
pub fn order_reverse_chronological<T>(items: &mut Vec<T>, date_of: impl Fn(&T) -> &str) {
    if items.len() < 2 {
        return;
    }

    let Some(dates) = items
        .iter()
        .map(|item| parse_leading_date(date_of(item)))
        .collect::<Option<Vec<NaiveDate>>>()
    else {
        return;
    };

    let mut keyed: Vec<(NaiveDate, T)> = dates.into_iter().zip(items.drain(..)).collect();
    keyed.sort_by(|a, b| b.0.cmp(&a.0));
    items.extend(keyed.into_iter().map(|(_, item)| item));
}

/// Parses a leading `YYYY`, `YYYY-MM` or `YYYY-MM-DD`. Missing month/day count as 1.
/// `"2018-2020"` reads as 2018, `"2019 – Present"` as 2019.
pub fn parse_leading_date(raw: &str) -> Option<NaiveDate> {
    let token: &str = {
        let raw = raw.trim();
        let end = raw
            .find(|c: char| !(c.is_ascii_digit() || c == '-'))
            .unwrap_or(raw.len());
        &raw[..end]
    };

    let mut parts = token.split('-');
    let year_part = parts.next()?;
    if year_part.len() != 4 {
        return None;
    }
    let year: i32 = year_part.parse().ok()?;

    let month = parts.next().and_then(small_number);
    let day = month.and_then(|_| parts.next().and_then(small_number));

    NaiveDate::from_ymd_opt(year, month.unwrap_or(1), day.unwrap_or(1))
}

fn small_number(part: &str) -> Option<u32> {
    if part.is_empty() || part.len() > 2 {
        return None;
    }
    part.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::models::{EmploymentEntry, WorkEntry};

    fn job(from: &str, employer: &str) -> EmploymentEntry {
        EmploymentEntry {
            from: from.to_string(),
            employer: employer.to_string(),
            ..Default::default()
        }
    }

    fn employers(profile: &CandidateProfile) -> Vec<&str> {
        profile
            .employment_record
            .iter()
            .map(|e| e.employer.as_str())
            .collect()
    }

    #[test]
    fn test_parse_leading_date_formats() {
        assert_eq!(parse_leading_date("2019"), NaiveDate::from_ymd_opt(2019, 1, 1));
        assert_eq!(parse_leading_date("2019-07"), NaiveDate::from_ymd_opt(2019, 7, 1));
        assert_eq!(
            parse_leading_date(" 2019-07-15 "),
            NaiveDate::from_ymd_opt(2019, 7, 15)
        );
        assert_eq!(parse_leading_date("2018-2020"), NaiveDate::from_ymd_opt(2018, 1, 1));
        assert_eq!(
            parse_leading_date("2019 – Present"),
            NaiveDate::from_ymd_opt(2019, 1, 1)
        );
    }

    #[test]
    fn test_parse_leading_date_rejects_unclear_values() {
        assert_eq!(parse_leading_date(""), None);
        assert_eq!(parse_leading_date("Present"), None);
        assert_eq!(parse_leading_date("Jan 2019"), None);
        assert_eq!(parse_leading_date("19-07"), None);
        assert_eq!(parse_leading_date("2019-13"), None);
    }

    #[test]
    fn test_employment_sorted_newest_first() {
        let mut profile = CandidateProfile {
            employment_record: vec![job("2012", "A"), job("2020-03", "B"), job("2016-11-02", "C")],
            ..Default::default()
        };
        order_profile(&mut profile);
        assert_eq!(employers(&profile), vec!["B", "C", "A"]);
    }

    #[test]
    fn test_unparseable_date_keeps_source_order() {
        let mut profile = CandidateProfile {
            employment_record: vec![job("2012", "A"), job("sometime", "B"), job("2020", "C")],
            ..Default::default()
        };
        order_profile(&mut profile);
        assert_eq!(employers(&profile), vec!["A", "B", "C"]);
    }

    #[test]
    fn test_equal_dates_keep_relative_order() {
        let mut profile = CandidateProfile {
            employment_record: vec![job("2015", "A"), job("2015", "B"), job("2018", "C")],
            ..Default::default()
        };
        order_profile(&mut profile);
        assert_eq!(employers(&profile), vec!["C", "A", "B"]);
    }

    #[test]
    fn test_work_undertaken_sorted_by_year() {
        let work = |year: &str, name: &str| WorkEntry {
            year: year.to_string(),
            name: name.to_string(),
            ..Default::default()
        };
        let mut profile = CandidateProfile {
            work_undertaken: vec![work("2010-2012", "Old"), work("2021 - Present", "New")],
            ..Default::default()
        };
        order_profile(&mut profile);
        let names: Vec<_> = profile.work_undertaken.iter().map(|w| w.name.as_str()).collect();
        assert_eq!(names, vec!["New", "Old"]);
    }
}
