//! Grid record to guide programme transformation
//!
//! A record either becomes a [`Programme`] or is skipped with a
//! [`SkipReason`]; skips never abort the surrounding day or run.

use chrono::Duration;
use chrono_tz::Tz;

use crate::errors::SkipReason;
use crate::models::{Category, Programme, RawProgramme};
use crate::utils::datetime::DateTimeParser;
use crate::utils::xml_name::encode_name;

/// Largest run time accepted, in milliseconds (about 30 000 years)
const MAX_RUN_TIME_MS: f64 = 1e15;

/// Transforms raw grid records into programmes in one target zone
#[derive(Debug, Clone, Copy)]
pub struct ProgrammeTransformer {
    timezone: Tz,
}

impl ProgrammeTransformer {
    pub fn new(timezone: Tz) -> Self {
        Self { timezone }
    }

    /// Transform one record, or explain why it has to be skipped
    pub fn transform(&self, raw: &RawProgramme) -> Result<Programme, SkipReason> {
        let program_id = encode_field(&raw.program_id);
        let title = encode_field(&raw.title);
        let subtitle = encode_field(&raw.subtitle);
        let kind = encode_field(&raw.kind);
        let flags = raw.flags.join(", ");

        let start_time = raw.start_time.as_deref().unwrap_or_default();
        if start_time.is_empty() {
            return Err(SkipReason::MissingStartTime);
        }

        let start = DateTimeParser::parse_flexible(start_time)
            .map_err(|_| SkipReason::InvalidStartTime {
                input: start_time.to_string(),
            })?
            .with_timezone(&self.timezone);

        let run_time = raw.run_time.as_deref().unwrap_or_default();
        let stop = start
            .checked_add_signed(parse_run_time(run_time)?)
            .ok_or_else(|| SkipReason::OutOfRange {
                input: run_time.to_string(),
            })?;

        let (categories, is_hd, is_stereo, is_new) = derive_attributes(&kind, &flags);

        Ok(Programme {
            program_id,
            title,
            subtitle,
            categories,
            is_hd,
            is_stereo,
            is_new,
            start,
            stop,
            duration: raw.duration.clone().unwrap_or_default(),
        })
    }
}

fn encode_field(value: &Option<String>) -> String {
    value.as_deref().map(encode_name).unwrap_or_default()
}

/// Run time in minutes, possibly fractional; empty means zero
fn parse_run_time(run_time: &str) -> Result<Duration, SkipReason> {
    let trimmed = run_time.trim();
    if trimmed.is_empty() {
        return Ok(Duration::zero());
    }

    let minutes: f64 = trimmed
        .parse()
        .ok()
        .filter(|m: &f64| m.is_finite())
        .ok_or_else(|| SkipReason::InvalidRunTime {
            input: run_time.to_string(),
        })?;

    let millis = (minutes * 60_000.0).round();
    if millis.abs() > MAX_RUN_TIME_MS {
        return Err(SkipReason::OutOfRange {
            input: run_time.to_string(),
        });
    }

    Ok(Duration::milliseconds(millis as i64))
}

/// Categories and flag-derived attributes
///
/// Every check is independent. Flags are matched as substrings of the
/// `", "`-joined flag list.
fn derive_attributes(kind: &str, flags: &str) -> (Vec<Category>, bool, bool, bool) {
    let mut categories = Vec::new();

    match kind {
        "M" => categories.push(Category::Movie),
        "N" => categories.push(Category::News),
        "S" => categories.push(Category::Sports),
        _ => {}
    }
    if flags.contains("EI") {
        categories.push(Category::Kids);
    }

    (
        categories,
        flags.contains("HD"),
        flags.contains("Stereo"),
        flags.contains("New"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn raw_programme(
        kind: &str,
        flags: &[&str],
        start: Option<&str>,
        run_time: Option<&str>,
    ) -> RawProgramme {
        RawProgramme {
            program_id: Some("EP0001".to_string()),
            title: Some("Title".to_string()),
            subtitle: None,
            kind: Some(kind.to_string()),
            flags: flags.iter().map(|f| f.to_string()).collect(),
            start_time: start.map(String::from),
            run_time: run_time.map(String::from),
            duration: Some("30".to_string()),
        }
    }

    fn utc() -> ProgrammeTransformer {
        ProgrammeTransformer::new(chrono_tz::UTC)
    }

    #[test]
    fn test_transform_basic() {
        let raw = raw_programme("N", &["HD", "New"], Some("2024-01-01T00:00:00Z"), Some("30"));
        let programme = utc().transform(&raw).unwrap();

        assert_eq!(programme.program_id, "EP0001");
        assert_eq!(programme.title, "Title");
        assert_eq!(programme.subtitle, "");
        assert_eq!(programme.xmltv_start(), "20240101000000 +0000");
        assert_eq!(programme.xmltv_stop(), "20240101003000 +0000");
        assert_eq!(programme.categories, vec![Category::News]);
        assert!(programme.is_hd);
        assert!(!programme.is_stereo);
        assert!(programme.is_new);
        assert_eq!(programme.duration, "30");
    }

    #[test]
    fn test_transform_converts_timezone() {
        let transformer = ProgrammeTransformer::new(chrono_tz::America::Chicago);
        let raw = raw_programme("", &[], Some("2024-01-01T18:00:00Z"), Some("90"));
        let programme = transformer.transform(&raw).unwrap();

        assert_eq!(programme.xmltv_start(), "20240101120000 -0600");
        assert_eq!(programme.xmltv_stop(), "20240101133000 -0600");
    }

    #[test]
    fn test_transform_across_dst_change() {
        // 2024-03-10 02:00 CST -> 03:00 CDT
        let transformer = ProgrammeTransformer::new(chrono_tz::America::Chicago);
        let raw = raw_programme("", &[], Some("2024-03-10T07:30:00Z"), Some("60"));
        let programme = transformer.transform(&raw).unwrap();

        assert_eq!(programme.xmltv_start(), "20240310013000 -0600");
        assert_eq!(programme.xmltv_stop(), "20240310033000 -0500");
        assert_eq!(programme.stop - programme.start, Duration::minutes(60));
    }

    #[rstest]
    #[case(None)]
    #[case(Some(""))]
    fn test_missing_start_time_is_skipped(#[case] start: Option<&str>) {
        let raw = raw_programme("M", &[], start, Some("30"));
        assert_eq!(utc().transform(&raw), Err(SkipReason::MissingStartTime));
    }

    #[test]
    fn test_invalid_start_time_is_skipped() {
        let raw = raw_programme("M", &[], Some("yesterday"), Some("30"));
        assert_eq!(
            utc().transform(&raw),
            Err(SkipReason::InvalidStartTime {
                input: "yesterday".to_string()
            })
        );
    }

    #[test]
    fn test_non_numeric_run_time_is_skipped() {
        let raw = raw_programme("M", &[], Some("2024-01-01T00:00:00Z"), Some("half an hour"));
        assert!(matches!(
            utc().transform(&raw),
            Err(SkipReason::InvalidRunTime { .. })
        ));

        let raw = raw_programme("M", &[], Some("2024-01-01T00:00:00Z"), Some("NaN"));
        assert!(matches!(
            utc().transform(&raw),
            Err(SkipReason::InvalidRunTime { .. })
        ));
    }

    #[test]
    fn test_huge_run_time_is_skipped() {
        let raw = raw_programme("M", &[], Some("2024-01-01T00:00:00Z"), Some("1e30"));
        assert!(matches!(
            utc().transform(&raw),
            Err(SkipReason::OutOfRange { .. })
        ));
    }

    #[rstest]
    #[case(None)]
    #[case(Some(""))]
    fn test_empty_run_time_gives_zero_length(#[case] run_time: Option<&str>) {
        let raw = raw_programme("M", &[], Some("2024-01-01T00:00:00Z"), run_time);
        let programme = utc().transform(&raw).unwrap();
        assert_eq!(programme.start, programme.stop);
    }

    #[test]
    fn test_fractional_run_time() {
        let raw = raw_programme("", &[], Some("2024-01-01T00:00:00Z"), Some("1.5"));
        let programme = utc().transform(&raw).unwrap();
        assert_eq!(programme.stop - programme.start, Duration::seconds(90));
    }

    #[test]
    fn test_text_fields_are_name_encoded() {
        let mut raw = raw_programme("M", &[], Some("2024-01-01T00:00:00Z"), Some("30"));
        raw.title = Some("Law & Order".to_string());
        raw.subtitle = Some("Pilot <1>".to_string());

        let programme = utc().transform(&raw).unwrap();
        assert_eq!(programme.title, "Law_x0020__x0026__x0020_Order");
        assert_eq!(programme.subtitle, "Pilot_x0020__x003C_1_x003E_");
    }

    #[rstest]
    #[case("M", &[], &[Category::Movie], false, false, false)]
    #[case("N", &[], &[Category::News], false, false, false)]
    #[case("S", &[], &[Category::Sports], false, false, false)]
    #[case("E", &[], &[], false, false, false)]
    #[case("M", &["EI"], &[Category::Movie, Category::Kids], false, false, false)]
    #[case("", &["EI", "HD", "Stereo", "New"], &[Category::Kids], true, true, true)]
    #[case("S", &["HD"], &[Category::Sports], true, false, false)]
    #[case("N", &["Stereo", "New"], &[Category::News], false, true, true)]
    #[case("M", &["HDR"], &[Category::Movie], true, false, false)]
    fn test_category_and_attribute_derivation(
        #[case] kind: &str,
        #[case] flags: &[&str],
        #[case] categories: &[Category],
        #[case] is_hd: bool,
        #[case] is_stereo: bool,
        #[case] is_new: bool,
    ) {
        let raw = raw_programme(kind, flags, Some("2024-01-01T00:00:00Z"), Some("30"));
        let programme = utc().transform(&raw).unwrap();

        assert_eq!(programme.categories, categories);
        assert_eq!(programme.is_hd, is_hd);
        assert_eq!(programme.is_stereo, is_stereo);
        assert_eq!(programme.is_new, is_new);
    }
}
