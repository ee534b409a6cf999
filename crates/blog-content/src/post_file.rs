//! Post file naming: `YYYY-MM-DD-<slug>.md`

use std::sync::LazyLock;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use regex::Regex;

use crate::{Error, Result};

/// Pattern every synchronized post file name must match in full.
pub static POST_FILE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{4}-\d{2}-\d{2})-(.+)\.md$").unwrap());

const DATE_FORMAT: &str = "%Y-%m-%d";

/// The date-part and slug encoded in a post file name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PostFileName {
    pub date_part: String,
    pub slug: String,
}

impl PostFileName {
    pub fn new(date_part: impl Into<String>, slug: impl Into<String>) -> Self {
        Self {
            date_part: date_part.into(),
            slug: slug.into(),
        }
    }

    /// Parse a file name; `None` for anything that is not a post file.
    ///
    /// The slug is everything after the third `-` with the `.md` suffix
    /// removed. Dates that do not exist on the calendar are rejected.
    pub fn parse(name: &str) -> Option<Self> {
        let captures = POST_FILE_PATTERN.captures(name)?;
        let date_part = captures.get(1)?.as_str();
        let slug = captures.get(2)?.as_str();

        NaiveDate::parse_from_str(date_part, DATE_FORMAT).ok()?;

        Some(Self::new(date_part, slug))
    }

    /// Date-part of a remote timestamp, in UTC.
    pub fn date_part_of(timestamp: DateTime<Utc>) -> String {
        timestamp.format(DATE_FORMAT).to_string()
    }

    pub fn file_name(&self) -> String {
        format!("{}-{}.md", self.date_part, self.slug)
    }

    /// Directory used for images that carry no path of their own.
    pub fn image_dir(&self) -> String {
        format!("{}-{}", self.date_part, self.slug)
    }

    /// The date-part at 12:00:00 UTC, used as the creation time of new remote posts.
    pub fn noon_utc(&self) -> Result<DateTime<Utc>> {
        let date = NaiveDate::parse_from_str(&self.date_part, DATE_FORMAT).map_err(|_| {
            Error::InvalidDate {
                value: self.date_part.clone(),
            }
        })?;
        let noon = NaiveTime::from_hms_opt(12, 0, 0).ok_or_else(|| Error::InvalidDate {
            value: self.date_part.clone(),
        })?;
        Ok(date.and_time(noon).and_utc())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rstest::rstest;

    #[rstest]
    #[case("2024-03-01-hello.md", "2024-03-01", "hello")]
    #[case("2024-03-01-hello-world.md", "2024-03-01", "hello-world")]
    #[case("1999-12-31-a.b.md", "1999-12-31", "a.b")]
    fn parses_post_file_names(#[case] name: &str, #[case] date: &str, #[case] slug: &str) {
        let parsed = PostFileName::parse(name).unwrap();
        assert_eq!(parsed.date_part, date);
        assert_eq!(parsed.slug, slug);
        assert_eq!(parsed.file_name(), name);
    }

    #[rstest]
    #[case("hello.md")]
    #[case("2024-03-01-.md")]
    #[case("2024-03-01-hello.markdown")]
    #[case("draft-2024-03-01-hello.md")]
    #[case("2024-03-01-hello.md.bak")]
    #[case("2024-13-01-hello.md")]
    #[case("2024-02-30-hello.md")]
    fn ignores_other_names(#[case] name: &str) {
        assert_eq!(PostFileName::parse(name), None);
    }

    #[test]
    fn noon_utc_uses_the_date_part() {
        let name = PostFileName::new("2024-03-01", "hello");
        assert_eq!(
            name.noon_utc().unwrap(),
            Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
        );
    }

    #[test]
    fn date_part_of_uses_utc() {
        let late = Utc.with_ymd_and_hms(2023, 12, 31, 23, 59, 59).unwrap();
        assert_eq!(PostFileName::date_part_of(late), "2023-12-31");
    }
}
