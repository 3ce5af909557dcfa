//! URL and page rules for AstroStyle.com
//!
//! AstroStyle keys its daily pages on the day of the week rather than a
//! relative day. Saturday and Sunday share a single "weekend" page, so a
//! Saturday and a Sunday request build the same URL and the page heading
//! carries both dates ("Horoscope for July 20, 2024 - July 21, 2024");
//! the parser picks the half matching the requested day.

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use scraper::{Html, Selector};

use super::{parse_page_date, Document, FetchError, PageParser, UrlBuilder};
use crate::data::{weekday_name, RelativeDay, Sign, Style};

const BASE_URL: &str = "https://astrostyle.com/";

/// Page date format, e.g. "July 16, 2024"
const DATE_FORMAT: &str = "%B %d, %Y";

static CONTENT_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("div.horoscope-content p").expect("valid selector"));

static HEADING_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("div.horoscope-content h2").expect("valid selector"));

/// Maps a lowercase weekday name to the URL bucket AstroStyle uses
fn url_bucket(weekday: &str) -> &'static str {
    match weekday {
        "monday" => "monday",
        "tuesday" => "tuesday",
        "wednesday" => "wednesday",
        "thursday" => "thursday",
        "friday" => "friday",
        // Saturday and Sunday publish on one shared page
        "saturday" | "sunday" => "weekend",
        _ => "weekend",
    }
}

/// Rules for AstroStyle.com
pub struct Astrostyle;

impl UrlBuilder for Astrostyle {
    fn build_url(&self, _style: Style, _day: RelativeDay, sign: Sign, on: NaiveDate) -> String {
        let bucket = url_bucket(weekday_name(on));
        format!("{BASE_URL}horoscopes/daily/{}/{bucket}/", sign.name())
    }
}

impl PageParser for Astrostyle {
    fn parse_page(&self, html: &str, on: NaiveDate) -> Result<Document, FetchError> {
        let doc = Html::parse_document(html);

        let text: String = doc
            .select(&CONTENT_SELECTOR)
            .next()
            .ok_or(FetchError::ElementNotFound("div.horoscope-content p"))?
            .text()
            .collect::<String>()
            .trim()
            .to_string();
        if text.is_empty() {
            return Err(FetchError::ElementNotFound("div.horoscope-content p"));
        }

        let heading: String = doc
            .select(&HEADING_SELECTOR)
            .next()
            .ok_or(FetchError::ElementNotFound("div.horoscope-content h2"))?
            .text()
            .collect();
        let raw_dates = heading
            .split("Horoscope for")
            .nth(1)
            .ok_or(FetchError::ElementNotFound("heading date"))?;

        // Weekend headings carry "saturday - sunday" date pairs
        let raw_date = match weekday_name(on) {
            "saturday" => raw_dates.split(" - ").next().unwrap_or(raw_dates),
            "sunday" => raw_dates.split(" - ").nth(1).unwrap_or(raw_dates),
            _ => raw_dates,
        };
        let date = parse_page_date(raw_date, DATE_FORMAT)?;

        Ok(Document { date, text })
    }
}
