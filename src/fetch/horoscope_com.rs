//! URL and page rules for Horoscope.com
//!
//! The relative day is a page name (`today.aspx`, `tomorrow.aspx`,
//! `yesterday.aspx`) and the sign travels as a 1-based query parameter. The
//! horoscope paragraph starts with a "<date> - " prefix that must be dropped;
//! dashes inside the text itself are restored after splitting.

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use scraper::{Html, Selector};

use super::{parse_page_date, Document, FetchError, PageParser, UrlBuilder};
use crate::data::{RelativeDay, Sign, Style};

const BASE_URL: &str = "https://www.horoscope.com/us/horoscopes/";

/// Page date format, e.g. "Jul 16, 2024"
const DATE_FORMAT: &str = "%b %d, %Y";

static CONTENT_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("div.main-horoscope p").expect("valid selector"));

static DATE_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("div.main-horoscope strong").expect("valid selector"));

/// 1-based sign number used in the query string
fn sign_number(sign: Sign) -> usize {
    Sign::ALL
        .iter()
        .position(|&s| s == sign)
        .map(|i| i + 1)
        .unwrap_or(1)
}

/// Rules for Horoscope.com
pub struct HoroscopeCom;

impl UrlBuilder for HoroscopeCom {
    fn build_url(&self, style: Style, day: RelativeDay, sign: Sign, _on: NaiveDate) -> String {
        let style_part = match style {
            Style::Daily => "general/horoscope-general-daily-",
            Style::DailyLove => "love/horoscope-love-daily-",
        };
        format!(
            "{BASE_URL}{style_part}{}.aspx?sign={}",
            day.name(),
            sign_number(sign)
        )
    }
}

impl PageParser for HoroscopeCom {
    fn parse_page(&self, html: &str, _on: NaiveDate) -> Result<Document, FetchError> {
        let doc = Html::parse_document(html);

        let paragraph: String = doc
            .select(&CONTENT_SELECTOR)
            .next()
            .ok_or(FetchError::ElementNotFound("div.main-horoscope p"))?
            .text()
            .collect();

        // The paragraph reads "<date> - <text>"; drop the date prefix and
        // restore any " - " that belonged to the text itself.
        let text = paragraph
            .split(" - ")
            .skip(1)
            .collect::<Vec<_>>()
            .join(" - ");
        if text.trim().is_empty() {
            return Err(FetchError::ElementNotFound("div.main-horoscope p"));
        }

        let raw_date: String = doc
            .select(&DATE_SELECTOR)
            .next()
            .ok_or(FetchError::ElementNotFound("div.main-horoscope strong"))?
            .text()
            .collect();
        let date = parse_page_date(&raw_date, DATE_FORMAT)?;

        Ok(Document { date, text })
    }
}
