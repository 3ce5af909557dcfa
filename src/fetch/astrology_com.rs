//! URL and page rules for Astrology.com
//!
//! Today's page lives at `horoscope/daily/{sign}.html`; yesterday and
//! tomorrow move the day into the path (`horoscope/daily/{day}/{sign}.html`).
//! The love style swaps `daily` for `daily-love`.

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use scraper::{Html, Selector};

use super::{parse_page_date, Document, FetchError, PageParser, UrlBuilder};
use crate::data::{RelativeDay, Sign, Style};

const BASE_URL: &str = "https://www.astrology.com/";

/// Page date format, e.g. "July 16, 2024"
const DATE_FORMAT: &str = "%B %d, %Y";

static CONTENT_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("#content span").expect("valid selector"));

static DATE_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("#content-date").expect("valid selector"));

/// Rules for Astrology.com
pub struct AstrologyCom;

impl UrlBuilder for AstrologyCom {
    fn build_url(&self, style: Style, day: RelativeDay, sign: Sign, _on: NaiveDate) -> String {
        let style_part = match style {
            Style::Daily => "horoscope/daily/",
            Style::DailyLove => "horoscope/daily-love/",
        };
        let day_part = match day {
            RelativeDay::Today => format!("{}.html", sign.name()),
            RelativeDay::Yesterday | RelativeDay::Tomorrow => {
                format!("{}/{}.html", day.name(), sign.name())
            }
        };
        format!("{BASE_URL}{style_part}{day_part}")
    }
}

impl PageParser for AstrologyCom {
    fn parse_page(&self, html: &str, _on: NaiveDate) -> Result<Document, FetchError> {
        let doc = Html::parse_document(html);

        let text: String = doc
            .select(&CONTENT_SELECTOR)
            .flat_map(|span| span.text())
            .collect();
        if text.trim().is_empty() {
            return Err(FetchError::ElementNotFound("#content span"));
        }

        let raw_date: String = doc
            .select(&DATE_SELECTOR)
            .next()
            .ok_or(FetchError::ElementNotFound("#content-date"))?
            .text()
            .collect();
        let date = parse_page_date(&raw_date, DATE_FORMAT)?;

        Ok(Document { date, text })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    const PAGE: &str = r#"
        <html><body>
          <div id="content-date">July 16, 2024</div>
          <div id="content">
            <span>A bold start to the day. </span>
            <span>Expect clarity by evening.</span>
          </div>
        </body></html>
    "#;

    #[test]
    fn test_url_today_has_no_day_segment() {
        let url = AstrologyCom.build_url(
            Style::Daily,
            RelativeDay::Today,
            Sign::Aries,
            date(2024, 7, 16),
        );
        assert_eq!(url, "https://www.astrology.com/horoscope/daily/aries.html");
    }

    #[test]
    fn test_url_tomorrow_moves_day_into_path() {
        let url = AstrologyCom.build_url(
            Style::Daily,
            RelativeDay::Tomorrow,
            Sign::Pisces,
            date(2024, 7, 16),
        );
        assert_eq!(
            url,
            "https://www.astrology.com/horoscope/daily/tomorrow/pisces.html"
        );
    }

    #[test]
    fn test_url_love_style() {
        let url = AstrologyCom.build_url(
            Style::DailyLove,
            RelativeDay::Yesterday,
            Sign::Leo,
            date(2024, 7, 16),
        );
        assert_eq!(
            url,
            "https://www.astrology.com/horoscope/daily-love/yesterday/leo.html"
        );
    }

    #[test]
    fn test_parse_page_concatenates_spans() {
        let doc = AstrologyCom.parse_page(PAGE, date(2024, 7, 16)).unwrap();
        assert_eq!(doc.date, date(2024, 7, 16));
        assert_eq!(
            doc.text,
            "A bold start to the day. Expect clarity by evening."
        );
    }

    #[test]
    fn test_parse_page_missing_content() {
        let html = r#"<html><body><div id="content-date">July 16, 2024</div></body></html>"#;
        let err = AstrologyCom
            .parse_page(html, date(2024, 7, 16))
            .unwrap_err();
        assert!(matches!(err, FetchError::ElementNotFound(_)));
    }

    #[test]
    fn test_parse_page_missing_date() {
        let html = r#"
            <html><body><div id="content"><span>text</span></div></body></html>
        "#;
        let err = AstrologyCom
            .parse_page(html, date(2024, 7, 16))
            .unwrap_err();
        assert!(matches!(
            err,
            FetchError::ElementNotFound("#content-date")
        ));
    }
}
