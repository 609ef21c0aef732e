// src/style.rs
use crate::data_types::Record;
use crate::table::is_blank;

pub const DEFAULT_TITLE: &str = "Zenika";
pub const WHITE: &str = "#fff";
pub const BRAND_COLOR: &str = "#b31835";

/// Fallbacks for every visual attribute a row may leave empty.
pub const STYLE_DEFAULTS: [(&str, &str); 5] = [
    ("title", DEFAULT_TITLE),
    ("titleColor", WHITE),
    ("titleBgColor", BRAND_COLOR),
    ("color", BRAND_COLOR),
    ("backgroundColor", WHITE),
];

/// A record with every visual attribute filled in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayRecord {
    pub text: String,
    pub title: String,
    pub title_color: String,
    pub title_bg_color: String,
    pub color: String,
    pub background_color: String,
}

impl DisplayRecord {
    /// Background behind the text: fades from the title badge colour
    /// into the text background over the first 2em.
    pub fn text_background(&self) -> String {
        format!(
            "linear-gradient(to right, {}, {} 2em)",
            self.title_bg_color, self.background_color
        )
    }
}

/// Effective value of a style field: the record's own value unless it
/// is missing or blank.
pub fn effective<'a>(record: &'a Record, field: &str) -> &'a str {
    let value = record.get(field);
    if !is_blank(value) {
        return value.unwrap_or_default();
    }

    STYLE_DEFAULTS
        .iter()
        .find(|(name, _)| *name == field)
        .map(|(_, default)| *default)
        .unwrap_or_default()
}

pub fn resolve(record: &Record) -> DisplayRecord {
    DisplayRecord {
        text: record.text().unwrap_or_default().to_string(),
        title: effective(record, "title").to_string(),
        title_color: effective(record, "titleColor").to_string(),
        title_bg_color: effective(record, "titleBgColor").to_string(),
        color: effective(record, "color").to_string(),
        background_color: effective(record, "backgroundColor").to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_record_gets_every_default() {
        let display = resolve(&Record::from_iter([("text", "hi")]));

        assert_eq!(
            display,
            DisplayRecord {
                text: "hi".into(),
                title: "Zenika".into(),
                title_color: "#fff".into(),
                title_bg_color: "#b31835".into(),
                color: "#b31835".into(),
                background_color: "#fff".into(),
            }
        );
    }

    #[test]
    fn record_values_override_defaults() {
        let display = resolve(&Record::from_iter([
            ("text", "breaking"),
            ("title", "News"),
            ("titleColor", "black"),
            ("titleBgColor", "yellow"),
            ("color", "navy"),
            ("backgroundColor", "#eee"),
        ]));

        assert_eq!(display.title, "News");
        assert_eq!(display.title_color, "black");
        assert_eq!(display.title_bg_color, "yellow");
        assert_eq!(display.color, "navy");
        assert_eq!(display.background_color, "#eee");
    }

    #[test]
    fn blank_values_fall_back() {
        let display = resolve(&Record::from_iter([
            ("text", "hi"),
            ("title", "   "),
            ("color", ""),
        ]));

        assert_eq!(display.title, DEFAULT_TITLE);
        assert_eq!(display.color, BRAND_COLOR);
    }

    #[test]
    fn non_blank_values_are_not_trimmed() {
        let display = resolve(&Record::from_iter([("text", " hi "), ("title", " T ")]));
        assert_eq!(display.text, " hi ");
        assert_eq!(display.title, " T ");
    }

    #[test]
    fn every_default_is_reachable_by_field_name() {
        let bare = Record::from_iter([("text", "hi")]);
        for (field, default) in STYLE_DEFAULTS {
            assert_eq!(effective(&bare, field), default);
        }
    }

    #[test]
    fn unknown_field_has_no_default() {
        assert_eq!(effective(&Record::new(), "fontSize"), "");
    }

    #[test]
    fn text_background_uses_both_colors() {
        let display = resolve(&Record::from_iter([("text", "hi"), ("backgroundColor", "#000")]));
        assert_eq!(
            display.text_background(),
            "linear-gradient(to right, #b31835, #000 2em)"
        );
    }
}
