use derive_builder::Builder;
use lazy_static::lazy_static;
use regex::Regex;

use crate::error::FormError;

pub mod parse;

lazy_static! {
    // Non-greedy so that several forms in one message stay separate.
    static ref FORM_REGEX: Regex = Regex::new(
        r"(?s)<\?xml[^>]*\?>\s*<RMS_Express_Form>.*?</RMS_Express_Form>"
    )
    .unwrap();
}

/// The four position fields of a form's `variables` section, as raw text.
#[derive(Clone, Debug, Builder, PartialEq, Eq)]
#[builder(setter(into))]
pub struct FormFields {
    pub sender: String,
    pub timestamp: String,
    pub latitude: String,
    pub longitude: String,
}

/// Blocks of message text that look like embedded forms, in order of appearance.
pub fn raw_forms<'a>(text: &'a str) -> impl Iterator<Item = &'a str> + 'a {
    FORM_REGEX.find_iter(text).map(|m| m.as_str())
}

/// Lazily parses every embedded form of a message.
pub fn extract_forms(text: &str) -> impl Iterator<Item = Result<FormFields, FormError>> + '_ {
    raw_forms(text).map(parse::parse_form)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(call: &str) -> String {
        format!(
            "<?xml version=\"1.0\"?>\n<RMS_Express_Form>\n<variables>\n\
             <msgsender>{}</msgsender>\n<datetime>2024-01-10 08:05:00</datetime>\n\
             <maplat>45.3</maplat>\n<maplon>-75.7</maplon>\n</variables>\n</RMS_Express_Form>",
            call
        )
    }

    #[test]
    fn finds_each_form_between_other_text() {
        let text = format!(
            "Date: 2024/01/10 08:00\nSubject: position\n\nHello\n{}\nsome text\n{}\n-- \n73",
            form("VE3NKL"),
            form("VA3XYZ")
        );
        let forms: Vec<_> = raw_forms(&text).collect();
        assert_eq!(forms.len(), 2);
        assert!(forms[0].contains("VE3NKL") && !forms[0].contains("VA3XYZ"));
        assert!(forms[1].ends_with("</RMS_Express_Form>"));

        let senders: Vec<_> = extract_forms(&text)
            .map(|f| f.unwrap().sender)
            .collect();
        assert_eq!(senders, vec!["VE3NKL", "VA3XYZ"]);
    }

    #[test]
    fn ignores_other_xml_documents() {
        let text = "<?xml version=\"1.0\"?>\n<Other><variables/></Other>";
        assert_eq!(raw_forms(text).count(), 0);
    }

    #[test]
    fn unclosed_form_is_not_matched() {
        let text = "<?xml version=\"1.0\"?>\n<RMS_Express_Form>\n<variables>";
        assert_eq!(extract_forms(text).count(), 0);
    }
}
