use quick_xml::events::*;
use quick_xml::Reader;

use super::{FormFields, FormFieldsBuilder};
use crate::error::FormError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Field {
    Sender,
    Timestamp,
    Latitude,
    Longitude,
}

fn field_for(name: &[u8]) -> Option<Field> {
    match name {
        b"msgsender" => Some(Field::Sender),
        b"datetime" => Some(Field::Timestamp),
        b"maplat" => Some(Field::Latitude),
        b"maplon" => Some(Field::Longitude),
        _ => None,
    }
}

#[derive(Default)]
struct Variables {
    fields: FormFieldsBuilder,
    seen: Vec<Field>,
}

impl Variables {
    // A repeated element keeps its first value.
    fn set(&mut self, field: Field, value: String) {
        if self.seen.contains(&field) {
            return;
        }
        self.seen.push(field);
        match field {
            Field::Sender => self.fields.sender(value),
            Field::Timestamp => self.fields.timestamp(value),
            Field::Latitude => self.fields.latitude(value),
            Field::Longitude => self.fields.longitude(value),
        };
    }

    fn has_sender(&self) -> bool {
        self.seen.contains(&Field::Sender)
    }
}

// Attribute values are unused; they are read only so a malformed one fails the form.
fn check_attributes(event: &BytesStart) -> Result<(), FormError> {
    for attr in event.attributes() {
        attr.map_err(quick_xml::Error::from)?.unescape_value()?;
    }
    Ok(())
}

/// Reads a `variables` element through its end tag. Yields the collected fields only when
/// the section has a sender.
fn get_variables(reader: &mut Reader<&[u8]>) -> Result<Option<FormFieldsBuilder>, FormError> {
    let mut vars = Variables::default();
    let mut current: Option<(Field, String)> = None;
    let mut depth = 0usize;

    loop {
        match reader.read_event()? {
            Event::Start(ref event) => {
                check_attributes(event)?;
                depth += 1;
                if depth == 1 {
                    current = field_for(event.name().as_ref()).map(|f| (f, String::new()));
                }
            }
            Event::Empty(ref event) => {
                check_attributes(event)?;
                if depth == 0 {
                    if let Some(field) = field_for(event.name().as_ref()) {
                        vars.set(field, String::new());
                    }
                }
            }
            Event::Text(ref text) => {
                let text = text.unescape()?;
                if depth == 1 {
                    if let Some((_, ref mut value)) = current {
                        value.push_str(&text);
                    }
                }
            }
            Event::CData(ref data) if depth == 1 => {
                if let Some((_, ref mut value)) = current {
                    value.push_str(&String::from_utf8_lossy(data));
                }
            }
            Event::End(_) if depth == 0 => break,
            Event::End(_) => {
                depth -= 1;
                if depth == 0 {
                    if let Some((field, value)) = current.take() {
                        vars.set(field, value);
                    }
                }
            }
            Event::Eof => return Err(FormError::Unbalanced),
            _ => (),
        }
    }

    Ok(if vars.has_sender() {
        Some(vars.fields)
    } else {
        None
    })
}

/// Parses one isolated form. The whole document must be well formed; the first
/// `variables` section that holds a `msgsender` supplies the fields.
pub fn parse_form(xml: &str) -> Result<FormFields, FormError> {
    let mut reader = Reader::from_str(xml);
    let mut variables = None;
    let mut depth = 0usize;

    loop {
        match reader.read_event()? {
            Event::Start(ref event)
                if variables.is_none() && event.name().as_ref() == b"variables" =>
            {
                check_attributes(event)?;
                variables = get_variables(&mut reader)?;
            }
            Event::Start(ref event) => {
                check_attributes(event)?;
                depth += 1;
            }
            Event::Empty(ref event) => check_attributes(event)?,
            Event::Text(ref text) => {
                text.unescape()?;
            }
            Event::End(_) => depth = depth.checked_sub(1).ok_or(FormError::Unbalanced)?,
            Event::Eof => break,
            _ => (),
        }
    }

    if depth != 0 {
        return Err(FormError::Unbalanced);
    }

    variables
        .ok_or(FormError::NoVariables)?
        .build()
        .map_err(|e| FormError::Incomplete {
            detail: e.to_string(),
        })
}
