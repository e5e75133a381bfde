use custom_error::custom_error;

pub type Result<T> = std::result::Result<T, Error>;

custom_error! {pub Error
    Io{source: std::io::Error} = "I/O error: {source}",
    MailDir{path: String} = "mail directory {path} does not exist or is not a directory",
    Config{source: ConfigError} = "{source}",
    Export{source: ExportError} = "export failed: {source}"
}

custom_error! {pub ConfigError
    Qth{value: String} = "Invalid --qth value <{value}>, must be maidenhead grid (6 or 8 characters) or 'latitude,longitude'",
    QthCoordinate{source: ValidationError} = "Invalid --qth coordinate: {source}"
}

// Station fields, first failing check wins.
custom_error! {#[derive(PartialEq)] pub ValidationError
    EmptyCallsign = "callsign is empty",
    EmptyLatitude = "latitude is empty",
    InvalidLatitude{value: String} = "invalid latitude value: <{value}>",
    EmptyLongitude = "longitude is empty",
    InvalidLongitude{value: String} = "invalid longitude value: <{value}>",
    EmptyTimestamp = "date/time is empty",
    InvalidTimestamp{value: String} = "date/time value is invalid: <{value}>"
}

custom_error! {pub FormError
    Xml{source: quick_xml::Error} = "form is not well-formed: {source}",
    Unbalanced = "form ends before its elements are closed",
    NoVariables = "form has no variables section with a sender",
    Incomplete{detail: String} = "form is incomplete: {detail}"
}

custom_error! {pub ExportError
    NoStations = "no station positions to export",
    NoHome = "a home location (--qth) is required to write waypoint files",
    Io{source: std::io::Error} = "{source}",
    Xml{source: quick_xml::Error} = "{source}"
}
