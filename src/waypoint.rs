use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::info;

use crate::error::ExportError;
use crate::geo::LatLon;
use crate::station::Station;

pub const GPX_NS: &str = "http://www.topografix.com/GPX/1/1";
pub const KML_NS: &str = "http://www.opengis.net/kml/2.2";
static XSI_NS: &str = "http://www.w3.org/2001/XMLSchema-instance";
static HOME_NAME: &str = "HOME STATION";

/// Both formats end with a home entry, so they need stations and a QTH.
fn home_position(stations: &[Station], home: Option<LatLon>) -> Result<LatLon, ExportError> {
    if stations.is_empty() {
        return Err(ExportError::NoStations);
    }
    home.ok_or(ExportError::NoHome)
}

fn text_element<W: Write>(w: &mut Writer<W>, name: &str, text: &str) -> quick_xml::Result<()> {
    w.write_event(Event::Start(BytesStart::new(name)))?;
    w.write_event(Event::Text(BytesText::new(text)))?;
    w.write_event(Event::End(BytesEnd::new(name)))
}

fn gpx_waypoint<W: Write>(w: &mut Writer<W>, latlon: LatLon, name: &str) -> quick_xml::Result<()> {
    let mut wpt = BytesStart::new("wpt");
    wpt.push_attribute(("lat", latlon.lat().to_string().as_str()));
    wpt.push_attribute(("lon", latlon.lon().to_string().as_str()));
    w.write_event(Event::Start(wpt))?;
    text_element(w, "name", name)?;
    w.write_event(Event::End(BytesEnd::new("wpt")))
}

fn kml_placemark<W: Write>(
    w: &mut Writer<W>,
    latlon: LatLon,
    name: &str,
    description: &str,
) -> quick_xml::Result<()> {
    w.write_event(Event::Start(BytesStart::new("Placemark")))?;
    text_element(w, "name", name)?;
    text_element(w, "description", description)?;
    w.write_event(Event::Start(BytesStart::new("Point")))?;
    text_element(
        w,
        "coordinates",
        &format!("{:.5},{:.5},0", latlon.lon(), latlon.lat()),
    )?;
    w.write_event(Event::End(BytesEnd::new("Point")))?;
    w.write_event(Event::End(BytesEnd::new("Placemark")))
}

/// GPX 1.1 document: one waypoint per station, unrounded, then the home waypoint.
pub fn write_gpx<W: Write>(
    out: W,
    stations: &[Station],
    home: Option<LatLon>,
) -> Result<W, ExportError> {
    let home = home_position(stations, home)?;
    let mut w = Writer::new_with_indent(out, b' ', 2);

    w.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    let mut gpx = BytesStart::new("gpx");
    gpx.push_attribute(("xmlns", GPX_NS));
    gpx.push_attribute(("xmlns:xsi", XSI_NS));
    gpx.push_attribute(("creator", env!("CARGO_PKG_NAME")));
    gpx.push_attribute(("version", "1.1"));
    w.write_event(Event::Start(gpx))?;

    for s in stations {
        gpx_waypoint(&mut w, s.latlon, &s.callsign)?;
    }
    gpx_waypoint(&mut w, home, HOME_NAME)?;

    w.write_event(Event::End(BytesEnd::new("gpx")))?;
    Ok(w.into_inner())
}

/// KML 2.2 document: one placemark per station, 5 decimals, then the home placemark.
pub fn write_kml<W: Write>(
    out: W,
    stations: &[Station],
    home: Option<LatLon>,
) -> Result<W, ExportError> {
    let home = home_position(stations, home)?;
    let mut w = Writer::new_with_indent(out, b' ', 2);

    w.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    let mut kml = BytesStart::new("kml");
    kml.push_attribute(("xmlns", KML_NS));
    w.write_event(Event::Start(kml))?;
    w.write_event(Event::Start(BytesStart::new("Document")))?;

    for s in stations {
        let description = format!("{} Winlink Station", s.callsign);
        kml_placemark(&mut w, s.latlon, &s.callsign, &description)?;
    }
    kml_placemark(&mut w, home, HOME_NAME, "Home Winlink Station")?;

    w.write_event(Event::End(BytesEnd::new("Document")))?;
    w.write_event(Event::End(BytesEnd::new("kml")))?;
    Ok(w.into_inner())
}

fn export<F>(path: &Path, stations: &[Station], home: Option<LatLon>, write: F) -> Result<(), ExportError>
where
    F: FnOnce(BufWriter<File>, &[Station], Option<LatLon>) -> Result<BufWriter<File>, ExportError>,
{
    // Nothing is created on disk unless the document can be completed.
    home_position(stations, home)?;
    let file = BufWriter::new(File::create(path)?);
    write(file, stations, home)?.flush()?;
    info!("Wrote {} waypoints to {}", stations.len() + 1, path.display());
    Ok(())
}

pub fn export_gpx(path: &Path, stations: &[Station], home: Option<LatLon>) -> Result<(), ExportError> {
    export(path, stations, home, write_gpx::<BufWriter<File>>)
}

pub fn export_kml(path: &Path, stations: &[Station], home: Option<LatLon>) -> Result<(), ExportError> {
    export(path, stations, home, write_kml::<BufWriter<File>>)
}
