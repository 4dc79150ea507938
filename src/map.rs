use crate::geocode::Coordinates;
use std::fmt::Write as _;
use std::io;
use std::path::Path;

// Fallback view when nothing could be geocoded.
const DEFAULT_CENTER: (f64, f64) = (51.1634, 10.4477);
const DEFAULT_ZOOM: u8 = 6;

pub struct MapPin {
    pub website: String,
    pub score: u8,
    pub coords: Coordinates,
}

/// Marker color band: red is a lead worth calling, green is fine as-is.
pub fn score_color(score: u8) -> &'static str {
    if score < 50 {
        "#d43f3a"
    } else if score < 80 {
        "#ed9c28"
    } else {
        "#4cae4c"
    }
}

/// Render a self-contained Leaflet map with one circle marker per
/// geocoded lead.
pub fn render_map(pins: &[MapPin]) -> String {
    let (center_lat, center_lon) = center_of(pins);

    let mut markers = String::new();
    for pin in pins {
        let _ = writeln!(
            markers,
            "    L.circleMarker([{:.6}, {:.6}], {{radius: 9, color: '{}', fillColor: '{}', fillOpacity: 0.8}})\n      .bindPopup('<b>{}</b><br>Score: {}/100')\n      .addTo(map);",
            pin.coords.lat,
            pin.coords.lon,
            score_color(pin.score),
            score_color(pin.score),
            escape_js(&pin.website),
            pin.score
        );
    }

    format!(
        r#"<!DOCTYPE html>
<html>
<head>
  <meta charset="utf-8">
  <title>Lead map</title>
  <link rel="stylesheet" href="https://unpkg.com/leaflet@1.9.4/dist/leaflet.css">
  <script src="https://unpkg.com/leaflet@1.9.4/dist/leaflet.js"></script>
  <style>html, body, #map {{ height: 100%; margin: 0; }}</style>
</head>
<body>
  <div id="map"></div>
  <script>
    var map = L.map('map').setView([{:.6}, {:.6}], {});
    L.tileLayer('https://tile.openstreetmap.org/{{z}}/{{x}}/{{y}}.png', {{
      attribution: '&copy; OpenStreetMap contributors'
    }}).addTo(map);
{}  </script>
</body>
</html>
"#,
        center_lat, center_lon, DEFAULT_ZOOM, markers
    )
}

pub fn write_map(path: &Path, pins: &[MapPin]) -> io::Result<()> {
    std::fs::write(path, render_map(pins))
}

fn center_of(pins: &[MapPin]) -> (f64, f64) {
    if pins.is_empty() {
        return DEFAULT_CENTER;
    }
    let lat: f64 = pins.iter().map(|p| p.coords.lat).sum::<f64>() / pins.len() as f64;
    let lon: f64 = pins.iter().map(|p| p.coords.lon).sum::<f64>() / pins.len() as f64;
    (lat, lon)
}

// Keep lead names from breaking out of the single-quoted JS string.
fn escape_js(raw: &str) -> String {
    raw.replace('\\', "\\\\")
        .replace('\'', "\\'")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
