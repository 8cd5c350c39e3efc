//! CSV export of plotted series
//!
//! Writes one row per sample index with one column per channel:
//!
//! ```text
//! sample,Channel 0,Channel 1
//! 0,512,1024
//! 1,515,
//! ```
//!
//! A cell is left empty when a channel has no point at that sample (for
//! example a channel that appeared later, or a value skipped on decode
//! error).

use crate::config::settings::ExportSettings;
use crate::error::{PlotterError, Result};
use chrono::{DateTime, TimeZone};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Data of one series, detached from the chart
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ExportSeries {
    pub name: String,
    /// `(sample, value)` pairs
    pub points: Vec<(f64, f64)>,
}

/// Default file name for an export started at `now`
pub fn default_export_filename<Tz: TimeZone>(now: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    format!("serial-plot-{}.csv", now.format("%Y%m%d-%H%M%S"))
}

/// Write `series` as CSV to `writer`
///
/// Returns the number of data rows written (the header is not counted).
pub fn write_csv<W: Write>(
    writer: &mut W,
    series: &[ExportSeries],
    settings: &ExportSettings,
) -> Result<usize> {
    let delimiter = settings.delimiter;
    if delimiter == '"' || delimiter == '\n' || delimiter == '\r' {
        return Err(PlotterError::Export(format!(
            "Unusable CSV delimiter {:?}",
            delimiter
        )));
    }

    // Samples are integer indices; key rows by them so channels line up
    let mut rows: BTreeMap<i64, Vec<Option<f64>>> = BTreeMap::new();
    for (column, s) in series.iter().enumerate() {
        for &(x, y) in &s.points {
            let cells = rows
                .entry(x.round() as i64)
                .or_insert_with(|| vec![None; series.len()]);
            cells[column] = Some(y);
        }
    }

    if settings.include_header {
        let mut header = String::from("sample");
        for s in series {
            header.push(delimiter);
            header.push_str(&quote_field(&s.name, delimiter));
        }
        writeln!(writer, "{}", header)?;
    }

    for (sample, cells) in &rows {
        let mut line = sample.to_string();
        for cell in cells {
            line.push(delimiter);
            if let Some(value) = cell {
                line.push_str(&format_value(*value));
            }
        }
        writeln!(writer, "{}", line)?;
    }

    writer.flush()?;
    Ok(rows.len())
}

/// Write `series` as CSV to a new file at `path`
pub fn export_to_file(
    path: &Path,
    series: &[ExportSeries],
    settings: &ExportSettings,
) -> Result<usize> {
    let file = File::create(path)
        .map_err(|e| PlotterError::Export(format!("Failed to create {}: {}", path.display(), e)))?;
    let mut writer = BufWriter::new(file);
    let rows = write_csv(&mut writer, series, settings)?;
    tracing::info!("Exported {} rows to {}", rows, path.display());
    Ok(rows)
}

fn quote_field(field: &str, delimiter: char) -> String {
    if field.contains(delimiter) || field.contains('"') || field.contains('\n') || field.contains('\r')
    {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// Integral values are written without a fractional part
fn format_value(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 9.0e15 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series(name: &str, points: &[(f64, f64)]) -> ExportSeries {
        ExportSeries {
            name: name.to_string(),
            points: points.to_vec(),
        }
    }

    fn to_string(series: &[ExportSeries], settings: &ExportSettings) -> (usize, String) {
        let mut out = Vec::new();
        let rows = write_csv(&mut out, series, settings).unwrap();
        (rows, String::from_utf8(out).unwrap())
    }

    #[test]
    fn test_aligned_channels() {
        let data = vec![
            series("Channel 0", &[(0.0, 1.0), (1.0, 2.0)]),
            series("Channel 1", &[(0.0, 10.0), (1.0, 20.0)]),
        ];
        let (rows, csv) = to_string(&data, &ExportSettings::default());
        assert_eq!(rows, 2);
        assert_eq!(csv, "sample,Channel 0,Channel 1\n0,1,10\n1,2,20\n");
    }

    #[test]
    fn test_missing_samples_are_empty_cells() {
        let data = vec![
            series("Channel 0", &[(0.0, 1.0), (1.0, 2.0), (2.0, 3.0)]),
            series("Channel 1", &[(2.0, 30.0)]),
        ];
        let (_, csv) = to_string(&data, &ExportSettings::default());
        assert_eq!(csv, "sample,Channel 0,Channel 1\n0,1,\n1,2,\n2,3,30\n");
    }

    #[test]
    fn test_without_header_and_custom_delimiter() {
        let settings = ExportSettings {
            include_header: false,
            delimiter: ';',
        };
        let data = vec![series("a", &[(5.0, -7.0)]), series("b", &[(5.0, 0.5)])];
        let (_, csv) = to_string(&data, &settings);
        assert_eq!(csv, "5;-7;0.5\n");
    }

    #[test]
    fn test_names_are_quoted() {
        let data = vec![series("volts, \"raw\"", &[])];
        let (rows, csv) = to_string(&data, &ExportSettings::default());
        assert_eq!(rows, 0);
        assert_eq!(csv, "sample,\"volts, \"\"raw\"\"\"\n");
    }

    #[test]
    fn test_rejects_quote_delimiter() {
        let settings = ExportSettings {
            include_header: true,
            delimiter: '"',
        };
        let mut out = Vec::new();
        assert!(matches!(
            write_csv(&mut out, &[], &settings),
            Err(PlotterError::Export(_))
        ));
    }

    #[test]
    fn test_default_filename() {
        let at = chrono::Utc.with_ymd_and_hms(2024, 3, 9, 14, 5, 7).unwrap();
        assert_eq!(default_export_filename(&at), "serial-plot-20240309-140507.csv");
    }

    #[test]
    fn test_export_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        let rows = export_to_file(
            &path,
            &[series("Channel 0", &[(0.0, 1.0)])],
            &ExportSettings::default(),
        )
        .unwrap();
        assert_eq!(rows, 1);
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "sample,Channel 0\n0,1\n"
        );
    }
}
