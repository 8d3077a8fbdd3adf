use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::Serialize;

/// Output formats for rendered frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// One SVG document per frame, written into a directory.
    Svg,
    /// A single JSON recording of every frame's path strings.
    Json,
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "svg" => Ok(ExportFormat::Svg),
            "json" => Ok(ExportFormat::Json),
            _ => Err(format!("Unsupported export format: {} (expected svg or json)", s)),
        }
    }
}

/// Errors raised while writing frames
#[derive(thiserror::Error, Debug)]
pub enum ExportError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("failed to encode recording: {0}")]
    Json(#[from] serde_json::Error),
}

/// One layer's outline within a frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrameLayer {
    pub fill: String,
    pub path: String,
}

/// Every layer's outline at one host timestamp.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Frame {
    pub index: usize,
    pub timestamp_ms: f64,
    pub layers: Vec<FrameLayer>,
}

#[derive(Serialize)]
struct Recording<'a> {
    width: f64,
    height: f64,
    frames: &'a [Frame],
}

/// Write one frame as an SVG document. Layers with an empty outline are skipped.
pub fn write_svg<W: Write>(
    frame: &Frame,
    width: f64,
    height: f64,
    writer: &mut W,
) -> Result<(), ExportError> {
    writeln!(
        writer,
        r#"<svg xmlns="http://www.w3.org/2000/svg" version="1.1" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
        w = width,
        h = height
    )?;

    for (i, layer) in frame.layers.iter().enumerate() {
        if layer.path.is_empty() {
            continue;
        }
        writeln!(
            writer,
            r#"  <path id="wave-path-{}" d="{}" fill="{}"/>"#,
            i,
            layer.path,
            escape_attr(&layer.fill)
        )?;
    }

    writeln!(writer, "</svg>")?;
    Ok(())
}

/// Write a JSON recording of all frames, suitable as golden output.
pub fn write_json<W: Write>(
    frames: &[Frame],
    width: f64,
    height: f64,
    writer: &mut W,
) -> Result<(), ExportError> {
    let recording = Recording {
        width,
        height,
        frames,
    };
    serde_json::to_writer_pretty(&mut *writer, &recording)?;
    writeln!(writer)?;
    Ok(())
}

/// Export frames to `output`.
///
/// For [`ExportFormat::Svg`] `output` is a directory that receives
/// `wave_frame_NNN.svg` files; for [`ExportFormat::Json`] it is the file path.
/// Returns the paths written.
pub fn export_frames(
    frames: &[Frame],
    format: ExportFormat,
    width: f64,
    height: f64,
    output: &Path,
) -> Result<Vec<PathBuf>, ExportError> {
    match format {
        ExportFormat::Svg => {
            fs::create_dir_all(output)?;
            let mut written = Vec::with_capacity(frames.len());
            for frame in frames {
                let file_path = output.join(format!("wave_frame_{:03}.svg", frame.index));
                let mut writer = BufWriter::new(File::create(&file_path)?);
                write_svg(frame, width, height, &mut writer)?;
                writer.flush()?;
                written.push(file_path);
            }
            Ok(written)
        }
        ExportFormat::Json => {
            if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)?;
            }
            let mut writer = BufWriter::new(File::create(output)?);
            write_json(frames, width, height, &mut writer)?;
            writer.flush()?;
            Ok(vec![output.to_path_buf()])
        }
    }
}

fn escape_attr(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn frame(index: usize) -> Frame {
        Frame {
            index,
            timestamp_ms: index as f64 * 50.0,
            layers: vec![
                FrameLayer {
                    fill: "rgba(0, 119, 190, 0.50)".to_string(),
                    path: "M 0 50 C 50 70 50 70 100 60 L 100 80 L 0 80 Z".to_string(),
                },
                FrameLayer {
                    fill: "url(#\"grad\")".to_string(),
                    path: String::new(),
                },
            ],
        }
    }

    #[test]
    fn format_names_parse_case_insensitively() {
        assert_eq!("SVG".parse::<ExportFormat>(), Ok(ExportFormat::Svg));
        assert_eq!("json".parse::<ExportFormat>(), Ok(ExportFormat::Json));
        assert!("glb".parse::<ExportFormat>().is_err());
    }

    #[test]
    fn svg_contains_non_empty_layers_only() {
        let mut buffer = Vec::new();
        write_svg(&frame(0), 100.0, 80.0, &mut buffer).expect("write svg");
        let svg = String::from_utf8(buffer).expect("utf8");

        assert!(svg.starts_with(r#"<svg xmlns="http://www.w3.org/2000/svg""#));
        assert!(svg.contains(r#"viewBox="0 0 100 80""#));
        assert!(svg.contains(
            r#"<path id="wave-path-0" d="M 0 50 C 50 70 50 70 100 60 L 100 80 L 0 80 Z" fill="rgba(0, 119, 190, 0.50)"/>"#
        ));
        assert!(!svg.contains("wave-path-1"));
        assert!(svg.trim_end().ends_with("</svg>"));
    }

    #[test]
    fn fill_attributes_are_escaped() {
        assert_eq!(escape_attr(r#"url(#"a")&<b>"#), "url(#&quot;a&quot;)&amp;&lt;b&gt;");
    }

    #[test]
    fn json_recording_keeps_every_frame() {
        let frames = vec![frame(0), frame(1)];
        let mut buffer = Vec::new();
        write_json(&frames, 100.0, 80.0, &mut buffer).expect("write json");

        let value: serde_json::Value = serde_json::from_slice(&buffer).expect("valid json");
        assert_eq!(value["width"], 100.0);
        assert_eq!(value["frames"].as_array().map(Vec::len), Some(2));
        assert_eq!(value["frames"][1]["timestamp_ms"], 50.0);
        assert_eq!(
            value["frames"][0]["layers"][0]["path"],
            "M 0 50 C 50 70 50 70 100 60 L 100 80 L 0 80 Z"
        );
    }

    #[test]
    fn svg_export_writes_one_file_per_frame() {
        let dir = tempdir().expect("Failed to create temp directory");
        let output = dir.path().join("frames");

        let written = export_frames(&[frame(0), frame(7)], ExportFormat::Svg, 100.0, 80.0, &output)
            .expect("export svg");

        assert_eq!(written.len(), 2);
        assert!(output.join("wave_frame_000.svg").exists());
        assert!(output.join("wave_frame_007.svg").exists());
        let metadata = fs::metadata(&written[1]).expect("Failed to get file metadata");
        assert!(metadata.len() > 0, "SVG file is empty");
    }

    #[test]
    fn json_export_creates_parent_directories() {
        let dir = tempdir().expect("Failed to create temp directory");
        let output = dir.path().join("nested").join("waves.json");

        let written =
            export_frames(&[frame(0)], ExportFormat::Json, 100.0, 80.0, &output).expect("export json");

        assert_eq!(written, vec![output.clone()]);
        assert!(output.exists());
    }
}
