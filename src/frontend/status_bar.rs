//! Status bar panel: bottom bar showing the status message, the last plot
//! click and throughput counters.

use egui::{Color32, RichText, Ui};
use egui_plot::PlotPoint;

use crate::ingest::{IngestStats, RunState};
use crate::types::{CollectionStats, ConnectionStatus};

/// Text shown on the left of the status bar
#[derive(Debug, Clone, PartialEq, Default)]
pub enum StatusMessage {
    #[default]
    Idle,
    NoPorts,
    /// Description of the selected port
    PortSelected(String),
    Connected,
    Disconnected,
    CannotOpen,
    /// A read failed while connected
    ConnectionLost(String),
    Exported { rows: usize, path: String },
    ExportFailed(String),
}

impl StatusMessage {
    pub fn is_error(&self) -> bool {
        matches!(
            self,
            StatusMessage::NoPorts
                | StatusMessage::CannotOpen
                | StatusMessage::ConnectionLost(_)
                | StatusMessage::ExportFailed(_)
        )
    }
}

impl std::fmt::Display for StatusMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StatusMessage::Idle => Ok(()),
            StatusMessage::NoPorts => write!(f, "No ports detected."),
            StatusMessage::PortSelected(description) => write!(f, "{}", description),
            StatusMessage::Connected => write!(f, "Connected!"),
            StatusMessage::Disconnected => write!(f, "Disconnected!"),
            StatusMessage::CannotOpen => write!(f, "Cannot open port!"),
            StatusMessage::ConnectionLost(e) => write!(f, "Connection lost: {}", e),
            StatusMessage::Exported { rows, path } => {
                write!(f, "Exported {} rows to {}", rows, path)
            }
            StatusMessage::ExportFailed(e) => write!(f, "Export failed: {}", e),
        }
    }
}

/// Plot coordinates of a click, rounded to whole units
pub fn format_coordinates(point: PlotPoint) -> String {
    format!("X: {} Y: {}", point.x.round() as i64, point.y.round() as i64)
}

/// Context needed to render the status bar.
pub struct StatusBarContext<'a> {
    pub connection_status: ConnectionStatus,
    pub message: &'a StatusMessage,
    pub last_click: Option<PlotPoint>,
    pub run_state: RunState,
    pub transport: &'a CollectionStats,
    pub ingest: &'a IngestStats,
}

/// Render the status bar.
pub fn render_status_bar(ui: &mut Ui, ctx: &StatusBarContext<'_>) {
    ui.horizontal(|ui| {
        ui.spacing_mut().item_spacing.x = 8.0;

        let status_color = match ctx.connection_status {
            ConnectionStatus::Connected => Color32::GREEN,
            ConnectionStatus::Connecting => Color32::YELLOW,
            ConnectionStatus::Disconnected => Color32::GRAY,
            ConnectionStatus::Error => Color32::RED,
        };
        ui.colored_label(status_color, "●");

        let text = RichText::new(ctx.message.to_string()).small();
        if ctx.message.is_error() {
            ui.colored_label(Color32::LIGHT_RED, text);
        } else {
            ui.label(text);
        }

        if let Some(point) = ctx.last_click {
            ui.separator();
            ui.label(RichText::new(format_coordinates(point)).small().monospace());
        }

        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            let kb_per_s = ctx.transport.bytes_per_second / 1024.0;
            ui.label(RichText::new(format!("{:.2} KB/s", kb_per_s)).small());

            ui.separator();

            let error_color = if ctx.ingest.decode_errors > 0 {
                Color32::LIGHT_RED
            } else {
                Color32::GRAY
            };
            ui.colored_label(
                error_color,
                RichText::new(format!("Decode errors: {}", ctx.ingest.decode_errors)).small(),
            );

            ui.separator();

            ui.label(RichText::new(format!("Messages: {}", ctx.ingest.messages)).small());

            if ctx.transport.dropped_chunks > 0 {
                ui.separator();
                ui.colored_label(
                    Color32::YELLOW,
                    RichText::new(format!("Dropped chunks: {}", ctx.transport.dropped_chunks))
                        .small(),
                );
            }

            if ctx.run_state == RunState::Paused {
                ui.separator();
                ui.colored_label(Color32::YELLOW, RichText::new("Stopped").small());
            }
        });
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_texts() {
        assert_eq!(StatusMessage::NoPorts.to_string(), "No ports detected.");
        assert_eq!(StatusMessage::Connected.to_string(), "Connected!");
        assert_eq!(StatusMessage::Disconnected.to_string(), "Disconnected!");
        assert_eq!(StatusMessage::CannotOpen.to_string(), "Cannot open port!");
        assert_eq!(StatusMessage::Idle.to_string(), "");
        assert_eq!(
            StatusMessage::PortSelected("FTDI FT232R".to_string()).to_string(),
            "FTDI FT232R"
        );
    }

    #[test]
    fn test_error_messages() {
        assert!(StatusMessage::CannotOpen.is_error());
        assert!(StatusMessage::NoPorts.is_error());
        assert!(!StatusMessage::Connected.is_error());
        assert!(!StatusMessage::Exported {
            rows: 1,
            path: "a.csv".to_string()
        }
        .is_error());
    }

    #[test]
    fn test_format_coordinates_rounds() {
        assert_eq!(format_coordinates(PlotPoint::new(12.4, 2047.6)), "X: 12 Y: 2048");
        assert_eq!(format_coordinates(PlotPoint::new(-3.5, -0.2)), "X: -4 Y: 0");
    }
}
