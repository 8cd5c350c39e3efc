//! Panel components for the frontend UI
//!
//! Each panel renders one group of controls and reports what the user did
//! as [`PanelAction`]s. The app applies them after the frame's UI is built.
//!
//! # Panels
//!
//! - [`ConnectionPanel`] - Port selection, serial settings, connect button
//! - [`PlotControlPanel`] - Start/stop, clear, window size, Y axis, export
//! - [`ChannelListPanel`] - Channels with their colours; double-click renames

use crate::config::{settings::RuntimeSettings, DataBits, Parity, SerialConfig, StopBits, BAUD_RATES};
use crate::ingest::{Channel, RunState, MAX_WINDOW_SIZE, MIN_WINDOW_SIZE};
use crate::types::{palette_color, ConnectionStatus, PortInfo};
use egui::{Color32, RichText, Ui};

/// Something the user asked for in a panel
#[derive(Debug, Clone, PartialEq)]
pub enum PanelAction {
    RefreshPorts,
    SelectPort(String),
    Connect,
    Disconnect,
    TogglePause,
    Clear,
    SetWindowSize(u64),
    ResetView,
    Export,
    RenameChannel(usize),
}

/// Renders the port and serial settings controls
pub struct ConnectionPanel;

impl ConnectionPanel {
    pub fn render(
        ui: &mut Ui,
        status: ConnectionStatus,
        ports: &[PortInfo],
        serial: &mut SerialConfig,
        actions: &mut Vec<PanelAction>,
    ) {
        let editable = status.controls_enabled();
        let have_ports = !ports.is_empty();

        ui.heading("Connection");

        ui.add_enabled_ui(editable && have_ports, |ui| {
            egui::Grid::new("serial_settings_grid")
                .num_columns(2)
                .spacing([8.0, 4.0])
                .show(ui, |ui| {
                    ui.label("Port:");
                    let selected = serial.port_name.clone().unwrap_or_default();
                    egui::ComboBox::from_id_salt("port_select")
                        .selected_text(if selected.is_empty() { "-" } else { &selected })
                        .width(140.0)
                        .show_ui(ui, |ui| {
                            for port in ports {
                                let is_selected = selected == port.name;
                                if ui
                                    .selectable_label(is_selected, &port.name)
                                    .on_hover_text(port.description())
                                    .clicked()
                                    && !is_selected
                                {
                                    actions.push(PanelAction::SelectPort(port.name.clone()));
                                }
                            }
                        });
                    ui.end_row();

                    ui.label("Baud rate:");
                    egui::ComboBox::from_id_salt("baud_select")
                        .selected_text(serial.baud_rate.to_string())
                        .width(140.0)
                        .show_ui(ui, |ui| {
                            for rate in BAUD_RATES {
                                ui.selectable_value(&mut serial.baud_rate, rate, rate.to_string());
                            }
                        });
                    ui.end_row();

                    ui.label("Data bits:");
                    egui::ComboBox::from_id_salt("data_bits_select")
                        .selected_text(serial.data_bits.to_string())
                        .width(140.0)
                        .show_ui(ui, |ui| {
                            for bits in DataBits::ALL {
                                ui.selectable_value(&mut serial.data_bits, bits, bits.to_string());
                            }
                        });
                    ui.end_row();

                    ui.label("Parity:");
                    egui::ComboBox::from_id_salt("parity_select")
                        .selected_text(serial.parity.to_string())
                        .width(140.0)
                        .show_ui(ui, |ui| {
                            for parity in Parity::ALL {
                                ui.selectable_value(&mut serial.parity, parity, parity.to_string());
                            }
                        });
                    ui.end_row();

                    ui.label("Stop bits:");
                    egui::ComboBox::from_id_salt("stop_bits_select")
                        .selected_text(serial.stop_bits.to_string())
                        .width(140.0)
                        .show_ui(ui, |ui| {
                            for bits in StopBits::ALL {
                                ui.selectable_value(&mut serial.stop_bits, bits, bits.to_string());
                            }
                        });
                    ui.end_row();
                });
        });

        ui.horizontal(|ui| {
            if ui
                .add_enabled(editable, egui::Button::new("⟳ Refresh"))
                .clicked()
            {
                actions.push(PanelAction::RefreshPorts);
            }

            match status {
                ConnectionStatus::Disconnected | ConnectionStatus::Error => {
                    let can_connect = have_ports && serial.port_name.is_some();
                    if ui
                        .add_enabled(can_connect, egui::Button::new("🔌 Connect"))
                        .clicked()
                    {
                        actions.push(PanelAction::Connect);
                    }
                }
                ConnectionStatus::Connecting => {
                    ui.add_enabled(false, egui::Button::new("⏳ Connecting..."));
                }
                ConnectionStatus::Connected => {
                    if ui.button("🔌 Disconnect").clicked() {
                        actions.push(PanelAction::Disconnect);
                    }
                }
            }
        });
    }
}

/// Renders the plot controls
pub struct PlotControlPanel;

impl PlotControlPanel {
    pub fn render(
        ui: &mut Ui,
        run_state: RunState,
        connected: bool,
        settings: &mut RuntimeSettings,
        actions: &mut Vec<PanelAction>,
    ) {
        ui.heading("Plot");

        ui.horizontal(|ui| {
            let label = match run_state {
                RunState::Running => "⏸ Stop",
                RunState::Paused => "▶ Start",
            };
            if ui.add_enabled(connected, egui::Button::new(label)).clicked() {
                actions.push(PanelAction::TogglePause);
            }
            if ui.button("🗑 Clear").clicked() {
                actions.push(PanelAction::Clear);
            }
        });

        egui::Grid::new("plot_controls_grid")
            .num_columns(2)
            .spacing([8.0, 4.0])
            .show(ui, |ui| {
                ui.label("Points:");
                let mut window_size = settings.window_size;
                if ui
                    .add(
                        egui::DragValue::new(&mut window_size)
                            .range(MIN_WINDOW_SIZE..=MAX_WINDOW_SIZE)
                            .speed(10.0),
                    )
                    .changed()
                {
                    actions.push(PanelAction::SetWindowSize(window_size));
                }
                ui.end_row();

                ui.label("Y min:");
                let mut y_min = settings.y_min;
                if ui.add(egui::DragValue::new(&mut y_min).speed(10.0)).changed() {
                    settings.set_y_range(y_min, settings.y_max);
                }
                ui.end_row();

                ui.label("Y max:");
                let mut y_max = settings.y_max;
                if ui.add(egui::DragValue::new(&mut y_max).speed(10.0)).changed() {
                    settings.set_y_range(settings.y_min, y_max);
                }
                ui.end_row();

                ui.label("Y step:");
                let mut y_step = settings.y_step;
                if ui
                    .add(egui::DragValue::new(&mut y_step).speed(1.0).range(0.001..=f64::MAX))
                    .changed()
                {
                    settings.set_y_step(y_step);
                }
                ui.end_row();

                ui.label("Line width:");
                ui.add(
                    egui::DragValue::new(&mut settings.line_width)
                        .range(0.5..=5.0)
                        .speed(0.1),
                );
                ui.end_row();

                ui.label("Grid:");
                ui.checkbox(&mut settings.show_grid, "");
                ui.end_row();

                ui.label("Legend:");
                ui.checkbox(&mut settings.show_legend, "");
                ui.end_row();
            });

        ui.horizontal(|ui| {
            if ui.button("Reset view").clicked() {
                actions.push(PanelAction::ResetView);
            }
            if ui.button("💾 Export CSV").clicked() {
                actions.push(PanelAction::Export);
            }
        });
    }
}

/// Renders the list of channels seen on the current connection
pub struct ChannelListPanel;

impl ChannelListPanel {
    pub fn render(ui: &mut Ui, channels: &[Channel], actions: &mut Vec<PanelAction>) {
        ui.heading("Channels");

        if channels.is_empty() {
            ui.label(RichText::new("No data yet").italics().color(Color32::GRAY));
            return;
        }

        egui::ScrollArea::vertical()
            .id_salt("channel_list")
            .max_height(240.0)
            .show(ui, |ui| {
                for channel in channels {
                    ui.horizontal(|ui| {
                        let [r, g, b, a] = palette_color(channel.color_index);
                        ui.colored_label(Color32::from_rgba_unmultiplied(r, g, b, a), "■");
                        let response = ui
                            .selectable_label(false, &channel.name)
                            .on_hover_text("Double-click to rename");
                        if response.double_clicked() {
                            actions.push(PanelAction::RenameChannel(channel.index));
                        }
                    });
                }
            });
    }
}
