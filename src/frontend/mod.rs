//! Frontend module for egui UI
//!
//! This module provides the main UI components using eframe/egui.
//! It receives raw bytes from the backend through crossbeam channels, runs
//! them through the [`PlotSession`] on the UI thread and renders the result.
//!
//! # Main Types
//!
//! - [`PlotterApp`] - Main application state implementing [`eframe::App`]
//! - [`PlotModel`] - Chart widget fed by the session
//!
//! # Submodules
//!
//! - `panels` - Connection, plot control and channel list panels
//! - `plot` - Plot rendering with egui_plot
//! - `status_bar` - Bottom status line
//! - `help` - "How to use" window
//! - [`dialogs`] - Dialog trait and the rename dialog

pub mod dialogs;
mod help;
mod panels;
mod plot;
mod status_bar;

pub use panels::{ChannelListPanel, ConnectionPanel, PanelAction, PlotControlPanel};
pub use plot::{PlotModel, PlotSeries};
pub use status_bar::{format_coordinates, StatusMessage};

use dialogs::{
    show_dialog, RenameChannelAction, RenameChannelContext, RenameChannelDialog,
    RenameChannelState,
};
use help::{HelpDialog, HelpState};
use status_bar::{render_status_bar, StatusBarContext};

use crate::backend::{BackendMessage, FrontendReceiver};
use crate::config::{settings::RuntimeSettings, AppConfig, AppState, SerialConfig};
use crate::export::{default_export_filename, export_to_file};
use crate::ingest::PlotSession;
use crate::types::{CollectionStats, ConnectionStatus, PortInfo};
use egui_plot::PlotPoint;
use std::path::Path;
use std::time::{Duration, Instant};

/// Main application state for the serial plotter
pub struct PlotterApp {
    // === Communication ===
    frontend: FrontendReceiver,

    // === Configuration ===
    config: AppConfig,
    app_state: AppState,
    settings: RuntimeSettings,
    /// Serial settings as edited in the connection panel
    serial: SerialConfig,

    // === Data ===
    session: PlotSession,
    plot: PlotModel,

    // === Backend state ===
    connection_status: ConnectionStatus,
    ports: Vec<PortInfo>,
    transport_stats: CollectionStats,
    /// A connect request is waiting for the backend's answer
    open_pending: bool,

    // === Status ===
    status_message: StatusMessage,
    last_click: Option<PlotPoint>,

    // === Dialogs ===
    rename_open: bool,
    rename_state: RenameChannelState,
    help_open: bool,
    help_state: HelpState,
}

impl PlotterApp {
    /// Create a new application instance
    pub fn new(
        cc: &eframe::CreationContext<'_>,
        frontend: FrontendReceiver,
        config: AppConfig,
        app_state: AppState,
    ) -> Self {
        if app_state.ui_preferences.dark_mode {
            cc.egui_ctx.set_visuals(egui::Visuals::dark());
        } else {
            cc.egui_ctx.set_visuals(egui::Visuals::light());
        }

        Self::with_parts(frontend, config, app_state)
    }

    /// Build the application state without an egui context
    pub fn with_parts(frontend: FrontendReceiver, config: AppConfig, app_state: AppState) -> Self {
        let mut session = PlotSession::new(&config).unwrap_or_else(|e| {
            tracing::warn!("Invalid protocol settings, using defaults: {}", e);
            PlotSession::default()
        });

        let mut settings = RuntimeSettings::from_plot_config(&config.plot);
        if let Some(size) = app_state.ui_preferences.window_size {
            settings.window_size = session.set_window_size(size);
        }

        let serial = app_state.initial_serial(&config.serial);
        let plot = PlotModel::new(config.plot.max_retained_points);

        frontend.refresh_ports();

        Self {
            frontend,
            config,
            app_state,
            settings,
            serial,
            session,
            plot,
            connection_status: ConnectionStatus::Disconnected,
            ports: Vec::new(),
            transport_stats: CollectionStats::default(),
            open_pending: false,
            status_message: StatusMessage::Idle,
            last_click: None,
            rename_open: false,
            rename_state: RenameChannelState::default(),
            help_open: false,
            help_state: HelpState,
        }
    }

    pub fn session(&self) -> &PlotSession {
        &self.session
    }

    pub fn plot(&self) -> &PlotModel {
        &self.plot
    }

    pub fn status_message(&self) -> &StatusMessage {
        &self.status_message
    }

    pub fn connection_status(&self) -> ConnectionStatus {
        self.connection_status
    }

    pub fn serial(&self) -> &SerialConfig {
        &self.serial
    }

    pub fn app_state(&self) -> &AppState {
        &self.app_state
    }

    /// Apply all pending backend messages. Returns true if any arrived.
    pub fn process_backend_messages(&mut self) -> bool {
        let messages = self.frontend.drain();
        let had_messages = !messages.is_empty();

        for msg in messages {
            match msg {
                BackendMessage::ConnectionStatus(status) => {
                    self.connection_status = status;
                }
                BackendMessage::PortOpened {
                    connection_id,
                    port_name,
                } => {
                    self.open_pending = false;
                    self.session.connect(connection_id, &mut self.plot);
                    self.last_click = None;
                    self.status_message = StatusMessage::Connected;
                    self.app_state.remember_connection(&port_name, &self.serial);
                }
                BackendMessage::PortClosed { connection_id } => {
                    if self.session.connection_id() == Some(connection_id) {
                        self.session.disconnect();
                        self.status_message = StatusMessage::Disconnected;
                    }
                }
                BackendMessage::ConnectionError(err) => {
                    if std::mem::take(&mut self.open_pending) {
                        tracing::warn!("Cannot open port: {}", err);
                        self.status_message = StatusMessage::CannotOpen;
                    } else {
                        tracing::warn!("Connection lost: {}", err);
                        self.status_message = StatusMessage::ConnectionLost(err);
                    }
                }
                BackendMessage::Data {
                    connection_id,
                    bytes,
                } => {
                    self.session.ingest(connection_id, &bytes, &mut self.plot);
                }
                BackendMessage::DataGap { connection_id } => {
                    self.session.data_gap(connection_id);
                }
                BackendMessage::PortList(ports) => {
                    self.apply_port_list(ports);
                }
                BackendMessage::Stats(stats) => {
                    self.transport_stats = stats;
                }
                BackendMessage::Shutdown => {
                    tracing::info!("Backend shutdown received");
                }
            }
        }

        had_messages
    }

    fn apply_port_list(&mut self, ports: Vec<PortInfo>) {
        tracing::debug!("Received {} ports", ports.len());
        self.ports = ports;

        if self.ports.is_empty() {
            self.serial.port_name = None;
            self.status_message = StatusMessage::NoPorts;
            return;
        }

        let known = self
            .serial
            .port_name
            .as_deref()
            .is_some_and(|name| self.ports.iter().any(|p| p.name == name));
        if !known {
            self.serial.port_name = self.ports.first().map(|p| p.name.clone());
        }

        if matches!(self.status_message, StatusMessage::Idle | StatusMessage::NoPorts) {
            self.status_message = self.selected_port_message();
        }
    }

    fn selected_port_message(&self) -> StatusMessage {
        self.serial
            .port_name
            .as_deref()
            .and_then(|name| self.ports.iter().find(|p| p.name == name))
            .map(|p| StatusMessage::PortSelected(p.description()))
            .unwrap_or_default()
    }

    /// Apply one panel action
    pub fn handle_action(&mut self, action: PanelAction) {
        match action {
            PanelAction::RefreshPorts => self.frontend.refresh_ports(),
            PanelAction::SelectPort(name) => {
                self.serial.port_name = Some(name);
                self.status_message = self.selected_port_message();
            }
            PanelAction::Connect => self.connect(),
            PanelAction::Disconnect => self.frontend.disconnect(),
            PanelAction::TogglePause => {
                self.session.toggle_pause();
            }
            PanelAction::Clear => {
                self.session.clear(&mut self.plot);
                self.last_click = None;
            }
            PanelAction::SetWindowSize(size) => {
                let size = self.session.set_window_size(size);
                self.settings.window_size = size;
                self.app_state.ui_preferences.window_size = Some(size);
            }
            PanelAction::ResetView => {
                self.settings.reset_view();
                self.plot.follow();
            }
            PanelAction::Export => self.export_with_dialog(),
            PanelAction::RenameChannel(index) => {
                if let Some(channel) = self.session.channels().get(index) {
                    self.rename_state = RenameChannelState::for_channel(index, &channel.name);
                    self.rename_open = true;
                }
            }
        }
    }

    fn connect(&mut self) {
        if self.serial.port_name.is_none() {
            return;
        }

        #[cfg(feature = "mock-serial")]
        self.frontend.use_mock_port(
            self.serial.port_name.as_deref() == Some(crate::backend::DEMO_PORT_NAME),
        );

        tracing::info!("Connecting with {}", self.serial);
        self.open_pending = true;
        self.frontend.connect(self.serial.clone());
    }

    fn export_with_dialog(&mut self) {
        let file_name = default_export_filename(&chrono::Local::now());
        if let Some(path) = rfd::FileDialog::new()
            .set_title("Export Data")
            .add_filter("CSV", &["csv"])
            .set_file_name(file_name)
            .save_file()
        {
            self.export_to(&path);
        }
    }

    /// Write all plotted series to `path` as CSV
    pub fn export_to(&mut self, path: &Path) {
        let series = self.plot.export_series();
        self.status_message = match export_to_file(path, &series, &self.settings.export) {
            Ok(rows) => StatusMessage::Exported {
                rows,
                path: path.display().to_string(),
            },
            Err(e) => {
                tracing::error!("Export failed: {}", e);
                StatusMessage::ExportFailed(e.to_string())
            }
        };
    }

    fn handle_keyboard_shortcuts(&mut self, ctx: &egui::Context) {
        use egui::Key;

        if ctx.wants_keyboard_input() {
            return;
        }

        let mut toggle_pause = false;
        let mut clear_data = false;

        ctx.input(|i| {
            if i.key_pressed(Key::Space) && !i.modifiers.any() {
                toggle_pause = true;
            }

            if i.key_pressed(Key::L) && i.modifiers.command_only() {
                clear_data = true;
            }
        });

        if toggle_pause && self.session.is_connected() {
            self.handle_action(PanelAction::TogglePause);
        }

        if clear_data {
            self.handle_action(PanelAction::Clear);
        }
    }

    fn render_menu_bar(&mut self, ctx: &egui::Context, actions: &mut Vec<PanelAction>) {
        egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
            egui::MenuBar::new().ui(ui, |ui| {
                ui.menu_button("File", |ui| {
                    if ui.button("Export CSV...").clicked() {
                        actions.push(PanelAction::Export);
                        ui.close();
                    }
                    if ui.button("Quit").clicked() {
                        ui.ctx().send_viewport_cmd(egui::ViewportCommand::Close);
                        ui.close();
                    }
                });

                ui.menu_button("View", |ui| {
                    ui.checkbox(
                        &mut self.app_state.ui_preferences.show_channel_list,
                        "Channel list",
                    );
                    if ui
                        .checkbox(&mut self.app_state.ui_preferences.dark_mode, "Dark mode")
                        .changed()
                    {
                        if self.app_state.ui_preferences.dark_mode {
                            ui.ctx().set_visuals(egui::Visuals::dark());
                        } else {
                            ui.ctx().set_visuals(egui::Visuals::light());
                        }
                    }
                    if ui.button("Reset view").clicked() {
                        actions.push(PanelAction::ResetView);
                        ui.close();
                    }
                });

                ui.menu_button("Help", |ui| {
                    if ui.button("How to use").clicked() {
                        self.help_open = true;
                        ui.close();
                    }
                });
            });
        });
    }

    fn render_dialogs(&mut self, ctx: &egui::Context) {
        if let Some(RenameChannelAction::Rename { index, name }) = show_dialog::<RenameChannelDialog>(
            ctx,
            &mut self.rename_open,
            &mut self.rename_state,
            RenameChannelContext,
        ) {
            if !self.session.rename_channel(index, &name, &mut self.plot) {
                tracing::warn!("Channel {} no longer exists", index);
            }
        }

        show_dialog::<HelpDialog>(
            ctx,
            &mut self.help_open,
            &mut self.help_state,
            &self.config.protocol,
        );
    }
}

impl eframe::App for PlotterApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let had_messages = self.process_backend_messages();
        self.handle_keyboard_shortcuts(ctx);

        let now = Instant::now();
        self.session.poll_tick(now, &mut self.plot);

        let mut actions = Vec::new();

        self.render_menu_bar(ctx, &mut actions);

        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            let status_ctx = StatusBarContext {
                connection_status: self.connection_status,
                message: &self.status_message,
                last_click: self.last_click,
                run_state: self.session.run_state(),
                transport: &self.transport_stats,
                ingest: self.session.stats(),
            };
            render_status_bar(ui, &status_ctx);
        });

        egui::SidePanel::left("controls")
            .resizable(true)
            .default_width(240.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    ConnectionPanel::render(
                        ui,
                        self.connection_status,
                        &self.ports,
                        &mut self.serial,
                        &mut actions,
                    );
                    ui.separator();
                    PlotControlPanel::render(
                        ui,
                        self.session.run_state(),
                        self.session.is_connected(),
                        &mut self.settings,
                        &mut actions,
                    );
                    if self.app_state.ui_preferences.show_channel_list {
                        ui.separator();
                        ChannelListPanel::render(ui, self.session.channels(), &mut actions);
                    }
                });
            });

        egui::CentralPanel::default().show(ctx, |ui| {
            if let Some(point) = self.plot.render(ui, &mut self.settings) {
                self.last_click = Some(point);
            }
        });

        for action in actions {
            self.handle_action(action);
        }

        self.render_dialogs(ctx);

        if had_messages || self.plot.take_redraw_request() {
            ctx.request_repaint();
        }
        if self.session.is_connected() {
            ctx.request_repaint_after(self.session.time_until_tick(now));
        } else {
            ctx.request_repaint_after(Duration::from_millis(250));
        }
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        self.frontend.shutdown();

        if let Err(e) = self.app_state.save() {
            tracing::warn!("Failed to save app state: {}", e);
        }
    }
}
