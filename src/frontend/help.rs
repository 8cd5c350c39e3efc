//! "How to use" window

use super::dialogs::{Dialog, DialogAction, DialogState, DialogWindowConfig};
use crate::config::ProtocolConfig;
use egui::{RichText, Ui};

/// Help text for the configured markers
pub fn usage_text(protocol: &ProtocolConfig) -> String {
    let (start, end) = (protocol.start_marker, protocol.end_marker);
    format!(
        "Send integers from your device in messages like this:\n\n    \
         {start}100 200 300{end}\n\n\
         A message starts with '{start}' and ends with '{end}'. Values are separated \
         by spaces. The first value goes to Channel 0, the second to Channel 1, and \
         so on. Every message is one sample on the horizontal axis.\n\n\
         Anything outside a message (line endings, debug prints) is ignored.\n\n\
         1. Pick a port and the serial settings, then press Connect.\n\
         2. Stop/Start freezes the plot; data received while stopped is dropped.\n\
         3. Clear removes the plotted data but keeps the channels.\n\
         4. Drag or scroll to look around, Reset view to follow the data again.\n\
         5. Double-click a channel in the list to rename it.\n\
         6. Click on the plot to read the coordinates in the status bar."
    )
}

#[derive(Debug, Default)]
pub struct HelpState;

impl DialogState for HelpState {}

pub struct HelpDialog;

impl Dialog for HelpDialog {
    type State = HelpState;
    type Action = ();
    type Context<'a> = &'a ProtocolConfig;

    fn title(_state: &Self::State) -> &'static str {
        "How to use this application"
    }

    fn window_config() -> DialogWindowConfig {
        DialogWindowConfig::new(460.0)
    }

    fn render(
        _state: &mut Self::State,
        protocol: Self::Context<'_>,
        ui: &mut Ui,
    ) -> DialogAction<Self::Action> {
        ui.label(RichText::new(usage_text(protocol)).monospace());
        ui.separator();
        if ui.button("Close").clicked() {
            DialogAction::Close
        } else {
            DialogAction::None
        }
    }
}
