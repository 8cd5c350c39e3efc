//! Channel rename dialog
//!
//! Opened by double-clicking a channel in the channel list.

use super::{Dialog, DialogAction, DialogState, DialogWindowConfig};
use egui::{Key, Ui};

/// State for the rename dialog
#[derive(Debug, Default)]
pub struct RenameChannelState {
    /// Channel being renamed
    pub channel_index: Option<usize>,
    /// Name being edited
    pub name_input: String,
    /// Focus the text field on the first frame
    request_focus: bool,
}

impl DialogState for RenameChannelState {
    fn is_valid(&self) -> bool {
        self.channel_index.is_some() && !self.name_input.trim().is_empty()
    }
}

impl RenameChannelState {
    /// Start renaming `channel_index`, pre-filled with its current name
    pub fn for_channel(channel_index: usize, current_name: &str) -> Self {
        Self {
            channel_index: Some(channel_index),
            name_input: current_name.to_string(),
            request_focus: true,
        }
    }

    fn action(&self) -> Option<RenameChannelAction> {
        if !self.is_valid() {
            return None;
        }
        self.channel_index.map(|index| RenameChannelAction::Rename {
            index,
            name: self.name_input.trim().to_string(),
        })
    }
}

/// Action from the rename dialog
#[derive(Debug, Clone, PartialEq)]
pub enum RenameChannelAction {
    Rename { index: usize, name: String },
}

/// No external data needed
pub struct RenameChannelContext;

pub struct RenameChannelDialog;

impl Dialog for RenameChannelDialog {
    type State = RenameChannelState;
    type Action = RenameChannelAction;
    type Context<'a> = RenameChannelContext;

    fn title(_state: &Self::State) -> &'static str {
        "Rename Channel"
    }

    fn window_config() -> DialogWindowConfig {
        DialogWindowConfig::centered_modal(300.0)
    }

    fn render(
        state: &mut Self::State,
        _ctx: Self::Context<'_>,
        ui: &mut Ui,
    ) -> DialogAction<Self::Action> {
        let Some(index) = state.channel_index else {
            return DialogAction::Close;
        };

        ui.label(format!("New name for channel {}:", index));
        let response = ui.text_edit_singleline(&mut state.name_input);
        if std::mem::take(&mut state.request_focus) {
            response.request_focus();
        }
        let submitted = response.lost_focus() && ui.input(|i| i.key_pressed(Key::Enter));

        ui.separator();

        ui.horizontal(|ui| {
            let ok = ui
                .add_enabled(state.is_valid(), egui::Button::new("OK"))
                .clicked();
            if ok || submitted {
                if let Some(action) = state.action() {
                    return DialogAction::CloseWithAction(action);
                }
            }
            if ui.button("Cancel").clicked() {
                return DialogAction::Close;
            }
            DialogAction::None
        })
        .inner
    }
}
