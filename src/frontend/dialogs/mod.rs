//! Small modal windows
//!
//! A dialog is a type implementing [`Dialog`]; [`show_dialog`] opens its
//! window, renders it and closes it when the dialog asks to. The help window
//! and the channel rename prompt are built on it.

use egui::{Align2, Context, Ui};

/// What a dialog wants after a frame
#[derive(Debug, Clone, Default)]
pub enum DialogAction<A> {
    /// Stay open
    #[default]
    None,
    /// Close without doing anything
    Close,
    /// Close and hand `A` to the caller
    CloseWithAction(A),
}

/// Per-dialog state, reset every time the dialog closes
pub trait DialogState: Default {
    fn reset(&mut self) {
        *self = Self::default();
    }

    /// Whether the dialog's input can be submitted
    fn is_valid(&self) -> bool {
        true
    }
}

/// Window placement for a dialog
#[derive(Debug, Clone, PartialEq)]
pub struct DialogWindowConfig {
    pub width: f32,
    pub resizable: bool,
    /// Pin the window to the middle of the screen
    pub centered: bool,
}

impl DialogWindowConfig {
    /// Free-floating, resizable window
    pub fn new(width: f32) -> Self {
        Self {
            width,
            resizable: true,
            centered: false,
        }
    }

    /// Fixed-size window in the middle of the screen
    pub fn centered_modal(width: f32) -> Self {
        Self {
            width,
            resizable: false,
            centered: true,
        }
    }
}

impl Default for DialogWindowConfig {
    fn default() -> Self {
        Self::new(400.0)
    }
}

/// A window with its own state, context and result type
pub trait Dialog {
    type State: DialogState;
    type Action;
    /// Borrowed data the dialog reads while rendering
    type Context<'a>;

    fn title(state: &Self::State) -> &'static str;

    fn window_config() -> DialogWindowConfig {
        DialogWindowConfig::default()
    }

    fn render(
        state: &mut Self::State,
        ctx: Self::Context<'_>,
        ui: &mut Ui,
    ) -> DialogAction<Self::Action>;
}

/// Render `D` if `is_open` is set.
///
/// Clears `is_open` and resets `state` when the dialog closes. Returns the
/// action the dialog closed with, if any.
pub fn show_dialog<D: Dialog>(
    ctx: &Context,
    is_open: &mut bool,
    state: &mut D::State,
    dialog_ctx: D::Context<'_>,
) -> Option<D::Action> {
    if !*is_open {
        return None;
    }

    let config = D::window_config();
    let mut window = egui::Window::new(D::title(state))
        .collapsible(false)
        .resizable(config.resizable)
        .default_width(config.width);
    if config.centered {
        window = window.anchor(Align2::CENTER_CENTER, [0.0, 0.0]);
    }

    let mut action = DialogAction::None;
    window.show(ctx, |ui| {
        action = D::render(state, dialog_ctx, ui);
    });

    match action {
        DialogAction::None => None,
        DialogAction::Close => {
            *is_open = false;
            state.reset();
            None
        }
        DialogAction::CloseWithAction(a) => {
            *is_open = false;
            state.reset();
            Some(a)
        }
    }
}

pub mod rename_channel;

pub use rename_channel::{
    RenameChannelAction, RenameChannelContext, RenameChannelDialog, RenameChannelState,
};
