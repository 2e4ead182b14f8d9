//! Capabilities the screen needs from the widgets it drives.
//!
//! Handlers receive these as arguments, so the screen never holds on to a
//! widget between calls.

/// A select field that shows the currently chosen item.
pub trait SelectHandle {
    /// Replaces the text shown in the closed field. `None` shows the
    /// placeholder.
    fn set_display_value(&mut self, value: Option<String>);

    /// Opens the selection list.
    fn open(&mut self);
}

/// The receipt mail composer.
pub trait MailHandle {
    fn toggle(&mut self);
}
