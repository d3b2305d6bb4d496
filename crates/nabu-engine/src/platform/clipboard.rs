use nabu_gui::ClipboardBackend;

/// System clipboard through `arboard`.
pub struct ArboardClipboard {
    inner: arboard::Clipboard,
}

impl ArboardClipboard {
    pub fn new() -> Option<Self> {
        match arboard::Clipboard::new() {
            Ok(inner) => Some(Self { inner }),
            Err(e) => {
                log::warn!("clipboard unavailable: {e}");
                None
            }
        }
    }
}

impl ClipboardBackend for ArboardClipboard {
    fn get(&mut self) -> Option<String> {
        match self.inner.get_text() {
            Ok(text) => Some(text),
            Err(e) => {
                log::debug!("clipboard read failed: {e}");
                None
            }
        }
    }

    fn set(&mut self, text: &str) {
        if let Err(e) = self.inner.set_text(text) {
            log::debug!("clipboard write failed: {e}");
        }
    }
}
