use nabu_gui::MouseCursor;

use crate::platform::Platform;

const LEN: usize = MouseCursor::SHAPES.len();

fn slot(shape: MouseCursor) -> Option<usize> {
    MouseCursor::SHAPES.iter().position(|&s| s == shape)
}

/// Native cursor per GUI cursor shape.
///
/// Shapes the platform cannot provide resolve to the `Arrow` entry.
#[derive(Debug)]
pub struct CursorRegistry<H> {
    entries: [Option<H>; LEN],
}

impl<H> CursorRegistry<H> {
    pub fn empty() -> Self {
        Self { entries: std::array::from_fn(|_| None) }
    }

    /// Creates one native cursor per visible shape.
    pub fn create<P>(platform: &mut P) -> Self
    where
        P: Platform<Cursor = H>,
    {
        let mut registry = Self::empty();
        for (entry, &shape) in registry.entries.iter_mut().zip(MouseCursor::SHAPES.iter()) {
            *entry = platform.create_standard_cursor(shape);
            if entry.is_none() {
                log::debug!("CursorRegistry: no native cursor for {shape:?}, using Arrow");
            }
        }
        registry
    }

    /// Cursor for `shape`, else the `Arrow` cursor. `None` only when neither exists.
    pub fn get(&self, shape: MouseCursor) -> Option<&H> {
        slot(shape)
            .and_then(|i| self.entries[i].as_ref())
            .or_else(|| self.arrow())
    }

    fn arrow(&self) -> Option<&H> {
        slot(MouseCursor::Arrow).and_then(|i| self.entries[i].as_ref())
    }

    pub fn destroy<P>(self, platform: &mut P)
    where
        P: Platform<Cursor = H>,
    {
        for cursor in self.entries.into_iter().flatten() {
            platform.destroy_cursor(cursor);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::mock::MockPlatform;

    #[test]
    fn missing_shape_falls_back_to_arrow() {
        let mut platform = MockPlatform::default();
        platform.unsupported.push(MouseCursor::ResizeNESW);

        let registry = CursorRegistry::create(&mut platform);
        assert_eq!(registry.get(MouseCursor::Hand), Some(&MouseCursor::Hand));
        assert_eq!(registry.get(MouseCursor::ResizeNESW), Some(&MouseCursor::Arrow));
        assert_eq!(registry.get(MouseCursor::None), Some(&MouseCursor::Arrow));
    }

    #[test]
    fn no_arrow_means_no_fallback() {
        let registry: CursorRegistry<MouseCursor> = CursorRegistry::empty();
        assert_eq!(registry.get(MouseCursor::TextInput), None);
    }

    #[test]
    fn destroy_releases_every_created_cursor() {
        let mut platform = MockPlatform::default();
        platform.unsupported.push(MouseCursor::NotAllowed);

        let registry = CursorRegistry::create(&mut platform);
        registry.destroy(&mut platform);

        assert_eq!(platform.destroyed.len(), MouseCursor::SHAPES.len() - 1);
        assert!(!platform.destroyed.contains(&MouseCursor::NotAllowed));
    }
}
