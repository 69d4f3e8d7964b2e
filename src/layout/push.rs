use super::SLOT_SIZE;

/// Offsets of the push (write path) record.
///
/// ```text
/// slot | show | click | embed_g | embedx_g[embedx_dim]
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PushLayout {
    embedx_dim: usize,
}

impl PushLayout {
    pub fn new(embedx_dim: usize) -> Self {
        Self { embedx_dim }
    }

    pub fn slot_index(&self) -> usize {
        0
    }

    pub fn show_index(&self) -> usize {
        self.slot_index() + 1
    }

    pub fn click_index(&self) -> usize {
        self.show_index() + 1
    }

    pub fn embed_g_index(&self) -> usize {
        self.click_index() + 1
    }

    pub fn embedx_g_index(&self) -> usize {
        self.embed_g_index() + 1
    }

    pub fn dim(&self) -> usize {
        4 + self.embedx_dim
    }

    pub fn dim_size(&self, _dim: usize) -> usize {
        SLOT_SIZE
    }

    pub fn size(&self) -> usize {
        self.dim() * SLOT_SIZE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_layout() {
        let layout = PushLayout::new(8);

        assert_eq!(layout.show_index(), 1);
        assert_eq!(layout.click_index(), 2);
        assert_eq!(layout.embed_g_index(), 3);
        assert_eq!(layout.embedx_g_index(), 4);

        for embedx_dim in [0, 3, 16] {
            assert_eq!(PushLayout::new(embedx_dim).size(), (4 + embedx_dim) * SLOT_SIZE);
        }
    }
}
