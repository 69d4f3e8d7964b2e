use super::SLOT_SIZE;

/// Offsets of the pull (read path) record.
///
/// ```text
/// embed_w | embedx_w[embedx_dim]
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PullLayout {
    embedx_dim: usize,
}

impl PullLayout {
    pub fn new(embedx_dim: usize) -> Self {
        Self { embedx_dim }
    }

    pub fn embed_w_index(&self) -> usize {
        0
    }

    pub fn embedx_w_index(&self) -> usize {
        self.embed_w_index() + 1
    }

    pub fn dim(&self) -> usize {
        1 + self.embedx_dim
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
    fn pull_layout() {
        for embedx_dim in [0, 3, 16] {
            let layout = PullLayout::new(embedx_dim);
            assert_eq!(layout.embedx_w_index(), 1);
            assert_eq!(layout.size(), (1 + embedx_dim) * SLOT_SIZE);
        }
    }
}
