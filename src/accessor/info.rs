/// The dimensions and byte sizes a table needs to allocate records for an accessor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AccessorInfo {
    pub dim: usize,
    pub size: usize,
    pub select_dim: usize,
    pub select_size: usize,
    pub update_dim: usize,
    pub update_size: usize,
    pub mf_size: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InfoKey {
    Dim,
    Size,
    SelectDim,
    SelectSize,
    UpdateDim,
    UpdateSize,
    MfSize,
}

impl AccessorInfo {
    pub fn get(&self, key: InfoKey) -> usize {
        match key {
            InfoKey::Dim => self.dim,
            InfoKey::Size => self.size,
            InfoKey::SelectDim => self.select_dim,
            InfoKey::SelectSize => self.select_size,
            InfoKey::UpdateDim => self.update_dim,
            InfoKey::UpdateSize => self.update_size,
            InfoKey::MfSize => self.mf_size,
        }
    }
}
