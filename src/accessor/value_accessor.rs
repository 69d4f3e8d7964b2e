use super::{AccessorInfo, CtrAccessor, InfoKey, SaveMode, Stage};
use crate::{error::Result, layout::Counter};

/// The operations a sparse table needs from the accessor of its records.
///
/// Tables only hold `f32` buffers, this trait is the only place that knows what's
/// inside them.
pub trait ValueAccessor: Send + Sync {
    fn dim(&self) -> usize;

    fn dim_size(&self, dim: usize) -> usize;

    fn size(&self) -> usize;

    fn mf_size(&self) -> usize;

    fn select_dim(&self) -> usize;

    fn select_dim_size(&self, dim: usize) -> usize;

    fn select_size(&self) -> usize;

    fn update_dim(&self) -> usize;

    fn update_dim_size(&self, dim: usize) -> usize;

    fn update_size(&self) -> usize;

    fn table_info(&self) -> AccessorInfo;

    fn get_table_info(&self, key: InfoKey) -> usize {
        self.table_info().get(key)
    }

    /// The amount of slots of an extended full record.
    fn slots(&self) -> usize;

    /// The amount of slots of a full record that doesn't hold the embedx region.
    fn short_slots(&self) -> usize;

    fn create(&self, values: &mut [&mut [f32]]) -> Result<()>;

    fn select(&self, pulls: &mut [&mut [f32]], values: &[&[f32]]) -> Result<()>;

    fn merge(&self, updates: &mut [&mut [f32]], others: &[&[f32]]) -> Result<()>;

    fn update(&self, values: &mut [&mut [f32]], pushes: &[&[f32]]) -> Result<()>;

    fn shrink(&self, value: &mut [f32]) -> Result<bool>;

    fn save(&self, value: &mut [f32], mode: SaveMode) -> Result<bool>;

    fn update_stat_after_save(&self, value: &mut [f32], mode: SaveMode) -> Result<()>;

    fn create_value(&self, stage: Stage, push: &[f32]) -> Result<bool>;

    fn save_ssd(&self, value: &[f32]) -> Result<bool>;

    fn need_extend_mf(&self, value: &[f32]) -> Result<bool>;

    fn has_mf(&self, slots: usize) -> bool;

    fn extend_mf(&self, value: &mut Vec<f32>) -> Result<bool>;

    fn parse_to_string(&self, value: &[f32], param: usize) -> Result<String>;

    fn parse_from_string(&self, text: &str, value: &mut [f32]) -> Result<usize>;

    fn get_field(&self, value: &[f32], name: &str) -> Result<f32>;

    fn set_day_id(&self, day_id: i32);
}

impl<C: Counter> ValueAccessor for CtrAccessor<C> {
    fn dim(&self) -> usize {
        CtrAccessor::dim(self)
    }

    fn dim_size(&self, dim: usize) -> usize {
        CtrAccessor::dim_size(self, dim)
    }

    fn size(&self) -> usize {
        CtrAccessor::size(self)
    }

    fn mf_size(&self) -> usize {
        CtrAccessor::mf_size(self)
    }

    fn select_dim(&self) -> usize {
        CtrAccessor::select_dim(self)
    }

    fn select_dim_size(&self, dim: usize) -> usize {
        CtrAccessor::select_dim_size(self, dim)
    }

    fn select_size(&self) -> usize {
        CtrAccessor::select_size(self)
    }

    fn update_dim(&self) -> usize {
        CtrAccessor::update_dim(self)
    }

    fn update_dim_size(&self, dim: usize) -> usize {
        CtrAccessor::update_dim_size(self, dim)
    }

    fn update_size(&self) -> usize {
        CtrAccessor::update_size(self)
    }

    fn table_info(&self) -> AccessorInfo {
        CtrAccessor::table_info(self)
    }

    fn slots(&self) -> usize {
        self.feature_layout().slots()
    }

    fn short_slots(&self) -> usize {
        self.feature_layout().short_slots()
    }

    fn create(&self, values: &mut [&mut [f32]]) -> Result<()> {
        CtrAccessor::create(self, values)
    }

    fn select(&self, pulls: &mut [&mut [f32]], values: &[&[f32]]) -> Result<()> {
        CtrAccessor::select(self, pulls, values)
    }

    fn merge(&self, updates: &mut [&mut [f32]], others: &[&[f32]]) -> Result<()> {
        CtrAccessor::merge(self, updates, others)
    }

    fn update(&self, values: &mut [&mut [f32]], pushes: &[&[f32]]) -> Result<()> {
        CtrAccessor::update(self, values, pushes)
    }

    fn shrink(&self, value: &mut [f32]) -> Result<bool> {
        CtrAccessor::shrink(self, value)
    }

    fn save(&self, value: &mut [f32], mode: SaveMode) -> Result<bool> {
        CtrAccessor::save(self, value, mode)
    }

    fn update_stat_after_save(&self, value: &mut [f32], mode: SaveMode) -> Result<()> {
        CtrAccessor::update_stat_after_save(self, value, mode)
    }

    fn create_value(&self, stage: Stage, push: &[f32]) -> Result<bool> {
        CtrAccessor::create_value(self, stage, push)
    }

    fn save_ssd(&self, value: &[f32]) -> Result<bool> {
        CtrAccessor::save_ssd(self, value)
    }

    fn need_extend_mf(&self, value: &[f32]) -> Result<bool> {
        CtrAccessor::need_extend_mf(self, value)
    }

    fn has_mf(&self, slots: usize) -> bool {
        CtrAccessor::has_mf(self, slots)
    }

    fn extend_mf(&self, value: &mut Vec<f32>) -> Result<bool> {
        CtrAccessor::extend_mf(self, value)
    }

    fn parse_to_string(&self, value: &[f32], param: usize) -> Result<String> {
        CtrAccessor::parse_to_string(self, value, param)
    }

    fn parse_from_string(&self, text: &str, value: &mut [f32]) -> Result<usize> {
        CtrAccessor::parse_from_string(self, text, value)
    }

    fn get_field(&self, value: &[f32], name: &str) -> Result<f32> {
        CtrAccessor::get_field(self, value, name)
    }

    fn set_day_id(&self, day_id: i32) {
        CtrAccessor::set_day_id(self, day_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accessor::testing::accessor;

    #[test]
    fn table_info_lookup() {
        let acc: Box<dyn ValueAccessor> = Box::new(accessor::<f64>(4));
        let info = acc.table_info();

        assert_eq!(acc.get_table_info(InfoKey::Size), info.size);
        assert_eq!(acc.get_table_info(InfoKey::SelectDim), 5);
        assert_eq!(acc.get_table_info(InfoKey::UpdateDim), 8);
        assert_eq!(acc.get_table_info(InfoKey::MfSize), acc.mf_size());
        assert_eq!(acc.slots(), 14);
        assert_eq!(acc.short_slots(), 9);
    }

    #[test]
    fn trait_objects_drive_the_lifecycle() {
        let acc: Box<dyn ValueAccessor> = Box::new(accessor::<f32>(2));
        let mut value = vec![0.; acc.short_slots()];
        acc.create(&mut [&mut value]).unwrap();

        let push: [f32; 6] = [1., 200., 20., 0.1, 0.5, 0.5];
        acc.update(&mut [&mut value], &[&push]).unwrap();

        assert!(acc.need_extend_mf(&value).unwrap());
        assert!(acc.extend_mf(&mut value).unwrap());
        assert!(acc.has_mf(value.len()));
        assert_eq!(acc.get_field(&value, "show").unwrap(), 200.);
    }
}
