use rand::{SeedableRng, rngs::StdRng};

use super::CtrAccessor;
use crate::{
    layout::Counter,
    optimization::{AdaGradSgd, RuleBase},
    specs::CtrParamSpec,
};

pub fn accessor_with<C: Counter>(params: CtrParamSpec, embedx_dim: usize) -> CtrAccessor<C> {
    let rule = |seed| {
        let base = RuleBase::new(0.05, 1e-4, (-10., 10.), StdRng::seed_from_u64(seed));
        Box::new(AdaGradSgd::new(base, 3.))
    };

    CtrAccessor::new(params, embedx_dim, 10., rule(1), rule(2))
}

pub fn accessor<C: Counter>(embedx_dim: usize) -> CtrAccessor<C> {
    accessor_with(CtrParamSpec::default(), embedx_dim)
}

pub fn push_record(slot: f32, show: f32, click: f32, embed_g: f32, embedx_g: &[f32]) -> Vec<f32> {
    let mut push = vec![slot, show, click, embed_g];
    push.extend_from_slice(embedx_g);
    push
}
