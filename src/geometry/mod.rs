//! Geometry helpers for placing emerged regions on the stellar sphere.

mod convert;

pub use convert::{
    to_region, wrap_longitude, CycleParity, SampledEmergence,
    REGION_WIDTH_DEG, FLUX_PER_SEPARATION_SQ,
};
