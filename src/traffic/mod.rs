pub mod recommend;
pub mod units;

pub use recommend::{
    describe_traffic_recommendation, get_organization_size_meta, get_traffic_recommendation,
    TrafficRecommendation,
};
pub use units::{TrafficUnit, GB_PER_TB, KB_PER_GB, KB_PER_TB};
