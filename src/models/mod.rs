pub mod finding;
pub mod profile;
pub mod record;
pub mod station;

pub use finding::{Finding, Report};
pub use profile::{
    ChannelNames, CheckProfile, Dispatch, ExclusionSet, Granularity, Limits, ProfileKind,
    ProfileSet, RuleId, StalenessPolicy, ValueRange,
};
pub use record::{StationRecord, StationWindow};
pub use station::Station;
