mod mock;
mod profile;
mod scenario;

pub use self::{mock::MockConfig, profile::Profile, scenario::parse_scenario};
