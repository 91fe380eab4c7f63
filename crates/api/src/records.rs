use std::str::FromStr;

/// Production base URL for the WHOOP developer API.
pub const BASE_URL: &str = "https://api.prod.whoop.com/developer/v2";

/// The record families the WHOOP API exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordType {
    Sleep,
    Workout,
    Profile,
    Recovery,
}

impl RecordType {
    /// Endpoint path under the developer API base URL.
    pub fn endpoint(self) -> &'static str {
        match self {
            Self::Sleep => "/activity/sleep",
            Self::Workout => "/activity/workout",
            Self::Profile => "/user/profile/basic",
            Self::Recovery => "/recovery",
        }
    }

    /// Selector name as accepted on the command line.
    pub fn name(self) -> &'static str {
        match self {
            Self::Sleep => "sleep",
            Self::Workout => "workout",
            Self::Profile => "profile",
            Self::Recovery => "recovery",
        }
    }
}

impl FromStr for RecordType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sleep" => Ok(Self::Sleep),
            "workout" => Ok(Self::Workout),
            "profile" => Ok(Self::Profile),
            "recovery" => Ok(Self::Recovery),
            other => anyhow::bail!(
                "invalid record type '{other}', expected sleep, workout, profile, or recovery"
            ),
        }
    }
}

impl std::fmt::Display for RecordType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
