//! Status severities and worst-of resolution.

use core::fmt;
use core::str::FromStr;

/// Result of a single health check.
///
/// Variants are declared in severity order, so the derived `Ord` is the
/// severity ordering: `Ok < Warn < Error`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "UPPERCASE")
)]
pub enum Status {
    Ok,
    Warn,
    Error,
}

impl Status {
    /// All severities, least severe first.
    pub const ALL: [Status; 3] = [Status::Ok, Status::Warn, Status::Error];

    /// Wire/display form (`OK`, `WARN`, `ERROR`).
    pub fn symbol(&self) -> &'static str {
        match self {
            Status::Ok => "OK",
            Status::Warn => "WARN",
            Status::Error => "ERROR",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.symbol())
    }
}

/// Error returned when parsing an unknown status string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown status {0:?} (expected OK, WARN or ERROR)")]
pub struct UnknownStatus(pub String);

impl FromStr for Status {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "OK" => Ok(Status::Ok),
            "WARN" => Ok(Status::Warn),
            "ERROR" => Ok(Status::Error),
            _ => Err(UnknownStatus(s.to_string())),
        }
    }
}

/// Resolve the most severe status in a collection.
///
/// Returns `None` for an empty collection. A day without checks has no
/// status at all; it must be shown as [`DayStatus::NoData`], never as OK.
///
/// ```rust
/// use statusboard_types::{worst, Status};
///
/// assert_eq!(worst([Status::Ok, Status::Warn]), Some(Status::Warn));
/// assert_eq!(worst(Vec::<Status>::new()), None);
/// ```
pub fn worst<I>(statuses: I) -> Option<Status>
where
    I: IntoIterator<Item = Status>,
{
    statuses.into_iter().max()
}

/// What a calendar cell or strip cell shows for one day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DayStatus {
    /// No check was recorded. Distinct from, and never rendered as, OK.
    #[default]
    NoData,
    /// Worst status among the checks recorded that day.
    Reported(Status),
}

impl DayStatus {
    /// The reported status, if any.
    pub fn status(&self) -> Option<Status> {
        match self {
            DayStatus::NoData => None,
            DayStatus::Reported(s) => Some(*s),
        }
    }

    pub fn is_no_data(&self) -> bool {
        matches!(self, DayStatus::NoData)
    }

    /// Short symbol for display.
    pub fn symbol(&self) -> &'static str {
        match self {
            DayStatus::NoData => "NONE",
            DayStatus::Reported(s) => s.symbol(),
        }
    }

    /// Human-readable label for tooltips and detail panes.
    pub fn label(&self) -> &'static str {
        match self {
            DayStatus::NoData => "No data",
            DayStatus::Reported(s) => s.symbol(),
        }
    }
}

impl From<Option<Status>> for DayStatus {
    fn from(status: Option<Status>) -> Self {
        status.map_or(DayStatus::NoData, DayStatus::Reported)
    }
}

impl From<Status> for DayStatus {
    fn from(status: Status) -> Self {
        DayStatus::Reported(status)
    }
}

/// System-wide banner state derived from every service's current status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverallStatus {
    Operational,
    PartialOutage,
    MajorOutage,
    /// None of the services has reported yet.
    NoData,
}

impl OverallStatus {
    /// Fold per-service statuses into a banner state.
    ///
    /// Services without data neither count as operational nor as failing.
    pub fn from_statuses<I>(statuses: I) -> Self
    where
        I: IntoIterator<Item = DayStatus>,
    {
        match worst(statuses.into_iter().filter_map(|s| s.status())) {
            None => OverallStatus::NoData,
            Some(Status::Ok) => OverallStatus::Operational,
            Some(Status::Warn) => OverallStatus::PartialOutage,
            Some(Status::Error) => OverallStatus::MajorOutage,
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            OverallStatus::Operational => "All Systems Operational",
            OverallStatus::PartialOutage => "Partial Outage",
            OverallStatus::MajorOutage => "Major Outage",
            OverallStatus::NoData => "Awaiting First Check",
        }
    }

    /// The status whose colour the banner uses.
    pub fn day_status(&self) -> DayStatus {
        match self {
            OverallStatus::Operational => DayStatus::Reported(Status::Ok),
            OverallStatus::PartialOutage => DayStatus::Reported(Status::Warn),
            OverallStatus::MajorOutage => DayStatus::Reported(Status::Error),
            OverallStatus::NoData => DayStatus::NoData,
        }
    }
}
