//! Output file layout
//!
//! Files land at `<root>/<tenant-host>/<YYYYMMDD>/<entity>_<YYYYMMDD>-<HHMM.SS>.csv`.

use chrono::{DateTime, Local, TimeZone};
use std::path::{Path, PathBuf};

/// Date and time a run started. Every file written by the run shares it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunStamp {
    started: DateTime<Local>,
}

impl RunStamp {
    pub fn now() -> Self {
        Self::at(Local::now())
    }

    pub fn at<Tz: TimeZone>(started: DateTime<Tz>) -> Self {
        Self {
            started: started.with_timezone(&Local),
        }
    }

    /// `YYYYMMDD`
    pub fn date(&self) -> String {
        self.started.format("%Y%m%d").to_string()
    }

    /// `HHMM.SS`
    pub fn time(&self) -> String {
        self.started.format("%H%M.%S").to_string()
    }

    /// `YYYYMMDD-HHMM.SS`, also used for debug log file names.
    pub fn label(&self) -> String {
        format!("{}-{}", self.date(), self.time())
    }
}

/// Derives extraction file paths for one tenant and run.
#[derive(Debug, Clone)]
pub struct OutputLayout {
    root: PathBuf,
    tenant_host: String,
    stamp: RunStamp,
}

impl OutputLayout {
    pub fn new(root: impl AsRef<Path>, tenant_host: impl Into<String>, stamp: RunStamp) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            tenant_host: tenant_host.into(),
            stamp,
        }
    }

    pub fn stamp(&self) -> RunStamp {
        self.stamp
    }

    /// Directory holding every file of this run.
    pub fn run_dir(&self) -> PathBuf {
        self.root.join(&self.tenant_host).join(self.stamp.date())
    }

    pub fn entity_path(&self, entity: &str) -> PathBuf {
        self.run_dir()
            .join(format!("{}_{}.csv", entity, self.stamp.label()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stamp() -> RunStamp {
        RunStamp::at(Local.with_ymd_and_hms(2024, 3, 7, 9, 5, 2).unwrap())
    }

    #[test]
    fn test_stamp_formats() {
        let stamp = stamp();
        assert_eq!(stamp.date(), "20240307");
        assert_eq!(stamp.time(), "0905.02");
        assert_eq!(stamp.label(), "20240307-0905.02");
    }

    #[test]
    fn test_entity_path() {
        let layout = OutputLayout::new("data", "acme.my.salesforce.com", stamp());
        assert_eq!(
            layout.entity_path("AccountHistory"),
            PathBuf::from("data/acme.my.salesforce.com/20240307/AccountHistory_20240307-0905.02.csv")
        );
    }

    #[test]
    fn test_entities_share_run_dir() {
        let layout = OutputLayout::new("out", "acme.my.salesforce.com", stamp());
        let a = layout.entity_path("AccountHistory");
        let b = layout.entity_path("Custom__History");
        assert_eq!(a.parent(), b.parent());
        assert_eq!(a.parent().unwrap(), layout.run_dir());
    }
}
