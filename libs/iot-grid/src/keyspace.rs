//! Grid key naming
//!
//! Lines and machines are keyed by their path below the owning facility,
//! so ids only need to be unique within their parent.

use serde::{Deserialize, Serialize};

/// Key of a line within the Lines map: `{fid}/{lid}`
pub fn line_key(fid: &str, lid: &str) -> String {
    format!("{}/{}", fid, lid)
}

/// Key of a machine within the Machines map: `{fid}/{lid}/{mid}`
pub fn machine_key(fid: &str, lid: &str, mid: &str) -> String {
    format!("{}/{}/{}", fid, lid, mid)
}

/// Redis hash names for the six entity maps
///
/// ```
/// use iot_grid::GridKeySpace;
///
/// let keys = GridKeySpace::new("dashboard");
/// assert_eq!(keys.facilities(), "dashboard:facilities");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridKeySpace {
    pub prefix: String,
}

impl Default for GridKeySpace {
    fn default() -> Self {
        Self::new("dashboard")
    }
}

impl GridKeySpace {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    /// Isolated keyspace for tests against a shared Redis
    pub fn test(run_id: &str) -> Self {
        Self::new(format!("test:{}:dashboard", run_id))
    }

    fn key(&self, map: &str) -> String {
        format!("{}:{}", self.prefix, map)
    }

    pub fn customers(&self) -> String {
        self.key("customers")
    }

    pub fn facilities(&self) -> String {
        self.key("facilities")
    }

    pub fn lines(&self) -> String {
        self.key("lines")
    }

    pub fn machines(&self) -> String {
        self.key("machines")
    }

    pub fn runs(&self) -> String {
        self.key("runs")
    }

    pub fn calendar(&self) -> String {
        self.key("calendar")
    }
}
