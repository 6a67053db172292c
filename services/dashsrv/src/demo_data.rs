//! Fixed demo topology
//!
//! Every generated facility has the same shape; only the numeric fields,
//! run picks and ids vary between resets.

/// Password stored on every demo customer. A placeholder, never a credential.
pub const DEMO_PASSWORD: &str = "password";

pub const LINE_DESCRIPTION: &str = "The line";
pub const MACHINE_DESCRIPTION: &str = "The machine";
pub const RUN_DESCRIPTION: &str = "Standard Run";
pub const RUN_DETAILS_DESC: &str = "The Run";

/// Fixed location shared by all demo facilities
pub const FACILITY_LAT: f64 = 20.0;
pub const FACILITY_LNG: f64 = -80.0;

pub const MS_IN_HOUR: i64 = 60 * 60 * 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FacilityTemplate {
    pub name: &'static str,
    pub fid: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineTemplate {
    pub name: &'static str,
    pub lid: &'static str,
    pub color: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MachineTemplate {
    pub name: &'static str,
    pub mid: &'static str,
    pub machine_type: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TelemetryTemplate {
    pub unit: &'static str,
    pub max: f64,
    pub min: f64,
    pub label: &'static str,
    pub short_code: &'static str,
}

pub const COMPANIES: &[&str] = &[
    "Wonka Industries",
    "Acme Corp",
    "Stark Industries",
    "Ollivander's Wand Shop",
    "Gekko & Co",
    "Wayne Enterprises",
    "Cyberdyne Systems",
    "Cheers",
    "Genco Pura",
    "NY Enquirer",
    "Duff Beer",
    "Bubba Gump Shrimp Co",
    "Olivia Pope & Associates",
    "Sterling Cooper",
    "Soylent",
    "Hooli",
    "Good Burger",
];

pub const FACILITIES: &[FacilityTemplate] = &[
    FacilityTemplate { name: "Atlanta", fid: "facility-1" },
    FacilityTemplate { name: "Singapore", fid: "facility-2" },
    FacilityTemplate { name: "Frankfurt", fid: "facility-3" },
    FacilityTemplate { name: "Raleigh", fid: "facility-4" },
];

const LINE_COLOR: &str = "#9ecf99";

pub const LINES: &[LineTemplate] = &[
    LineTemplate { name: "Line 1", lid: "line-1", color: LINE_COLOR },
    LineTemplate { name: "Line 2", lid: "line-2", color: LINE_COLOR },
    LineTemplate { name: "Line 3", lid: "line-3", color: LINE_COLOR },
    LineTemplate { name: "Line 4", lid: "line-4", color: LINE_COLOR },
    LineTemplate { name: "Line 5", lid: "line-5", color: LINE_COLOR },
    LineTemplate { name: "Line 6", lid: "line-6", color: LINE_COLOR },
    LineTemplate { name: "Line 7", lid: "line-7", color: LINE_COLOR },
    LineTemplate { name: "Line 8", lid: "line-8", color: LINE_COLOR },
];

pub const MACHINES: &[MachineTemplate] = &[
    MachineTemplate { name: "Caster", mid: "machine-1", machine_type: "caster" },
    MachineTemplate { name: "Chiller", mid: "machine-2", machine_type: "chiller" },
    MachineTemplate { name: "Weighting", mid: "machine-3", machine_type: "scale" },
    MachineTemplate { name: "Spin Test", mid: "machine-4", machine_type: "spinner" },
    MachineTemplate { name: "Caster", mid: "machine-5", machine_type: "caster" },
    MachineTemplate { name: "Chiller", mid: "machine-6", machine_type: "chiller" },
    MachineTemplate { name: "Weighting", mid: "machine-7", machine_type: "scale" },
    MachineTemplate { name: "Spin Test", mid: "machine-8", machine_type: "spinner" },
];

pub const TELEMETRY: &[TelemetryTemplate] = &[
    TelemetryTemplate { unit: "A", max: 55.0, min: 15.0, label: "Current", short_code: "current" },
    TelemetryTemplate { unit: "°C", max: 90.0, min: 10.0, label: "Temperature", short_code: "temp" },
    TelemetryTemplate { unit: "db", max: 40.0, min: 30.0, label: "Noise", short_code: "noise" },
    TelemetryTemplate { unit: "rpm", max: 2000.0, min: 1500.0, label: "Speed", short_code: "speed" },
    TelemetryTemplate { unit: "nu", max: 0.5, min: 0.05, label: "Vibration", short_code: "vibration" },
    TelemetryTemplate { unit: "V", max: 250.0, min: 200.0, label: "Voltage", short_code: "voltage" },
];

pub const RUN_NAMES: &[&str] = &["500-FS", "240-DS", "10000-TP"];

/// The immutable tables handed to the generator and reset logic
#[derive(Debug, Clone, Copy)]
pub struct DemoTables {
    pub companies: &'static [&'static str],
    pub facilities: &'static [FacilityTemplate],
    pub lines: &'static [LineTemplate],
    pub machines: &'static [MachineTemplate],
    pub telemetry: &'static [TelemetryTemplate],
    pub run_names: &'static [&'static str],
}

impl Default for DemoTables {
    fn default() -> Self {
        Self::standard()
    }
}

impl DemoTables {
    pub const fn standard() -> Self {
        Self {
            companies: COMPANIES,
            facilities: FACILITIES,
            lines: LINES,
            machines: MACHINES,
            telemetry: TELEMETRY,
            run_names: RUN_NAMES,
        }
    }

    pub fn facility_template(&self, fid: &str) -> Option<&'static FacilityTemplate> {
        self.facilities.iter().find(|t| t.fid == fid)
    }
}
