/// Legacy stored value for a successful query without MX answers.
pub const NO_RECORDS: &str = "none";
/// Legacy stored value for a failed MX query.
pub const QUERY_FAILED: &str = "null";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MxRecord {
    pub preference: u16,
    pub exchange: String,
}

impl MxRecord {
    pub fn new(preference: u16, exchange: impl Into<String>) -> Self {
        Self {
            preference,
            exchange: exchange.into(),
        }
    }
}

/// Outcome of an MX enumeration. Records keep resolver answer order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MxList {
    Records(Vec<MxRecord>),
    NoRecords,
    QueryFailed(String),
}

/// Which exchange counts as "first" when only one is probed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MxOrder {
    /// Position 0 of the answer section, as returned by the resolver.
    #[default]
    Answer,
    /// Lowest preference value; ties keep answer order.
    Preference,
}

impl MxList {
    pub fn records(&self) -> &[MxRecord] {
        match self {
            Self::Records(records) => records.as_slice(),
            Self::NoRecords | Self::QueryFailed(_) => &[],
        }
    }

    pub fn hostnames(&self) -> Vec<&str> {
        self.records()
            .iter()
            .map(|record| record.exchange.as_str())
            .collect()
    }

    pub fn failure(&self) -> Option<&str> {
        match self {
            Self::QueryFailed(reason) => Some(reason.as_str()),
            Self::Records(_) | Self::NoRecords => None,
        }
    }

    /// Exchange selected for the capability probe.
    pub fn primary(&self, order: MxOrder) -> Option<&MxRecord> {
        let records = self.records();
        match order {
            MxOrder::Answer => records.first(),
            MxOrder::Preference => records.iter().min_by_key(|record| record.preference),
        }
    }

    /// Hostnames as persisted, with the `"none"`/`"null"` sentinels.
    pub fn stored(&self) -> Vec<String> {
        match self {
            Self::Records(records) => records.iter().map(|r| r.exchange.clone()).collect(),
            Self::NoRecords => vec![NO_RECORDS.to_string()],
            Self::QueryFailed(_) => vec![QUERY_FAILED.to_string()],
        }
    }
}
