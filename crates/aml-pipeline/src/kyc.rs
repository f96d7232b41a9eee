use std::collections::BTreeSet;

/// Registry of KYC-verified party identifiers.
///
/// Both legs of a transfer must be verified before it is scored. The
/// registry is an in-process set; production deployments populate it from
/// the institution's KYC system at startup.
#[derive(Clone, Debug, Default)]
pub struct KycRegistry {
    verified: BTreeSet<String>,
}

impl KycRegistry {
    pub fn new<I, S>(parties: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            verified: parties.into_iter().map(Into::into).collect(),
        }
    }

    pub fn register(&mut self, party: impl Into<String>) {
        self.verified.insert(party.into());
    }

    pub fn is_verified(&self, party: &str) -> bool {
        self.verified.contains(party)
    }

    pub fn len(&self) -> usize {
        self.verified.len()
    }

    pub fn is_empty(&self) -> bool {
        self.verified.is_empty()
    }
}
