/// The signed-in account as the decryptor needs to see it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnIdentity {
    /// Primary routing address, e.g. `15551234567:3@s.whatsapp.net`.
    pub id: String,
    /// Alternate (lid) address, not known for every account.
    pub lid: Option<String>,
}

impl OwnIdentity {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            lid: None,
        }
    }

    pub fn with_lid(mut self, lid: impl Into<String>) -> Self {
        self.lid = Some(lid.into());
        self
    }

    /// The alternate address, or an empty string when unknown.
    pub fn lid_or_empty(&self) -> &str {
        self.lid.as_deref().unwrap_or("")
    }
}
