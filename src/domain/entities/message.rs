use std::fmt;

/// An inbound chat message as handed over by a transport adapter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncomingMessage {
    pub chat_id: String,
    pub text: String,
}

impl IncomingMessage {
    pub fn new(chat_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            chat_id: chat_id.into(),
            text: text.into(),
        }
    }
}

/// Account address on the chain.
///
/// Passed through as-is; malformed addresses are rejected by the node.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ChainAddress(String);

impl ChainAddress {
    pub fn new(address: impl Into<String>) -> Self {
        Self(address.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ChainAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
