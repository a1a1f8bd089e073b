use std::future::Future;

use thiserror::Error;

use herald_types::BinaryNode;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DecryptError {
    #[error("message node carries no encrypted content")]
    MissingContent,

    #[error("no session for sender {0}")]
    NoSession(String),

    #[error("decryption failed: {0}")]
    Failed(String),
}

/// Plaintext of one channel post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecryptedMessage {
    /// Sender address as resolved by the decryptor, when known.
    pub from: Option<String>,
    pub plaintext: Vec<u8>,
}

/// Turns an encrypted message node into plaintext.
///
/// Called once per fetched post; calls for different posts may run
/// concurrently.
pub trait MessageDecryptor: Send + Sync {
    fn decrypt(
        &self,
        node: &BinaryNode,
        me_id: &str,
        me_lid: &str,
    ) -> impl Future<Output = Result<DecryptedMessage, DecryptError>> + Send;
}
