/// Herald Crypto Interface
///
/// Herald never decrypts anything itself. Channel posts arrive as encrypted
/// message nodes and are handed to a `MessageDecryptor` supplied by the
/// session layer, together with the caller's own identity.

pub mod decrypt;
pub mod identity;

pub use decrypt::{DecryptError, DecryptedMessage, MessageDecryptor};
pub use identity::OwnIdentity;
