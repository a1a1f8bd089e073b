use std::future::Future;

use herald_types::BinaryNode;

use crate::error::TransportError;

/// The session layer Herald borrows to talk to the service.
///
/// Timeouts, retries and connection state all live behind this trait.
pub trait Transport: Send + Sync {
    /// Sends one request tree and waits for the matching reply.
    fn query(
        &self,
        node: BinaryNode,
    ) -> impl Future<Output = Result<BinaryNode, TransportError>> + Send;

    /// Fresh `id` for an `iq` request, unique among in-flight requests.
    fn generate_message_tag(&self) -> String;

    /// Fresh client id for a `message` stanza.
    fn generate_message_id(&self) -> String;
}
