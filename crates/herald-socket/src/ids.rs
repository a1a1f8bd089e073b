use std::sync::atomic::{AtomicU64, Ordering};

/// Produces request tags of the form `<a>.<b>-<n>`: a random per-session
/// prefix followed by a counter, so no two in-flight requests share a tag.
#[derive(Debug)]
pub struct MessageTagGenerator {
    prefix: String,
    counter: AtomicU64,
}

impl MessageTagGenerator {
    pub fn new() -> Self {
        let (a, b): (u16, u16) = (rand::random(), rand::random());
        Self::with_prefix(format!("{}.{}-", a, b))
    }

    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            counter: AtomicU64::new(1),
        }
    }

    pub fn next_tag(&self) -> String {
        let n = self.counter.fetch_add(1, Ordering::Relaxed);
        format!("{}{}", self.prefix, n)
    }
}

impl Default for MessageTagGenerator {
    fn default() -> Self {
        Self::new()
    }
}

/// Random client message id: `3EB0` followed by 18 random bytes in upper-case hex.
pub fn generate_message_id() -> String {
    let bytes: [u8; 18] = rand::random();
    format!("3EB0{}", hex::encode_upper(bytes))
}
